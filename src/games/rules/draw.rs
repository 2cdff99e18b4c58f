//! Draw detection.

use super::BoardGame;
use crate::games::action::InvariantViolation;
use crate::games::board::Board;
use crate::games::types::{Cell, Mark};
use tracing::instrument;

/// Checks if every cell of a mark board is occupied.
#[instrument(skip(board))]
pub fn is_full(board: &Board<Cell>) -> bool {
    board.cells().iter().all(|cell| !cell.is_empty())
}

/// True iff no legal moves remain and nobody has won.
///
/// # Errors
///
/// Propagates [`InvariantViolation`] from win detection.
pub fn detect_draw<G: BoardGame + ?Sized>(
    game: &G,
    board: &Board<G::Cell>,
) -> Result<bool, InvariantViolation> {
    if !game.legal_moves(board, Mark::X).is_empty() {
        return Ok(false);
    }
    Ok(!game.detect_win(board)?.is_terminal())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::board::Coord;
    use crate::games::tictactoe::TicTacToe;

    fn fill(rows: [[Mark; 3]; 3]) -> Board<Cell> {
        let mut board = TicTacToe::new().empty_board();
        for (r, row) in rows.iter().enumerate() {
            for (c, mark) in row.iter().enumerate() {
                board.set(Coord::new(r, c), Cell::Occupied(*mark)).unwrap();
            }
        }
        board
    }

    #[test]
    fn test_empty_board_not_full() {
        assert!(!is_full(&TicTacToe::new().empty_board()));
    }

    #[test]
    fn test_draw_detection() {
        use Mark::{O, X};
        // X O X / O X X / O X O
        let board = fill([[X, O, X], [O, X, X], [O, X, O]]);
        assert!(is_full(&board));
        assert_eq!(detect_draw(&TicTacToe::new(), &board), Ok(true));
    }

    #[test]
    fn test_not_draw_if_winner() {
        use Mark::{O, X};
        let board = fill([[X, X, X], [O, O, X], [X, O, O]]);
        assert_eq!(detect_draw(&TicTacToe::new(), &board), Ok(false));
    }

    #[test]
    fn test_not_draw_while_moves_remain() {
        let board = TicTacToe::new().empty_board();
        assert_eq!(detect_draw(&TicTacToe::new(), &board), Ok(false));
    }
}
