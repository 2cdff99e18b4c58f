//! Depth-limited minimax with alpha-beta pruning.
//!
//! Used for boards too large to search exhaustively (Connect Four). At
//! the depth limit a non-terminal board is scored by
//! [`BoardGame::heuristic`], which stays strictly inside the win score.
//! With a depth at least as large as the remaining game this returns the
//! same move as [`super::minimax::best_move`].

use super::{SearchError, WIN_SCORE, terminal_score};
use crate::games::{Board, BoardGame, Mark, Move};
use tracing::{debug, instrument};

const INFINITY: i32 = WIN_SCORE + 1;

/// Returns the best move for `maximizing` looking `max_depth` plies ahead.
///
/// Ties go to the first move in enumeration order.
///
/// # Errors
///
/// [`SearchError::TerminalBoard`] or [`SearchError::NoLegalMoves`] if
/// there is nothing to search.
#[instrument(skip(game, board), fields(kind = %game.kind()))]
pub fn best_move<G: BoardGame>(
    game: &G,
    board: &Board<G::Cell>,
    maximizing: Mark,
    max_depth: u32,
) -> Result<Move<G::Position>, SearchError> {
    let outcome = game.outcome(board)?;
    if outcome.is_terminal() {
        return Err(SearchError::TerminalBoard(outcome));
    }

    let mut alpha = -INFINITY;
    let mut best: Option<(i32, Move<G::Position>)> = None;
    for mv in game.legal_moves(board, maximizing) {
        let child = game.apply(board, &mv)?;
        let score = search(
            game,
            &child,
            max_depth.saturating_sub(1),
            alpha,
            INFINITY,
            maximizing.opponent(),
            maximizing,
        )?;
        if best.as_ref().is_none_or(|(best_score, _)| score > *best_score) {
            best = Some((score, mv));
            alpha = alpha.max(score);
        }
    }

    let (score, mv) = best.ok_or(SearchError::NoLegalMoves)?;
    debug!(score, max_depth, position = %mv.position, "Alpha-beta chose move");
    Ok(mv)
}

fn search<G: BoardGame>(
    game: &G,
    board: &Board<G::Cell>,
    depth: u32,
    mut alpha: i32,
    mut beta: i32,
    to_move: Mark,
    maximizing: Mark,
) -> Result<i32, SearchError> {
    if let Some(score) = terminal_score(&game.outcome(board)?, maximizing) {
        return Ok(score);
    }
    if depth == 0 {
        return Ok(game.heuristic(board, maximizing));
    }

    let maximizing_turn = to_move == maximizing;
    let mut value = if maximizing_turn { -INFINITY } else { INFINITY };
    for mv in game.legal_moves(board, to_move) {
        let child = game.apply(board, &mv)?;
        let score = search(game, &child, depth - 1, alpha, beta, to_move.opponent(), maximizing)?;
        if maximizing_turn {
            value = value.max(score);
            alpha = alpha.max(value);
        } else {
            value = value.min(score);
            beta = beta.min(value);
        }
        if alpha >= beta {
            break;
        }
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Cell, ConnectFour, Coord, TicTacToe};
    use crate::search::minimax;

    fn drop_discs(game: &ConnectFour, columns: &[usize]) -> Board<Cell> {
        let mut board = game.empty_board();
        let mut mark = Mark::X;
        for &column in columns {
            board = game.apply(&board, &Move::new(mark, column)).unwrap();
            mark = mark.opponent();
        }
        board
    }

    #[test]
    fn test_connect_four_takes_immediate_win() {
        let game = ConnectFour::new();
        // X: bottom row columns 0-2, O stacked on top of them.
        let board = drop_discs(&game, &[0, 0, 1, 1, 2, 2]);
        let mv = best_move(&game, &board, Mark::X, 1).unwrap();
        assert_eq!(mv.position, 3);
    }

    #[test]
    fn test_connect_four_blocks_threat() {
        let game = ConnectFour::new();
        // O: bottom row columns 0-2 under X's discs; X to move must block column 3.
        let mut board = game.empty_board();
        for col in 0..3 {
            board.set(Coord::new(5, col), Cell::Occupied(Mark::O)).unwrap();
            board.set(Coord::new(4, col), Cell::Occupied(Mark::X)).unwrap();
        }
        let mv = best_move(&game, &board, Mark::X, 2).unwrap();
        assert_eq!(mv.position, 3);
    }

    #[test]
    fn test_connect_four_depth_limited_is_deterministic() {
        let game = ConnectFour::new();
        let board = drop_discs(&game, &[3, 3, 2]);
        let first = best_move(&game, &board, Mark::O, 4).unwrap();
        assert_eq!(best_move(&game, &board, Mark::O, 4).unwrap(), first);
    }

    #[test]
    fn test_matches_minimax_when_deep_enough() {
        let game = TicTacToe::new();
        let openings: [&[(usize, usize)]; 3] = [
            &[(0, 0)],
            &[(1, 1), (0, 0), (2, 2)],
            &[(0, 1), (1, 1), (2, 0), (0, 0)],
        ];
        for opening in openings {
            let mut board = game.empty_board();
            let mut mark = Mark::X;
            for &(row, col) in opening {
                board = game.apply(&board, &Move::new(mark, Coord::new(row, col))).unwrap();
                mark = mark.opponent();
            }
            assert_eq!(
                best_move(&game, &board, mark, 9).unwrap(),
                minimax::best_move(&game, &board, mark).unwrap(),
            );
        }
    }
}
