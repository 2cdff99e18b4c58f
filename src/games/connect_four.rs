//! Connect Four: 7 columns by 6 rows, discs fall to the lowest empty row.

use super::action::{InvariantViolation, Move, MoveError};
use super::board::{Board, BoardError, Coord, Dimensions};
use super::rules::{BoardGame, check_winner, winning_lines};
use super::types::{Cell, GameKind, Line, Mark, Outcome};
use crate::search::WIN_SCORE;
use tracing::instrument;

const ROWS: usize = 6;
const COLS: usize = 7;
const RUN: usize = 4;

/// Connect Four rules. A move names a column (0-based).
#[derive(Debug, Clone)]
pub struct ConnectFour {
    lines: Vec<Line>,
}

impl ConnectFour {
    /// Creates the rule set, precomputing all 69 runs of four.
    #[instrument]
    pub fn new() -> Self {
        Self {
            lines: winning_lines(Dimensions::new(ROWS, COLS), RUN),
        }
    }

    /// An empty 7x6 board.
    pub fn empty_board(&self) -> Board<Cell> {
        Board::new(self.dimensions())
    }

    /// Row a disc dropped in `column` would land on, if the column has room.
    ///
    /// # Errors
    ///
    /// [`BoardError::OutOfBounds`] if the column does not exist.
    pub fn landing_row(board: &Board<Cell>, column: usize) -> Result<Option<usize>, BoardError> {
        let rows = board.dimensions().rows();
        for row in (0..rows).rev() {
            if board.get(Coord::new(row, column))?.is_empty() {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    fn column_has_room(board: &Board<Cell>, column: usize) -> bool {
        matches!(board.get(Coord::new(0, column)), Ok(Cell::Empty))
    }
}

impl Default for ConnectFour {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardGame for ConnectFour {
    type Cell = Cell;
    type Position = usize;

    fn kind(&self) -> GameKind {
        GameKind::ConnectFour
    }

    fn dimensions(&self) -> Dimensions {
        Dimensions::new(ROWS, COLS)
    }

    fn validate(&self, board: &Board<Cell>, mv: &Move<usize>) -> Result<(), MoveError> {
        match Self::landing_row(board, mv.position)? {
            Some(_) => Ok(()),
            None => Err(MoveError::illegal(mv.position, "column is full")),
        }
    }

    fn legal_moves(&self, board: &Board<Cell>, mark: Mark) -> Vec<Move<usize>> {
        (0..board.dimensions().cols())
            .filter(|&column| Self::column_has_room(board, column))
            .map(|column| Move::new(mark, column))
            .collect()
    }

    fn apply(&self, board: &Board<Cell>, mv: &Move<usize>) -> Result<Board<Cell>, MoveError> {
        let row = Self::landing_row(board, mv.position)?
            .ok_or_else(|| MoveError::illegal(mv.position, "column is full"))?;
        Ok(board.with(Coord::new(row, mv.position), Cell::Occupied(mv.mark))?)
    }

    fn detect_win(&self, board: &Board<Cell>) -> Result<Outcome, InvariantViolation> {
        Ok(check_winner(board, &self.lines)?.map_or(Outcome::InProgress, Outcome::Win))
    }

    /// Open threes (three discs plus an empty cell in a run) and centre-column
    /// control, clamped inside the win score.
    fn heuristic(&self, board: &Board<Cell>, mark: Mark) -> i32 {
        let mut score = 0i32;
        for line in &self.lines {
            let (mut mine, mut theirs, mut empty) = (0, 0, 0);
            for coord in line {
                match board.get(*coord) {
                    Ok(Cell::Occupied(m)) if m == mark => mine += 1,
                    Ok(Cell::Occupied(_)) => theirs += 1,
                    _ => empty += 1,
                }
            }
            if empty == 1 && mine == RUN - 1 {
                score += 2;
            } else if empty == 1 && theirs == RUN - 1 {
                score -= 2;
            }
        }
        let centre = COLS / 2;
        for row in 0..ROWS {
            match board.get(Coord::new(row, centre)) {
                Ok(Cell::Occupied(m)) if m == mark => score += 1,
                Ok(Cell::Occupied(_)) => score -= 1,
                _ => {}
            }
        }
        score.clamp(-(WIN_SCORE - 1), WIN_SCORE - 1)
    }

    /// Accepts a 1-based column number.
    fn parse_position(&self, input: &str) -> Option<usize> {
        let column = input.trim().parse::<usize>().ok()?.checked_sub(1)?;
        (column < COLS).then_some(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(board: &mut Board<Cell>, cells: &[(usize, usize, Mark)]) {
        for &(row, col, mark) in cells {
            board.set(Coord::new(row, col), Cell::Occupied(mark)).unwrap();
        }
    }

    #[test]
    fn test_disc_falls_to_bottom() {
        let game = ConnectFour::new();
        let board = game.apply(&game.empty_board(), &Move::new(Mark::X, 3)).unwrap();
        assert_eq!(board.get(Coord::new(5, 3)).unwrap(), Cell::Occupied(Mark::X));
        let board = game.apply(&board, &Move::new(Mark::O, 3)).unwrap();
        assert_eq!(board.get(Coord::new(4, 3)).unwrap(), Cell::Occupied(Mark::O));
    }

    #[test]
    fn test_full_column_rejected() {
        let game = ConnectFour::new();
        let mut board = game.empty_board();
        let mut mark = Mark::X;
        for _ in 0..ROWS {
            board = game.apply(&board, &Move::new(mark, 0)).unwrap();
            mark = mark.opponent();
        }
        let err = game.apply(&board, &Move::new(mark, 0)).unwrap_err();
        assert!(matches!(err, MoveError::IllegalMove { .. }));
        assert!(!game.legal_moves(&board, mark).iter().any(|mv| mv.position == 0));
    }

    #[test]
    fn test_missing_column_out_of_bounds() {
        let game = ConnectFour::new();
        let err = game.apply(&game.empty_board(), &Move::new(Mark::X, 7)).unwrap_err();
        assert!(matches!(err, MoveError::OutOfBounds(_)));
    }

    #[test]
    fn test_diagonal_win_before_board_full() {
        let game = ConnectFour::new();
        let mut board = game.empty_board();
        place(
            &mut board,
            &[
                (5, 0, Mark::X),
                (4, 1, Mark::X),
                (3, 2, Mark::X),
                (2, 3, Mark::X),
            ],
        );
        let outcome = game.detect_win(&board).unwrap();
        assert_eq!(outcome.winner(), Some(Mark::X));
        assert_eq!(
            outcome.winning_line(),
            Some(
                &[
                    Coord::new(2, 3),
                    Coord::new(3, 2),
                    Coord::new(4, 1),
                    Coord::new(5, 0),
                ][..]
            )
        );
        assert!(!game.legal_moves(&board, Mark::O).is_empty());
    }

    #[test]
    fn test_three_in_a_row_is_not_a_win() {
        let game = ConnectFour::new();
        let mut board = game.empty_board();
        place(&mut board, &[(5, 0, Mark::O), (5, 1, Mark::O), (5, 2, Mark::O)]);
        assert_eq!(game.detect_win(&board).unwrap(), Outcome::InProgress);
        assert!(game.heuristic(&board, Mark::O) > 0);
        assert!(game.heuristic(&board, Mark::X) < 0);
    }

    #[test]
    fn test_parse_position_is_one_based() {
        let game = ConnectFour::new();
        assert_eq!(game.parse_position("1"), Some(0));
        assert_eq!(game.parse_position("7"), Some(6));
        assert_eq!(game.parse_position("8"), None);
        assert_eq!(game.parse_position("0"), None);
    }
}
