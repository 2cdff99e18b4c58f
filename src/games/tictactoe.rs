//! Tic-tac-toe: 3x3, three in a row.

use super::action::{InvariantViolation, Move, MoveError};
use super::board::{Board, Coord, Dimensions};
use super::rules::{BoardGame, check_winner, winning_lines};
use super::types::{Cell, GameKind, Line, Mark, Outcome};
use tracing::instrument;

const SIZE: usize = 3;

/// Square labels in row-major order, used for parsing player input.
const LABELS: [&str; 9] = [
    "top-left",
    "top-center",
    "top-right",
    "middle-left",
    "center",
    "middle-right",
    "bottom-left",
    "bottom-center",
    "bottom-right",
];

/// Tic-tac-toe rules.
#[derive(Debug, Clone)]
pub struct TicTacToe {
    lines: Vec<Line>,
}

impl TicTacToe {
    /// Creates the rule set, precomputing the eight winning lines.
    #[instrument]
    pub fn new() -> Self {
        Self {
            lines: winning_lines(Dimensions::square(SIZE), SIZE),
        }
    }

    /// An empty 3x3 board.
    pub fn empty_board(&self) -> Board<Cell> {
        Board::new(self.dimensions())
    }

    /// Human-readable label for a square.
    pub fn label(coord: Coord) -> Option<&'static str> {
        Dimensions::square(SIZE)
            .index_of(coord)
            .map(|index| LABELS[index])
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardGame for TicTacToe {
    type Cell = Cell;
    type Position = Coord;

    fn kind(&self) -> GameKind {
        GameKind::TicTacToe
    }

    fn dimensions(&self) -> Dimensions {
        Dimensions::square(SIZE)
    }

    fn validate(&self, board: &Board<Cell>, mv: &Move<Coord>) -> Result<(), MoveError> {
        if board.get(mv.position)?.is_empty() {
            Ok(())
        } else {
            Err(MoveError::illegal(mv.position, "square is already occupied"))
        }
    }

    fn legal_moves(&self, board: &Board<Cell>, mark: Mark) -> Vec<Move<Coord>> {
        board
            .iter()
            .filter(|(_, cell)| cell.is_empty())
            .map(|(coord, _)| Move::new(mark, coord))
            .collect()
    }

    fn apply(&self, board: &Board<Cell>, mv: &Move<Coord>) -> Result<Board<Cell>, MoveError> {
        self.validate(board, mv)?;
        Ok(board.with(mv.position, Cell::Occupied(mv.mark))?)
    }

    fn detect_win(&self, board: &Board<Cell>) -> Result<Outcome, InvariantViolation> {
        Ok(check_winner(board, &self.lines)?.map_or(Outcome::InProgress, Outcome::Win))
    }

    /// Accepts `1`-`9` (reading order), `row,col`, or a label like `center`.
    fn parse_position(&self, input: &str) -> Option<Coord> {
        let input = input.trim().to_lowercase();
        if let Ok(number) = input.parse::<usize>() {
            return number
                .checked_sub(1)
                .and_then(|index| self.dimensions().coord_of(index));
        }
        if let Some((row, col)) = input.split_once(',') {
            let coord = Coord::new(row.trim().parse().ok()?, col.trim().parse().ok()?);
            return self.dimensions().contains(coord).then_some(coord);
        }
        LABELS
            .iter()
            .position(|label| *label == input)
            .and_then(|index| self.dimensions().coord_of(index))
    }
}
