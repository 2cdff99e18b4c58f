//! Game rules.
//!
//! This module contains the [`BoardGame`] trait every game implements,
//! plus the pure line/win/draw functions the mark-placing games share.
//! Rules are separated from board storage so the search and the session
//! controller can drive any game the same way.

pub mod draw;
pub mod lines;
pub mod win;

pub use draw::{detect_draw, is_full};
pub use lines::winning_lines;
pub use win::check_winner;

use super::action::{InvariantViolation, Move, MoveError};
use super::board::{Board, CellGlyph, Dimensions};
use super::types::{GameKind, Mark, Outcome};

/// A deterministic, finite, two-mark (or solo) board game.
///
/// Implementations are pure: every method takes the board by reference
/// and `apply` returns a new board, so search can branch freely.
pub trait BoardGame: std::fmt::Debug + Clone + Send + Sync + 'static {
    /// Per-cell state.
    type Cell: Copy + Default + PartialEq + std::fmt::Debug + CellGlyph + Send + Sync;
    /// What a player names when moving (a coordinate, a column, ...).
    type Position: Copy + PartialEq + std::fmt::Debug + std::fmt::Display + Send + Sync;

    /// Which game this is.
    fn kind(&self) -> GameKind;

    /// Board dimensions, fixed for the life of a session.
    fn dimensions(&self) -> Dimensions;

    /// Board a fresh session starts from.
    fn initial_board(&mut self) -> Board<Self::Cell> {
        Board::new(self.dimensions())
    }

    /// Checks bounds and occupancy for a move, ignoring terminal state.
    ///
    /// # Errors
    ///
    /// [`MoveError::OutOfBounds`] or [`MoveError::IllegalMove`].
    fn validate(
        &self,
        board: &Board<Self::Cell>,
        mv: &Move<Self::Position>,
    ) -> Result<(), MoveError>;

    /// All currently legal moves for `mark`, in a stable order
    /// (row-major, or left to right for column games).
    ///
    /// An empty list means the board is full.
    fn legal_moves(&self, board: &Board<Self::Cell>, mark: Mark) -> Vec<Move<Self::Position>>;

    /// Applies a move, returning the resulting board.
    ///
    /// # Errors
    ///
    /// Whatever [`BoardGame::validate`] rejects.
    fn apply(
        &self,
        board: &Board<Self::Cell>,
        mv: &Move<Self::Position>,
    ) -> Result<Board<Self::Cell>, MoveError>;

    /// Returns [`Outcome::Win`] or [`Outcome::InProgress`]; never `Draw`.
    ///
    /// # Errors
    ///
    /// [`InvariantViolation`] if both marks hold a complete line.
    fn detect_win(&self, board: &Board<Self::Cell>) -> Result<Outcome, InvariantViolation>;

    /// Static evaluation for depth-limited search, from `mark`'s point of view.
    ///
    /// Must stay strictly inside the win score so real wins dominate.
    fn heuristic(&self, _board: &Board<Self::Cell>, _mark: Mark) -> i32 {
        0
    }

    /// Parses player input into a position.
    fn parse_position(&self, input: &str) -> Option<Self::Position>;

    /// Whether the turn passes to the other mark after each move.
    fn alternates_turns(&self) -> bool {
        true
    }

    /// True iff the move passes [`BoardGame::validate`] and the board is not terminal.
    fn is_legal(&self, board: &Board<Self::Cell>, mv: &Move<Self::Position>) -> bool {
        self.validate(board, mv).is_ok()
            && matches!(self.detect_win(board), Ok(Outcome::InProgress))
    }

    /// True iff no legal moves remain and nobody has won.
    ///
    /// # Errors
    ///
    /// Propagates [`InvariantViolation`] from win detection.
    fn detect_draw(&self, board: &Board<Self::Cell>) -> Result<bool, InvariantViolation> {
        detect_draw(self, board)
    }

    /// Full evaluation: win, then draw, otherwise in progress.
    ///
    /// # Errors
    ///
    /// Propagates [`InvariantViolation`] from win detection.
    fn outcome(&self, board: &Board<Self::Cell>) -> Result<Outcome, InvariantViolation> {
        let win = self.detect_win(board)?;
        if win.is_terminal() {
            return Ok(win);
        }
        if self.legal_moves(board, Mark::X).is_empty() {
            return Ok(Outcome::Draw);
        }
        Ok(Outcome::InProgress)
    }
}
