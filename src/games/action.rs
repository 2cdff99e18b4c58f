//! First-class move and error types.
//!
//! Moves are domain events, not side effects. They carry the player's
//! intent and can be validated independently of execution.

use super::board::BoardError;
use super::types::Mark;
use serde::{Deserialize, Serialize};

/// A move: a mark placed (or a press made) at a game-specific position.
///
/// The position type is a [`Coord`](super::Coord) for grid games and a
/// column index for gravity games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move<P> {
    /// The player making the move.
    pub mark: Mark,
    /// Where the move lands.
    pub position: P,
}

impl<P> Move<P> {
    /// Creates a new move.
    pub fn new(mark: Mark, position: P) -> Self {
        Self { mark, position }
    }
}

impl<P: Copy> Move<P> {
    /// Returns the player making this move.
    pub fn mark(&self) -> Mark {
        self.mark
    }

    /// Returns the position of this move.
    pub fn position(&self) -> P {
        self.position
    }
}

impl<P: std::fmt::Display> std::fmt::Display for Move<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.mark, self.position)
    }
}

/// A rule the engine relies on was broken.
///
/// Never produced by legal alternating play; seeing one means a caller
/// bypassed the session controller or a rule implementation is wrong.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}", description)]
pub struct InvariantViolation {
    /// What went wrong.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Error that can occur when validating or applying a move.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::From)]
pub enum MoveError {
    /// The move targets a cell outside the board.
    #[display("{}", _0)]
    #[from]
    OutOfBounds(BoardError),

    /// The target is occupied (or the column is full).
    #[display("Illegal move at {}: {}", position, reason)]
    IllegalMove {
        /// Rendered position of the rejected move.
        position: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The session is already terminal.
    #[display("Game is already over")]
    GameOver,

    /// It's not this mark's turn.
    #[display("It's not {}'s turn", _0)]
    NotYourTurn(Mark),

    /// An invariant was violated (two winners, search on a dead board).
    #[display("Invariant violation: {}", _0)]
    #[from]
    InvariantViolation(InvariantViolation),

    /// A deferred opponent move belongs to an earlier session generation.
    #[display("Stale opponent move for generation {}", _0)]
    StaleMove(u64),
}

impl std::error::Error for MoveError {}

impl MoveError {
    /// Builds an [`MoveError::IllegalMove`] for a displayable position.
    pub fn illegal(position: impl std::fmt::Display, reason: &'static str) -> Self {
        Self::IllegalMove {
            position: position.to_string(),
            reason,
        }
    }
}
