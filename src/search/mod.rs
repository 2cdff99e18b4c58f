//! Adversarial move selection.
//!
//! Terminal scoring is +10 for a win by the maximizing mark, -10 for a
//! loss and 0 for a draw. Scores are not discounted by depth: a win next
//! move and a win five moves out score the same, and ties go to the first
//! move in the game's enumeration order. Play is therefore deterministic,
//! though it can look unhurried.

pub mod alpha_beta;
pub mod minimax;

use crate::games::{BoardGame, Mark, MoveError, Outcome};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Score of a won terminal position.
pub const WIN_SCORE: i32 = 10;

/// Search limits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Maximum plies to look ahead; `None` searches to the end of the game.
    pub max_depth: Option<u32>,
}

impl SearchConfig {
    /// Exhaustive search.
    pub fn exhaustive() -> Self {
        Self { max_depth: None }
    }

    /// Depth-limited search.
    pub fn depth(max_depth: u32) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}

/// Why no move could be chosen. Both cases are caller contract violations.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SearchError {
    /// The board is already won or drawn.
    #[display("Search called on a terminal board ({})", _0)]
    TerminalBoard(Outcome),
    /// No legal moves and no terminal outcome.
    #[display("Search called on a board with no legal moves")]
    NoLegalMoves,
    /// A rule rejected a move the generator produced.
    #[display("{}", _0)]
    Rules(MoveError),
}

impl std::error::Error for SearchError {}

impl From<MoveError> for SearchError {
    fn from(err: MoveError) -> Self {
        Self::Rules(err)
    }
}

impl From<crate::games::InvariantViolation> for SearchError {
    fn from(err: crate::games::InvariantViolation) -> Self {
        Self::Rules(err.into())
    }
}

/// Chooses a move for `maximizing` according to `config`.
///
/// # Errors
///
/// See [`SearchError`].
pub fn choose_move<G: BoardGame>(
    game: &G,
    board: &crate::games::Board<G::Cell>,
    maximizing: Mark,
    config: SearchConfig,
) -> Result<crate::games::Move<G::Position>, SearchError> {
    match config.max_depth {
        None => minimax::best_move(game, board, maximizing),
        Some(depth) => alpha_beta::best_move(game, board, maximizing, depth),
    }
}

/// Scores a terminal outcome from `maximizing`'s point of view.
pub(crate) fn terminal_score(outcome: &Outcome, maximizing: Mark) -> Option<i32> {
    match outcome {
        Outcome::InProgress => None,
        Outcome::Draw => Some(0),
        Outcome::Win(win) if win.winner() == maximizing => Some(WIN_SCORE),
        Outcome::Win(_) => Some(-WIN_SCORE),
    }
}
