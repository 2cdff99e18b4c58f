//! Game implementations and the shared board/rule machinery.

mod action;
mod board;
pub mod connect_four;
pub mod lights_out;
pub mod rules;
pub mod tictactoe;
mod types;

pub use action::{InvariantViolation, Move, MoveError};
pub use board::{Board, BoardError, CellGlyph, Coord, Dimensions};
pub use connect_four::ConnectFour;
pub use lights_out::{Difficulty, Light, LightsOut};
pub use rules::BoardGame;
pub use tictactoe::TicTacToe;
pub use types::{Cell, GameKind, Line, Mark, Outcome, Win};
