//! Core domain types shared by the mark-placing games.

use super::board::{CellGlyph, Coord};
use serde::{Deserialize, Serialize};

/// Which game a session is playing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GameKind {
    /// 3x3 noughts and crosses against a minimax opponent.
    TicTacToe,
    /// 7x6 gravity board, four in a row.
    ConnectFour,
    /// Single-player toggle puzzle.
    LightsOut,
}

/// A player's mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Mark {
    /// Player X (moves first).
    X,
    /// Player O (moves second).
    O,
}

impl Mark {
    /// Returns the opposing mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }
}

/// A cell on a mark-placing board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nobody has played here.
    #[default]
    Empty,
    /// Cell holds a mark.
    Occupied(Mark),
}

impl Cell {
    /// Returns the mark in this cell, if any.
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(mark) => Some(mark),
        }
    }

    /// Returns true if the cell is empty.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl CellGlyph for Cell {
    fn glyph(&self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Occupied(Mark::X) => 'X',
            Cell::Occupied(Mark::O) => 'O',
        }
    }
}

/// A completed line of cells.
pub type Line = Vec<Coord>;

/// A win: who won, and the line that did it (absent for puzzle games).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Win {
    winner: Mark,
    line: Option<Line>,
}

impl Win {
    /// Creates a win with an optional winning line.
    pub fn new(winner: Mark, line: Option<Line>) -> Self {
        Self { winner, line }
    }

    /// The winning mark.
    pub fn winner(&self) -> Mark {
        self.winner
    }

    /// The winning line, if the game forms lines.
    pub fn line(&self) -> Option<&[Coord]> {
        self.line.as_deref()
    }
}

/// Result of evaluating a board.
///
/// Exactly one variant holds at any time. Once a session records a
/// terminal outcome it keeps it until reset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    /// No winner yet and moves remain.
    InProgress,
    /// Someone won.
    Win(Win),
    /// No legal moves remain and nobody won.
    Draw,
}

impl Outcome {
    /// Returns true for `Win` and `Draw`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(&self) -> Option<Mark> {
        match self {
            Outcome::Win(win) => Some(win.winner()),
            Outcome::InProgress | Outcome::Draw => None,
        }
    }

    /// Returns the winning line if there is one.
    pub fn winning_line(&self) -> Option<&[Coord]> {
        match self {
            Outcome::Win(win) => win.line(),
            Outcome::InProgress | Outcome::Draw => None,
        }
    }

    /// Returns true if the game was a draw.
    pub fn is_draw(&self) -> bool {
        matches!(self, Outcome::Draw)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "In progress"),
            Outcome::Win(win) => write!(f, "Player {} wins", win.winner()),
            Outcome::Draw => write!(f, "Draw"),
        }
    }
}
