//! Lights Out: press a light to flip it and its orthogonal neighbours;
//! the puzzle is solved when every light is off.
//!
//! This is a single-player toggle game. Every in-bounds cell is always a
//! legal press, so it never draws; the solo player (always [`Mark::X`])
//! wins by clearing the board.

use super::action::{InvariantViolation, Move, MoveError};
use super::board::{Board, CellGlyph, Coord, Dimensions};
use super::rules::BoardGame;
use super::types::{GameKind, Mark, Outcome, Win};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const NEIGHBOURS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A single light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Light {
    /// Light is off.
    #[default]
    Off,
    /// Light is on.
    On,
}

impl Light {
    fn flipped(self) -> Self {
        match self {
            Light::Off => Light::On,
            Light::On => Light::Off,
        }
    }
}

impl CellGlyph for Light {
    fn glyph(&self) -> char {
        match self {
            Light::Off => '.',
            Light::On => '#',
        }
    }
}

/// Puzzle difficulty, which sets the grid size.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    /// 3x3.
    Easy,
    /// 5x5.
    #[default]
    Medium,
    /// 7x7.
    Hard,
}

impl Difficulty {
    /// Side length of the grid.
    pub fn size(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 5,
            Difficulty::Hard => 7,
        }
    }
}

/// Lights Out rules plus the RNG used to scramble new puzzles.
#[derive(Debug, Clone)]
pub struct LightsOut {
    size: usize,
    rng: StdRng,
}

impl LightsOut {
    /// Creates a puzzle generator seeded from the OS.
    #[instrument]
    pub fn new(difficulty: Difficulty) -> Self {
        Self::with_rng(difficulty, StdRng::from_entropy())
    }

    /// Creates a puzzle generator with a fixed seed (deterministic puzzles).
    #[instrument]
    pub fn seeded(difficulty: Difficulty, seed: u64) -> Self {
        Self::with_rng(difficulty, StdRng::seed_from_u64(seed))
    }

    fn with_rng(difficulty: Difficulty, rng: StdRng) -> Self {
        Self {
            size: difficulty.size(),
            rng,
        }
    }

    /// Side length of the grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// An all-off board.
    pub fn empty_board(&self) -> Board<Light> {
        Board::new(self.dimensions())
    }

    /// Flips `coord` and its in-bounds orthogonal neighbours.
    ///
    /// # Errors
    ///
    /// [`MoveError::OutOfBounds`] if `coord` is off the board.
    pub fn press(board: &Board<Light>, coord: Coord) -> Result<Board<Light>, MoveError> {
        let mut next = board.clone();
        next.set(coord, board.get(coord)?.flipped())?;
        for (d_row, d_col) in NEIGHBOURS {
            if let Some(neighbour) = coord.offset(d_row, d_col)
                && let Ok(light) = next.get(neighbour)
            {
                next.set(neighbour, light.flipped())?;
            }
        }
        Ok(next)
    }

    /// Returns true if every light is off.
    pub fn is_solved(board: &Board<Light>) -> bool {
        board.cells().iter().all(|light| *light == Light::Off)
    }

    /// Builds a puzzle by pressing random cells on a solved board.
    ///
    /// Starting from a solved board guarantees the result is solvable.
    /// Retries until at least one light is on.
    pub fn scramble<R: Rng>(&self, rng: &mut R) -> Board<Light> {
        let cells = self.size * self.size;
        loop {
            let mut board = self.empty_board();
            let presses = rng.gen_range(0..(cells / 2).max(1)) + self.size;
            for _ in 0..presses {
                let coord = Coord::new(rng.gen_range(0..self.size), rng.gen_range(0..self.size));
                if let Ok(next) = Self::press(&board, coord) {
                    board = next;
                }
            }
            if !Self::is_solved(&board) {
                debug!(presses, "Scrambled puzzle");
                return board;
            }
        }
    }
}

impl BoardGame for LightsOut {
    type Cell = Light;
    type Position = Coord;

    fn kind(&self) -> GameKind {
        GameKind::LightsOut
    }

    fn dimensions(&self) -> Dimensions {
        Dimensions::square(self.size)
    }

    fn initial_board(&mut self) -> Board<Light> {
        let mut rng = self.rng.clone();
        let board = self.scramble(&mut rng);
        self.rng = rng;
        board
    }

    fn validate(&self, board: &Board<Light>, mv: &Move<Coord>) -> Result<(), MoveError> {
        board.get(mv.position)?;
        Ok(())
    }

    fn legal_moves(&self, board: &Board<Light>, mark: Mark) -> Vec<Move<Coord>> {
        board.coords().map(|coord| Move::new(mark, coord)).collect()
    }

    fn apply(&self, board: &Board<Light>, mv: &Move<Coord>) -> Result<Board<Light>, MoveError> {
        Self::press(board, mv.position)
    }

    fn detect_win(&self, board: &Board<Light>) -> Result<Outcome, InvariantViolation> {
        if Self::is_solved(board) {
            Ok(Outcome::Win(Win::new(Mark::X, None)))
        } else {
            Ok(Outcome::InProgress)
        }
    }

    /// Accepts `row,col` (0-based).
    fn parse_position(&self, input: &str) -> Option<Coord> {
        let (row, col) = input.trim().split_once(',')?;
        let coord = Coord::new(row.trim().parse().ok()?, col.trim().parse().ok()?);
        self.dimensions().contains(coord).then_some(coord)
    }

    fn alternates_turns(&self) -> bool {
        false
    }
}
