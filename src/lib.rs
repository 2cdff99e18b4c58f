//! Arcade engine - deterministic board-game rules, search and sessions
//!
//! This library provides the game logic behind a small arcade: rule
//! engines for tic-tac-toe, Connect Four and Lights Out, minimax and
//! alpha-beta opponents, and a session controller that reports each
//! finished game exactly once to a score sink.
//!
//! # Architecture
//!
//! - **Games**: boards, moves and the [`BoardGame`] trait each game implements
//! - **Search**: exhaustive minimax and depth-limited alpha-beta
//! - **Session**: turn order, terminal detection and single-fire outcome reporting
//! - **Driver**: async command loop with a cancellable "thinking" delay
//! - **Sink / Db**: score collaborators, in memory or SQLite
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use arcade_engine::{
//!     Coord, GameSession, MemoryScoreboard, Mark, Opponent, ScoringPolicy, SearchConfig,
//!     TicTacToe,
//! };
//!
//! let mut session = GameSession::new(
//!     TicTacToe::new(),
//!     "ann",
//!     Opponent::Ai { mark: Mark::O, search: SearchConfig::exhaustive() },
//!     Arc::new(MemoryScoreboard::new()),
//!     ScoringPolicy::default(),
//! );
//! session.submit_move(Coord::new(1, 1))?;
//! if let Some(pending) = session.pending_opponent_move() {
//!     session.play_opponent(&pending)?;
//! }
//! # Ok::<(), arcade_engine::MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod db;
pub mod driver;
pub mod error;
pub mod games;
pub mod scoring;
pub mod search;
pub mod session;
pub mod sink;

// Crate-level exports - Configuration
pub use config::{ArcadeConfig, ConfigError, SearchDepths};

// Crate-level exports - Persistence
pub use db::{DbError, ScoreRecord, ScoreRepository};

// Crate-level exports - Driver
pub use driver::{Command, DriverChannels, SessionDriver};

// Crate-level exports - Errors
pub use error::ErrorLocation;

// Crate-level exports - Games
pub use games::{
    Board, BoardError, BoardGame, Cell, ConnectFour, Coord, Difficulty, Dimensions, GameKind,
    InvariantViolation, Light, LightsOut, Mark, Move, MoveError, Outcome, TicTacToe, Win,
};

// Crate-level exports - Scoring
pub use scoring::{GameResult, OutcomeEvent, PlayStats, PuzzleScoring, ScoreRule, ScoringPolicy};

// Crate-level exports - Search
pub use search::{SearchConfig, SearchError, WIN_SCORE, choose_move};

// Crate-level exports - Sessions
pub use session::{
    GameSession, Opponent, ParticipantId, PendingMove, SessionEvent, SessionId, SessionPhase,
};

// Crate-level exports - Score collaborators
pub use sink::{
    LeaderboardScope, LeaderboardSource, MemoryScoreboard, ScoreEntry, ScoreSink, SinkError,
    fetch_top_scores,
};
