//! Arcade configuration loaded from TOML.

use crate::error::ErrorLocation;
use crate::games::GameKind;
use crate::scoring::ScoringPolicy;
use crate::search::SearchConfig;
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Search depth per versus game. `None` means exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDepths {
    /// Depth for tic-tac-toe.
    pub tic_tac_toe: Option<u32>,
    /// Depth for Connect Four.
    pub connect_four: Option<u32>,
}

impl Default for SearchDepths {
    fn default() -> Self {
        Self {
            tic_tac_toe: None,
            connect_four: Some(6),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, Deserialize)]
pub struct ArcadeConfig {
    /// Pause before the AI replies, in milliseconds.
    #[serde(default = "default_thinking_delay_ms")]
    thinking_delay_ms: u64,

    /// SQLite database file.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Rows shown on a leaderboard.
    #[serde(default = "default_leaderboard_limit")]
    leaderboard_limit: usize,

    /// Search limits per game.
    #[serde(default)]
    search: SearchDepths,

    /// Point values.
    #[serde(default)]
    scoring: ScoringPolicy,
}

#[instrument]
fn default_thinking_delay_ms() -> u64 {
    500
}

#[instrument]
fn default_db_path() -> String {
    "arcade.db".to_string()
}

#[instrument]
fn default_leaderboard_limit() -> usize {
    10
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            thinking_delay_ms: default_thinking_delay_ms(),
            db_path: default_db_path(),
            leaderboard_limit: default_leaderboard_limit(),
            search: SearchDepths::default(),
            scoring: ScoringPolicy::default(),
        }
    }
}

impl ArcadeConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(db_path = %config.db_path, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid configuration.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Replaces the database path.
    pub fn with_db_path(mut self, db_path: impl Into<String>) -> Self {
        self.db_path = db_path.into();
        self
    }

    /// The AI's thinking pause.
    pub fn thinking_delay(&self) -> Duration {
        Duration::from_millis(self.thinking_delay_ms)
    }

    /// Search limits for a game. Puzzles have no opponent and search exhaustively.
    pub fn search_for(&self, kind: GameKind) -> SearchConfig {
        let depth = match kind {
            GameKind::TicTacToe => self.search.tic_tac_toe,
            GameKind::ConnectFour => self.search.connect_four,
            GameKind::LightsOut => None,
        };
        SearchConfig { max_depth: depth }
    }

    /// Search limits with a command-line depth applied.
    ///
    /// A depth of 0 asks for exhaustive search. Connect Four is too large
    /// for that, so it keeps its configured depth instead.
    #[instrument(skip(self))]
    pub fn search_with_depth(&self, kind: GameKind, depth: Option<u32>) -> SearchConfig {
        match depth {
            None => self.search_for(kind),
            Some(0) if kind == GameKind::ConnectFour => {
                warn!("Connect Four cannot search exhaustively, using the configured depth");
                self.search_for(kind)
            }
            Some(0) => SearchConfig::exhaustive(),
            Some(n) => SearchConfig::depth(n),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}", message, location)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Where the error was raised.
    pub location: ErrorLocation,
}

impl ConfigError {
    /// Creates a new config error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreRule;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ArcadeConfig::from_toml("").unwrap();
        assert_eq!(config, ArcadeConfig::default());
        assert_eq!(config.thinking_delay(), Duration::from_millis(500));
        assert_eq!(*config.leaderboard_limit(), 10);
        assert_eq!(config.search_for(GameKind::TicTacToe), SearchConfig::exhaustive());
        assert_eq!(config.search_for(GameKind::ConnectFour), SearchConfig::depth(6));
    }

    #[test]
    fn test_command_line_depth() {
        let config = ArcadeConfig::default();
        assert_eq!(
            config.search_with_depth(GameKind::TicTacToe, None),
            SearchConfig::exhaustive()
        );
        assert_eq!(
            config.search_with_depth(GameKind::TicTacToe, Some(3)),
            SearchConfig::depth(3)
        );
        assert_eq!(
            config.search_with_depth(GameKind::ConnectFour, Some(8)),
            SearchConfig::depth(8)
        );
    }

    #[test]
    fn test_connect_four_never_searches_exhaustively() {
        let config = ArcadeConfig::default();
        assert_eq!(
            config.search_with_depth(GameKind::ConnectFour, Some(0)),
            SearchConfig::depth(6)
        );
        assert_eq!(
            config.search_with_depth(GameKind::TicTacToe, Some(0)),
            SearchConfig::exhaustive()
        );
    }

    #[test]
    fn test_overrides() {
        let config = ArcadeConfig::from_toml(
            r#"
            thinking_delay_ms = 0
            db_path = "scores.db"

            [search]
            connect_four = 4

            [scoring.rules.connect-four]
            win = 50
            loss = -5
            draw = 1
            entry_fee = 3

            [scoring.puzzle]
            base = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.thinking_delay(), Duration::ZERO);
        assert_eq!(config.db_path(), "scores.db");
        assert_eq!(config.search_for(GameKind::ConnectFour), SearchConfig::depth(4));
        assert_eq!(config.scoring().rule(GameKind::ConnectFour), ScoreRule::new(50, -5, 1, 3));
        assert_eq!(config.scoring().puzzle.base, 500);
        assert_eq!(config.scoring().puzzle.size_bonus, 50);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = ArcadeConfig::from_toml("thinking_delay_ms = \"soon\"").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }
}
