//! Boundaries to the scoring collaborators.
//!
//! The core reports finished sessions through [`ScoreSink`] and reads
//! results back through [`LeaderboardSource`]. Neither may block play: the
//! session controller logs and swallows sink failures, and
//! [`fetch_top_scores`] turns a failing source into an empty list.

use crate::error::ErrorLocation;
use crate::games::GameKind;
use crate::scoring::{GameResult, OutcomeEvent};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument, warn};

/// Failure reported by a scoring collaborator.
#[derive(Debug, Clone, Display, Error)]
#[display("Score sink error: {} at {}", message, location)]
pub struct SinkError {
    /// Error message.
    pub message: String,
    /// Where the error was raised.
    pub location: ErrorLocation,
}

impl SinkError {
    /// Creates a new sink error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: ErrorLocation::caller(),
        }
    }
}

/// Receives one outcome per finished session.
pub trait ScoreSink: Send + Sync + std::fmt::Debug {
    /// Records a finished session. Called exactly once per session id.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the outcome could not be stored.
    fn record_outcome(
        &self,
        session_id: &str,
        participant_id: &str,
        game: GameKind,
        event: &OutcomeEvent,
    ) -> Result<(), SinkError>;

    /// Deducts an entry fee when a session starts, at most once per session id.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the fee could not be stored.
    fn charge_entry_fee(
        &self,
        session_id: &str,
        participant_id: &str,
        game: GameKind,
        fee: i64,
    ) -> Result<(), SinkError>;
}

/// Which leaderboard to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct LeaderboardScope {
    /// Game to rank.
    pub game: GameKind,
    /// Maximum number of entries.
    pub limit: usize,
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct ScoreEntry {
    identity: String,
    score: i64,
}

/// Read-only access to recorded scores.
pub trait LeaderboardSource: Send + Sync + std::fmt::Debug {
    /// Highest scores for a game, best first; equal scores in recording order.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if scores could not be read.
    fn top_scores(&self, scope: &LeaderboardScope) -> Result<Vec<ScoreEntry>, SinkError>;

    /// Running total for a participant: every recorded score minus entry fees.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if scores could not be read.
    fn global_score(&self, participant_id: &str) -> Result<i64, SinkError>;
}

/// Reads a leaderboard, treating any failure as an empty board.
#[instrument(skip(source))]
pub fn fetch_top_scores(
    source: &dyn LeaderboardSource,
    scope: LeaderboardScope,
) -> Vec<ScoreEntry> {
    match source.top_scores(&scope) {
        Ok(entries) => {
            debug!(count = entries.len(), "Leaderboard loaded");
            entries
        }
        Err(e) => {
            warn!(error = %e, "Leaderboard unavailable, showing empty board");
            Vec::new()
        }
    }
}

/// A stored outcome in [`MemoryScoreboard`].
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StoredOutcome {
    session_id: String,
    participant_id: String,
    game: GameKind,
    result: GameResult,
    score: i64,
}

#[derive(Debug, Default)]
struct MemoryState {
    outcomes: Vec<StoredOutcome>,
    fees: Vec<(String, String, i64)>,
    record_calls: usize,
}

/// In-process scoreboard; the default collaborator when no database is configured.
///
/// Storing is idempotent per session id: a repeated call is counted but
/// not stored twice.
#[derive(Debug, Clone, Default)]
pub struct MemoryScoreboard {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryScoreboard {
    /// Creates an empty scoreboard.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored outcomes in recording order.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the lock is poisoned.
    pub fn outcomes(&self) -> Result<Vec<StoredOutcome>, SinkError> {
        Ok(self.lock()?.outcomes.clone())
    }

    /// Number of `record_outcome` calls received, duplicates included.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the lock is poisoned.
    pub fn record_calls(&self) -> Result<usize, SinkError> {
        Ok(self.lock()?.record_calls)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, SinkError> {
        self.state
            .lock()
            .map_err(|_| SinkError::new("scoreboard lock poisoned"))
    }
}

impl ScoreSink for MemoryScoreboard {
    #[instrument(skip(self, event), fields(result = %event.result(), score = event.score()))]
    fn record_outcome(
        &self,
        session_id: &str,
        participant_id: &str,
        game: GameKind,
        event: &OutcomeEvent,
    ) -> Result<(), SinkError> {
        let mut state = self.lock()?;
        state.record_calls += 1;

        if state.outcomes.iter().any(|o| o.session_id == session_id) {
            warn!(session_id, "Outcome already recorded for session, ignoring");
            return Ok(());
        }

        state.outcomes.push(StoredOutcome {
            session_id: session_id.to_string(),
            participant_id: participant_id.to_string(),
            game,
            result: event.result(),
            score: event.score(),
        });
        info!(session_id, participant_id, "Outcome recorded");
        Ok(())
    }

    #[instrument(skip(self))]
    fn charge_entry_fee(
        &self,
        session_id: &str,
        participant_id: &str,
        game: GameKind,
        fee: i64,
    ) -> Result<(), SinkError> {
        let mut state = self.lock()?;
        if state.fees.iter().any(|(id, _, _)| id == session_id) {
            warn!(session_id, "Entry fee already charged for session, ignoring");
            return Ok(());
        }
        state
            .fees
            .push((session_id.to_string(), participant_id.to_string(), fee));
        debug!(fee, "Entry fee charged");
        Ok(())
    }
}

impl LeaderboardSource for MemoryScoreboard {
    #[instrument(skip(self))]
    fn top_scores(&self, scope: &LeaderboardScope) -> Result<Vec<ScoreEntry>, SinkError> {
        let state = self.lock()?;
        let mut entries: Vec<ScoreEntry> = state
            .outcomes
            .iter()
            .filter(|o| o.game == scope.game)
            .map(|o| ScoreEntry::new(o.participant_id.clone(), o.score))
            .collect();
        // Stable sort keeps recording order among equal scores.
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(scope.limit);
        Ok(entries)
    }

    #[instrument(skip(self))]
    fn global_score(&self, participant_id: &str) -> Result<i64, SinkError> {
        let state = self.lock()?;
        let earned: i64 = state
            .outcomes
            .iter()
            .filter(|o| o.participant_id == participant_id)
            .map(|o| o.score)
            .sum();
        let fees: i64 = state
            .fees
            .iter()
            .filter(|(_, participant, _)| participant == participant_id)
            .map(|(_, _, fee)| fee)
            .sum();
        Ok(earned - fees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct BrokenSource;

    impl LeaderboardSource for BrokenSource {
        fn top_scores(&self, _scope: &LeaderboardScope) -> Result<Vec<ScoreEntry>, SinkError> {
            Err(SinkError::new("offline"))
        }

        fn global_score(&self, _participant_id: &str) -> Result<i64, SinkError> {
            Err(SinkError::new("offline"))
        }
    }

    fn win(score: i64) -> OutcomeEvent {
        OutcomeEvent::new(GameResult::Win, score)
    }

    #[test]
    fn test_failing_source_yields_empty() {
        let entries =
            fetch_top_scores(&BrokenSource, LeaderboardScope::new(GameKind::TicTacToe, 10));
        assert!(entries.is_empty());
    }

    #[test]
    fn test_top_scores_ordered_and_limited() {
        let board = MemoryScoreboard::new();
        board.record_outcome("s1", "ann", GameKind::TicTacToe, &win(10)).unwrap();
        board.record_outcome("s2", "bob", GameKind::TicTacToe, &win(30)).unwrap();
        board.record_outcome("s3", "cat", GameKind::TicTacToe, &win(10)).unwrap();
        board.record_outcome("s4", "dan", GameKind::ConnectFour, &win(99)).unwrap();

        let top = board
            .top_scores(&LeaderboardScope::new(GameKind::TicTacToe, 2))
            .unwrap();
        assert_eq!(
            top,
            vec![ScoreEntry::new("bob".into(), 30), ScoreEntry::new("ann".into(), 10)]
        );
    }

    #[test]
    fn test_duplicate_session_not_stored_twice() {
        let board = MemoryScoreboard::new();
        board.record_outcome("s1", "ann", GameKind::TicTacToe, &win(10)).unwrap();
        board.record_outcome("s1", "ann", GameKind::TicTacToe, &win(10)).unwrap();
        assert_eq!(board.outcomes().unwrap().len(), 1);
        assert_eq!(board.record_calls().unwrap(), 2);
    }

    #[test]
    fn test_global_score_subtracts_fees() {
        let board = MemoryScoreboard::new();
        board.charge_entry_fee("s1", "ann", GameKind::ConnectFour, 5).unwrap();
        board.record_outcome("s1", "ann", GameKind::ConnectFour, &win(20)).unwrap();
        let loss = OutcomeEvent::new(GameResult::Loss, -10);
        board
            .record_outcome("s2", "ann", GameKind::TicTacToe, &loss)
            .unwrap();
        assert_eq!(board.global_score("ann").unwrap(), 5);
        assert_eq!(board.global_score("nobody").unwrap(), 0);
    }

    #[test]
    fn test_entry_fee_charged_once_per_session() {
        let board = MemoryScoreboard::new();
        board.charge_entry_fee("s1", "ann", GameKind::ConnectFour, 5).unwrap();
        board.charge_entry_fee("s1", "ann", GameKind::ConnectFour, 5).unwrap();
        assert_eq!(board.global_score("ann").unwrap(), -5);

        board.charge_entry_fee("s2", "ann", GameKind::ConnectFour, 5).unwrap();
        assert_eq!(board.global_score("ann").unwrap(), -10);
    }
}
