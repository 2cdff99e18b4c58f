//! Outcome events and the points economy.
//!
//! Point values are product constants, not rules of play: every number
//! here can be overridden from the config file.

use crate::games::{GameKind, Mark, Outcome};
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::instrument;

/// Session result from the participant's point of view.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameResult {
    /// Participant won.
    Win,
    /// Participant lost.
    Loss,
    /// Nobody won.
    Draw,
}

/// The single value a finished session reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct OutcomeEvent {
    result: GameResult,
    score: i64,
}

impl OutcomeEvent {
    /// Win, loss or draw.
    pub fn result(&self) -> GameResult {
        self.result
    }

    /// Points awarded (negative for a loss).
    pub fn score(&self) -> i64 {
        self.score
    }
}

/// Point deltas for a versus game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct ScoreRule {
    /// Awarded on a win.
    pub win: i64,
    /// Awarded on a loss (usually negative).
    pub loss: i64,
    /// Awarded on a draw.
    pub draw: i64,
    /// Deducted from the participant's total when a session starts.
    #[serde(default)]
    pub entry_fee: i64,
}

impl ScoreRule {
    /// Built-in rule for a game.
    pub fn default_for(kind: GameKind) -> Self {
        match kind {
            GameKind::TicTacToe => Self::new(10, -10, 0, 0),
            GameKind::ConnectFour => Self::new(20, -10, 0, 0),
            GameKind::LightsOut => Self::new(0, 0, 0, 0),
        }
    }

    /// Points for a result.
    pub fn delta(&self, result: GameResult) -> i64 {
        match result {
            GameResult::Win => self.win,
            GameResult::Loss => self.loss,
            GameResult::Draw => self.draw,
        }
    }
}

/// Scoring constants for solo puzzles, where the score depends on effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PuzzleScoring {
    /// Starting points.
    pub base: i64,
    /// Bonus per unit of grid side length.
    pub size_bonus: i64,
    /// Deducted per press.
    pub move_penalty: i64,
    /// Deducted per elapsed second.
    pub time_penalty: i64,
}

impl Default for PuzzleScoring {
    fn default() -> Self {
        Self {
            base: 1000,
            size_bonus: 50,
            move_penalty: 10,
            time_penalty: 5,
        }
    }
}

impl PuzzleScoring {
    /// `max(0, base + size * size_bonus - moves * move_penalty - seconds * time_penalty)`.
    pub fn score(&self, size: usize, moves: usize, elapsed: Duration) -> i64 {
        let raw = self.base + size as i64 * self.size_bonus
            - moves as i64 * self.move_penalty
            - elapsed.as_secs() as i64 * self.time_penalty;
        raw.max(0)
    }
}

/// How a session was played, for effort-based scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, new)]
pub struct PlayStats {
    /// Moves made by the participant.
    pub moves: usize,
    /// Time from first move to the end.
    pub elapsed: Duration,
    /// Grid side length.
    pub board_size: usize,
}

/// Every scoring constant, with per-game overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    /// Overrides keyed by game; missing games use [`ScoreRule::default_for`].
    #[serde(default)]
    pub rules: HashMap<GameKind, ScoreRule>,
    /// Puzzle scoring constants.
    #[serde(default)]
    pub puzzle: PuzzleScoring,
}

impl ScoringPolicy {
    /// Replaces the rule for one game.
    pub fn with_rule(mut self, kind: GameKind, rule: ScoreRule) -> Self {
        self.rules.insert(kind, rule);
        self
    }

    /// The rule in force for a game.
    pub fn rule(&self, kind: GameKind) -> ScoreRule {
        self.rules
            .get(&kind)
            .copied()
            .unwrap_or_else(|| ScoreRule::default_for(kind))
    }

    /// Builds the outcome event for a finished session.
    ///
    /// Returns `None` while the game is still in progress.
    #[instrument(skip(self))]
    pub fn event_for(
        &self,
        kind: GameKind,
        outcome: &Outcome,
        participant: Mark,
        stats: &PlayStats,
    ) -> Option<OutcomeEvent> {
        let result = match outcome {
            Outcome::InProgress => return None,
            Outcome::Draw => GameResult::Draw,
            Outcome::Win(win) if win.winner() == participant => GameResult::Win,
            Outcome::Win(_) => GameResult::Loss,
        };

        let score = match kind {
            GameKind::LightsOut => self.puzzle.score(stats.board_size, stats.moves, stats.elapsed),
            GameKind::TicTacToe | GameKind::ConnectFour => self.rule(kind).delta(result),
        };

        Some(OutcomeEvent::new(result, score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::Win;

    fn stats() -> PlayStats {
        PlayStats::new(5, Duration::ZERO, 3)
    }

    #[test]
    fn test_tic_tac_toe_defaults() {
        let policy = ScoringPolicy::default();
        let x_wins = Outcome::Win(Win::new(Mark::X, None));
        assert_eq!(
            policy.event_for(GameKind::TicTacToe, &x_wins, Mark::X, &stats()),
            Some(OutcomeEvent::new(GameResult::Win, 10))
        );
        assert_eq!(
            policy.event_for(GameKind::TicTacToe, &x_wins, Mark::O, &stats()),
            Some(OutcomeEvent::new(GameResult::Loss, -10))
        );
        assert_eq!(
            policy.event_for(GameKind::TicTacToe, &Outcome::Draw, Mark::X, &stats()),
            Some(OutcomeEvent::new(GameResult::Draw, 0))
        );
    }

    #[test]
    fn test_in_progress_has_no_event() {
        let policy = ScoringPolicy::default();
        assert_eq!(
            policy.event_for(GameKind::ConnectFour, &Outcome::InProgress, Mark::X, &stats()),
            None
        );
    }

    #[test]
    fn test_override_rule() {
        let policy = ScoringPolicy::default()
            .with_rule(GameKind::ConnectFour, ScoreRule::new(50, -5, 1, 3));
        assert_eq!(policy.rule(GameKind::ConnectFour).entry_fee, 3);
        assert_eq!(policy.rule(GameKind::TicTacToe), ScoreRule::default_for(GameKind::TicTacToe));
    }

    #[test]
    fn test_puzzle_score() {
        let puzzle = PuzzleScoring::default();
        assert_eq!(puzzle.score(5, 12, Duration::from_secs(20)), 1000 + 250 - 120 - 100);
        assert_eq!(puzzle.score(3, 500, Duration::ZERO), 0);
    }

    #[test]
    fn test_lights_out_uses_puzzle_scoring() {
        let policy = ScoringPolicy::default();
        let solved = Outcome::Win(Win::new(Mark::X, None));
        let event = policy
            .event_for(GameKind::LightsOut, &solved, Mark::X, &PlayStats::new(4, Duration::ZERO, 3))
            .unwrap();
        assert_eq!(event, OutcomeEvent::new(GameResult::Win, 1110));
    }

    #[test]
    fn test_result_strings() {
        assert_eq!(GameResult::Loss.to_string(), "loss");
        assert_eq!("draw".parse::<GameResult>().unwrap(), GameResult::Draw);
    }
}
