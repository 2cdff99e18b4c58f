//! Game session controller.
//!
//! A [`GameSession`] owns one board and moves it through
//! [`SessionPhase::AwaitingPlayerMove`], [`SessionPhase::AwaitingOpponentMove`]
//! and finally [`SessionPhase::Terminal`]. Entering the terminal phase
//! reports exactly one [`OutcomeEvent`] per session id to the score sink.
//!
//! The opponent's reply is deferred: the controller hands out a
//! [`PendingMove`] stamped with the current generation, and
//! [`GameSession::play_opponent`] refuses any ticket from an earlier
//! generation. A reset between the two therefore cannot apply a stale move.

use crate::games::{Board, BoardGame, InvariantViolation, Mark, Move, MoveError, Outcome};
use crate::scoring::{OutcomeEvent, PlayStats, ScoringPolicy};
use crate::search::{SearchConfig, SearchError, choose_move};
use crate::sink::ScoreSink;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Unique identifier for one playthrough.
pub type SessionId = String;

/// Identity of the person scores are credited to.
pub type ParticipantId = String;

/// Who plays against the participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opponent {
    /// The engine plays `mark` using adversarial search.
    Ai {
        /// Mark the engine plays.
        mark: Mark,
        /// Search limits.
        search: SearchConfig,
    },
    /// Both marks are entered at the same input surface.
    HotSeat,
    /// Single-player puzzle.
    Solo,
}

impl Opponent {
    fn ai_mark(&self) -> Option<Mark> {
        match self {
            Opponent::Ai { mark, .. } => Some(*mark),
            Opponent::HotSeat | Opponent::Solo => None,
        }
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting for input from the participant.
    AwaitingPlayerMove,
    /// Waiting for the engine's reply.
    AwaitingOpponentMove,
    /// Finished; only a reset leaves this phase.
    Terminal(Outcome),
}

impl SessionPhase {
    /// Returns true once the session has finished.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Terminal(_))
    }
}

/// Ticket for a deferred opponent move.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct PendingMove {
    session_id: SessionId,
    generation: u64,
}

/// Notifications sent to the hosting shell.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A move landed on the board.
    MoveApplied {
        /// Session the move belongs to.
        session_id: SessionId,
        /// Who moved.
        mark: Mark,
        /// Rendered position.
        position: String,
        /// Rendered board after the move.
        board: String,
    },
    /// Input was refused; the board did not change.
    MoveRejected {
        /// Session the input was meant for.
        session_id: SessionId,
        /// Why it was refused.
        reason: String,
    },
    /// The engine is about to reply.
    OpponentThinking {
        /// Session waiting on the reply.
        session_id: SessionId,
    },
    /// The session finished.
    GameOver {
        /// Session that finished.
        session_id: SessionId,
        /// Final outcome.
        outcome: Outcome,
        /// What was reported to the score sink.
        event: OutcomeEvent,
    },
    /// A new session replaced the previous one.
    Reset {
        /// The new session id.
        session_id: SessionId,
        /// The new generation.
        generation: u64,
    },
}

/// One game from start to terminal outcome, plus the resets that follow it.
#[derive(Debug)]
pub struct GameSession<G: BoardGame> {
    id: SessionId,
    generation: u64,
    game: G,
    initial_board: Board<G::Cell>,
    board: Board<G::Cell>,
    to_move: Mark,
    player: Mark,
    participant: ParticipantId,
    opponent: Opponent,
    phase: SessionPhase,
    history: Vec<Move<G::Position>>,
    player_moves: usize,
    // Puzzle clock; starts at the participant's first move.
    started_at: Option<Instant>,
    sink: Arc<dyn ScoreSink>,
    scoring: ScoringPolicy,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
    reported: Option<SessionId>,
    outcome_event: Option<OutcomeEvent>,
}

impl<G: BoardGame> GameSession<G> {
    /// Starts a session. Charges the entry fee, if any, through `sink`.
    ///
    /// When the engine plays X it moves first, so the session opens in
    /// [`SessionPhase::AwaitingOpponentMove`].
    #[instrument(skip(game, participant, sink, scoring), fields(kind = %game.kind()))]
    pub fn new(
        mut game: G,
        participant: impl Into<ParticipantId>,
        opponent: Opponent,
        sink: Arc<dyn ScoreSink>,
        scoring: ScoringPolicy,
    ) -> Self {
        let board = game.initial_board();
        let player = opponent.ai_mark().map_or(Mark::X, Mark::opponent);
        let mut session = Self {
            id: new_session_id(),
            generation: 0,
            game,
            initial_board: board.clone(),
            board,
            to_move: Mark::X,
            player,
            participant: participant.into(),
            opponent,
            phase: SessionPhase::AwaitingPlayerMove,
            history: Vec::new(),
            player_moves: 0,
            started_at: None,
            sink,
            scoring,
            events: None,
            reported: None,
            outcome_event: None,
        };
        session.begin();
        session
    }

    /// Sends lifecycle notifications to `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Current session id; changes on every reset.
    pub fn session_id(&self) -> &str {
        &self.id
    }

    /// Number of resets so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The rules in play.
    pub fn game(&self) -> &G {
        &self.game
    }

    /// Current board.
    pub fn board(&self) -> &Board<G::Cell> {
        &self.board
    }

    /// Current phase.
    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    /// Mark whose turn it is.
    pub fn to_move(&self) -> Mark {
        self.to_move
    }

    /// Mark the participant plays.
    pub fn player_mark(&self) -> Mark {
        self.player
    }

    /// Who the participant plays against.
    pub fn opponent(&self) -> Opponent {
        self.opponent
    }

    /// Participant scores are credited to.
    pub fn participant(&self) -> &str {
        &self.participant
    }

    /// Moves applied this session, in order.
    pub fn history(&self) -> &[Move<G::Position>] {
        &self.history
    }

    /// Final outcome, once terminal.
    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            SessionPhase::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Outcome event reported for this session, once terminal.
    pub fn outcome_event(&self) -> Option<OutcomeEvent> {
        self.outcome_event
    }

    /// Parses player input with the game's notation and submits it.
    ///
    /// # Errors
    ///
    /// [`MoveError::IllegalMove`] for unreadable input, otherwise as
    /// [`GameSession::submit_move`].
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn submit_input(&mut self, input: &str) -> Result<&SessionPhase, MoveError> {
        let position = self.game.parse_position(input).ok_or_else(|| {
            warn!(input, "Unrecognised position");
            MoveError::illegal(input.trim(), "not a recognised position")
        })?;
        self.submit_move(position)
    }

    /// Applies the participant's move for the mark whose turn it is.
    ///
    /// A rejected move leaves the board and phase untouched.
    ///
    /// # Errors
    ///
    /// - [`MoveError::GameOver`] if the session is terminal
    /// - [`MoveError::NotYourTurn`] while the engine's reply is pending
    /// - [`MoveError::OutOfBounds`] / [`MoveError::IllegalMove`] from the rules
    /// - [`MoveError::InvariantViolation`] if the resulting board is impossible
    #[instrument(skip(self), fields(session_id = %self.id, to_move = %self.to_move))]
    pub fn submit_move(&mut self, position: G::Position) -> Result<&SessionPhase, MoveError> {
        match &self.phase {
            SessionPhase::Terminal(_) => {
                warn!("Move submitted after game over");
                return Err(MoveError::GameOver);
            }
            SessionPhase::AwaitingOpponentMove => {
                warn!("Move submitted while opponent is to move");
                return Err(MoveError::NotYourTurn(self.to_move));
            }
            SessionPhase::AwaitingPlayerMove => {}
        }

        self.apply(Move::new(self.to_move, position), true)?;
        self.advance();
        Ok(&self.phase)
    }

    /// Ticket for the engine's reply, if one is due.
    pub fn pending_opponent_move(&self) -> Option<PendingMove> {
        (self.phase == SessionPhase::AwaitingOpponentMove).then(|| PendingMove {
            session_id: self.id.clone(),
            generation: self.generation,
        })
    }

    /// Runs the search and applies the engine's reply.
    ///
    /// # Errors
    ///
    /// - [`MoveError::StaleMove`] if `pending` predates the latest reset
    /// - [`MoveError::NotYourTurn`] if no reply is due
    /// - [`MoveError::InvariantViolation`] if the search found nothing to play
    #[instrument(
        skip(self, pending),
        fields(session_id = %self.id, generation = pending.generation)
    )]
    pub fn play_opponent(
        &mut self,
        pending: &PendingMove,
    ) -> Result<Move<G::Position>, MoveError> {
        if pending.generation != self.generation || pending.session_id != self.id {
            debug!(current = self.generation, "Discarding stale opponent move");
            return Err(MoveError::StaleMove(pending.generation));
        }

        let Opponent::Ai { mark, search } = self.opponent else {
            return Err(MoveError::NotYourTurn(self.to_move));
        };
        if self.phase != SessionPhase::AwaitingOpponentMove {
            return Err(MoveError::NotYourTurn(self.to_move));
        }

        let mv = choose_move(&self.game, &self.board, mark, search).map_err(|e| match e {
            SearchError::Rules(err) => err,
            SearchError::TerminalBoard(_) => MoveError::GameOver,
            SearchError::NoLegalMoves => {
                error!("Search found no legal moves on a live board");
                MoveError::InvariantViolation(InvariantViolation::new(
                    "no legal moves on a non-terminal board",
                ))
            }
        })?;

        self.apply(mv, false)?;
        self.advance();
        Ok(mv)
    }

    /// Abandons the current session and starts a fresh one.
    ///
    /// The new session gets a new id and the next generation, so any
    /// outstanding [`PendingMove`] becomes stale. An unreported game is
    /// abandoned without an outcome.
    #[instrument(skip(self), fields(old_session_id = %self.id))]
    pub fn reset(&mut self) {
        self.id = new_session_id();
        self.generation += 1;
        self.board = self.game.initial_board();
        self.initial_board = self.board.clone();
        self.to_move = Mark::X;
        self.history.clear();
        self.player_moves = 0;
        self.started_at = None;
        self.reported = None;
        self.outcome_event = None;
        self.begin();
        self.notify(SessionEvent::Reset {
            session_id: self.id.clone(),
            generation: self.generation,
        });
    }

    /// Rebuilds every intermediate board from the starting board and history.
    ///
    /// The last board equals [`GameSession::board`].
    ///
    /// # Errors
    ///
    /// Propagates any rule rejection, which means the history was corrupted.
    #[instrument(skip(self), fields(session_id = %self.id, moves = self.history.len()))]
    pub fn replay(&self) -> Result<Vec<Board<G::Cell>>, MoveError> {
        let mut boards = Vec::with_capacity(self.history.len() + 1);
        let mut board = self.initial_board.clone();
        boards.push(board.clone());
        for mv in &self.history {
            board = self.game.apply(&board, mv)?;
            boards.push(board.clone());
        }
        Ok(boards)
    }

    fn begin(&mut self) {
        let kind = self.game.kind();
        info!(session_id = %self.id, generation = self.generation, game = %kind, "Session started");

        let fee = self.scoring.rule(kind).entry_fee;
        if fee != 0
            && let Err(e) = self
                .sink
                .charge_entry_fee(&self.id, &self.participant, kind, fee)
        {
            warn!(error = %e, fee, "Failed to charge entry fee, continuing");
        }

        self.phase = self.waiting_phase();
        if self.phase == SessionPhase::AwaitingOpponentMove {
            self.notify(SessionEvent::OpponentThinking {
                session_id: self.id.clone(),
            });
        }
    }

    fn apply(&mut self, mv: Move<G::Position>, by_player: bool) -> Result<(), MoveError> {
        let next = self.game.apply(&self.board, &mv).inspect_err(|e| {
            warn!(error = %e, mv = %mv, "Move rejected");
        })?;
        let outcome = self.game.outcome(&next)?;

        self.board = next;
        self.history.push(mv);
        if by_player {
            self.player_moves += 1;
            self.started_at.get_or_insert_with(Instant::now);
        }
        debug!(mv = %mv, outcome = %outcome, "Move applied");
        self.notify(SessionEvent::MoveApplied {
            session_id: self.id.clone(),
            mark: mv.mark,
            position: mv.position.to_string(),
            board: self.board.to_string(),
        });

        if outcome.is_terminal() {
            self.finish(outcome);
        }
        Ok(())
    }

    fn advance(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        if self.game.alternates_turns() {
            self.to_move = self.to_move.opponent();
        }
        self.phase = self.waiting_phase();
        if self.phase == SessionPhase::AwaitingOpponentMove {
            self.notify(SessionEvent::OpponentThinking {
                session_id: self.id.clone(),
            });
        }
    }

    fn waiting_phase(&self) -> SessionPhase {
        if self.opponent.ai_mark() == Some(self.to_move) {
            SessionPhase::AwaitingOpponentMove
        } else {
            SessionPhase::AwaitingPlayerMove
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        info!(session_id = %self.id, outcome = %outcome, "Session reached terminal state");
        self.phase = SessionPhase::Terminal(outcome.clone());
        self.report(&outcome);
    }

    fn report(&mut self, outcome: &Outcome) {
        if self.reported.as_deref() == Some(self.id.as_str()) {
            warn!(session_id = %self.id, "Outcome already reported, skipping");
            return;
        }
        self.reported = Some(self.id.clone());

        let kind = self.game.kind();
        let stats = PlayStats::new(
            self.player_moves,
            self.started_at.map_or(Duration::ZERO, |at| at.elapsed()),
            self.game.dimensions().cols(),
        );
        let Some(event) = self.scoring.event_for(kind, outcome, self.player, &stats) else {
            return;
        };
        self.outcome_event = Some(event);

        if let Err(e) = self
            .sink
            .record_outcome(&self.id, &self.participant, kind, &event)
        {
            warn!(error = %e, session_id = %self.id, "Failed to record outcome, continuing");
        }

        self.notify(SessionEvent::GameOver {
            session_id: self.id.clone(),
            outcome: outcome.clone(),
            event,
        });
    }

    fn notify(&self, event: SessionEvent) {
        if let Some(tx) = &self.events
            && tx.send(event).is_err()
        {
            debug!("Event receiver dropped");
        }
    }
}

fn new_session_id() -> SessionId {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Coord, TicTacToe};
    use crate::sink::MemoryScoreboard;

    fn hot_seat(board: &MemoryScoreboard) -> GameSession<TicTacToe> {
        GameSession::new(
            TicTacToe::new(),
            "ann",
            Opponent::HotSeat,
            Arc::new(board.clone()),
            ScoringPolicy::default(),
        )
    }

    #[test]
    fn test_hot_seat_alternates() {
        let scoreboard = MemoryScoreboard::new();
        let mut session = hot_seat(&scoreboard);
        session.submit_move(Coord::new(0, 0)).unwrap();
        assert_eq!(session.to_move(), Mark::O);
        assert_eq!(session.phase(), &SessionPhase::AwaitingPlayerMove);
        assert!(session.pending_opponent_move().is_none());
    }

    #[test]
    fn test_ai_playing_x_moves_first() {
        let session = GameSession::new(
            TicTacToe::new(),
            "ann",
            Opponent::Ai {
                mark: Mark::X,
                search: SearchConfig::exhaustive(),
            },
            Arc::new(MemoryScoreboard::new()),
            ScoringPolicy::default(),
        );
        assert_eq!(session.player_mark(), Mark::O);
        assert_eq!(session.phase(), &SessionPhase::AwaitingOpponentMove);
        assert!(session.pending_opponent_move().is_some());
    }

    #[test]
    fn test_unrecognised_input_rejected() {
        let mut session = hot_seat(&MemoryScoreboard::new());
        let err = session.submit_input("somewhere").unwrap_err();
        assert!(matches!(err, MoveError::IllegalMove { .. }));
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_replay_rebuilds_board() {
        let mut session = hot_seat(&MemoryScoreboard::new());
        for input in ["5", "1", "9"] {
            session.submit_input(input).unwrap();
        }
        let boards = session.replay().unwrap();
        assert_eq!(boards.len(), 4);
        assert_eq!(boards.last(), Some(session.board()));
    }

    #[test]
    fn test_reset_changes_identity() {
        let mut session = hot_seat(&MemoryScoreboard::new());
        let first = session.session_id().to_string();
        session.submit_move(Coord::new(1, 1)).unwrap();
        session.reset();
        assert_ne!(session.session_id(), first);
        assert_eq!(session.generation(), 1);
        assert!(session.history().is_empty());
        assert_eq!(session.to_move(), Mark::X);
    }
}
