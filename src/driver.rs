//! Async event loop around a [`GameSession`].
//!
//! The driver owns the session exclusively. Input arrives as [`Command`]s
//! on a channel; the engine's cosmetic "thinking" pause is a timer raced
//! against that channel. A reset drops the timer, and the session's
//! generation check rejects any reply that still slips through.

use crate::games::{BoardGame, MoveError};
use crate::session::{GameSession, PendingMove, SessionEvent};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, instrument, warn};

/// Input from the hosting shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<P> {
    /// Play a position for the mark to move.
    Move(P),
    /// Play a position written in the game's notation.
    Input(String),
    /// Abandon the current game and start a new one.
    Reset,
    /// Stop the driver.
    Quit,
}

/// The shell's ends of the driver's channels.
#[derive(Debug)]
pub struct DriverChannels<P> {
    /// Send commands here.
    pub commands: mpsc::UnboundedSender<Command<P>>,
    /// Session notifications arrive here.
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
}

/// Runs a session until [`Command::Quit`] or until every command sender is dropped.
#[derive(Debug)]
pub struct SessionDriver<G: BoardGame> {
    session: GameSession<G>,
    commands: mpsc::UnboundedReceiver<Command<G::Position>>,
    events: mpsc::UnboundedSender<SessionEvent>,
    thinking_delay: Duration,
}

impl<G: BoardGame> SessionDriver<G> {
    /// Wraps a session, wiring its events to the returned channels.
    #[instrument(skip(session), fields(session_id = %session.session_id()))]
    pub fn new(
        session: GameSession<G>,
        thinking_delay: Duration,
    ) -> (Self, DriverChannels<G::Position>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let driver = Self {
            session: session.with_events(event_tx.clone()),
            commands: command_rx,
            events: event_tx,
            thinking_delay,
        };
        let channels = DriverChannels {
            commands: command_tx,
            events: event_rx,
        };
        (driver, channels)
    }

    /// Processes commands and deferred replies, then hands the session back.
    #[instrument(skip(self), fields(session_id = %self.session.session_id()))]
    pub async fn run(mut self) -> GameSession<G> {
        info!("Session driver started");
        let mut deferred: Option<(PendingMove, Instant)> = None;

        loop {
            if deferred.is_none()
                && let Some(pending) = self.session.pending_opponent_move()
            {
                debug!(generation = pending.generation(), "Scheduling opponent reply");
                deferred = Some((pending, Instant::now() + self.thinking_delay));
            }
            let wake_at = deferred.as_ref().map(|(_, at)| *at);

            tokio::select! {
                command = self.commands.recv() => match command {
                    None | Some(Command::Quit) => break,
                    Some(Command::Move(position)) => {
                        let result = self.session.submit_move(position).map(|_| ());
                        self.report_rejection(result);
                    }
                    Some(Command::Input(input)) => {
                        let result = self.session.submit_input(&input).map(|_| ());
                        self.report_rejection(result);
                    }
                    Some(Command::Reset) => {
                        if deferred.take().is_some() {
                            debug!("Cancelled pending opponent reply");
                        }
                        self.session.reset();
                    }
                },
                () = wait_until(wake_at) => {
                    if let Some((pending, _)) = deferred.take() {
                        self.reply(&pending);
                    }
                }
            }
        }

        info!("Session driver stopped");
        self.session
    }

    fn reply(&mut self, pending: &PendingMove) {
        match self.session.play_opponent(pending) {
            Ok(mv) => debug!(mv = %mv, "Opponent replied"),
            Err(MoveError::StaleMove(generation)) => {
                debug!(generation, "Dropped stale opponent reply");
            }
            Err(e) => warn!(error = %e, "Opponent could not move"),
        }
    }

    fn report_rejection(&self, result: Result<(), MoveError>) {
        if let Err(e) = result {
            let event = SessionEvent::MoveRejected {
                session_id: self.session.session_id().to_string(),
                reason: e.to_string(),
            };
            if self.events.send(event).is_err() {
                debug!("Event receiver dropped");
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::{Coord, Mark, TicTacToe};
    use crate::scoring::ScoringPolicy;
    use crate::search::SearchConfig;
    use crate::session::{Opponent, SessionPhase};
    use crate::sink::MemoryScoreboard;
    use std::sync::Arc;

    fn ai_session(ai: Mark) -> GameSession<TicTacToe> {
        GameSession::new(
            TicTacToe::new(),
            "ann",
            Opponent::Ai {
                mark: ai,
                search: SearchConfig::exhaustive(),
            },
            Arc::new(MemoryScoreboard::new()),
            ScoringPolicy::default(),
        )
    }

    #[tokio::test]
    async fn test_opponent_replies_after_delay() {
        let (driver, mut channels) =
            SessionDriver::new(ai_session(Mark::O), Duration::from_millis(5));
        let handle = tokio::spawn(driver.run());

        channels.commands.send(Command::Move(Coord::new(1, 1))).unwrap();
        loop {
            match channels.events.recv().await {
                Some(SessionEvent::MoveApplied { mark: Mark::O, .. }) => break,
                Some(_) => continue,
                None => panic!("driver stopped early"),
            }
        }
        channels.commands.send(Command::Quit).unwrap();

        let session = handle.await.unwrap();
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.phase(), &SessionPhase::AwaitingPlayerMove);
    }

    #[tokio::test]
    async fn test_rejection_is_reported() {
        let (driver, mut channels) =
            SessionDriver::new(ai_session(Mark::O), Duration::from_secs(60));
        let handle = tokio::spawn(driver.run());

        channels.commands.send(Command::Input("nowhere".into())).unwrap();
        let event = channels.events.recv().await.unwrap();
        assert!(matches!(event, SessionEvent::MoveRejected { .. }));

        drop(channels.commands);
        let session = handle.await.unwrap();
        assert!(session.history().is_empty());
    }
}
