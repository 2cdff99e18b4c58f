//! Tests for the async session driver.

use std::sync::Arc;
use std::time::Duration;

use arcade_engine::{
    Command, Coord, GameSession, Mark, MemoryScoreboard, Opponent, ScoringPolicy, SearchConfig,
    SessionDriver, SessionEvent, SessionPhase, TicTacToe,
};

fn session_against(ai: Mark, scoreboard: &MemoryScoreboard) -> GameSession<TicTacToe> {
    GameSession::new(
        TicTacToe::new(),
        "ann",
        Opponent::Ai {
            mark: ai,
            search: SearchConfig::exhaustive(),
        },
        Arc::new(scoreboard.clone()),
        ScoringPolicy::default(),
    )
}

#[tokio::test]
async fn test_reset_during_thinking_cancels_reply() {
    let scoreboard = MemoryScoreboard::new();
    let (driver, mut channels) =
        SessionDriver::new(session_against(Mark::O, &scoreboard), Duration::from_millis(150));
    let handle = tokio::spawn(driver.run());

    channels
        .commands
        .send(Command::Move(Coord::new(1, 1)))
        .expect("Driver running");
    loop {
        match channels.events.recv().await.expect("Driver running") {
            SessionEvent::OpponentThinking { .. } => break,
            _ => continue,
        }
    }

    channels.commands.send(Command::Reset).expect("Driver running");
    tokio::time::sleep(Duration::from_millis(400)).await;
    channels.commands.send(Command::Quit).expect("Driver running");

    let session = handle.await.expect("Driver panicked");
    assert_eq!(session.generation(), 1);
    assert!(session.history().is_empty());
    assert_eq!(session.phase(), &SessionPhase::AwaitingPlayerMove);
    while let Ok(event) = channels.events.try_recv() {
        assert!(
            !matches!(event, SessionEvent::MoveApplied { mark: Mark::O, .. }),
            "stale reply must not be applied"
        );
    }
}

#[tokio::test]
async fn test_ai_first_opens_without_input() {
    let scoreboard = MemoryScoreboard::new();
    let (driver, mut channels) =
        SessionDriver::new(session_against(Mark::X, &scoreboard), Duration::from_millis(1));
    let handle = tokio::spawn(driver.run());

    match channels.events.recv().await.expect("Driver running") {
        SessionEvent::MoveApplied { mark, .. } => assert_eq!(mark, Mark::X),
        other => panic!("unexpected event {:?}", other),
    }
    channels.commands.send(Command::Quit).expect("Driver running");

    let session = handle.await.expect("Driver panicked");
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.to_move(), Mark::O);
}

#[tokio::test]
async fn test_full_game_reports_once() {
    let scoreboard = MemoryScoreboard::new();
    let (driver, mut channels) =
        SessionDriver::new(session_against(Mark::O, &scoreboard), Duration::ZERO);
    let handle = tokio::spawn(driver.run());

    // Keep offering squares in reading order; rejected ones are skipped.
    let mut next_square = 1;
    channels
        .commands
        .send(Command::Input(next_square.to_string()))
        .expect("Driver running");
    loop {
        match channels.events.recv().await.expect("Driver running") {
            SessionEvent::GameOver { .. } => break,
            SessionEvent::MoveApplied { mark: Mark::O, .. } | SessionEvent::MoveRejected { .. } => {
                next_square += 1;
                channels
                    .commands
                    .send(Command::Input(next_square.to_string()))
                    .expect("Driver running");
            }
            _ => {}
        }
    }
    channels.commands.send(Command::Quit).expect("Driver running");

    let session = handle.await.expect("Driver panicked");
    assert!(session.phase().is_terminal());
    assert_eq!(scoreboard.record_calls().expect("Lock"), 1);
}
