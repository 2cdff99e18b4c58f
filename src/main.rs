//! Arcade - unified CLI
//!
//! Plays games in the terminal and reads the scoreboard.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use arcade_engine::{
    ArcadeConfig, BoardGame, Command as DriverCommand, ConnectFour, DriverChannels, GameKind,
    GameSession, LeaderboardScope, LeaderboardSource, LightsOut, Opponent, ScoreRepository,
    SessionDriver, SessionEvent, TicTacToe, fetch_top_scores,
};
use clap::Parser;
use cli::{Cli, Command};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let repo = ScoreRepository::new(config.db_path().clone())?;
    repo.run_migrations()?;

    match cli.command {
        Command::Play {
            game,
            player,
            ai_first,
            hot_seat,
            depth,
            difficulty,
        } => {
            let opponent = if game == GameKind::LightsOut {
                Opponent::Solo
            } else if hot_seat {
                Opponent::HotSeat
            } else {
                Opponent::Ai {
                    mark: Command::ai_mark(ai_first),
                    search: config.search_with_depth(game, depth),
                }
            };
            let repo = Arc::new(repo);
            match game {
                GameKind::TicTacToe => {
                    play(TicTacToe::new(), player, opponent, &config, repo).await
                }
                GameKind::ConnectFour => {
                    play(ConnectFour::new(), player, opponent, &config, repo).await
                }
                GameKind::LightsOut => {
                    play(LightsOut::new(difficulty), player, opponent, &config, repo).await
                }
            }
        }
        Command::Leaderboard { game, limit, json } => {
            let limit = limit.unwrap_or(*config.leaderboard_limit());
            show_leaderboard(&repo, game, limit, json)
        }
        Command::Total { player } => show_total(&repo, &player),
    }
}

/// Reads the config file if present, then applies CLI overrides.
#[instrument(skip(cli), fields(path = %cli.config.display()))]
fn load_config(cli: &Cli) -> Result<ArcadeConfig> {
    let config = if cli.config.exists() {
        ArcadeConfig::from_file(&cli.config)?
    } else {
        info!("No config file found, using defaults");
        ArcadeConfig::default()
    };
    Ok(match &cli.db_path {
        Some(path) => config.with_db_path(path.clone()),
        None => config,
    })
}

/// Runs one interactive game until the player quits.
#[instrument(skip(game, config, repo), fields(kind = %game.kind()))]
async fn play<G: BoardGame>(
    game: G,
    player: String,
    opponent: Opponent,
    config: &ArcadeConfig,
    repo: Arc<ScoreRepository>,
) -> Result<()> {
    let kind = game.kind();
    let session = GameSession::new(game, player, opponent, repo.clone(), config.scoring().clone());
    println!("{}\n", session.board());
    println!("Enter a move, 'r' for a new game, 'q' to quit.");

    let (driver, channels) = SessionDriver::new(session, config.thinking_delay());
    let DriverChannels {
        commands,
        mut events,
    } = channels;
    let mut handle = tokio::spawn(driver.run());

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let command = match line.trim() {
                "q" | "quit" => DriverCommand::Quit,
                "r" | "reset" | "new" => DriverCommand::Reset,
                other => DriverCommand::Input(other.to_string()),
            };
            let quit = command == DriverCommand::Quit;
            if commands.send(command).is_err() || quit {
                return;
            }
        }
        if commands.send(DriverCommand::Quit).is_err() {
            debug!("Driver already stopped");
        }
    });

    let session = loop {
        tokio::select! {
            Some(event) = events.recv() => render(event, &*repo, kind, *config.leaderboard_limit()),
            finished = &mut handle => break finished?,
        }
    };
    while let Ok(event) = events.try_recv() {
        render(event, &*repo, kind, *config.leaderboard_limit());
    }

    info!(generation = session.generation(), "Play finished");
    Ok(())
}

/// Prints one session notification.
fn render(event: SessionEvent, source: &dyn LeaderboardSource, kind: GameKind, limit: usize) {
    match event {
        SessionEvent::MoveApplied { mark, position, board, .. } => {
            println!("{} plays {}\n{}\n", mark, position, board);
        }
        SessionEvent::MoveRejected { reason, .. } => println!("Not accepted: {}", reason),
        SessionEvent::OpponentThinking { .. } => println!("Thinking..."),
        SessionEvent::GameOver { outcome, event, .. } => {
            println!("Game over: {} ({}, {} points)", outcome, event.result(), event.score());
            println!("Top scores:");
            for (rank, entry) in fetch_top_scores(source, LeaderboardScope::new(kind, limit))
                .iter()
                .enumerate()
            {
                println!("{:>3}. {:<20} {:>6}", rank + 1, entry.identity(), entry.score());
            }
            println!("Enter 'r' for a new game or 'q' to quit.");
        }
        SessionEvent::Reset { .. } => println!("New game started."),
    }
}

/// Prints a game's leaderboard.
#[instrument(skip(repo))]
fn show_leaderboard(
    repo: &ScoreRepository,
    game: GameKind,
    limit: usize,
    json: bool,
) -> Result<()> {
    let entries = fetch_top_scores(repo, LeaderboardScope::new(game, limit));
    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No scores yet for {}.", game);
    }
    for (rank, entry) in entries.iter().enumerate() {
        println!("{:>3}. {:<20} {:>6}", rank + 1, entry.identity(), entry.score());
    }
    Ok(())
}

/// Prints a player's running total and recent results.
#[instrument(skip(repo))]
fn show_total(repo: &ScoreRepository, player: &str) -> Result<()> {
    let total = repo.global_score(player)?;
    println!("{}: {} points", player, total);
    for record in repo.records_for(player)?.iter().take(10) {
        println!(
            "  {}  {:<13} {:<5} {:>6}",
            record.recorded_at().format("%Y-%m-%d %H:%M"),
            record.game(),
            record.result(),
            record.score()
        );
    }
    Ok(())
}
