//! Command-line interface for the arcade.

use arcade_engine::{Difficulty, GameKind, Mark};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Arcade - terminal board games with a persistent scoreboard
#[derive(Parser, Debug)]
#[command(name = "arcade")]
#[command(
    about = "Play tic-tac-toe, Connect Four and Lights Out in the terminal",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Path to the TOML config file (defaults are used if it is missing)
    #[arg(long, global = true, default_value = "arcade.toml")]
    pub config: PathBuf,

    /// Override the database path from the config file
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play a game
    Play {
        /// Which game (tic-tac-toe, connect-four, lights-out)
        game: GameKind,

        /// Name scores are recorded under
        #[arg(short, long, default_value = "player")]
        player: String,

        /// Let the computer open the game
        #[arg(long)]
        ai_first: bool,

        /// Two players at one keyboard instead of the computer
        #[arg(long, conflicts_with = "ai_first")]
        hot_seat: bool,

        /// Override the search depth (0 searches to the end, except in Connect Four)
        #[arg(long)]
        depth: Option<u32>,

        /// Lights Out grid size (easy, medium, hard)
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
    },

    /// Show the best scores for a game
    Leaderboard {
        /// Which game
        game: GameKind,

        /// Maximum rows (defaults to the config value)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a player's running total and recent results
    Total {
        /// Player name
        #[arg(short, long, default_value = "player")]
        player: String,
    },
}

impl Command {
    /// Mark the computer plays for a `play` command.
    pub fn ai_mark(ai_first: bool) -> Mark {
        if ai_first { Mark::X } else { Mark::O }
    }
}
