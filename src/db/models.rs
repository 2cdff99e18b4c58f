//! Row types for the score tables.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;

use crate::db::{DbError, schema};
use crate::games::GameKind;
use crate::scoring::GameResult;

/// A recorded session outcome.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::scores)]
pub struct ScoreRecord {
    id: i32,
    session_id: String,
    participant_id: String,
    game: String,
    result: String,
    score: i64,
    recorded_at: NaiveDateTime,
}

impl ScoreRecord {
    /// Parses the stored result column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown value.
    #[instrument(skip(self), fields(result = %self.result))]
    pub fn parse_result(&self) -> Result<GameResult, DbError> {
        self.result
            .parse()
            .map_err(|_| DbError::new(format!("Invalid result: '{}'", self.result)))
    }

    /// Parses the stored game column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column holds an unknown game.
    #[instrument(skip(self), fields(game = %self.game))]
    pub fn parse_game(&self) -> Result<GameKind, DbError> {
        self.game
            .parse()
            .map_err(|_| DbError::new(format!("Invalid game: '{}'", self.game)))
    }
}

/// Insertable outcome row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::scores)]
pub struct NewScoreRecord {
    session_id: String,
    participant_id: String,
    game: String,
    result: String,
    score: i64,
}

/// A charged entry fee.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::entry_fees)]
pub struct EntryFee {
    id: i32,
    session_id: String,
    participant_id: String,
    game: String,
    fee: i64,
    charged_at: NaiveDateTime,
}

/// Insertable entry fee row.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::entry_fees)]
pub struct NewEntryFee {
    session_id: String,
    participant_id: String,
    game: String,
    fee: i64,
}
