//! Database repository for recorded outcomes, leaderboards and running totals.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument, warn};

use crate::db::{DbError, EntryFee, NewEntryFee, NewScoreRecord, ScoreRecord, schema};
use crate::games::GameKind;
use crate::scoring::OutcomeEvent;
use crate::sink::{LeaderboardScope, LeaderboardSource, ScoreEntry, ScoreSink, SinkError};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// SQLite-backed score store.
#[derive(Debug, Clone)]
pub struct ScoreRepository {
    db_path: String,
}

impl ScoreRepository {
    /// Creates a repository for the database at the given path.
    ///
    /// Each operation opens its own connection, so `":memory:"` does not
    /// persist between calls; tests use a temporary file instead.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating ScoreRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| DbError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Stores an outcome. Returns `false` if the session already has one.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(
        skip(self, record),
        fields(session_id = %record.session_id(), score = record.score())
    )]
    pub fn insert_score(&self, record: NewScoreRecord) -> Result<bool, DbError> {
        let mut conn = self.connection()?;
        let inserted = diesel::insert_or_ignore_into(schema::scores::table)
            .values(&record)
            .execute(&mut conn)?;

        if inserted == 0 {
            warn!("Outcome already recorded for session, ignoring");
            return Ok(false);
        }
        info!(participant = %record.participant_id(), game = %record.game(), "Outcome recorded");
        Ok(true)
    }

    /// Stores an entry fee.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, fee), fields(session_id = %fee.session_id(), fee = fee.fee()))]
    pub fn insert_fee(&self, fee: NewEntryFee) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        diesel::insert_or_ignore_into(schema::entry_fees::table)
            .values(&fee)
            .execute(&mut conn)?;
        debug!("Entry fee recorded");
        Ok(())
    }

    /// Best scores for a game: highest first, earliest first among equals.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn top_records(&self, game: GameKind, limit: usize) -> Result<Vec<ScoreRecord>, DbError> {
        let mut conn = self.connection()?;
        let limit = i64::try_from(limit).map_err(|_| DbError::new("Leaderboard limit too large"))?;

        let records = schema::scores::table
            .filter(schema::scores::game.eq(game.to_string()))
            .order((schema::scores::score.desc(), schema::scores::id.asc()))
            .limit(limit)
            .select(ScoreRecord::as_select())
            .load(&mut conn)?;

        info!(count = records.len(), "Leaderboard loaded");
        Ok(records)
    }

    /// Every outcome recorded for a participant, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn records_for(&self, participant_id: &str) -> Result<Vec<ScoreRecord>, DbError> {
        let mut conn = self.connection()?;
        let records = schema::scores::table
            .filter(schema::scores::participant_id.eq(participant_id))
            .order(schema::scores::id.desc())
            .select(ScoreRecord::as_select())
            .load(&mut conn)?;

        debug!(count = records.len(), "Participant outcomes loaded");
        Ok(records)
    }

    /// Every entry fee charged to a participant.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn fees_for(&self, participant_id: &str) -> Result<Vec<EntryFee>, DbError> {
        let mut conn = self.connection()?;
        let fees = schema::entry_fees::table
            .filter(schema::entry_fees::participant_id.eq(participant_id))
            .select(EntryFee::as_select())
            .load(&mut conn)?;

        debug!(count = fees.len(), "Participant fees loaded");
        Ok(fees)
    }

    /// Recorded scores minus entry fees.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn running_total(&self, participant_id: &str) -> Result<i64, DbError> {
        let earned: i64 = self.records_for(participant_id)?.iter().map(|r| *r.score()).sum();
        let spent: i64 = self.fees_for(participant_id)?.iter().map(|f| *f.fee()).sum();

        info!(earned, spent, total = earned - spent, "Running total computed");
        Ok(earned - spent)
    }
}

impl ScoreSink for ScoreRepository {
    #[instrument(skip(self, event), fields(result = %event.result(), score = event.score()))]
    fn record_outcome(
        &self,
        session_id: &str,
        participant_id: &str,
        game: GameKind,
        event: &OutcomeEvent,
    ) -> Result<(), SinkError> {
        let record = NewScoreRecord::new(
            session_id.to_string(),
            participant_id.to_string(),
            game.to_string(),
            event.result().to_string(),
            event.score(),
        );
        self.insert_score(record)?;
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
        let row = NewEntryFee::new(
            session_id.to_string(),
            participant_id.to_string(),
            game.to_string(),
            fee,
        );
        self.insert_fee(row)?;
        Ok(())
    }
}

impl LeaderboardSource for ScoreRepository {
    #[instrument(skip(self))]
    fn top_scores(&self, scope: &LeaderboardScope) -> Result<Vec<ScoreEntry>, SinkError> {
        Ok(self
            .top_records(scope.game, scope.limit)?
            .into_iter()
            .map(|r| ScoreEntry::new(r.participant_id().clone(), *r.score()))
            .collect())
    }

    #[instrument(skip(self))]
    fn global_score(&self, participant_id: &str) -> Result<i64, SinkError> {
        Ok(self.running_total(participant_id)?)
    }
}
