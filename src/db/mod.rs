//! SQLite persistence for recorded outcomes and entry fees.

mod error;
mod models;
mod repository;
mod schema;

pub use error::DbError;
pub use models::{EntryFee, NewEntryFee, NewScoreRecord, ScoreRecord};
pub use repository::{MIGRATIONS, ScoreRepository};
