//! # parley-store
//!
//! SQLite persistence for the two things that outlive a process: the model
//! catalog read at startup and user ratings of conversations.
//!
//! Every statement binds its values through `params![]`; no caller-supplied
//! text is ever spliced into SQL.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use parley_engine::{ModelId, ModelRecord};
use rusqlite::{params, Connection};
use serde::Serialize;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database unavailable: {0}")]
    Unavailable(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    Poisoned,
}

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS model (
    id             INTEGER PRIMARY KEY,
    name           TEXT NOT NULL,
    download_url   TEXT,
    tokenizer_path TEXT NOT NULL,
    model_path     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS model_ratings (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation TEXT NOT NULL,
    rating       INTEGER NOT NULL,
    model_used   INTEGER NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_model_ratings_model_used
    ON model_ratings(model_used);
";

/// One stored rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingRecord {
    pub id: i64,
    pub conversation: String,
    pub rating: i64,
    pub model_used: ModelId,
    pub created_at: DateTime<Utc>,
}

/// Shared handle to the database. Cloning is cheap.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "opened database");
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Add a catalog row. Replaces any existing row with the same id.
    pub fn insert_model(&self, record: &ModelRecord) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            r"
            INSERT OR REPLACE INTO model (id, name, download_url, tokenizer_path, model_path)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
            params![
                record.id,
                record.name,
                record.download_url,
                record.tokenizer_path,
                record.model_path,
            ],
        )?;
        Ok(())
    }

    /// Every catalog row, ordered by id.
    pub fn models(&self) -> Result<Vec<ModelRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, download_url, tokenizer_path, model_path FROM model ORDER BY id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ModelRecord {
                id: row.get(0)?,
                name: row.get(1)?,
                download_url: row.get(2)?,
                tokenizer_path: row.get(3)?,
                model_path: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Record a rating and return its row id.
    ///
    /// `model_used` is not checked against the catalog; ratings for retired
    /// models stay queryable.
    pub fn submit_rating(&self, conversation: &str, rating: i64, model_used: ModelId) -> Result<i64> {
        let conn = self.lock()?;
        conn.execute(
            r"
            INSERT INTO model_ratings (conversation, rating, model_used, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![conversation, rating, model_used, Utc::now().to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, model_used, rating, "rating stored");
        Ok(id)
    }

    /// All ratings for one model, oldest first.
    pub fn ratings_for_model(&self, model_used: ModelId) -> Result<Vec<RatingRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            r"
            SELECT id, conversation, rating, model_used, created_at
            FROM model_ratings WHERE model_used = ?1 ORDER BY id
            ",
        )?;
        let rows = stmt.query_map(params![model_used], |row| {
            let created_at: String = row.get(4)?;
            Ok(RatingRecord {
                id: row.get(0)?,
                conversation: row.get(1)?,
                rating: row.get(2)?,
                model_used: row.get(3)?,
                created_at: parse_timestamp(&created_at),
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Cheap liveness check.
    pub fn ping(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            tracing::warn!(value = s, "unparseable created_at, using epoch");
            DateTime::<Utc>::default()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: ModelId, name: &str) -> ModelRecord {
        ModelRecord {
            id,
            name: name.to_string(),
            download_url: None,
            tokenizer_path: format!("/models/{name}/vocab.txt"),
            model_path: format!("/models/{name}/weights.bin"),
        }
    }

    #[test]
    fn empty_database_has_no_models() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.models().unwrap().is_empty());
        store.ping().unwrap();
    }

    #[test]
    fn models_come_back_ordered() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_model(&record(2, "beta")).unwrap();
        store.insert_model(&record(1, "alpha")).unwrap();

        let models = store.models().unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, 1);
        assert_eq!(models[1].name, "beta");
    }

    #[test]
    fn insert_model_replaces_same_id() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.insert_model(&record(1, "alpha")).unwrap();
        store.insert_model(&record(1, "alpha-v2")).unwrap();
        let models = store.models().unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].name, "alpha-v2");
    }

    #[test]
    fn ratings_are_filtered_by_model() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = store.submit_rating("hi / hello", 5, 1).unwrap();
        let b = store.submit_rating("bye / ok", 2, 2).unwrap();
        assert_ne!(a, b);

        let ratings = store.ratings_for_model(1).unwrap();
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].id, a);
        assert_eq!(ratings[0].conversation, "hi / hello");
        assert_eq!(ratings[0].rating, 5);
        assert_eq!(ratings[0].model_used, 1);
        assert!(store.ratings_for_model(3).unwrap().is_empty());
    }

    #[test]
    fn bad_timestamp_falls_back_to_epoch() {
        assert_eq!(parse_timestamp("yesterday"), DateTime::<Utc>::default());
    }
}
