//! SQLite-backed knowledge store.
//!
//! One connection behind a mutex; schema created on open. Rolling summaries
//! are keyed by (user_id, stream), the overall summary and profile by
//! user_id. Condition/allergy lists are stored as JSON arrays.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::types::{OverallSummary, RollingSummary, SummaryStream, UserProfileSnapshot};
use super::{KnowledgeStore, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rolling_summaries (
    user_id      TEXT NOT NULL,
    stream       TEXT NOT NULL,
    text         TEXT NOT NULL,
    last_updated TEXT NOT NULL,
    PRIMARY KEY (user_id, stream)
);

CREATE TABLE IF NOT EXISTS overall_summaries (
    user_id      TEXT PRIMARY KEY,
    text         TEXT NOT NULL,
    generated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    user_id             TEXT PRIMARY KEY,
    name                TEXT,
    age                 INTEGER,
    gender              TEXT,
    height_cm           REAL,
    weight_kg           REAL,
    existing_conditions TEXT NOT NULL DEFAULT '[]',
    allergies           TEXT NOT NULL DEFAULT '[]'
);
";

/// SQLite-backed `KnowledgeStore`.
pub struct SqliteKnowledgeStore {
    conn: Mutex<Connection>,
}

impl SqliteKnowledgeStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// In-memory store, used by tests and previews.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store connection poisoned".into()))
    }

    /// Upsert profile fields for a user. The synthesizer only reads
    /// profiles; this write path is for the profile-editing caller.
    pub fn put_profile(
        &self,
        user_id: &str,
        profile: &UserProfileSnapshot,
    ) -> Result<(), StoreError> {
        let conditions = serde_json::to_string(&profile.existing_conditions)
            .map_err(|e| StoreError::Decoding(e.to_string()))?;
        let allergies = serde_json::to_string(&profile.allergies)
            .map_err(|e| StoreError::Decoding(e.to_string()))?;

        self.lock()?.execute(
            "INSERT OR REPLACE INTO profiles
             (user_id, name, age, gender, height_cm, weight_kg, existing_conditions, allergies)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user_id,
                profile.name,
                profile.age,
                profile.gender,
                profile.height_cm,
                profile.weight_kg,
                conditions,
                allergies,
            ],
        )?;
        Ok(())
    }
}

fn parse_list(raw: String) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(&raw).map_err(|e| StoreError::Decoding(e.to_string()))
}

impl KnowledgeStore for SqliteKnowledgeStore {
    fn rolling_summary(
        &self,
        user_id: &str,
        stream: SummaryStream,
    ) -> Result<Option<RollingSummary>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT text, last_updated FROM rolling_summaries
                 WHERE user_id = ?1 AND stream = ?2",
                params![user_id, stream.as_str()],
                |row| {
                    Ok(RollingSummary {
                        text: row.get::<_, String>(0)?,
                        last_updated: row.get::<_, DateTime<Utc>>(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn put_rolling_summary(
        &self,
        user_id: &str,
        stream: SummaryStream,
        summary: &RollingSummary,
    ) -> Result<(), StoreError> {
        self.lock()?.execute(
            "INSERT OR REPLACE INTO rolling_summaries (user_id, stream, text, last_updated)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, stream.as_str(), summary.text, summary.last_updated],
        )?;
        Ok(())
    }

    fn overall_summary(&self, user_id: &str) -> Result<Option<OverallSummary>, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT text, generated_at FROM overall_summaries WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(OverallSummary {
                        text: row.get::<_, String>(0)?,
                        generated_at: row.get::<_, DateTime<Utc>>(1)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    fn put_overall_summary(
        &self,
        user_id: &str,
        summary: &OverallSummary,
    ) -> Result<(), StoreError> {
        self.lock()?.execute(
            "INSERT OR REPLACE INTO overall_summaries (user_id, text, generated_at)
             VALUES (?1, ?2, ?3)",
            params![user_id, summary.text, summary.generated_at],
        )?;
        Ok(())
    }

    fn profile_snapshot(&self, user_id: &str) -> Result<UserProfileSnapshot, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT name, age, gender, height_cm, weight_kg, existing_conditions, allergies
                 FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<u32>>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<f64>>(3)?,
                        row.get::<_, Option<f64>>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                },
            )
            .optional()?;

        match row {
            None => Ok(UserProfileSnapshot::default()),
            Some((name, age, gender, height_cm, weight_kg, conditions, allergies)) => {
                Ok(UserProfileSnapshot {
                    name,
                    age,
                    gender,
                    height_cm,
                    weight_kg,
                    existing_conditions: parse_list(conditions)?,
                    allergies: parse_list(allergies)?,
                })
            }
        }
    }
}
