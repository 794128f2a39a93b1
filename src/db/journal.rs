//! Journal entry repository

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DbPool;
use super::session::parse_datetime;
use crate::{Error, Result};

/// A private journal entry
#[derive(Debug, Clone)]
pub struct JournalEntry {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Journal repository
#[derive(Clone)]
pub struct JournalRepo {
    pool: DbPool,
}

impl JournalRepo {
    /// Create a new journal repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Add a journal entry
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn add(&self, user_id: &str, title: &str, content: &str) -> Result<JournalEntry> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute("INSERT OR IGNORE INTO users (id) VALUES (?1)", [user_id])
            .map_err(|e| Error::Database(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let now_str = now.to_rfc3339();

        conn.execute(
            "INSERT INTO journal_entries (id, user_id, title, content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            rusqlite::params![&id, user_id, title, content, &now_str],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(JournalEntry {
            id,
            user_id: user_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// List a user's entries, newest first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<JournalEntry>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, title, content, created_at, updated_at
                 FROM journal_entries WHERE user_id = ?1
                 ORDER BY created_at DESC",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let entries = stmt
            .query_map([user_id], |row| {
                Ok(JournalEntry {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    content: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    updated_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(entries)
    }

    /// Update an entry's title and content
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such entry exists, or error if the
    /// database operation fails
    pub fn update(&self, entry_id: &str, title: &str, content: &str) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let changed = conn
            .execute(
                "UPDATE journal_entries SET title = ?1, content = ?2, updated_at = ?3
                 WHERE id = ?4",
                rusqlite::params![title, content, Utc::now().to_rfc3339(), entry_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        if changed == 0 {
            return Err(Error::NotFound(format!("journal entry {entry_id}")));
        }
        Ok(())
    }

    /// Delete an entry
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such entry exists, or error if the
    /// database operation fails
    pub fn delete(&self, entry_id: &str) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let changed = conn
            .execute(
                "DELETE FROM journal_entries WHERE id = ?1",
                [entry_id],
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        if changed == 0 {
            return Err(Error::NotFound(format!("journal entry {entry_id}")));
        }
        Ok(())
    }
}
