//! Session repository for chat persistence

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::DbPool;
use crate::chat::{Message, MessageRole};
use crate::{Error, Result};

/// A stored conversation session
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session repository
#[derive(Clone)]
pub struct SessionRepo {
    pool: DbPool,
}

impl SessionRepo {
    /// Create a new session repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new session for a user
    ///
    /// The user row is created on first use.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn create(&self, user_id: &str, title: Option<&str>) -> Result<Session> {
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
            "INSERT INTO sessions (id, user_id, title, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            rusqlite::params![&id, user_id, title, &now_str],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(Session {
            id,
            user_id: user_id.to_string(),
            title: title.map(String::from),
            created_at: now,
            updated_at: now,
        })
    }

    /// Find a session by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no such session exists, or error if the
    /// database operation fails
    pub fn find(&self, session_id: &str) -> Result<Session> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.query_row(
            "SELECT id, user_id, title, created_at, updated_at
             FROM sessions WHERE id = ?1",
            [session_id],
            |row| {
                Ok(Session {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound(format!("session {session_id}"))
            }
            other => Error::Database(other.to_string()),
        })
    }

    /// List a user's sessions, most recently updated first
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list_for_user(&self, user_id: &str) -> Result<Vec<Session>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, title, created_at, updated_at
                 FROM sessions WHERE user_id = ?1 ORDER BY updated_at DESC",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let sessions = stmt
            .query_map([user_id], |row| {
                Ok(Session {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    title: row.get(2)?,
                    created_at: parse_datetime(&row.get::<_, String>(3)?),
                    updated_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(sessions)
    }

    /// Set a session's title
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn set_title(&self, session_id: &str, title: &str) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "UPDATE sessions SET title = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![title, Utc::now().to_rfc3339(), session_id],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Store a message, keeping its id and timestamp
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn add_message(&self, session_id: &str, message: &Message) -> Result<()> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "INSERT INTO messages (id, session_id, role, content, is_voice, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                &message.id,
                session_id,
                message.role.as_str(),
                &message.content,
                message.is_voice,
                message.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute(
            "UPDATE sessions SET updated_at = ?1 WHERE id = ?2",
            rusqlite::params![Utc::now().to_rfc3339(), session_id],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(())
    }

    /// Get a session's messages in chronological order
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn messages(&self, session_id: &str) -> Result<Vec<Message>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, role, content, is_voice, created_at
                 FROM messages WHERE session_id = ?1
                 ORDER BY created_at ASC",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let messages = stmt
            .query_map([session_id], |row| {
                Ok(Message {
                    id: row.get(0)?,
                    role: MessageRole::from_str(&row.get::<_, String>(1)?)
                        .unwrap_or(MessageRole::User),
                    content: row.get(2)?,
                    is_voice: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(messages)
    }

    /// Count messages in a session
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn message_count(&self, session_id: &str) -> Result<usize> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM messages WHERE session_id = ?1",
                [session_id],
                |row| row.get(0),
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }
}

pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    fn setup() -> SessionRepo {
        SessionRepo::new(init_memory().unwrap())
    }

    #[test]
    fn test_create_and_find_session() {
        let repo = setup();

        let session = repo.create("test-user", Some("First chat")).unwrap();
        let found = repo.find(&session.id).unwrap();

        assert_eq!(found.id, session.id);
        assert_eq!(found.title.as_deref(), Some("First chat"));
    }

    #[test]
    fn test_find_missing_session() {
        let repo = setup();
        assert!(matches!(repo.find("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_add_and_get_messages() {
        let repo = setup();
        let session = repo.create("test-user", None).unwrap();

        let first = Message::new(MessageRole::User, "Hello", false);
        let second = Message::new(MessageRole::Assistant, "Hi there!", true);
        repo.add_message(&session.id, &first).unwrap();
        repo.add_message(&session.id, &second).unwrap();

        let messages = repo.messages(&session.id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[1].content, "Hi there!");
        assert!(messages[1].is_voice);
    }

    #[test]
    fn test_list_for_user_orders_by_recency() {
        let repo = setup();

        let older = repo.create("test-user", Some("older")).unwrap();
        let newer = repo.create("test-user", Some("newer")).unwrap();
        // Touching the older session should move it to the front
        repo.add_message(&older.id, &Message::new(MessageRole::User, "hi", false))
            .unwrap();

        let sessions = repo.list_for_user("test-user").unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, older.id);
        assert_eq!(sessions[1].id, newer.id);
    }

    #[test]
    fn test_message_count() {
        let repo = setup();
        let session = repo.create("test-user", None).unwrap();

        assert_eq!(repo.message_count(&session.id).unwrap(), 0);
        repo.add_message(&session.id, &Message::new(MessageRole::User, "Test", false))
            .unwrap();
        assert_eq!(repo.message_count(&session.id).unwrap(), 1);
    }
}
