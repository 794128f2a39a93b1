//! Mood check-in repository
//!
//! One row per check-in, scored 1-10 on each dimension. `recorded_on` is a
//! calendar date so check-ins can be charted day by day.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::DbPool;
use super::session::parse_datetime;
use crate::{Error, Result};

/// A single mood check-in
#[derive(Debug, Clone)]
pub struct MoodEntry {
    pub id: String,
    pub user_id: String,
    /// Overall mood, 1 (lowest) to 10 (highest)
    pub mood_score: u8,
    pub anxiety_level: u8,
    pub sleep_quality: u8,
    pub energy_level: u8,
    pub notes: Option<String>,
    pub recorded_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// New check-in values, validated on insert
#[derive(Debug, Clone)]
pub struct NewMoodEntry {
    pub mood_score: u8,
    pub anxiety_level: u8,
    pub sleep_quality: u8,
    pub energy_level: u8,
    pub notes: Option<String>,
    pub recorded_on: NaiveDate,
}

/// Per-dimension averages over a range of check-ins
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodAverages {
    pub mood_score: f64,
    pub anxiety_level: f64,
    pub sleep_quality: f64,
    pub energy_level: f64,
    pub entry_count: usize,
}

/// Mood repository
#[derive(Clone)]
pub struct MoodRepo {
    pool: DbPool,
}

impl MoodRepo {
    /// Create a new mood repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record a check-in
    ///
    /// # Errors
    ///
    /// Returns error if any score falls outside 1-10 or the database
    /// operation fails
    pub fn add(&self, user_id: &str, entry: NewMoodEntry) -> Result<MoodEntry> {
        for (name, score) in [
            ("mood_score", entry.mood_score),
            ("anxiety_level", entry.anxiety_level),
            ("sleep_quality", entry.sleep_quality),
            ("energy_level", entry.energy_level),
        ] {
            if !(1..=10).contains(&score) {
                return Err(Error::Database(format!(
                    "{name} must be between 1 and 10, got {score}"
                )));
            }
        }

        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        conn.execute("INSERT OR IGNORE INTO users (id) VALUES (?1)", [user_id])
            .map_err(|e| Error::Database(e.to_string()))?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO mood_entries
             (id, user_id, mood_score, anxiety_level, sleep_quality, energy_level,
              notes, recorded_on, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            rusqlite::params![
                &id,
                user_id,
                entry.mood_score,
                entry.anxiety_level,
                entry.sleep_quality,
                entry.energy_level,
                entry.notes.as_deref(),
                entry.recorded_on.to_string(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(MoodEntry {
            id,
            user_id: user_id.to_string(),
            mood_score: entry.mood_score,
            anxiety_level: entry.anxiety_level,
            sleep_quality: entry.sleep_quality,
            energy_level: entry.energy_level,
            notes: entry.notes,
            recorded_on: entry.recorded_on,
            created_at: now,
        })
    }

    /// List a user's check-ins, newest day first
    ///
    /// Bounds are inclusive; `None` leaves that end open.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn list_for_user(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<MoodEntry>> {
        let conn = self
            .pool
            .get()
            .map_err(|e| Error::Database(e.to_string()))?;

        let from = from.map_or_else(|| "0000-01-01".to_string(), |d| d.to_string());
        let to = to.map_or_else(|| "9999-12-31".to_string(), |d| d.to_string());

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, mood_score, anxiety_level, sleep_quality,
                        energy_level, notes, recorded_on, created_at
                 FROM mood_entries
                 WHERE user_id = ?1 AND recorded_on BETWEEN ?2 AND ?3
                 ORDER BY recorded_on DESC, created_at DESC",
            )
            .map_err(|e| Error::Database(e.to_string()))?;

        let entries = stmt
            .query_map(rusqlite::params![user_id, from, to], |row| {
                Ok(MoodEntry {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    mood_score: row.get(2)?,
                    anxiety_level: row.get(3)?,
                    sleep_quality: row.get(4)?,
                    energy_level: row.get(5)?,
                    notes: row.get(6)?,
                    recorded_on: parse_date(&row.get::<_, String>(7)?),
                    created_at: parse_datetime(&row.get::<_, String>(8)?),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(entries)
    }

    /// Average each dimension over a user's check-ins
    ///
    /// Returns `None` when the user has no check-ins in the range.
    ///
    /// # Errors
    ///
    /// Returns error if database operation fails
    pub fn averages(
        &self,
        user_id: &str,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Option<MoodAverages>> {
        let entries = self.list_for_user(user_id, from, to)?;
        if entries.is_empty() {
            return Ok(None);
        }

        #[allow(clippy::cast_precision_loss)]
        let count = entries.len() as f64;
        let sum = |f: fn(&MoodEntry) -> u8| {
            entries.iter().map(|e| f64::from(f(e))).sum::<f64>() / count
        };

        Ok(Some(MoodAverages {
            mood_score: sum(|e| e.mood_score),
            anxiety_level: sum(|e| e.anxiety_level),
            sleep_quality: sum(|e| e.sleep_quality),
            energy_level: sum(|e| e.energy_level),
            entry_count: entries.len(),
        }))
    }
}

fn parse_date(s: &str) -> NaiveDate {
    s.parse()
        .unwrap_or_else(|_| Utc::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;

    fn setup() -> MoodRepo {
        MoodRepo::new(init_memory().unwrap())
    }

    fn entry(mood: u8, day: &str) -> NewMoodEntry {
        NewMoodEntry {
            mood_score: mood,
            anxiety_level: 4,
            sleep_quality: 6,
            energy_level: 5,
            notes: None,
            recorded_on: day.parse().unwrap(),
        }
    }

    #[test]
    fn test_add_and_list() {
        let repo = setup();

        repo.add("test-user", entry(7, "2026-08-25")).unwrap();
        repo.add("test-user", entry(4, "2026-08-26")).unwrap();

        let entries = repo.list_for_user("test-user", None, None).unwrap();
        assert_eq!(entries.len(), 2);
        // Newest day first
        assert_eq!(entries[0].mood_score, 4);
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let repo = setup();
        assert!(repo.add("test-user", entry(0, "2026-08-25")).is_err());
        assert!(repo.add("test-user", entry(11, "2026-08-25")).is_err());
    }

    #[test]
    fn test_date_range_filter() {
        let repo = setup();

        repo.add("test-user", entry(3, "2026-08-01")).unwrap();
        repo.add("test-user", entry(8, "2026-08-20")).unwrap();

        let from = Some("2026-08-10".parse().unwrap());
        let entries = repo.list_for_user("test-user", from, None).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mood_score, 8);
    }

    #[test]
    fn test_averages() {
        let repo = setup();

        repo.add("test-user", entry(4, "2026-08-25")).unwrap();
        repo.add("test-user", entry(8, "2026-08-26")).unwrap();

        let averages = repo.averages("test-user", None, None).unwrap().unwrap();
        assert!((averages.mood_score - 6.0).abs() < f64::EPSILON);
        assert_eq!(averages.entry_count, 2);

        assert!(repo.averages("nobody", None, None).unwrap().is_none());
    }
}
