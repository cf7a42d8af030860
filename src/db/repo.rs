//! SQLite repository for streak documents.

use crate::domain::{StreakRecord, UserId};
use crate::store::{StoreError, StreakStore};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::collections::BTreeMap;
use tracing::debug;

/// Raw `streaks` row; `history` is the JSON-encoded day map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreakRow {
    pub user_id: String,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub last_active_date: String,
    pub history: String,
    pub updated_at_ms: i64,
}

/// Repository for database operations.
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    /// Fetch the stored row for a user, if any.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_streak(&self, user: &UserId) -> Result<Option<StreakRow>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT user_id, current_streak, longest_streak, last_active_date, history, updated_at_ms
            FROM streaks
            WHERE user_id = ?
            "#,
        )
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| StreakRow {
            user_id: row.get("user_id"),
            current_streak: row.get("current_streak"),
            longest_streak: row.get("longest_streak"),
            last_active_date: row.get("last_active_date"),
            history: row.get("history"),
            updated_at_ms: row.get("updated_at_ms"),
        }))
    }

    /// Insert or replace the row for a user.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_streak(
        &self,
        user: &UserId,
        record: &StreakRecord,
        history_json: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO streaks (
                user_id, current_streak, longest_streak, last_active_date, history, updated_at_ms
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                current_streak = excluded.current_streak,
                longest_streak = excluded.longest_streak,
                last_active_date = excluded.last_active_date,
                history = excluded.history,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(user.as_str())
        .bind(record.current_streak)
        .bind(record.longest_streak)
        .bind(record.last_active_date.as_str())
        .bind(history_json)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Number of users with a stored streak.
    pub async fn count_streaks(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM streaks")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::StorageUnavailable(err.to_string())
    }
}

#[async_trait]
impl StreakStore for Repository {
    async fn get_snapshot(&self, user: &UserId) -> Result<Option<StreakRecord>, StoreError> {
        let row = match self.query_streak(user).await? {
            Some(row) => row,
            None => return Ok(None),
        };
        debug!(user = %user, updated_at_ms = row.updated_at_ms, "Loaded streak row");

        let history: BTreeMap<String, bool> =
            serde_json::from_str(&row.history).map_err(|e| StoreError::Corrupt {
                user: row.user_id.clone(),
                reason: format!("history column: {}", e),
            })?;

        Ok(Some(StreakRecord {
            current_streak: row.current_streak,
            longest_streak: row.longest_streak,
            last_active_date: row.last_active_date,
            history,
        }))
    }

    async fn put_snapshot(&self, user: &UserId, record: &StreakRecord) -> Result<(), StoreError> {
        let history_json = serde_json::to_string(&record.history)
            .map_err(|e| StoreError::StorageUnavailable(format!("encode history: {}", e)))?;
        self.upsert_streak(user, record, &history_json).await?;
        Ok(())
    }
}
