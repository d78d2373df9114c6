use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{StatisticsRepository, StatsKey, StorageError};

use super::SqliteRepository;

#[async_trait]
impl StatisticsRepository for SqliteRepository {
    async fn get_value(&self, key: StatsKey) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM key_values WHERE key = ?1")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        row.try_get::<String, _>("value")
            .map(Some)
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn set_values(&self, entries: &[(StatsKey, String)]) -> Result<(), StorageError> {
        let updated_at = Utc::now();
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        for (key, value) in entries {
            sqlx::query(
                r"
                INSERT INTO key_values (key, value, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(key.as_str())
            .bind(value.as_str())
            .bind(updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(())
    }
}
