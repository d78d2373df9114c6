use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Keys of the persisted statistics layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatsKey {
    GamesCount,
    Correct,
    Total,
    BestGame,
}

impl StatsKey {
    pub const ALL: [StatsKey; 4] = [
        StatsKey::GamesCount,
        StatsKey::Correct,
        StatsKey::Total,
        StatsKey::BestGame,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatsKey::GamesCount => "gamesCount",
            StatsKey::Correct => "correct",
            StatsKey::Total => "total",
            StatsKey::BestGame => "bestGame",
        }
    }
}

impl fmt::Display for StatsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Durable key-value contract backing the statistics service.
///
/// Values are opaque strings; encoding them is the caller's concern.
#[async_trait]
pub trait StatisticsRepository: Send + Sync {
    /// Fetch the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_value(&self, key: StatsKey) -> Result<Option<String>, StorageError>;

    /// Write all `entries` as one batch.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the batch cannot be stored; backends that
    /// support it leave no entry of a failed batch behind.
    async fn set_values(&self, entries: &[(StatsKey, String)]) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<StatsKey, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryRepository {
    async fn get_value(&self, key: StatsKey) -> Result<Option<String>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&key).cloned())
    }

    async fn set_values(&self, entries: &[(StatsKey, String)]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for (key, value) in entries {
            guard.insert(*key, value.clone());
        }
        Ok(())
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub statistics: Arc<dyn StatisticsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let statistics: Arc<dyn StatisticsRepository> = Arc::new(InMemoryRepository::new());
        Self { statistics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_persisted_layout() {
        let names: Vec<_> = StatsKey::ALL.iter().map(|key| key.as_str()).collect();
        assert_eq!(names, ["gamesCount", "correct", "total", "bestGame"]);
        assert_eq!(StatsKey::BestGame.to_string(), "bestGame");
    }

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_value(StatsKey::Total).await.unwrap(), None);
    }

    #[tokio::test]
    async fn batch_overwrites_previous_values() {
        let repo = InMemoryRepository::new();
        repo.set_values(&[(StatsKey::Correct, "3".into()), (StatsKey::Total, "10".into())])
            .await
            .unwrap();
        repo.set_values(&[(StatsKey::Correct, "11".into())])
            .await
            .unwrap();

        assert_eq!(
            repo.get_value(StatsKey::Correct).await.unwrap().as_deref(),
            Some("11")
        );
        assert_eq!(
            repo.get_value(StatsKey::Total).await.unwrap().as_deref(),
            Some("10")
        );
    }

    #[tokio::test]
    async fn in_memory_storage_shares_one_repository() {
        let storage = Storage::in_memory();
        let clone = storage.clone();
        storage
            .statistics
            .set_values(&[(StatsKey::GamesCount, "1".into())])
            .await
            .unwrap();
        assert_eq!(
            clone
                .statistics
                .get_value(StatsKey::GamesCount)
                .await
                .unwrap()
                .as_deref(),
            Some("1")
        );
    }
}
