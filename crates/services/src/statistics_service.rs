use std::str::FromStr;
use std::sync::Arc;

use quiz_core::Clock;
use quiz_core::model::{AggregateStats, GameRecord};
use storage::repository::{StatisticsRepository, StatsKey};

use crate::error::StatisticsError;

/// Lifetime quiz statistics, loaded once and flushed on every write.
///
/// The in-memory aggregate is authoritative for the running process; failed
/// writes are logged and do not roll it back.
#[derive(Clone)]
pub struct StatisticService {
    clock: Clock,
    repo: Arc<dyn StatisticsRepository>,
    stats: AggregateStats,
}

impl StatisticService {
    /// Read the persisted statistics.
    ///
    /// Values that cannot be decoded are logged and treated as absent.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError::Storage` if the repository cannot be read.
    pub async fn load(
        clock: Clock,
        repo: Arc<dyn StatisticsRepository>,
    ) -> Result<Self, StatisticsError> {
        let games_count: u32 = read_number(repo.as_ref(), StatsKey::GamesCount).await?;
        let correct: u64 = read_number(repo.as_ref(), StatsKey::Correct).await?;
        let total: u64 = read_number(repo.as_ref(), StatsKey::Total).await?;
        let best_game = read_best_game(repo.as_ref()).await?;

        let stats = AggregateStats::from_persisted(games_count, correct, total, best_game)
            .unwrap_or_else(|err| {
                tracing::warn!(%err, "persisted statistics are inconsistent; starting over");
                AggregateStats::default()
            });

        Ok(Self { clock, repo, stats })
    }

    #[must_use]
    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    #[must_use]
    pub fn games_count(&self) -> u32 {
        self.stats.games_count()
    }

    #[must_use]
    pub fn total_accuracy(&self) -> f64 {
        self.stats.total_accuracy()
    }

    #[must_use]
    pub fn best_game(&self) -> Option<&GameRecord> {
        self.stats.best_game()
    }

    /// Record a finished round and persist the result.
    ///
    /// Persistence failures are logged; the updated statistics stay in memory.
    pub async fn store(&mut self, correct: u32, total: u32) {
        let game = match GameRecord::new(correct, total, self.clock.now()) {
            Ok(game) => game,
            Err(err) => {
                tracing::warn!(%err, "ignoring impossible round result");
                return;
            }
        };

        let new_best = self.stats.record(game);
        if let Err(err) = self.write(new_best).await {
            tracing::warn!(%err, "failed to persist quiz statistics");
        }
    }

    /// Write the full aggregate to storage.
    ///
    /// # Errors
    ///
    /// Returns `StatisticsError` if encoding or storage fails.
    pub async fn flush(&self) -> Result<(), StatisticsError> {
        self.write(true).await
    }

    async fn write(&self, include_best: bool) -> Result<(), StatisticsError> {
        self.repo
            .set_values(&[
                (StatsKey::GamesCount, self.stats.games_count().to_string()),
                (StatsKey::Correct, self.stats.correct().to_string()),
                (StatsKey::Total, self.stats.total().to_string()),
            ])
            .await?;

        let Some(best) = self.stats.best_game().filter(|_| include_best) else {
            return Ok(());
        };
        let encoded = serde_json::to_string(best)?;
        self.repo
            .set_values(&[(StatsKey::BestGame, encoded)])
            .await?;
        Ok(())
    }
}

async fn read_number<T: FromStr + Default>(
    repo: &dyn StatisticsRepository,
    key: StatsKey,
) -> Result<T, StatisticsError> {
    let Some(raw) = repo.get_value(key).await? else {
        return Ok(T::default());
    };
    Ok(raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(%key, value = %raw, "unreadable persisted counter; using 0");
        T::default()
    }))
}

async fn read_best_game(
    repo: &dyn StatisticsRepository,
) -> Result<Option<GameRecord>, StatisticsError> {
    let Some(raw) = repo.get_value(StatsKey::BestGame).await? else {
        return Ok(None);
    };
    let decoded = serde_json::from_str::<GameRecord>(&raw)
        .map_err(|err| err.to_string())
        .and_then(|record| {
            GameRecord::new(record.correct(), record.total(), record.achieved_at())
                .map_err(|err| err.to_string())
        });
    match decoded {
        Ok(record) => Ok(Some(record)),
        Err(err) => {
            tracing::warn!(%err, "unreadable persisted best game; ignoring it");
            Ok(None)
        }
    }
}
