use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GameRecordError {
    #[error("correct answers ({correct}) exceed questions asked ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AggregateStatsError {
    #[error("lifetime correct ({correct}) exceeds lifetime total ({total})")]
    CorrectExceedsTotal { correct: u64, total: u64 },
}

/// Result of a single finished round.
///
/// Serialized as `{"correct": .., "total": .., "date": "<RFC 3339>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    correct: u32,
    total: u32,
    #[serde(rename = "date")]
    achieved_at: DateTime<Utc>,
}

impl GameRecord {
    /// # Errors
    ///
    /// Returns `GameRecordError::CorrectExceedsTotal` if `correct > total`.
    pub fn new(
        correct: u32,
        total: u32,
        achieved_at: DateTime<Utc>,
    ) -> Result<Self, GameRecordError> {
        if correct > total {
            return Err(GameRecordError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self {
            correct,
            total,
            achieved_at,
        })
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn achieved_at(&self) -> DateTime<Utc> {
        self.achieved_at
    }

    /// Ordering used for the all-time best: strictly more correct answers wins.
    #[must_use]
    pub fn is_better_than(&self, other: &GameRecord) -> bool {
        self.correct > other.correct
    }
}

/// Lifetime statistics across all finished rounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateStats {
    games_count: u32,
    correct: u64,
    total: u64,
    best_game: Option<GameRecord>,
}

impl AggregateStats {
    /// Rehydrate stats from persisted counters.
    ///
    /// # Errors
    ///
    /// Returns `AggregateStatsError::CorrectExceedsTotal` if the counters are inconsistent.
    pub fn from_persisted(
        games_count: u32,
        correct: u64,
        total: u64,
        best_game: Option<GameRecord>,
    ) -> Result<Self, AggregateStatsError> {
        if correct > total {
            return Err(AggregateStatsError::CorrectExceedsTotal { correct, total });
        }
        Ok(Self {
            games_count,
            correct,
            total,
            best_game,
        })
    }

    #[must_use]
    pub fn games_count(&self) -> u32 {
        self.games_count
    }

    #[must_use]
    pub fn correct(&self) -> u64 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub fn best_game(&self) -> Option<&GameRecord> {
        self.best_game.as_ref()
    }

    /// Percentage of correct answers over all rounds; `0.0` before the first round.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn total_accuracy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }

    /// Fold a finished round into the counters.
    ///
    /// Counters move together; the best game is replaced only by a strictly
    /// better record. Returns `true` when `game` became the new best.
    pub fn record(&mut self, game: GameRecord) -> bool {
        self.games_count = self.games_count.saturating_add(1);
        self.correct = self.correct.saturating_add(u64::from(game.correct));
        self.total = self.total.saturating_add(u64::from(game.total));

        let replace = self
            .best_game
            .as_ref()
            .is_none_or(|best| game.is_better_than(best));
        if replace {
            self.best_game = Some(game);
        }
        replace
    }
}
