#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod network;
pub mod quiz;
pub mod statistics_service;

#[cfg(test)]
mod testing;

pub use quiz_core::Clock;

pub use catalog::{CatalogConfig, MoviesLoader, MoviesLoading};
pub use error::{CatalogError, LoadFailure, NetworkError, QuestionFactoryError, StatisticsError};
pub use network::{NetworkClient, NetworkRouting};
pub use statistics_service::StatisticService;

pub use quiz::{
    AlertModel, FactoryEvent, QuestionFactory, QuizPhase, QuizPresenter, QuizView,
    RecoveryAction, SelectionPolicy,
};
