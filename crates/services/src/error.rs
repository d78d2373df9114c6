//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;

/// Errors emitted by `NetworkRouting` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum NetworkError {
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by `MoviesLoading` implementations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("invalid catalog url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error(transparent)]
    Transport(#[from] NetworkError),
    #[error("malformed catalog payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors emitted by `QuestionFactory`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionFactoryError {
    #[error("no movies available for a question")]
    EmptyCatalog,
}

/// Errors emitted while persisting statistics.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StatisticsError {
    #[error("failed to encode best game: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Why questions cannot be served right now, in a form the player can read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LoadFailure {
    #[error("could not reach the movie catalog: {0}")]
    Transport(String),
    #[error("the movie catalog could not be read: {0}")]
    Decode(String),
    #[error("{0}")]
    Provider(String),
    #[error("no movies available for a question")]
    EmptyCatalog,
}

impl From<CatalogError> for LoadFailure {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Decode(err) => LoadFailure::Decode(err.to_string()),
            other => LoadFailure::Transport(other.to_string()),
        }
    }
}

impl From<QuestionFactoryError> for LoadFailure {
    fn from(err: QuestionFactoryError) -> Self {
        match err {
            QuestionFactoryError::EmptyCatalog => LoadFailure::EmptyCatalog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_maps_to_transport_failure() {
        let err = CatalogError::from(NetworkError::HttpStatus(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        ));
        let failure = LoadFailure::from(err);
        assert!(matches!(failure, LoadFailure::Transport(ref msg) if msg.contains("500")));
    }

    #[test]
    fn malformed_json_maps_to_decode_failure() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let failure = LoadFailure::from(CatalogError::from(json_err));
        assert!(matches!(failure, LoadFailure::Decode(_)));
    }

    #[test]
    fn provider_message_is_shown_verbatim() {
        let failure = LoadFailure::Provider("Invalid API Key".into());
        assert_eq!(failure.to_string(), "Invalid API Key");
        assert_eq!(
            LoadFailure::from(QuestionFactoryError::EmptyCatalog),
            LoadFailure::EmptyCatalog
        );
    }
}
