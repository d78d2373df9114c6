use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::Catalog;
use url::Url;

use crate::error::CatalogError;
use crate::network::NetworkRouting;

const DEFAULT_BASE_URL: &str = "https://imdb-api.com/en/API";

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub base_url: String,
    pub api_key: String,
}

impl CatalogConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
        }
    }

    /// Reads `MOVIEQUIZ_API_KEY` and `MOVIEQUIZ_CATALOG_URL`.
    ///
    /// Returns `None` when no usable API key is set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("MOVIEQUIZ_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("MOVIEQUIZ_CATALOG_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Some(Self {
            base_url,
            api_key: api_key.trim().to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Endpoint serving the top-rated movie list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidUrl` if the base URL does not parse.
    pub fn catalog_url(&self) -> Result<Url, CatalogError> {
        let url = format!(
            "{}/Top250Movies/{}",
            self.base_url.trim_end_matches('/'),
            self.api_key
        );
        Ok(Url::parse(&url)?)
    }
}

/// Source of the movie catalog.
#[async_trait]
pub trait MoviesLoading: Send + Sync {
    /// Fetch and decode the catalog. Single attempt, never cached.
    ///
    /// A provider-level error message does not fail the call; it is returned
    /// inside the `Catalog` (see `Catalog::provider_error`).
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on transport failure, non-2xx status or malformed JSON.
    async fn load_movies(&self) -> Result<Catalog, CatalogError>;
}

/// Loads the catalog over an injected `NetworkRouting`.
#[derive(Clone)]
pub struct MoviesLoader {
    network: Arc<dyn NetworkRouting>,
    config: CatalogConfig,
}

impl MoviesLoader {
    #[must_use]
    pub fn new(network: Arc<dyn NetworkRouting>, config: CatalogConfig) -> Self {
        Self { network, config }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }
}

#[async_trait]
impl MoviesLoading for MoviesLoader {
    async fn load_movies(&self) -> Result<Catalog, CatalogError> {
        let url = self.config.catalog_url()?;
        let body = self.network.fetch(&url).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use crate::testing::{StubNetworkClient, catalog_json};

    fn loader(network: StubNetworkClient) -> MoviesLoader {
        MoviesLoader::new(Arc::new(network), CatalogConfig::new("k_test"))
    }

    #[test]
    fn catalog_url_joins_base_and_key() {
        let config = CatalogConfig::new("k_123").with_base_url("https://example.com/api/");
        assert_eq!(
            config.catalog_url().unwrap().as_str(),
            "https://example.com/api/Top250Movies/k_123"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = CatalogConfig::new("k_123").with_base_url("not a url");
        assert!(matches!(
            config.catalog_url(),
            Err(CatalogError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn successful_load_decodes_items() {
        let network = StubNetworkClient::with_catalog(catalog_json("", &[("7.2", "a"), ("6.5", "b")]));
        let loader = loader(network.clone());

        let catalog = loader.load_movies().await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.provider_error(), None);
        assert_eq!(network.catalog_requests(), 1);
        assert_eq!(
            network.requested_urls()[0].as_str(),
            "https://imdb-api.com/en/API/Top250Movies/k_test"
        );
    }

    #[tokio::test]
    async fn every_load_refetches() {
        let network = StubNetworkClient::with_catalog(catalog_json("", &[("7.2", "a")]));
        let loader = loader(network.clone());
        loader.load_movies().await.unwrap();
        loader.load_movies().await.unwrap();
        assert_eq!(network.catalog_requests(), 2);
    }

    #[tokio::test]
    async fn provider_error_is_returned_alongside_items() {
        let network =
            StubNetworkClient::with_catalog(catalog_json("Invalid API Key", &[("8.0", "a")]));
        let catalog = loader(network).load_movies().await.unwrap();
        assert_eq!(catalog.provider_error(), Some("Invalid API Key"));
        assert_eq!(catalog.len(), 1);
    }

    #[tokio::test]
    async fn failing_status_is_a_transport_error() {
        let network = StubNetworkClient::with_catalog_status(500);
        let err = loader(network).load_movies().await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Transport(NetworkError::HttpStatus(status)) if status.as_u16() == 500
        ));
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let network = StubNetworkClient::with_catalog(b"<html>not json</html>".to_vec());
        let err = loader(network).load_movies().await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode(_)));
    }
}
