use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::NetworkError;

/// Fetch capability shared by the catalog loader and the poster loader.
#[async_trait]
pub trait NetworkRouting: Send + Sync {
    /// `GET` the resource and return its body.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` on transport failure or a non-2xx status.
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, NetworkError>;
}

/// `reqwest`-backed fetcher.
#[derive(Clone, Default)]
pub struct NetworkClient {
    client: Client,
}

impl NetworkClient {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl NetworkRouting for NetworkClient {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, NetworkError> {
        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            return Err(NetworkError::HttpStatus(response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
