//! Fetcher capability and its reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{NetworkError, Request, Response};

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Performs live network fetches.
///
/// Implementations return `Err` only when no response was received at all.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for std::sync::Arc<F> {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        (**self).fetch(request).await
    }
}

/// Fetcher backed by a shared reqwest client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, NetworkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| NetworkError::InvalidUrl(format!("{}: {}", request.url, e)))?;

        debug!(url = %url, mode = %request.mode, "Fetching from network");
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(Response {
            url: final_url,
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_http_fetcher_rejects_relative_url() {
        let fetcher = HttpFetcher::new().expect("build client");
        let err = fetcher
            .fetch(&Request::get("/offline.html"))
            .await
            .expect_err("relative URL must fail");
        assert!(matches!(err, NetworkError::InvalidUrl(_)));
    }
}
