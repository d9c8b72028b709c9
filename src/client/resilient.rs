//! HTTP client with per-attempt timeouts and retries

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::request::RequestDescriptor;
use super::retry::{retry_with_backoff, RetryPolicy};
use crate::config::ClientConfig;
use crate::error::{FetchError, NetworkError};

/// Client that fetches JSON from a REST API and rides out transient failures
///
/// Each attempt is bounded by the request's timeout (or the configured
/// default). Timeouts fail the call immediately; network failures and
/// non-success statuses are retried with exponential backoff.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Defaults applied when a request does not override them
    config: ClientConfig,
}

impl ResilientClient {
    /// Creates a client with its own connection pool
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http_client(Client::new(), config)
    }

    /// Creates a client on top of an existing `reqwest::Client`
    pub fn with_http_client(http_client: Client, config: ClientConfig) -> Self {
        Self {
            http_client,
            config,
        }
    }

    /// Defaults applied to requests without overrides
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// `GET`s `url` with default settings and returns the parsed JSON body
    pub async fn get(&self, url: &str) -> Result<Value, FetchError> {
        self.fetch(&RequestDescriptor::get(url)).await
    }

    /// Issues `request` and returns the parsed JSON body
    pub async fn fetch(&self, request: &RequestDescriptor) -> Result<Value, FetchError> {
        self.fetch_json(request).await
    }

    /// Issues `request` and deserializes the body into `T`
    ///
    /// A body that does not parse is reported as a network failure and is not
    /// retried.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
    ) -> Result<T, FetchError> {
        let body = self.fetch_body(request).await?;
        serde_json::from_slice(&body).map_err(|e| {
            NetworkError::Decode {
                url: request.url().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Runs the retry loop and returns the raw body of the first success
    async fn fetch_body(&self, request: &RequestDescriptor) -> Result<Vec<u8>, FetchError> {
        let timeout = request.timeout_override().unwrap_or(self.config.timeout);
        let policy = RetryPolicy::new(
            request
                .max_retries_override()
                .unwrap_or(self.config.max_retries),
            self.config.backoff_base,
        );

        retry_with_backoff(&policy, |attempt| self.attempt(request, timeout, attempt)).await
    }

    /// A single bounded attempt
    async fn attempt(
        &self,
        request: &RequestDescriptor,
        timeout: Duration,
        attempt: u32,
    ) -> Result<Vec<u8>, FetchError> {
        debug!(
            method = %request.method(),
            url = request.url(),
            attempt = attempt + 1,
            "sending request"
        );

        let exchange = async {
            let response = self
                .http_client
                .request(request.method().clone(), request.url())
                .headers(request.headers().clone())
                .send()
                .await
                .map_err(|e| classify_transport(e, request.url(), timeout))?;

            let status = response.status();
            // The reason is the canonical phrase for the code; a custom phrase
            // sent by the upstream is not carried through
            if !status.is_success() {
                return Err(FetchError::Network(NetworkError::Status {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or_default().to_string(),
                }));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| classify_transport(e, request.url(), timeout))?;
            Ok::<_, FetchError>(body.to_vec())
        };

        // Dropping the exchange on elapse cancels the in-flight request
        match tokio::time::timeout(timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: request.url().to_string(),
                after: timeout,
            }),
        }
    }
}

/// Maps a `reqwest` error to a fetch failure
fn classify_transport(error: reqwest::Error, url: &str, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            after: timeout,
        }
    } else {
        FetchError::Network(NetworkError::Transport(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_config() {
        let config = ClientConfig {
            timeout: Duration::from_millis(1234),
            max_retries: 7,
            backoff_base: Duration::from_millis(10),
        };
        let client = ResilientClient::new(config.clone());
        assert_eq!(client.config(), &config);
    }

    #[tokio::test]
    async fn test_invalid_url_is_a_network_failure() {
        let config = ClientConfig {
            max_retries: 1,
            ..ClientConfig::default()
        };
        let client = ResilientClient::new(config);

        let err = client.get("not a url").await.unwrap_err();

        assert_eq!(err.kind(), crate::error::ErrorKind::Network);
    }
}
