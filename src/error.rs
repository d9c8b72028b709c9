//! Error taxonomy shared by the fetch client and its callers
//!
//! Every failure the client can raise falls into one of three kinds. The kind
//! decides whether the retry loop tries again and which gateway status a
//! caller should answer with.

use std::time::Duration;
use thiserror::Error;

/// Discriminant for [`FetchError`], used for branch-by-kind dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-side malformed input or upstream data of the wrong shape
    Validation,
    /// The per-attempt time bound elapsed
    Timeout,
    /// Transport failure or non-success upstream status
    Network,
}

/// Errors raised by the resilient client
#[derive(Debug, Error)]
pub enum FetchError {
    /// Input or payload failed validation; never retried
    #[error("{0}")]
    Validation(String),

    /// The attempt did not complete within its time bound; never retried
    #[error("Request timeout after {}ms", .after.as_millis())]
    Timeout {
        /// URL of the request that timed out
        url: String,
        /// The bound that elapsed
        after: Duration,
    },

    /// Transport or upstream failure; retried until the budget runs out
    #[error(transparent)]
    Network(#[from] NetworkError),
}

/// The different ways a request can fail at the network level
#[derive(Debug, Error)]
pub enum NetworkError {
    /// DNS, connect, reset or any other transport-level failure
    #[error("Network request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("HTTP {status}: {reason}")]
    Status {
        /// Numeric status code
        status: u16,
        /// Canonical reason phrase, empty when unknown
        reason: String,
    },

    /// Response body could not be read or parsed as JSON
    #[error("Failed to fetch from {url}: {message}")]
    Decode {
        /// URL the body came from
        url: String,
        /// Underlying parser or read error
        message: String,
    },
}

impl FetchError {
    /// Builds a validation failure from any message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Network(_) => ErrorKind::Network,
        }
    }

    /// Whether the retry loop should try again after this error
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// Upstream status code, if the failure came from a non-success response
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Network(NetworkError::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Status code a gateway should answer with for this failure
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::Timeout => 504,
            ErrorKind::Network => 502,
        }
    }

    /// Short title matching [`status_code`](Self::status_code)
    pub fn title(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "Validation Error",
            ErrorKind::Timeout => "Gateway Timeout",
            ErrorKind::Network => "Bad Gateway",
        }
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Validation => self.to_string(),
            ErrorKind::Timeout => {
                "The external API request timed out. Please try again.".to_string()
            }
            ErrorKind::Network => {
                "Failed to fetch data from external API. Please try again later.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16) -> FetchError {
        FetchError::Network(NetworkError::Status {
            status,
            reason: "Service Unavailable".to_string(),
        })
    }

    #[test]
    fn test_kind_discriminant() {
        assert_eq!(FetchError::validation("bad").kind(), ErrorKind::Validation);
        let timeout = FetchError::Timeout {
            url: "http://example.test".to_string(),
            after: Duration::from_millis(10),
        };
        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(status_error(503).kind(), ErrorKind::Network);
    }

    #[test]
    fn test_only_network_failures_are_retryable() {
        assert!(status_error(500).is_retryable());
        assert!(!FetchError::validation("bad").is_retryable());
        let timeout = FetchError::Timeout {
            url: String::new(),
            after: Duration::from_secs(1),
        };
        assert!(!timeout.is_retryable());
    }

    #[test]
    fn test_gateway_status_mapping() {
        assert_eq!(FetchError::validation("x").status_code(), 400);
        let timeout = FetchError::Timeout {
            url: String::new(),
            after: Duration::from_secs(1),
        };
        assert_eq!(timeout.status_code(), 504);
        assert_eq!(timeout.title(), "Gateway Timeout");
        assert_eq!(status_error(404).status_code(), 502);
        assert_eq!(status_error(404).title(), "Bad Gateway");
    }

    #[test]
    fn test_display_carries_status_and_reason() {
        assert_eq!(status_error(503).to_string(), "HTTP 503: Service Unavailable");
        assert_eq!(status_error(503).upstream_status(), Some(503));
        assert_eq!(FetchError::validation("x").upstream_status(), None);
    }

    #[test]
    fn test_timeout_display_in_millis() {
        let timeout = FetchError::Timeout {
            url: String::new(),
            after: Duration::from_millis(2500),
        };
        assert_eq!(timeout.to_string(), "Request timeout after 2500ms");
    }
}
