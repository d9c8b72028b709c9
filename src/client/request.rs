//! Outbound request description

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use std::time::Duration;

/// Everything needed to issue one logical request
///
/// Built once and then only read; the builder methods consume `self`.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: String,
    headers: HeaderMap,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
}

impl RequestDescriptor {
    /// Creates a request with a JSON content type and client defaults
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            method,
            url: url.into(),
            headers,
            timeout: None,
            max_retries: None,
        }
    }

    /// Shorthand for a `GET` request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Sets a header, replacing any previous value for the same name
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Overrides the client's per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the client's total attempt budget
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Headers sent with every attempt
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Per-attempt timeout, if this request overrides the client default
    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    /// Attempt budget, if this request overrides the client default
    pub fn max_retries_override(&self) -> Option<u32> {
        self.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::AUTHORIZATION;

    #[test]
    fn test_get_defaults() {
        let request = RequestDescriptor::get("http://example.test/posts");
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url(), "http://example.test/posts");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert!(request.timeout_override().is_none());
        assert!(request.max_retries_override().is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let request = RequestDescriptor::new(Method::POST, "http://example.test")
            .header(AUTHORIZATION, HeaderValue::from_static("Bearer token"))
            .header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .timeout(Duration::from_millis(250))
            .max_retries(5);

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer token");
        assert_eq!(request.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(request.timeout_override(), Some(Duration::from_millis(250)));
        assert_eq!(request.max_retries_override(), Some(5));
    }
}
