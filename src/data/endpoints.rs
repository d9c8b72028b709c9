//! Upstream endpoint table

use crate::config::DEFAULT_BASE_URL;

/// Builds resource URLs against a base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    /// Creates an endpoint table; a trailing slash on `base_url` is ignored
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// All posts
    pub fn posts(&self) -> String {
        format!("{}/posts", self.base_url)
    }

    /// A single post
    pub fn post(&self, id: u64) -> String {
        format!("{}/posts/{}", self.base_url, id)
    }

    /// A single user
    pub fn user(&self, id: u64) -> String {
        format!("{}/users/{}", self.base_url, id)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}
