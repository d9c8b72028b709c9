//! Shape checks for upstream payloads and caller queries
//!
//! All failures are reported as [`FetchError::Validation`], which is never
//! retried.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Post, PostPage, User};
use crate::error::FetchError;

/// Posts returned when the caller does not ask for a limit
pub const DEFAULT_LIMIT: usize = 20;

/// Largest limit a caller may ask for
pub const MAX_LIMIT: usize = 100;

const POST_FIELDS: &[&str] = &["id", "userId", "title", "body"];
const USER_FIELDS: &[&str] = &["id", "name", "email"];

/// Checks that `value` is a post and converts it
pub fn validate_post(value: &Value) -> Result<Post, FetchError> {
    validate_object(value, "post", POST_FIELDS)
}

/// Checks that `value` is a list of posts and converts it
pub fn validate_posts(value: &Value) -> Result<Vec<Post>, FetchError> {
    let items = value
        .as_array()
        .ok_or_else(|| FetchError::validation("Expected a list of posts"))?;
    items.iter().map(validate_post).collect()
}

/// Checks that `value` is a user and converts it
pub fn validate_user(value: &Value) -> Result<User, FetchError> {
    validate_object(value, "user", USER_FIELDS)
}

fn validate_object<T: DeserializeOwned>(
    value: &Value,
    what: &str,
    required: &[&str],
) -> Result<T, FetchError> {
    let object = value
        .as_object()
        .ok_or_else(|| FetchError::validation(format!("Invalid {} object", what)))?;

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|field| !object.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        return Err(FetchError::validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    serde_json::from_value(value.clone())
        .map_err(|e| FetchError::validation(format!("Invalid {} object: {}", what, e)))
}

/// Filters applied to the cached post list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// Only posts by this user
    pub user_id: Option<u64>,
    /// Maximum number of posts returned
    pub limit: usize,
    /// Case-insensitive substring of the title or body
    pub search: Option<String>,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            limit: DEFAULT_LIMIT,
            search: None,
        }
    }
}

impl PostQuery {
    /// Parses raw query values
    ///
    /// Empty values are treated as absent. `user_id` must be a positive
    /// integer and `limit` an integer between 1 and 100.
    pub fn parse(
        user_id: Option<&str>,
        limit: Option<&str>,
        search: Option<&str>,
    ) -> Result<Self, FetchError> {
        let mut query = Self::default();

        if let Some(raw) = non_empty(user_id) {
            query.user_id = Some(
                raw.parse::<u64>()
                    .ok()
                    .filter(|id| *id >= 1)
                    .ok_or_else(|| FetchError::validation("userId must be a positive integer"))?,
            );
        }

        if let Some(raw) = non_empty(limit) {
            query.limit = raw
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_LIMIT).contains(n))
                .ok_or_else(|| FetchError::validation("limit must be between 1 and 100"))?;
        }

        query.search = non_empty(search).map(str::to_string);

        Ok(query)
    }

    /// Whether `post` passes the user and search filters
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(user_id) = self.user_id {
            if post.user_id != user_id {
                return false;
            }
        }
        match &self.search {
            Some(search) => {
                let needle = search.to_lowercase();
                post.title.to_lowercase().contains(&needle)
                    || post.body.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }

    /// Filters `posts` and truncates the result to the limit
    pub fn apply(&self, posts: Vec<Post>) -> PostPage {
        posts
            .into_iter()
            .filter(|post| self.matches(post))
            .take(self.limit)
            .collect::<Vec<_>>()
            .into()
    }
}

/// Trims a raw value and drops it when nothing is left
fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}
