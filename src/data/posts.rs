//! Posts service: cache-first reads backed by the resilient client
//!
//! Looks up the cache first; on a miss fetches from upstream, validates the
//! payload, stores it, and only then applies the caller's filters.

use thiserror::Error;

use super::endpoints::Endpoints;
use super::validation::{validate_post, validate_posts, validate_user, PostQuery};
use super::{Post, PostPage, PostWithAuthor};
use crate::cache::{CacheManager, Params};
use crate::client::ResilientClient;
use crate::config::Config;
use crate::error::FetchError;

/// Cache resource holding the full, unfiltered post list
const POSTS_RESOURCE: &str = "posts";

/// Errors surfaced by the posts service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The fetch failed or the payload was invalid
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The requested post does not exist
    #[error("{0}")]
    NotFound(String),
}

impl ServiceError {
    /// Status code a gateway should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Fetch(e) => e.status_code(),
            Self::NotFound(_) => 404,
        }
    }

    /// Short title matching [`status_code`](Self::status_code)
    pub fn title(&self) -> &'static str {
        match self {
            Self::Fetch(e) => e.title(),
            Self::NotFound(_) => "Not Found",
        }
    }

    /// Message suitable for showing to an end user
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(e) => e.user_message(),
            Self::NotFound(message) => message.clone(),
        }
    }
}

/// Parses a post id the way a route parameter would be
///
/// Anything that is not a positive integer is reported as not found.
pub fn parse_post_id(raw: &str) -> Result<u64, ServiceError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(|| ServiceError::NotFound("Invalid post ID".to_string()))
}

/// Serves posts from cache when fresh, from upstream otherwise
#[derive(Debug, Clone)]
pub struct PostsService {
    client: ResilientClient,
    cache: CacheManager,
    endpoints: Endpoints,
}

impl PostsService {
    /// Creates a service from its parts
    pub fn new(client: ResilientClient, cache: CacheManager, endpoints: Endpoints) -> Self {
        Self {
            client,
            cache,
            endpoints,
        }
    }

    /// Creates a service with components built from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ResilientClient::new(config.client.clone()),
            CacheManager::new(&config.cache),
            Endpoints::new(config.base_url.clone()),
        )
    }

    /// Cache backing this service
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Lists posts matching `query`
    ///
    /// The full list is cached once; filters run locally on every call.
    pub async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, ServiceError> {
        let cached: Option<Vec<Post>> = self.cache.get(POSTS_RESOURCE, Params::new()).await;

        let posts = match cached {
            Some(posts) => posts,
            None => {
                let raw = self.client.get(&self.endpoints.posts()).await?;
                let posts = validate_posts(&raw)?;
                self.cache.set(POSTS_RESOURCE, Params::new(), &posts).await;
                posts
            }
        };

        Ok(query.apply(posts))
    }

    /// Fetches a single post together with its author
    ///
    /// An upstream 404 for either the post or its author is reported as
    /// [`ServiceError::NotFound`].
    pub async fn get_post(&self, id: u64) -> Result<PostWithAuthor, ServiceError> {
        if id == 0 {
            return Err(ServiceError::NotFound("Invalid post ID".to_string()));
        }

        let resource = format!("post_{}", id);
        let cached: Option<PostWithAuthor> = self.cache.get(&resource, Params::new()).await;
        if let Some(found) = cached {
            return Ok(found);
        }

        let combined = self.fetch_post_with_author(id).await.map_err(|e| {
            if e.upstream_status() == Some(404) {
                ServiceError::NotFound("Post not found".to_string())
            } else {
                ServiceError::Fetch(e)
            }
        })?;

        self.cache.set(&resource, Params::new(), &combined).await;
        Ok(combined)
    }

    /// Deletes every cached response and returns how many were removed
    pub async fn clear_cache(&self) -> usize {
        self.cache.clear_all().await
    }

    async fn fetch_post_with_author(&self, id: u64) -> Result<PostWithAuthor, FetchError> {
        let post = validate_post(&self.client.get(&self.endpoints.post(id)).await?)?;
        let user = validate_user(&self.client.get(&self.endpoints.user(post.user_id)).await?)?;

        Ok(PostWithAuthor {
            post,
            author: user.into(),
        })
    }
}
