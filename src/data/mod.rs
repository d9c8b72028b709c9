//! Core data models for the posts API
//!
//! This module contains the upstream resource shapes, their validation, the
//! endpoint table, and the service that combines the fetch client with the
//! response cache.

pub mod endpoints;
pub mod posts;
pub mod validation;

pub use endpoints::Endpoints;
pub use posts::{PostsService, ServiceError};
pub use validation::{validate_post, validate_posts, validate_user, PostQuery};

use serde::{Deserialize, Serialize};

/// A post as served by the upstream API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Id of the user who wrote the post
    pub user_id: u64,
    /// Unique post id
    pub id: u64,
    pub title: String,
    pub body: String,
}

/// A user as served by the upstream API
///
/// Only the fields the posts service needs are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Author details embedded in a single-post response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub username: Option<String>,
}

impl From<User> for Author {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            username: user.username,
        }
    }
}

/// A post together with its author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: Author,
}

/// One page of filtered posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostPage {
    /// Number of posts in `data`
    pub count: usize,
    pub data: Vec<Post>,
}

impl From<Vec<Post>> for PostPage {
    fn from(data: Vec<Post>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}
