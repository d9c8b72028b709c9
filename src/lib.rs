//! fetchcache library
//!
//! A resilient REST fetch client and a TTL-keyed on-disk cache, plus the posts
//! service and CLI built on top of them.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod data;
pub mod error;

pub use cache::CacheManager;
pub use client::{RequestDescriptor, ResilientClient};
pub use config::Config;
pub use error::{ErrorKind, FetchError, NetworkError};
