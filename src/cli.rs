//! Command-line interface for fetchcache
//!
//! Parses arguments with clap, layers flag overrides on top of the
//! environment-derived configuration, and renders results as JSON bodies.

use clap::{Parser, Subcommand};
use reqwest::Url;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::data::posts::parse_post_id;
use crate::data::{PostQuery, PostsService, ServiceError};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The base URL could not be parsed
    #[error("Invalid base URL: '{0}'")]
    InvalidBaseUrl(String),
}

/// fetchcache - fetch posts through a resilient client and a TTL cache
#[derive(Parser, Debug)]
#[command(name = "fetchcache")]
#[command(about = "Fetch posts from a REST API with retries and an on-disk TTL cache")]
#[command(version)]
pub struct Cli {
    /// Upstream API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Directory for cached responses
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Per-attempt request timeout in milliseconds (overrides API_TIMEOUT_MS)
    #[arg(long, global = true, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: Option<u64>,

    /// Cache time-to-live in minutes (overrides CACHE_TTL_MINUTES)
    #[arg(long, global = true, value_name = "MINUTES", value_parser = clap::value_parser!(u64).range(1..))]
    pub ttl_minutes: Option<u64>,

    /// Total attempts per request, including the first
    #[arg(long, global = true, value_name = "N")]
    pub max_retries: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations exposed by the CLI
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List posts, optionally filtered
    Posts {
        /// Only posts by this user id
        #[arg(long)]
        user_id: Option<String>,
        /// Maximum number of posts (1-100, default 20)
        #[arg(long)]
        limit: Option<String>,
        /// Case-insensitive text to look for in title or body
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a single post with its author
    Post {
        /// Post id
        id: String,
    },
    /// Delete every cached response
    ClearCache,
}

impl Config {
    /// Applies CLI flag overrides on top of `self`
    ///
    /// # Returns
    /// * `Ok(Config)` with flags applied
    /// * `Err(CliError)` if the base URL is not a valid URL
    pub fn with_cli(mut self, cli: &Cli) -> Result<Self, CliError> {
        if let Some(base_url) = &cli.base_url {
            Url::parse(base_url).map_err(|_| CliError::InvalidBaseUrl(base_url.clone()))?;
            self.base_url = base_url.clone();
        }
        if let Some(dir) = &cli.cache_dir {
            self.cache.dir = dir.clone();
        }
        if let Some(ms) = cli.timeout_ms {
            self.client.timeout = Duration::from_millis(ms);
        }
        if let Some(minutes) = cli.ttl_minutes {
            self.cache.ttl = Duration::from_secs(minutes.saturating_mul(60));
        }
        if let Some(max_retries) = cli.max_retries {
            self.client.max_retries = max_retries;
        }
        Ok(self)
    }
}

/// Runs `command` and returns the success body
pub async fn execute(service: &PostsService, command: &Command) -> Result<Value, ServiceError> {
    match command {
        Command::Posts {
            user_id,
            limit,
            search,
        } => {
            let query =
                PostQuery::parse(user_id.as_deref(), limit.as_deref(), search.as_deref())?;
            let page = service.list_posts(&query).await?;
            Ok(json!({
                "success": true,
                "count": page.count,
                "data": page.data,
            }))
        }
        Command::Post { id } => {
            let post = service.get_post(parse_post_id(id)?).await?;
            Ok(json!({
                "success": true,
                "data": post,
            }))
        }
        Command::ClearCache => {
            let count = service.clear_cache().await;
            Ok(json!({
                "success": true,
                "message": format!("Cleared {} cache files", count),
                "count": count,
            }))
        }
    }
}

/// Renders a failure the way a gateway would answer it
pub fn error_body(error: &ServiceError) -> Value {
    json!({
        "success": false,
        "status": error.status_code(),
        "error": error.title(),
        "message": error.user_message(),
    })
}
