//! fetchcache - fetch posts through a resilient client and an on-disk TTL cache

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fetchcache::cli::{error_body, execute, Cli};
use fetchcache::config::Config;
use fetchcache::data::PostsService;

/// Sends logs to stderr, off unless `RUST_LOG` is set
///
/// stderr otherwise carries only the JSON error body.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let config = match Config::from_env().with_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    tracing::debug!(
        base_url = %config.base_url,
        cache_dir = %config.cache.dir.display(),
        ttl_secs = config.cache.ttl.as_secs(),
        "starting"
    );

    let service = PostsService::from_config(&config);
    match execute(&service, &cli.command).await {
        Ok(body) => {
            println!("{}", pretty(&body));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", pretty(&error_body(&e)));
            ExitCode::FAILURE
        }
    }
}

fn pretty(body: &serde_json::Value) -> String {
    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
}
