// ============================================================
// tweet-classifier — entry point
// ============================================================
// Fine-tunes a transformer to separate disaster tweets from the
// rest and reports test-set metrics.
//
//   tweet-classifier train    [--data-path train.csv ...]
//   tweet-classifier classify --text "Forest fire near La Ronge"
//
// Log level: RUST_LOG when set, `tweet_classifier=info` otherwise.

#![recursion_limit = "256"]

mod application;
mod cli;
mod data;
mod domain;
mod infra;
mod ml;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;

const DEFAULT_LOG: &str = "tweet_classifier=info";

/// RUST_LOG directives if present, the crate-level default otherwise.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    match rust_log.map(str::trim) {
        Some(directives) if !directives.is_empty() => EnvFilter::new(directives),
        _ => EnvFilter::new(DEFAULT_LOG),
    }
}

fn main() -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_target(false)
        .init();

    Cli::parse().run()
}
