//! Scuttle: a cooperative web-crawl orchestrator
//!
//! This crate coordinates any number of crawler instances through a shared
//! keyed store. Every tracked URL lives in exactly one of four lifecycle
//! sets (todo, doing, done, trash), so concurrent workers never process a
//! page twice, and an interrupted run is repaired by an explicit recover
//! operation rather than any automatic magic.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod frontier;
pub mod pipeline;
pub mod stats;
pub mod store;

use thiserror::Error;

/// Main error type for scuttle operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] store::StoreError),

    #[error("Extraction failed for {url}: {source}")]
    Extraction {
        url: String,
        source: extract::ExtractError,
    },

    #[error("Too many errors: {count} consecutive fetch failures")]
    TooManyErrors { count: u32 },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(
        "No settings stored. Persist them first, e.g.\n\n\tscuttle set --url http://www.example.com\n"
    )]
    MissingSettings,
}

/// Result type alias for scuttle operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{CrawlerOptions, Settings};
pub use crawler::{Crawler, RunState};
pub use frontier::{Frontier, SetCounts};
pub use store::{MemoryStore, Namespace, RedisStore, Store};
