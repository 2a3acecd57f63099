use serde::{Deserialize, Serialize};

/// Per-run crawl settings, shared by every instance
///
/// Persisted as a JSON record in the store's settings namespace; serde
/// field names double as the record format, so renames here are breaking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Site root; also the substring every candidate link must contain
    #[serde(default)]
    pub base_url: String,

    /// Opaque rule spec handed to the extraction backend; empty disables
    /// extraction
    #[serde(default)]
    pub extraction_rules: String,

    /// Links containing any of these substrings are discarded
    #[serde(default)]
    pub keywords_to_exclude: Vec<String>,

    /// When non-empty, links must contain at least one of these substrings
    #[serde(default)]
    pub keywords_to_include: Vec<String>,

    /// Keep `?...` query parts on discovered links
    #[serde(default)]
    pub allow_query_parameters: bool,

    /// Keep `#...` fragments on discovered links
    #[serde(default)]
    pub allow_hash_parameters: bool,

    /// Record pages without following their links
    #[serde(default)]
    pub dont_follow_links: bool,
}

/// Per-instance tuning knobs, never persisted
#[derive(Debug, Clone)]
pub struct CrawlerOptions {
    /// Store host
    pub store_host: String,

    /// Store port
    pub store_port: u16,

    /// Maximum idle connections kept in the HTTP pool
    pub max_connections: usize,

    /// Parallel workers per batch
    pub workers: usize,

    /// Consecutive fetch failures tolerated before the run aborts
    pub max_errors: u32,

    /// Seconds between statistics log lines
    pub stats_interval: u64,

    /// Optional User-Agent header for fetches
    pub user_agent: Option<String>,

    /// Optional SOCKS5 proxy endpoint (host:port) for fetches
    pub proxy: Option<String>,

    /// Wipe all previous crawl state during init
    pub erase_store: bool,
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self {
            store_host: "localhost".to_string(),
            store_port: 6379,
            max_connections: 20,
            workers: 8,
            max_errors: 20,
            stats_interval: 1,
            user_agent: None,
            proxy: None,
            erase_store: false,
        }
    }
}
