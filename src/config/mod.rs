//! Crawl settings and instance options
//!
//! Two kinds of configuration live here. [`Settings`] is the per-run record
//! shared by every cooperating instance; it is persisted in the store so
//! all instances crawl with identical rules. [`CrawlerOptions`] are
//! per-instance tuning knobs that never leave the process.

mod parser;
mod types;

pub use parser::{load_settings, validate_settings};
pub use types::{CrawlerOptions, Settings};
