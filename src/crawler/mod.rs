//! Crawl execution
//!
//! This module contains the run machinery: the coordinator that claims
//! batches and joins worker rounds, the shared HTTP fetch primitive, and
//! the consecutive-failure circuit breaker all workers feed.

mod breaker;
mod coordinator;
mod fetcher;

pub use breaker::CircuitBreaker;
pub use coordinator::{Crawler, RunState};
pub use fetcher::{build_http_client, fetch_url, FetchOutcome};
