//! Link discovery pipeline
//!
//! Turns a fetched page body into candidate URLs: raw hrefs come out of the
//! markup, then pass through a fixed sequence of deterministic filter steps
//! (parameter stripping, base-URL resolution, same-site scoping,
//! canonicalization, keyword gates). Candidates may repeat within a page;
//! global dedup happens when the frontier admits them.

mod filter;
mod parser;

pub use filter::{candidates, canonicalize};
pub use parser::collect_hrefs;
