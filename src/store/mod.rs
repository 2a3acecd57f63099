//! Keyed-store client
//!
//! The crawl state lives in an external keyed store reached over the Redis
//! protocol: four independent namespaces hold the URL lifecycle sets and a
//! fifth holds the shared settings record. This module defines the store
//! trait every component talks to, plus the two backends: the networked
//! Redis client and an in-process map used by tests and single-instance
//! runs.

mod memory;
mod redis;
mod traits;

pub use self::redis::RedisStore;
pub use memory::MemoryStore;
pub use traits::{Namespace, Store, StoreError, StoreResult};
