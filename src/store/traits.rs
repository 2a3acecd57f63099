//! Store trait and error types
//!
//! This module defines the trait interface for store backends and the
//! namespace layout shared by all of them.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// The keyed namespaces the crawler uses
///
/// The four lifecycle namespaces hold URL keys; `Settings` holds the single
/// persisted settings record shared by every cooperating instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// URLs awaiting fetch (empty values)
    Todo,
    /// URLs currently assigned to a worker (empty values)
    Doing,
    /// Terminal success; values hold the extracted-data JSON
    Done,
    /// Terminal failure (empty values)
    Trash,
    /// The persisted settings record
    Settings,
}

impl Namespace {
    /// The four URL lifecycle namespaces, in dump order.
    pub const LIFECYCLE: [Namespace; 4] = [
        Namespace::Todo,
        Namespace::Doing,
        Namespace::Done,
        Namespace::Trash,
    ];

    /// Logical database index used by the Redis backend.
    pub fn db_index(self) -> u8 {
        match self {
            Self::Todo => 0,
            Self::Doing => 1,
            Self::Done => 2,
            Self::Trash => 3,
            Self::Settings => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Trash => "trash",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cannot reach store at {addr}: {message}")]
    Connect { addr: String, message: String },

    #[error("Store unavailable after {attempts} attempts: {message}")]
    Unavailable { attempts: u32, message: String },

    #[error("Store protocol error: {0}")]
    Protocol(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for store backend implementations
///
/// Every call is an independent request; there is no cross-call transaction,
/// so multi-step moves between namespaces are not atomic. Backends retry
/// transient network failures a bounded number of times and surface
/// [`StoreError::Unavailable`] once retries are exhausted; callers treat
/// that as fatal.
#[async_trait]
pub trait Store: Send + Sync {
    /// Sets `key` to `value` in the namespace.
    async fn put(&self, ns: Namespace, key: &str, value: &str) -> StoreResult<()>;

    /// Gets the value stored under `key`, or `None` when absent.
    async fn get(&self, ns: Namespace, key: &str) -> StoreResult<Option<String>>;

    /// Removes `key`, reporting whether it was present.
    ///
    /// A `false` return means some other claimant already removed the key;
    /// callers racing on the same key treat that as a benign no-op.
    async fn delete(&self, ns: Namespace, key: &str) -> StoreResult<bool>;

    /// Returns whether `key` is present in the namespace.
    async fn exists(&self, ns: Namespace, key: &str) -> StoreResult<bool>;

    /// Draws one key uniformly at random, or `None` when the namespace is
    /// empty.
    async fn random_key(&self, ns: Namespace) -> StoreResult<Option<String>>;

    /// Enumerates every key in the namespace.
    ///
    /// The scan is cursor-based on the networked backend, so the result is a
    /// near-snapshot: keys inserted or removed mid-scan may or may not
    /// appear.
    async fn scan_all(&self, ns: Namespace) -> StoreResult<Vec<String>>;

    /// Number of keys in the namespace.
    async fn size(&self, ns: Namespace) -> StoreResult<u64>;

    /// Wipes every namespace, the settings record included.
    async fn flush_all(&self) -> StoreResult<()>;

    /// Verifies the store is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_indices_are_distinct() {
        let mut seen = std::collections::HashSet::new();
        for ns in [
            Namespace::Todo,
            Namespace::Doing,
            Namespace::Done,
            Namespace::Trash,
            Namespace::Settings,
        ] {
            assert!(seen.insert(ns.db_index()), "duplicate index for {ns}");
        }
    }

    #[test]
    fn test_lifecycle_excludes_settings() {
        assert_eq!(Namespace::LIFECYCLE.len(), 4);
        assert!(!Namespace::LIFECYCLE.contains(&Namespace::Settings));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Namespace::Todo), "todo");
        assert_eq!(format!("{}", Namespace::Trash), "trash");
    }
}
