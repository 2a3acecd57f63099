//! URL lifecycle frontier
//!
//! The frontier is the state machine every tracked URL moves through:
//! `todo` (awaiting fetch) -> `doing` (assigned to a worker) -> `done`
//! (terminal success, holding the extracted data) or `trash` (terminal
//! failure). All bookkeeping goes through the shared store, so any number
//! of crawler instances can cooperate on one frontier.
//!
//! Moves between sets are delete-then-insert over independent store calls,
//! never a transaction. A crash between the two steps can leave a URL
//! transiently absent from every set; `recover` is the operator's repair
//! for whatever an aborted run leaves behind.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::store::{Namespace, Store, StoreResult};

/// Per-set key counts, polled for telemetry and the scheduler loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetCounts {
    pub todo: u64,
    pub doing: u64,
    pub done: u64,
    pub trash: u64,
}

/// Four-set URL state machine over a shared keyed store
#[derive(Clone)]
pub struct Frontier {
    store: Arc<dyn Store>,
}

impl Frontier {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Unconditionally inserts `urls` into `todo`.
    ///
    /// This is the seeding path: no membership probe, an already-finished
    /// URL handed in here will be crawled again. Discovered links go through
    /// [`Frontier::add_discovered`] instead.
    pub async fn add_seeds(&self, urls: &[String]) -> StoreResult<()> {
        for url in urls {
            self.store.put(Namespace::Todo, url, "").await?;
        }
        tracing::info!("added {} seed links", urls.len());
        Ok(())
    }

    /// Admits a discovered link into `todo` unless it is already tracked.
    ///
    /// Dedup is global across the whole lifecycle: a URL sitting in `doing`,
    /// `done` or `trash` must never be re-queued, so membership is probed in
    /// all four sets before inserting. Returns whether the URL was admitted.
    pub async fn add_discovered(&self, url: &str) -> StoreResult<bool> {
        for ns in Namespace::LIFECYCLE {
            if self.store.exists(ns, url).await? {
                return Ok(false);
            }
        }
        self.store.put(Namespace::Todo, url, "").await?;
        Ok(true)
    }

    /// Claims up to `n` URLs for one round of workers.
    ///
    /// Keys are drawn uniformly at random rather than scanned in order, to
    /// avoid biasing crawl order and to keep concurrent claimants from
    /// piling onto the same keys. Each draw moves the key from `todo` to
    /// `doing`; losing the delete race to another claimant skips the key.
    /// The returned list may hold fewer than `n` URLs when `todo` empties
    /// mid-claim.
    pub async fn claim_batch(&self, n: usize) -> StoreResult<Vec<String>> {
        let mut claimed = Vec::with_capacity(n);
        for _ in 0..n {
            let Some(url) = self.store.random_key(Namespace::Todo).await? else {
                break;
            };
            if !self.store.delete(Namespace::Todo, &url).await? {
                // another claimant won this key
                continue;
            }
            self.store.put(Namespace::Doing, &url, "").await?;
            claimed.push(url);
        }
        Ok(claimed)
    }

    /// Terminal success: the URL leaves `doing` and lands in `done` carrying
    /// its extracted data (possibly empty).
    pub async fn complete_success(&self, url: &str, extracted: &str) -> StoreResult<()> {
        self.store.delete(Namespace::Doing, url).await?;
        self.store.put(Namespace::Done, url, extracted).await?;
        Ok(())
    }

    /// Terminal failure: the URL is removed from `doing` and `todo` (both
    /// deletes are idempotent) and lands in `trash`.
    pub async fn complete_failure(&self, url: &str) -> StoreResult<()> {
        self.store.delete(Namespace::Doing, url).await?;
        self.store.delete(Namespace::Todo, url).await?;
        self.store.put(Namespace::Trash, url, "").await?;
        Ok(())
    }

    /// Operator repair after abnormal termination: every key in `doing` and
    /// every key in `trash` moves back to `todo`. Never invoked
    /// automatically. Returns how many keys were requeued.
    pub async fn recover(&self) -> StoreResult<usize> {
        let mut moved = 0;
        for ns in [Namespace::Doing, Namespace::Trash] {
            for key in self.store.scan_all(ns).await? {
                tracing::debug!("moving {key} from {ns} back to todo");
                self.store.delete(ns, &key).await?;
                self.store.put(Namespace::Todo, &key, "").await?;
                moved += 1;
            }
        }
        tracing::info!("requeued {moved} urls");
        Ok(moved)
    }

    /// Number of URLs still awaiting fetch.
    pub async fn todo_size(&self) -> StoreResult<u64> {
        self.store.size(Namespace::Todo).await
    }

    /// Key counts for all four sets.
    pub async fn counts(&self) -> StoreResult<SetCounts> {
        Ok(SetCounts {
            todo: self.store.size(Namespace::Todo).await?,
            doing: self.store.size(Namespace::Doing).await?,
            done: self.store.size(Namespace::Done).await?,
            trash: self.store.size(Namespace::Trash).await?,
        })
    }

    /// Every tracked URL across all four sets.
    pub async fn dump(&self) -> StoreResult<Vec<String>> {
        let mut all = Vec::new();
        for ns in Namespace::LIFECYCLE {
            all.extend(self.store.scan_all(ns).await?);
        }
        Ok(all)
    }

    /// URL -> extracted-data pairs for every completed URL.
    pub async fn dump_map(&self) -> StoreResult<BTreeMap<String, String>> {
        let mut map = BTreeMap::new();
        for key in self.store.scan_all(Namespace::Done).await? {
            if let Some(value) = self.store.get(Namespace::Done, &key).await? {
                map.insert(key, value);
            }
        }
        Ok(map)
    }
}
