//! In-memory store backend
//!
//! A map per namespace behind the same [`Store`] contract as the networked
//! client. Used by the test suite and useful for single-instance runs where
//! crawl state does not need to outlive the process.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::store::{Namespace, Store, StoreResult};

/// In-process store backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    maps: [RwLock<HashMap<String, String>>; 5],
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, ns: Namespace) -> &RwLock<HashMap<String, String>> {
        &self.maps[ns.db_index() as usize]
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put(&self, ns: Namespace, key: &str, value: &str) -> StoreResult<()> {
        self.map(ns)
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, ns: Namespace, key: &str) -> StoreResult<Option<String>> {
        Ok(self.map(ns).read().unwrap().get(key).cloned())
    }

    async fn delete(&self, ns: Namespace, key: &str) -> StoreResult<bool> {
        Ok(self.map(ns).write().unwrap().remove(key).is_some())
    }

    async fn exists(&self, ns: Namespace, key: &str) -> StoreResult<bool> {
        Ok(self.map(ns).read().unwrap().contains_key(key))
    }

    async fn random_key(&self, ns: Namespace) -> StoreResult<Option<String>> {
        let map = self.map(ns).read().unwrap();
        if map.is_empty() {
            return Ok(None);
        }
        let idx = fastrand::usize(..map.len());
        Ok(map.keys().nth(idx).cloned())
    }

    async fn scan_all(&self, ns: Namespace) -> StoreResult<Vec<String>> {
        Ok(self.map(ns).read().unwrap().keys().cloned().collect())
    }

    async fn size(&self, ns: Namespace) -> StoreResult<u64> {
        Ok(self.map(ns).read().unwrap().len() as u64)
    }

    async fn flush_all(&self) -> StoreResult<()> {
        for map in &self.maps {
            map.write().unwrap().clear();
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        store
            .put(Namespace::Todo, "http://example.com/", "")
            .await
            .unwrap();

        assert!(store.exists(Namespace::Todo, "http://example.com/").await.unwrap());
        assert_eq!(
            store.get(Namespace::Todo, "http://example.com/").await.unwrap(),
            Some(String::new())
        );

        assert!(store.delete(Namespace::Todo, "http://example.com/").await.unwrap());
        // second delete reports the key as already gone
        assert!(!store.delete(Namespace::Todo, "http://example.com/").await.unwrap());
    }

    #[tokio::test]
    async fn test_namespaces_are_independent() {
        let store = MemoryStore::new();
        store.put(Namespace::Todo, "key", "a").await.unwrap();
        store.put(Namespace::Done, "key", "b").await.unwrap();

        assert_eq!(store.get(Namespace::Todo, "key").await.unwrap(), Some("a".into()));
        assert_eq!(store.get(Namespace::Done, "key").await.unwrap(), Some("b".into()));
        assert!(!store.exists(Namespace::Doing, "key").await.unwrap());
    }

    #[tokio::test]
    async fn test_random_key_empty_and_nonempty() {
        let store = MemoryStore::new();
        assert_eq!(store.random_key(Namespace::Todo).await.unwrap(), None);

        store.put(Namespace::Todo, "only", "").await.unwrap();
        assert_eq!(
            store.random_key(Namespace::Todo).await.unwrap(),
            Some("only".to_string())
        );
    }

    #[tokio::test]
    async fn test_size_and_scan() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .put(Namespace::Trash, &format!("url-{i}"), "")
                .await
                .unwrap();
        }

        assert_eq!(store.size(Namespace::Trash).await.unwrap(), 5);
        let mut keys = store.scan_all(Namespace::Trash).await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["url-0", "url-1", "url-2", "url-3", "url-4"]);
    }

    #[tokio::test]
    async fn test_flush_all_wipes_every_namespace() {
        let store = MemoryStore::new();
        store.put(Namespace::Todo, "a", "").await.unwrap();
        store.put(Namespace::Settings, "settings", "{}").await.unwrap();

        store.flush_all().await.unwrap();

        assert_eq!(store.size(Namespace::Todo).await.unwrap(), 0);
        assert_eq!(store.size(Namespace::Settings).await.unwrap(), 0);
    }
}
