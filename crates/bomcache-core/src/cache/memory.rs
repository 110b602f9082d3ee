//! In-process cache storage.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::storage::{cache_key, CacheBucket, CacheStorage, CachedData};
use super::CacheError;
use crate::net::Response;

type Entries = Arc<RwLock<Vec<(String, CachedData<Response>)>>>;

/// Cache storage held in memory.
/// Clones share the same buckets, so a clone is a handle to the same store.
#[derive(Clone, Default)]
pub struct MemoryCacheStorage {
    buckets: Arc<RwLock<Vec<(String, Entries)>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    type Bucket = MemoryBucket;

    async fn open(&self, name: &str) -> Result<MemoryBucket, CacheError> {
        let mut buckets = self.buckets.write().await;
        let entries = match buckets.iter().find(|(n, _)| n == name) {
            Some((_, entries)) => entries.clone(),
            None => {
                let entries = Entries::default();
                buckets.push((name.to_string(), entries.clone()));
                entries
            }
        };
        Ok(MemoryBucket {
            name: name.to_string(),
            entries,
        })
    }

    async fn has(&self, name: &str) -> Result<bool, CacheError> {
        Ok(self.buckets.read().await.iter().any(|(n, _)| n == name))
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self
            .buckets
            .read()
            .await
            .iter()
            .map(|(n, _)| n.clone())
            .collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|(n, _)| n != name);
        Ok(buckets.len() != before)
    }
}

/// Handle to one in-memory bucket.
///
/// A handle stays usable after its bucket is deleted from the storage, but
/// writes through it are no longer visible to new `open` calls.
#[derive(Clone)]
pub struct MemoryBucket {
    name: String,
    entries: Entries,
}

fn upsert(entries: &mut Vec<(String, CachedData<Response>)>, key: &str, response: Response) {
    let cached = CachedData::new(response);
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some((_, existing)) => *existing = cached,
        None => entries.push((key.to_string(), cached)),
    }
}

#[async_trait]
impl CacheBucket for MemoryBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_url(&self, url: &str) -> Result<Option<CachedData<Response>>, CacheError> {
        let key = cache_key(url);
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, cached)| cached.clone()))
    }

    async fn put(&self, url: &str, response: Response) -> Result<(), CacheError> {
        upsert(&mut *self.entries.write().await, cache_key(url), response);
        Ok(())
    }

    async fn put_all(&self, batch: Vec<(String, Response)>) -> Result<(), CacheError> {
        let mut entries = self.entries.write().await;
        for (url, response) in batch {
            upsert(&mut entries, cache_key(&url), response);
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn delete(&self, url: &str) -> Result<bool, CacheError> {
        let key = cache_key(url);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(k, _)| k != key);
        Ok(entries.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_bucket_once() {
        let storage = MemoryCacheStorage::new();
        assert!(!storage.has("static-cache-v1").await.unwrap());

        storage.open("static-cache-v1").await.unwrap();
        storage.open("static-cache-v1").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["static-cache-v1"]);
    }

    #[tokio::test]
    async fn test_clones_share_buckets() {
        let storage = MemoryCacheStorage::new();
        let other = storage.clone();

        let bucket = storage.open("a").await.unwrap();
        bucket
            .put("https://a.test/index.html", Response::new("https://a.test/index.html", 200, "home"))
            .await
            .unwrap();

        let same = other.open("a").await.unwrap();
        let hit = same
            .match_url("https://a.test/index.html#main")
            .await
            .unwrap()
            .expect("entry visible through clone");
        assert_eq!(hit.data.text(), "home");
    }

    #[tokio::test]
    async fn test_put_replaces_existing_entry() {
        let storage = MemoryCacheStorage::new();
        let bucket = storage.open("a").await.unwrap();
        bucket.put("/x", Response::new("/x", 200, "one")).await.unwrap();
        bucket.put("/x", Response::new("/x", 200, "two")).await.unwrap();

        assert_eq!(bucket.keys().await.unwrap(), vec!["/x"]);
        let hit = bucket.match_url("/x").await.unwrap().unwrap();
        assert_eq!(hit.data.text(), "two");
    }

    #[tokio::test]
    async fn test_delete_bucket_and_entry() {
        let storage = MemoryCacheStorage::new();
        let bucket = storage.open("old").await.unwrap();
        bucket
            .put_all(vec![
                ("/a".to_string(), Response::new("/a", 200, "a")),
                ("/b".to_string(), Response::new("/b", 200, "b")),
            ])
            .await
            .unwrap();

        assert!(bucket.delete("/a").await.unwrap());
        assert!(!bucket.delete("/a").await.unwrap());
        assert_eq!(bucket.keys().await.unwrap(), vec!["/b"]);

        assert!(storage.delete("old").await.unwrap());
        assert!(!storage.delete("old").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());

        // Reopening gives a fresh, empty bucket
        let reopened = storage.open("old").await.unwrap();
        assert!(reopened.keys().await.unwrap().is_empty());
    }
}
