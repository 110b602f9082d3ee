use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CacheError;
use crate::net::Response;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / 1440)
        }
    }
}

/// Key an entry is stored under: the URL without its fragment.
pub fn cache_key(url: &str) -> &str {
    match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    }
}

/// Collection of named buckets.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    type Bucket: CacheBucket;

    /// Open the bucket called `name`, creating it if it does not exist.
    async fn open(&self, name: &str) -> Result<Self::Bucket, CacheError>;

    async fn has(&self, name: &str) -> Result<bool, CacheError>;

    /// Bucket names in creation order.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Remove a bucket and everything in it. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;
}

/// A single named bucket of URL-keyed responses.
#[async_trait]
pub trait CacheBucket: Send + Sync {
    fn name(&self) -> &str;

    async fn match_url(&self, url: &str) -> Result<Option<CachedData<Response>>, CacheError>;

    async fn put(&self, url: &str, response: Response) -> Result<(), CacheError>;

    /// Store several entries as one batch.
    async fn put_all(&self, entries: Vec<(String, Response)>) -> Result<(), CacheError>;

    /// Entry URLs in insertion order.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    async fn delete(&self, url: &str) -> Result<bool, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_cached_data_age_display_just_now() {
        let cached = CachedData::new(vec![1, 2, 3]);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cached_data_age_display_units() {
        let mut cached = CachedData::new(());
        cached.cached_at = Utc::now() - Duration::minutes(5);
        assert_eq!(cached.age_display(), "5m ago");

        cached.cached_at = Utc::now() - Duration::minutes(130);
        assert_eq!(cached.age_display(), "2h ago");

        cached.cached_at = Utc::now() - Duration::days(3);
        assert_eq!(cached.age_display(), "3d ago");

        cached.cached_at = Utc::now() + Duration::minutes(10);
        assert_eq!(cached.age_display(), "just now");
    }

    #[test]
    fn test_cache_key_strips_fragment() {
        assert_eq!(cache_key("https://a.test/index.html#top"), "https://a.test/index.html");
        assert_eq!(cache_key("https://a.test/?q=1"), "https://a.test/?q=1");
    }
}
