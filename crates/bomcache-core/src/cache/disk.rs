//! Cache storage persisted under a directory.
//!
//! Layout:
//!
//! ```text
//! <root>/index.json                  bucket names in creation order
//! <root>/<hash(bucket)>/<hash(url)>.json  entry metadata + cached_at
//! <root>/<hash(bucket)>/<hash(url)>.body  entry payload
//! ```
//!
//! File names are blake3 digests, so any bucket name or URL maps to a short,
//! valid file name. The full URL lives in the entry metadata.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use super::storage::{cache_key, CacheBucket, CacheStorage, CachedData};
use super::CacheError;
use crate::net::Response;

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryMeta {
    url: String,
    status: u16,
    #[serde(default)]
    headers: Vec<(String, String)>,
}

fn file_stem(name: &str) -> String {
    blake3::hash(name.as_bytes()).to_hex().to_string()
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CacheError> {
    if !fs::try_exists(path).await? {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).await?;
    Ok(Some(serde_json::from_str(&contents)?))
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CacheError> {
    let contents = serde_json::to_string_pretty(value)?;
    fs::write(path, contents).await?;
    Ok(())
}

#[derive(Clone)]
pub struct DiskCacheStorage {
    root: PathBuf,
    // Serializes read-modify-write of the index
    index_lock: Arc<Mutex<()>>,
}

impl DiskCacheStorage {
    pub fn new(root: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            index_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn bucket_dir(&self, name: &str) -> PathBuf {
        self.root.join(file_stem(name))
    }

    async fn load_index(&self) -> Result<Vec<String>, CacheError> {
        Ok(read_json(&self.index_path()).await?.unwrap_or_default())
    }

    async fn save_index(&self, names: &[String]) -> Result<(), CacheError> {
        write_json(&self.index_path(), &names).await
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    type Bucket = DiskBucket;

    async fn open(&self, name: &str) -> Result<DiskBucket, CacheError> {
        let _guard = self.index_lock.lock().await;
        let mut names = self.load_index().await?;
        let dir = self.bucket_dir(name);
        fs::create_dir_all(&dir).await?;
        if !names.iter().any(|n| n == name) {
            debug!(bucket = name, "Creating cache bucket");
            names.push(name.to_string());
            self.save_index(&names).await?;
        }
        Ok(DiskBucket {
            name: name.to_string(),
            dir,
        })
    }

    async fn has(&self, name: &str) -> Result<bool, CacheError> {
        let _guard = self.index_lock.lock().await;
        Ok(self.load_index().await?.iter().any(|n| n == name))
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let _guard = self.index_lock.lock().await;
        self.load_index().await
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let _guard = self.index_lock.lock().await;
        let mut names = self.load_index().await?;
        let Some(pos) = names.iter().position(|n| n == name) else {
            return Ok(false);
        };

        let dir = self.bucket_dir(name);
        if fs::try_exists(&dir).await? {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| CacheError::DeleteFailed {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?;
        }
        names.remove(pos);
        self.save_index(&names).await?;
        debug!(bucket = name, "Deleted cache bucket");
        Ok(true)
    }
}

/// Handle to one bucket directory.
///
/// Once the bucket is deleted from its storage, reads through the handle find
/// nothing and writes fail with `BucketNotFound`.
pub struct DiskBucket {
    name: String,
    dir: PathBuf,
}

impl DiskBucket {
    fn meta_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }

    fn body_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.body", file_stem(key)))
    }

    async fn ensure_exists(&self) -> Result<(), CacheError> {
        if fs::try_exists(&self.dir).await? {
            Ok(())
        } else {
            Err(CacheError::BucketNotFound(self.name.clone()))
        }
    }

    async fn write_entry(&self, key: &str, response: &Response) -> Result<(), CacheError> {
        let meta = CachedData::new(EntryMeta {
            url: key.to_string(),
            status: response.status,
            headers: response.headers.clone(),
        });
        fs::write(self.body_path(key), &response.body).await?;
        write_json(&self.meta_path(key), &meta).await
    }

    async fn entries(&self) -> Result<Vec<CachedData<EntryMeta>>, CacheError> {
        if !fs::try_exists(&self.dir).await? {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        let mut dir = fs::read_dir(&self.dir).await?;
        while let Some(dir_entry) = dir.next_entry().await? {
            let path = dir_entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(meta) = read_json::<CachedData<EntryMeta>>(&path).await? {
                entries.push(meta);
            }
        }
        entries.sort_by(|a, b| a.cached_at.cmp(&b.cached_at).then_with(|| a.data.url.cmp(&b.data.url)));
        Ok(entries)
    }
}

#[async_trait]
impl CacheBucket for DiskBucket {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_url(&self, url: &str) -> Result<Option<CachedData<Response>>, CacheError> {
        let key = cache_key(url);
        let Some(meta) = read_json::<CachedData<EntryMeta>>(&self.meta_path(key)).await? else {
            return Ok(None);
        };
        let body = fs::read(self.body_path(key)).await?;
        Ok(Some(CachedData {
            data: Response {
                url: meta.data.url,
                status: meta.data.status,
                headers: meta.data.headers,
                body,
            },
            cached_at: meta.cached_at,
        }))
    }

    async fn put(&self, url: &str, response: Response) -> Result<(), CacheError> {
        self.ensure_exists().await?;
        self.write_entry(cache_key(url), &response).await
    }

    async fn put_all(&self, batch: Vec<(String, Response)>) -> Result<(), CacheError> {
        self.ensure_exists().await?;
        for (url, response) in &batch {
            self.write_entry(cache_key(url), response).await?;
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(self.entries().await?.into_iter().map(|e| e.data.url).collect())
    }

    async fn delete(&self, url: &str) -> Result<bool, CacheError> {
        let key = cache_key(url);
        let meta = self.meta_path(key);
        if !fs::try_exists(&meta).await? {
            return Ok(false);
        }
        fs::remove_file(meta).await?;
        let body = self.body_path(key);
        if fs::try_exists(&body).await? {
            fs::remove_file(body).await?;
        }
        Ok(true)
    }
}
