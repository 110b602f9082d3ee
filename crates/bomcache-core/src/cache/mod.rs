//! Named cache buckets for offline assets.
//!
//! This module provides the storage capability the offline worker writes its
//! pre-cached assets to. A storage holds any number of named buckets; each
//! bucket maps request URLs (without fragment) to the response captured for
//! them, stamped with the time it was cached.
//!
//! Implementations:
//! - `MemoryCacheStorage`: process-local, shared between clones
//! - `DiskCacheStorage`: one directory per bucket under a cache root

pub mod disk;
pub mod error;
pub mod memory;
pub mod storage;

pub use disk::{DiskBucket, DiskCacheStorage};
pub use error::CacheError;
pub use memory::{MemoryBucket, MemoryCacheStorage};
pub use storage::{cache_key, CacheBucket, CacheStorage, CachedData};
