//! Core library for bomcache.
//!
//! - `models`: `Bom` / `Item` records and their default factories
//! - `cache`: named cache buckets (in memory or on disk)
//! - `net`: requests, responses and the network fetcher
//! - `worker`: the offline worker lifecycle and the host driving it
//! - `config`: user configuration

pub mod cache;
pub mod config;
pub mod models;
pub mod net;
pub mod worker;

#[cfg(test)]
mod test_support;

pub use cache::{CacheBucket, CacheError, CacheStorage, CachedData, DiskCacheStorage, MemoryCacheStorage};
pub use config::Config;
pub use models::{default_bom, default_item, BaseModel, Bom, Item};
pub use net::{Fetcher, HttpFetcher, NetworkError, Request, RequestMode, Response};
pub use worker::{OfflineWorker, ServiceHost, WorkerError};
