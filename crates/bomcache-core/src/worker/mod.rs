//! Offline worker: pre-caches static assets and serves an offline page.
//!
//! The worker reacts to three host events:
//!
//! - **install**: fetch every asset of the manifest and store them in the
//!   current bucket, all or nothing, then ask the host to skip waiting
//! - **activate**: delete every bucket except the current one, then claim
//!   open clients
//! - **fetch**: for navigation requests only, go to the network and fall back
//!   to the cached offline page when the network is unreachable
//!
//! `ServiceHost` plays the host side: it tracks the lifecycle state, orders
//! the events and performs the default fetch for requests the worker lets
//! through.

pub mod assets;
pub mod error;
pub mod host;
pub mod lifecycle;

pub use assets::{AssetManifest, CACHE_NAME, FILES_TO_CACHE, OFFLINE_PAGE, VERSION};
pub use error::WorkerError;
pub use host::{ClientControl, EventKind, EventOutcome, HostControl, LifecycleEvent, ServiceHost, WorkerState};
pub use lifecycle::{ActivationReport, FetchOutcome, OfflineWorker, ResponseSource};
