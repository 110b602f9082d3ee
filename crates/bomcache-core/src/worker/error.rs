use thiserror::Error;

use super::host::WorkerState;
use crate::cache::CacheError;
use crate::net::NetworkError;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to fetch {url} while installing: {source}")]
    Install {
        url: String,
        #[source]
        source: NetworkError,
    },

    #[error("Bad response for {url} while installing: status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Failed to remove {} stale cache bucket(s)", .failed.len())]
    Activation {
        removed: Vec<String>,
        failed: Vec<(String, CacheError)>,
    },

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Invalid worker state: expected {expected}, got {actual}")]
    InvalidState {
        expected: WorkerState,
        actual: WorkerState,
    },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}
