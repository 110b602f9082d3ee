use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to delete cache bucket {name}: {reason}")]
    DeleteFailed { name: String, reason: String },

    #[error("Cache bucket not found: {0}")]
    BucketNotFound(String),
}
