use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Network error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unreachable: {0}")]
    Unreachable(String),
}
