//! Error types for the follower ingestion pipeline
//!
//! Network, decode, record and database errors end only the page, record or
//! candidate that raised them. `Config` errors stop start-up.

use scgraph_common::GraphError;
use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Connection failure, timeout, or non-success HTTP status
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    /// Response body was not JSON or did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Record(#[from] GraphError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),
}

impl IngestError {
    pub fn network(msg: impl Into<String>) -> Self {
        Self::TransientNetwork(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<reqwest::Error> for IngestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::TransientNetwork(err.to_string())
        }
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
