//! Error types for the blockout pipeline

use thiserror::Error;

/// Fatal error type. Anything that aborts a whole scene build lands here;
/// per-object problems are collected in a [`crate::scene::BuildReport`] instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Backend error: {0}")]
    Backend(String),
}
