//! Error types for the watcher/uploader

use std::path::PathBuf;
use thiserror::Error;

use signrelay_core::RelayError;

/// Result type alias using ClientError
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised while watching, uploading, or publishing
#[derive(Debug, Error)]
pub enum ClientError {
    /// The sign endpoint answered with a non-success status
    #[error("server rejected upload: HTTP {status}: {body}")]
    ServerRejected { status: u16, body: String },

    /// Transport-level HTTP failure (connect, timeout, body read)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A watch-directory path had no usable UTF-8 filename
    #[error("unusable path in watch directory: {0}")]
    UnusablePath(PathBuf),

    /// Shared relay errors (atomic publish, digests)
    #[error(transparent)]
    Core(#[from] RelayError),

    /// IO errors (stat/read of watched files, directory scans)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
