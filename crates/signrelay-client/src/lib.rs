//! Signrelay Client - the watcher/uploader
//!
//! Monitors a watch directory for new signable files, waits for each file
//! to settle, uploads it to the sign endpoint with bounded retries, and
//! publishes the signed result atomically into the output directory.

pub mod error;
pub mod uploader;
pub mod watcher;

pub use error::{ClientError, Result};
pub use uploader::{SignedArtifact, UploadOutcome, Uploader};
pub use watcher::{PendingFile, Watcher};
