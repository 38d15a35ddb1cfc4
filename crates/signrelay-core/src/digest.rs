//! SHA-256 content digests
//!
//! Files are streamed through an incremental hasher in fixed-size chunks
//! so large binaries never have to fit in memory twice. The chunked digest
//! is identical to a one-shot digest of the same bytes.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::error::Result;

/// Chunk size for streaming file digests
const CHUNK_SIZE: usize = 1024 * 1024;

/// Compute the hex-encoded SHA-256 digest of a file
pub async fn sha256_file(path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the hex-encoded SHA-256 digest of an in-memory buffer
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}
