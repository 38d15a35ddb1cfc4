//! Atomic filesystem operations
//!
//! Signed artifacts are published with write-temp-then-rename so an
//! observer of the destination path sees either nothing, the previous
//! content, or the complete new content. The staging file lives in the
//! destination's directory to keep the rename on one filesystem.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{RelayError, Result};

/// Create a directory and its parents if they do not exist
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Atomically publish `data` at `dest` via a temp file and rename
pub fn atomic_write_bytes(dest: &Path, data: &[u8]) -> Result<()> {
    let dir = parent_dir(dest)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(dest).map_err(|e| RelayError::Io(e.error))?;
    debug!(dest = %dest.display(), bytes = data.len(), "published file atomically");
    Ok(())
}

/// Atomically copy `src` to `dest` via a temp file and rename
pub fn atomic_copy(src: &Path, dest: &Path) -> Result<()> {
    let dir = parent_dir(dest)?;
    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    std::fs::copy(src, tmp.path())?;
    tmp.persist(dest).map_err(|e| RelayError::Io(e.error))?;
    debug!(src = %src.display(), dest = %dest.display(), "copied file atomically");
    Ok(())
}

fn parent_dir(dest: &Path) -> Result<&Path> {
    let dir = dest.parent().ok_or_else(|| {
        RelayError::other(format!("destination has no parent directory: {}", dest.display()))
    })?;
    Ok(if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    })
}
