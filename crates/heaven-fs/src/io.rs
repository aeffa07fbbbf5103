//! Atomic I/O operations with file locking

use std::fs;
use std::io::Write;

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::{Error, NormalizedPath, Result};

/// Write content atomically to a file with locking.
///
/// The content goes to a temp file next to `path` that is renamed over it
/// once synced. The temp file is held under an exclusive advisory lock while
/// written, and is deleted if any step before the rename fails.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();
    let parent = match native_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| Error::io(&parent, e))?;

    // Same directory keeps the rename on one filesystem
    let mut temp_file = NamedTempFile::new_in(&parent).map_err(|e| Error::io(&parent, e))?;
    let temp_path = temp_file.path().to_path_buf();

    temp_file
        .as_file()
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;
    temp_file
        .write_all(content)
        .and_then(|()| temp_file.as_file().sync_all())
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file
        .as_file()
        .unlock()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    // On failure the returned NamedTempFile is dropped, removing the temp file
    temp_file
        .persist(&native_path)
        .map_err(|e| Error::io(&native_path, e.error))?;

    tracing::debug!(path = %path, bytes = content.len(), "wrote file");
    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read raw bytes, returning `None` when the file does not exist.
///
/// For content whose encoding is validated by its own parser.
pub fn read_bytes_opt(path: &NormalizedPath) -> Result<Option<Vec<u8>>> {
    let native_path = path.to_native();
    match fs::read(&native_path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(&native_path, e)),
    }
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
