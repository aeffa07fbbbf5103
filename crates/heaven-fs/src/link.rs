//! Symlink capability used by link folder management.
//!
//! The engine only ever touches the filesystem through [`LinkFs`], so the
//! same logic runs against the real disk ([`OsLinkFs`]) or an in-memory fake.

use std::fs;

use crate::{Error, NormalizedPath, Result};

/// What occupies a path, judged without following symlinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

/// Minimal filesystem surface needed to maintain a link folder.
pub trait LinkFs {
    /// Kind of the entry at `path`, or `None` if nothing is there.
    /// Never follows a final symlink.
    fn kind(&self, path: &NormalizedPath) -> Result<Option<EntryKind>>;

    /// Names of the direct children of `dir`, sorted.
    fn list(&self, dir: &NormalizedPath) -> Result<Vec<String>>;

    /// Create `dir` and any missing parents.
    fn create_dir(&self, dir: &NormalizedPath) -> Result<()>;

    /// Create a symlink at `link` pointing to `target`. The target may be missing.
    fn create_symlink(&self, target: &NormalizedPath, link: &NormalizedPath) -> Result<()>;

    /// Where the symlink at `link` points.
    fn read_link(&self, link: &NormalizedPath) -> Result<NormalizedPath>;

    /// Remove the symlink at `link` without touching its target.
    fn remove_symlink(&self, link: &NormalizedPath) -> Result<()>;

    /// Remove `dir` recursively. Symlinks inside are unlinked, never followed.
    fn remove_dir_all(&self, dir: &NormalizedPath) -> Result<()>;
}

/// [`LinkFs`] backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsLinkFs;

impl OsLinkFs {
    pub fn new() -> Self {
        Self
    }
}

impl LinkFs for OsLinkFs {
    fn kind(&self, path: &NormalizedPath) -> Result<Option<EntryKind>> {
        let native = path.to_native();
        match fs::symlink_metadata(&native) {
            Ok(meta) => {
                let file_type = meta.file_type();
                let kind = if file_type.is_symlink() {
                    EntryKind::Symlink
                } else if file_type.is_dir() {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                };
                Ok(Some(kind))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(native, e)),
        }
    }

    fn list(&self, dir: &NormalizedPath) -> Result<Vec<String>> {
        let native = dir.to_native();
        let entries = fs::read_dir(&native).map_err(|e| Error::io(&native, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&native, e))?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn create_dir(&self, dir: &NormalizedPath) -> Result<()> {
        let native = dir.to_native();
        fs::create_dir_all(&native).map_err(|e| Error::io(native, e))
    }

    fn create_symlink(&self, target: &NormalizedPath, link: &NormalizedPath) -> Result<()> {
        let link_native = link.to_native();
        create_symlink_native(&target.to_native(), &link_native)
            .map_err(|e| Error::io(&link_native, e))?;
        tracing::debug!(link = %link, target = %target, "created symlink");
        Ok(())
    }

    fn read_link(&self, link: &NormalizedPath) -> Result<NormalizedPath> {
        let native = link.to_native();
        fs::read_link(&native)
            .map(NormalizedPath::new)
            .map_err(|e| Error::io(native, e))
    }

    fn remove_symlink(&self, link: &NormalizedPath) -> Result<()> {
        let native = link.to_native();
        remove_symlink_native(&native).map_err(|e| Error::io(&native, e))?;
        tracing::debug!(link = %link, "removed symlink");
        Ok(())
    }

    fn remove_dir_all(&self, dir: &NormalizedPath) -> Result<()> {
        let native = dir.to_native();
        fs::remove_dir_all(&native).map_err(|e| Error::io(&native, e))?;
        tracing::debug!(dir = %dir, "removed directory");
        Ok(())
    }
}

#[cfg(unix)]
fn create_symlink_native(target: &std::path::Path, link: &std::path::Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_symlink_native(target: &std::path::Path, link: &std::path::Path) -> std::io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}

#[cfg(unix)]
fn remove_symlink_native(link: &std::path::Path) -> std::io::Result<()> {
    fs::remove_file(link)
}

// Directory symlinks on windows are removed like directories
#[cfg(windows)]
fn remove_symlink_native(link: &std::path::Path) -> std::io::Result<()> {
    fs::remove_file(link).or_else(|_| fs::remove_dir(link))
}
