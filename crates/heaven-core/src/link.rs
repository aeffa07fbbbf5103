//! Link folder management
//!
//! The link folder lives at `<root>/<link_folder_name>` and holds exactly one
//! symlink per included item, named like the item and pointing at
//! `<root>/<item>`. Its content is derived, so anything that is a symlink in
//! there may be replaced or deleted. Anything that is not a symlink is user
//! content and is never touched.

use std::collections::BTreeSet;
use std::fmt;

use heaven_fs::{EntryKind, LinkFs, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Non-fatal conditions noticed while maintaining a link folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// The item a link points at does not exist; the link is dangling
    MissingLinkTarget { name: String, target: String },
    /// A non-symlink entry in the link folder that no item claims
    UnmanagedEntry { path: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLinkTarget { name, target } => {
                write!(f, "link '{name}' points at missing item {target}")
            }
            Self::UnmanagedEntry { path } => {
                write!(f, "unmanaged entry left in link folder: {path}")
            }
        }
    }
}

/// Changes needed (or made) to bring a link folder in line with an
/// included set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkChanges {
    /// Absolute path of the link folder
    pub folder: NormalizedPath,
    /// Whether the folder itself has to be created
    pub create_folder: bool,
    /// Names that get a new symlink
    pub created: Vec<String>,
    /// Names whose symlink points elsewhere and is replaced
    pub relinked: Vec<String>,
    /// Stale symlinks removed because their name is no longer included
    pub removed: Vec<String>,
    /// Names present in the folder before any change
    pub existing: BTreeSet<String>,
    pub warnings: Vec<Warning>,
}

impl LinkChanges {
    fn new(folder: NormalizedPath) -> Self {
        Self {
            folder,
            create_folder: false,
            created: Vec::new(),
            relinked: Vec::new(),
            removed: Vec::new(),
            existing: BTreeSet::new(),
            warnings: Vec::new(),
        }
    }

    /// Whether applying these changes would leave the disk as it is.
    pub fn is_noop(&self) -> bool {
        !self.create_folder
            && self.created.is_empty()
            && self.relinked.is_empty()
            && self.removed.is_empty()
    }
}

/// Validates a name used as a single path segment under a package root.
pub fn validate_segment(name: &str, what: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(Error::invalid_argument(format!(
            "{what} '{name}' must be a single path segment"
        )));
    }
    Ok(())
}

/// Maintains link folders through a [`LinkFs`].
#[derive(Debug)]
pub struct LinkFolderManager<'a, F: LinkFs> {
    fs: &'a F,
}

impl<'a, F: LinkFs> LinkFolderManager<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Work out what [`ensure_linked`](Self::ensure_linked) would do, without
    /// touching anything.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for a folder or item name that is not a
    ///   single path segment, or an item named like the folder itself
    /// - [`Error::ManagedFolderCorrupted`] if the folder path is not a
    ///   directory, or a non-symlink sits where a link must go
    pub fn plan(
        &self,
        root: &NormalizedPath,
        link_folder_name: &str,
        included: &BTreeSet<String>,
    ) -> Result<LinkChanges> {
        validate_segment(link_folder_name, "link folder name")?;
        for name in included {
            validate_segment(name, "item name")?;
            if name == link_folder_name {
                return Err(Error::invalid_argument(format!(
                    "item '{name}' collides with the link folder name"
                )));
            }
        }

        let folder = root.join(link_folder_name);
        let mut changes = LinkChanges::new(folder.clone());

        let existing: BTreeSet<String> = match self.fs.kind(&folder)? {
            None => {
                changes.create_folder = true;
                BTreeSet::new()
            }
            Some(EntryKind::Dir) => self.fs.list(&folder)?.into_iter().collect(),
            Some(_) => {
                return Err(Error::corrupted(
                    folder.to_native(),
                    "link folder path is occupied by something that is not a directory",
                ));
            }
        };

        for name in existing.difference(included) {
            let entry = folder.join(name);
            match self.fs.kind(&entry)? {
                Some(EntryKind::Symlink) => changes.removed.push(name.clone()),
                Some(_) => changes.warnings.push(Warning::UnmanagedEntry {
                    path: entry.as_str().to_string(),
                }),
                None => {}
            }
        }

        for name in included {
            let link = folder.join(name);
            let target = root.join(name);

            if existing.contains(name) {
                match self.fs.kind(&link)? {
                    Some(EntryKind::Symlink) => {
                        if self.fs.read_link(&link)? != target {
                            changes.relinked.push(name.clone());
                        }
                    }
                    Some(_) => {
                        return Err(Error::corrupted(
                            link.to_native(),
                            format!("unmanaged entry occupies the link for '{name}'"),
                        ));
                    }
                    None => changes.created.push(name.clone()),
                }
            } else {
                changes.created.push(name.clone());
            }

            if self.fs.kind(&target)?.is_none() {
                changes.warnings.push(Warning::MissingLinkTarget {
                    name: name.clone(),
                    target: target.as_str().to_string(),
                });
            }
        }

        changes.existing = existing;
        Ok(changes)
    }

    /// Perform a plan produced by [`plan`](Self::plan) for the same root.
    pub fn apply(&self, root: &NormalizedPath, changes: &LinkChanges) -> Result<()> {
        if changes.create_folder {
            self.fs.create_dir(&changes.folder)?;
            tracing::debug!(folder = %changes.folder, "created link folder");
        }

        for name in &changes.removed {
            self.fs.remove_symlink(&changes.folder.join(name))?;
        }

        for name in &changes.relinked {
            let link = changes.folder.join(name);
            self.fs.remove_symlink(&link)?;
            self.fs.create_symlink(&root.join(name), &link)?;
        }

        for name in &changes.created {
            self.fs
                .create_symlink(&root.join(name), &changes.folder.join(name))?;
        }

        for warning in &changes.warnings {
            tracing::warn!(%warning, "link folder warning");
        }

        Ok(())
    }

    /// Make the link folder hold exactly one correct symlink per name in
    /// `included`, creating the folder if needed.
    ///
    /// All collisions are detected before the first write, so a corrupted
    /// folder is reported without being half-updated. Running this twice with
    /// the same input changes nothing the second time.
    pub fn ensure_linked(
        &self,
        root: &NormalizedPath,
        link_folder_name: &str,
        included: &BTreeSet<String>,
    ) -> Result<LinkChanges> {
        let changes = self.plan(root, link_folder_name, included)?;
        self.apply(root, &changes)?;
        Ok(changes)
    }

    /// Delete the link folder and everything in it.
    ///
    /// Returns whether a folder was removed; an absent folder is not an
    /// error.
    pub fn remove_link_folder(&self, root: &NormalizedPath, link_folder_name: &str) -> Result<bool> {
        validate_segment(link_folder_name, "link folder name")?;
        let folder = root.join(link_folder_name);

        match self.fs.kind(&folder)? {
            None => Ok(false),
            Some(EntryKind::Dir) => {
                self.fs.remove_dir_all(&folder)?;
                tracing::debug!(folder = %folder, "removed link folder");
                Ok(true)
            }
            Some(_) => Err(Error::corrupted(
                folder.to_native(),
                "link folder path is occupied by something that is not a directory",
            )),
        }
    }

    /// Would [`remove_link_folder`](Self::remove_link_folder) remove anything.
    pub fn link_folder_exists(&self, root: &NormalizedPath, link_folder_name: &str) -> Result<bool> {
        validate_segment(link_folder_name, "link folder name")?;
        Ok(self.fs.kind(&root.join(link_folder_name))?.is_some())
    }
}
