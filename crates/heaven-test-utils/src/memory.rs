//! In-memory [`LinkFs`] for exercising link folder logic without a disk.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::io::ErrorKind;

use heaven_fs::{EntryKind, Error, LinkFs, NormalizedPath, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    File,
    Dir,
    Symlink(NormalizedPath),
}

/// A tree of files, directories and symlinks keyed by normalized path.
///
/// The root `/` always exists. Symlink targets are stored verbatim and never
/// resolved, so dangling links behave like they do on disk.
///
/// ```rust
/// use heaven_fs::{EntryKind, LinkFs, NormalizedPath};
/// use heaven_test_utils::MemoryLinkFs;
///
/// let fs = MemoryLinkFs::new().with_dir("/pkg/src").with_file("/pkg/README.md");
/// let kind = fs.kind(&NormalizedPath::new("/pkg/src")).unwrap();
/// assert_eq!(kind, Some(EntryKind::Dir));
/// ```
#[derive(Debug)]
pub struct MemoryLinkFs {
    nodes: RefCell<BTreeMap<String, Node>>,
}

impl Default for MemoryLinkFs {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLinkFs {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert("/".to_string(), Node::Dir);
        Self {
            nodes: RefCell::new(nodes),
        }
    }

    /// Add a directory (and its parents).
    pub fn with_dir(self, path: &str) -> Self {
        self.create_dir(&NormalizedPath::new(path))
            .unwrap_or_else(|e| panic!("MemoryLinkFs::with_dir({path}): {e}"));
        self
    }

    /// Add an empty file, creating parent directories.
    pub fn with_file(self, path: &str) -> Self {
        let path = NormalizedPath::new(path);
        if let Some(parent) = path.parent() {
            self.create_dir(&parent)
                .unwrap_or_else(|e| panic!("MemoryLinkFs::with_file({path}): {e}"));
        }
        self.nodes
            .borrow_mut()
            .insert(path.as_str().to_string(), Node::File);
        self
    }

    /// Add a symlink, creating parent directories.
    pub fn with_symlink(self, link: &str, target: &str) -> Self {
        let link = NormalizedPath::new(link);
        if let Some(parent) = link.parent() {
            self.create_dir(&parent)
                .unwrap_or_else(|e| panic!("MemoryLinkFs::with_symlink({link}): {e}"));
        }
        self.nodes.borrow_mut().insert(
            link.as_str().to_string(),
            Node::Symlink(NormalizedPath::new(target)),
        );
        self
    }

    /// Remove a single entry of any kind. Returns whether it existed.
    pub fn remove(&self, path: &str) -> bool {
        self.nodes
            .borrow_mut()
            .remove(NormalizedPath::new(path).as_str())
            .is_some()
    }

    /// Every path currently present, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.nodes.borrow().keys().cloned().collect()
    }

    fn parent_is_dir(&self, path: &NormalizedPath) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| not_found(path, "no parent directory"))?;
        match self.nodes.borrow().get(parent.as_str()) {
            Some(Node::Dir) => Ok(()),
            Some(_) => Err(failure(path, ErrorKind::Other, "parent is not a directory")),
            None => Err(not_found(path, "parent directory missing")),
        }
    }
}

impl LinkFs for MemoryLinkFs {
    fn kind(&self, path: &NormalizedPath) -> Result<Option<EntryKind>> {
        Ok(self.nodes.borrow().get(path.as_str()).map(|node| match node {
            Node::File => EntryKind::File,
            Node::Dir => EntryKind::Dir,
            Node::Symlink(_) => EntryKind::Symlink,
        }))
    }

    fn list(&self, dir: &NormalizedPath) -> Result<Vec<String>> {
        let nodes = self.nodes.borrow();
        match nodes.get(dir.as_str()) {
            Some(Node::Dir) => {}
            Some(_) => return Err(failure(dir, ErrorKind::Other, "not a directory")),
            None => return Err(not_found(dir, "directory missing")),
        }

        let names = nodes
            .keys()
            .filter(|key| key.as_str() != dir.as_str())
            .map(NormalizedPath::new)
            .filter(|path| path.parent().as_ref() == Some(dir))
            .filter_map(|path| path.file_name().map(str::to_string))
            .collect();
        Ok(names)
    }

    fn create_dir(&self, dir: &NormalizedPath) -> Result<()> {
        let mut chain = vec![dir.clone()];
        while let Some(parent) = chain.last().and_then(NormalizedPath::parent) {
            chain.push(parent);
        }

        let mut nodes = self.nodes.borrow_mut();
        for path in chain.iter().rev() {
            match nodes.get(path.as_str()) {
                Some(Node::Dir) => {}
                Some(_) => return Err(failure(path, ErrorKind::AlreadyExists, "not a directory")),
                None => {
                    nodes.insert(path.as_str().to_string(), Node::Dir);
                }
            }
        }
        Ok(())
    }

    fn create_symlink(&self, target: &NormalizedPath, link: &NormalizedPath) -> Result<()> {
        self.parent_is_dir(link)?;
        let mut nodes = self.nodes.borrow_mut();
        if nodes.contains_key(link.as_str()) {
            return Err(failure(link, ErrorKind::AlreadyExists, "entry exists"));
        }
        nodes.insert(link.as_str().to_string(), Node::Symlink(target.clone()));
        Ok(())
    }

    fn read_link(&self, link: &NormalizedPath) -> Result<NormalizedPath> {
        match self.nodes.borrow().get(link.as_str()) {
            Some(Node::Symlink(target)) => Ok(target.clone()),
            Some(_) => Err(failure(link, ErrorKind::InvalidInput, "not a symlink")),
            None => Err(not_found(link, "symlink missing")),
        }
    }

    fn remove_symlink(&self, link: &NormalizedPath) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        match nodes.get(link.as_str()) {
            Some(Node::Symlink(_)) => {
                nodes.remove(link.as_str());
                Ok(())
            }
            Some(_) => Err(failure(link, ErrorKind::InvalidInput, "not a symlink")),
            None => Err(not_found(link, "symlink missing")),
        }
    }

    fn remove_dir_all(&self, dir: &NormalizedPath) -> Result<()> {
        let mut nodes = self.nodes.borrow_mut();
        match nodes.get(dir.as_str()) {
            Some(Node::Dir) => {}
            Some(_) => return Err(failure(dir, ErrorKind::Other, "not a directory")),
            None => return Err(not_found(dir, "directory missing")),
        }

        let prefix = format!("{}/", dir.as_str().trim_end_matches('/'));
        nodes.retain(|key, _| key != dir.as_str() && !key.starts_with(&prefix));
        Ok(())
    }
}

fn not_found(path: &NormalizedPath, message: &str) -> Error {
    failure(path, ErrorKind::NotFound, message)
}

fn failure(path: &NormalizedPath, kind: ErrorKind, message: &str) -> Error {
    Error::io(path.to_native(), std::io::Error::new(kind, message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_returns_direct_children_only() {
        let fs = MemoryLinkFs::new()
            .with_file("/pkg/a.txt")
            .with_file("/pkg/nested/b.txt")
            .with_dir("/pkg/empty");

        let names = fs.list(&NormalizedPath::new("/pkg")).unwrap();
        assert_eq!(names, vec!["a.txt", "empty", "nested"]);
    }

    #[test]
    fn test_remove_dir_all_keeps_siblings_with_shared_prefix() {
        let fs = MemoryLinkFs::new()
            .with_dir("/pkg/.heaven")
            .with_symlink("/pkg/.heaven/src", "/pkg/src")
            .with_file("/pkg/.heaven-notes");

        fs.remove_dir_all(&NormalizedPath::new("/pkg/.heaven")).unwrap();

        assert_eq!(fs.paths(), vec!["/", "/pkg", "/pkg/.heaven-notes"]);
    }

    #[test]
    fn test_create_symlink_refuses_existing_entry() {
        let fs = MemoryLinkFs::new().with_file("/pkg/taken");
        let result = fs.create_symlink(
            &NormalizedPath::new("/pkg/x"),
            &NormalizedPath::new("/pkg/taken"),
        );
        assert!(result.is_err());
    }
}
