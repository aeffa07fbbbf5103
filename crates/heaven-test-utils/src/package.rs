//! [`TestPackage`] builder for hide/reset scenarios on a real disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use heaven_fs::{HeavenPath, NormalizedPath};
use serde_json::Value;
use tempfile::TempDir;

/// A package root in a temporary directory with helpers for seeding items
/// and reading back link folder and settings state.
///
/// # Example
///
/// ```rust,no_run
/// use heaven_test_utils::TestPackage;
///
/// let pkg = TestPackage::new()
///     .with_dir("src")
///     .with_file("README.md")
///     .with_dir("node_modules");
/// pkg.assert_not_exists(".heaven");
/// ```
pub struct TestPackage {
    temp_dir: TempDir,
    root: PathBuf,
}

/// Everything a hide run can change, captured for equality checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSnapshot {
    /// Link name -> symlink target, `None` when the folder is absent
    pub links: Option<BTreeMap<String, PathBuf>>,
    /// Raw settings file text, `None` when the file is absent
    pub settings: Option<String>,
}

impl Default for TestPackage {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPackage {
    /// Create an empty package root.
    ///
    /// The root is canonicalized so paths compare equal to those produced by
    /// the engine on platforms where the temp dir sits behind a symlink.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = dunce::canonicalize(temp_dir.path()).unwrap();
        Self { temp_dir, root }
    }

    /// Create a package with a directory for each name in `items`.
    pub fn with_items(items: &[&str]) -> Self {
        items
            .iter()
            .fold(Self::new(), |pkg, item| pkg.with_dir(item))
    }

    pub fn with_dir(self, name: &str) -> Self {
        fs::create_dir_all(self.root.join(name)).unwrap();
        self
    }

    pub fn with_file(self, name: &str) -> Self {
        self.write(name, "");
        self
    }

    /// Return the root path of the package.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root as a [`NormalizedPath`].
    pub fn normalized_root(&self) -> NormalizedPath {
        NormalizedPath::new(&self.root)
    }

    /// The exclusion key the engine writes for `name`.
    pub fn exclusion_key(&self, name: &str) -> String {
        self.normalized_root().join(name).as_str().to_string()
    }

    /// Write `content` to `path` relative to the root, creating parents.
    pub fn write(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }

    /// Remove an item from the package root.
    pub fn remove(&self, name: &str) {
        let path = self.root.join(name);
        if path.is_dir() {
            fs::remove_dir_all(path).unwrap();
        } else {
            fs::remove_file(path).unwrap();
        }
    }

    /// Seed `.vscode/settings.json` with `value`.
    pub fn write_settings(&self, value: &Value) {
        self.write(
            HeavenPath::VscodeSettings.as_str(),
            &serde_json::to_string_pretty(value).unwrap(),
        );
    }

    /// Parse `.vscode/settings.json`.
    ///
    /// # Panics
    /// Panics if the file is missing or not valid JSON.
    pub fn read_settings(&self) -> Value {
        let path = self.root.join(HeavenPath::VscodeSettings.as_str());
        let content = fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("Could not read settings: {}", path.display()));
        serde_json::from_str(&content).unwrap()
    }

    /// Sorted keys of the `files.exclude` mapping.
    pub fn exclusion_keys(&self) -> Vec<String> {
        let settings = self.read_settings();
        let mut keys: Vec<String> = settings["files.exclude"]
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Sorted names inside the link folder, empty when it does not exist.
    pub fn linked_items(&self, link_folder_name: &str) -> Vec<String> {
        let folder = self.root.join(link_folder_name);
        let Ok(entries) = fs::read_dir(folder) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Capture link folder contents and raw settings text.
    pub fn snapshot(&self, link_folder_name: &str) -> PackageSnapshot {
        let folder = self.root.join(link_folder_name);
        let links = folder.is_dir().then(|| {
            self.linked_items(link_folder_name)
                .into_iter()
                .map(|name| {
                    let target = fs::read_link(folder.join(&name)).unwrap_or_default();
                    (name, target)
                })
                .collect()
        });
        let settings = fs::read_to_string(self.root.join(HeavenPath::VscodeSettings.as_str())).ok();
        PackageSnapshot { links, settings }
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, path: &str) {
        let full_path = self.root.join(path);
        assert!(
            full_path.symlink_metadata().is_ok(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, path: &str) {
        let full_path = self.root.join(path);
        assert!(
            full_path.symlink_metadata().is_err(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }

    /// Keep the temporary directory alive for the lifetime of the borrow.
    pub fn temp_dir(&self) -> &TempDir {
        &self.temp_dir
    }
}
