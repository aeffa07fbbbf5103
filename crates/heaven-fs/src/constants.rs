//! Well-known paths inside a package root.

use std::path::Path;

/// Paths hidden-heaven reads or writes relative to a package root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeavenPath {
    /// The `.vscode` directory
    VscodeDir,
    /// The editor settings file, `.vscode/settings.json`
    VscodeSettings,
    /// The default link folder
    DefaultLinkFolder,
    /// Per-package TOML configuration
    ConfigToml,
    /// Per-package JSON configuration
    ConfigJson,
}

impl HeavenPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VscodeDir => ".vscode",
            Self::VscodeSettings => ".vscode/settings.json",
            Self::DefaultLinkFolder => ".heaven",
            Self::ConfigToml => ".hidden-heaven.toml",
            Self::ConfigJson => ".hidden-heaven.json",
        }
    }
}

impl AsRef<Path> for HeavenPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for HeavenPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for HeavenPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
