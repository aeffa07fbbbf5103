//! Per-package configuration
//!
//! Resolution order, later wins:
//! 1. Built-in defaults (`.heaven`, [`DEFAULT_INCLUDE`], no excludes)
//! 2. Package config file (`.hidden-heaven.toml`, then `.hidden-heaven.json`),
//!    or the file named by [`RunOptions::config_path`]
//! 3. Run options (command line flags)

use heaven_fs::{ConfigStore, HeavenPath, NormalizedPath};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::link::validate_segment;
use crate::policy::{DEFAULT_INCLUDE, Policy};
use crate::sync::RunOptions;

/// Contents of a package config file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    pub link_folder_name: Option<String>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

/// Effective settings for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub link_folder_name: String,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            link_folder_name: HeavenPath::DefaultLinkFolder.as_str().to_string(),
            include: DEFAULT_INCLUDE.iter().map(|s| s.to_string()).collect(),
            exclude: Vec::new(),
        }
    }
}

impl ResolvedConfig {
    /// Layer `config` on top of `self`.
    pub fn merge(mut self, config: PackageConfig) -> Self {
        if let Some(name) = config.link_folder_name {
            self.link_folder_name = name;
        }
        if let Some(include) = config.include {
            self.include = include;
        }
        if let Some(exclude) = config.exclude {
            self.exclude = exclude;
        }
        self
    }

    /// Compile the policy, reserving names the tool itself owns in the
    /// package root.
    pub fn policy(&self) -> Result<Policy> {
        Ok(Policy::new(self.include.as_slice(), self.exclude.as_slice())?.with_reserved([
            self.link_folder_name.as_str(),
            HeavenPath::VscodeDir.as_str(),
            HeavenPath::ConfigToml.as_str(),
            HeavenPath::ConfigJson.as_str(),
        ]))
    }
}

/// Resolves [`ResolvedConfig`] for package roots.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    store: ConfigStore,
    options: RunOptions,
}

impl ConfigResolver {
    pub fn new(options: RunOptions) -> Self {
        Self {
            store: ConfigStore::new(),
            options,
        }
    }

    /// Config file that applies to `root`, if any exists.
    pub fn config_file(&self, root: &NormalizedPath) -> Option<NormalizedPath> {
        if let Some(path) = &self.options.config_path {
            return Some(path.clone());
        }
        [HeavenPath::ConfigToml, HeavenPath::ConfigJson]
            .iter()
            .map(|candidate| root.join(candidate.as_str()))
            .find(NormalizedPath::exists)
    }

    /// Resolve the configuration for one package.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be read or parsed, or if the resolved
    /// link folder name is not a single path segment.
    pub fn resolve(&self, root: &NormalizedPath) -> Result<ResolvedConfig> {
        let mut resolved = ResolvedConfig::default();

        if let Some(path) = self.config_file(root) {
            let config: PackageConfig = self.store.load(&path)?;
            tracing::debug!(path = %path, "loaded package config");
            resolved = resolved.merge(config);
        }

        resolved = resolved.merge(PackageConfig {
            link_folder_name: self.options.link_folder_name.clone(),
            include: self.options.include.clone(),
            exclude: self.options.exclude.clone(),
        });

        validate_segment(&resolved.link_folder_name, "link folder name")?;
        Ok(resolved)
    }
}
