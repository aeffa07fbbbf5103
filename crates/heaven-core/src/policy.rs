//! Item classification
//!
//! A [`Policy`] is plain data: include and exclude glob patterns over item
//! names plus a set of reserved names that are never linked. [`classify`]
//! partitions a package listing with it and never looks at the disk.

use std::collections::BTreeSet;

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Items hidden when neither the package config nor the command line says
/// otherwise: dependency folders, lockfiles and tool configuration.
pub const DEFAULT_INCLUDE: &[&str] = &[
    "node_modules",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    ".npmrc",
    ".nvmrc",
    ".yarnrc*",
    ".editorconfig",
    ".gitattributes",
    ".eslintrc*",
    ".eslintignore",
    "eslint.config.*",
    ".prettierrc*",
    ".prettierignore",
    "prettier.config.*",
    ".babelrc*",
    "babel.config.*",
    "tsconfig*.json",
    "jsconfig*.json",
    "vite.config.*",
    "vitest.config.*",
    "jest.config.*",
    "rollup.config.*",
    "webpack.config.*",
    ".turbo",
    "coverage",
];

/// Which side of the partition an item landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemClass {
    /// Linked into the link folder and hidden from the editor
    Included,
    /// Left untouched and visible
    Excluded,
}

/// Compiled include/exclude rules.
#[derive(Debug, Clone)]
pub struct Policy {
    include: GlobSet,
    exclude: GlobSet,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    reserved: BTreeSet<String>,
}

impl Policy {
    /// Compile a policy from include and exclude patterns.
    ///
    /// A literal name is a valid pattern matching only itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for the first pattern that fails to
    /// compile.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
            include_patterns: include.iter().map(|p| p.as_ref().to_string()).collect(),
            exclude_patterns: exclude.iter().map(|p| p.as_ref().to_string()).collect(),
            reserved: BTreeSet::new(),
        })
    }

    /// Policy built from [`DEFAULT_INCLUDE`] with no excludes.
    pub fn default_policy() -> Result<Self> {
        Self::new(DEFAULT_INCLUDE, &[])
    }

    /// Force `names` to be excluded whatever the patterns say.
    pub fn with_reserved<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn include_patterns(&self) -> &[String] {
        &self.include_patterns
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude_patterns
    }

    /// Classify a single name.
    pub fn class_of(&self, name: &str) -> ItemClass {
        if self.reserved.contains(name) || self.exclude.is_match(name) {
            ItemClass::Excluded
        } else if self.include.is_match(name) {
            ItemClass::Included
        } else {
            ItemClass::Excluded
        }
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.kind().to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| Error::InvalidPattern {
        pattern: patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(", "),
        message: e.to_string(),
    })
}

/// A package listing partitioned by a [`Policy`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub included: BTreeSet<String>,
    pub excluded: BTreeSet<String>,
}

impl Classification {
    /// Look up the class of a name from the classified listing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `name` was not part of the
    /// listing that produced this classification.
    pub fn class_of(&self, name: &str) -> Result<ItemClass> {
        if self.included.contains(name) {
            Ok(ItemClass::Included)
        } else if self.excluded.contains(name) {
            Ok(ItemClass::Excluded)
        } else {
            Err(Error::invalid_argument(format!(
                "'{name}' is not part of the classified listing"
            )))
        }
    }

    pub fn len(&self) -> usize {
        self.included.len() + self.excluded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition `items` into included and excluded names.
pub fn classify<I, S>(items: I, policy: &Policy) -> Classification
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut classification = Classification::default();
    for item in items {
        let name = item.into();
        match policy.class_of(&name) {
            ItemClass::Included => classification.included.insert(name),
            ItemClass::Excluded => classification.excluded.insert(name),
        };
    }
    classification
}
