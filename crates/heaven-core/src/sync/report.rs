//! Reports produced by an [`Engine`](super::Engine) run

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Mode;
use crate::error::{Error, ErrorKind};
use crate::link::Warning;

/// One change made (or, in a dry run, planned) to a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    CreatedLinkFolder { path: String },
    Linked { name: String },
    Relinked { name: String },
    Unlinked { name: String },
    UpdatedSettings { path: String },
    RemovedLinkFolder { path: String },
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedLinkFolder { path } => write!(f, "create link folder {path}"),
            Self::Linked { name } => write!(f, "link {name}"),
            Self::Relinked { name } => write!(f, "relink {name}"),
            Self::Unlinked { name } => write!(f, "unlink {name}"),
            Self::UpdatedSettings { path } => write!(f, "update {path}"),
            Self::RemovedLinkFolder { path } => write!(f, "remove link folder {path}"),
        }
    }
}

/// Serializable summary of the error that stopped a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&Error> for Failure {
    fn from(error: &Error) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Outcome for a single package root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    pub root: String,
    pub link_folder_name: Option<String>,
    pub actions: Vec<Action>,
    pub warnings: Vec<Warning>,
    pub failure: Option<Failure>,
}

impl PackageReport {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            link_folder_name: None,
            actions: Vec::new(),
            warnings: Vec::new(),
            failure: None,
        }
    }

    pub fn failed(root: impl Into<String>, error: &Error) -> Self {
        Self {
            failure: Some(Failure::from(error)),
            ..Self::new(root)
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether the package was already in the desired state.
    pub fn is_unchanged(&self) -> bool {
        self.is_success() && self.actions.is_empty()
    }
}

/// Outcome of a whole run, one entry per package in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub mode: Mode,
    pub dry_run: bool,
    pub packages: Vec<PackageReport>,
}

impl RunReport {
    pub fn new(mode: Mode, dry_run: bool) -> Self {
        Self {
            mode,
            dry_run,
            packages: Vec::new(),
        }
    }

    /// True when no package failed. Warnings do not count.
    pub fn is_success(&self) -> bool {
        self.packages.iter().all(PackageReport::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &PackageReport> {
        self.packages.iter().filter(|p| !p.is_success())
    }

    pub fn warning_count(&self) -> usize {
        self.packages.iter().map(|p| p.warnings.len()).sum()
    }

    pub fn package(&self, root: &str) -> Option<&PackageReport> {
        self.packages.iter().find(|p| p.root == root)
    }
}
