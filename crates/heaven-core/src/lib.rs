//! Link folder and editor exclusion synchronization for hidden-heaven
//!
//! Hiding a package means:
//!
//! - **Classification**: partition the items in the package root into
//!   included and excluded names with a [`Policy`]
//! - **Linking**: keep `<root>/<link folder>` holding exactly one symlink per
//!   included item ([`LinkFolderManager`])
//! - **Exclusion**: keep `files.exclude` in `.vscode/settings.json` listing the
//!   absolute path of every included item ([`SettingsSynchronizer`])
//!
//! Resetting clears the exclusions and deletes the link folder. [`Engine`]
//! runs either mode over many packages, isolating failures per package.
//!
//! # Architecture
//!
//! ```text
//!               heaven-cli
//!                   |
//!              heaven-core
//!   policy  link  settings  config  sync
//!                   |
//!               heaven-fs
//! ```
//!
//! # Example
//!
//! ```no_run
//! use heaven_core::{Engine, Mode, RunOptions};
//! use heaven_fs::NormalizedPath;
//!
//! let options = RunOptions {
//!     mode: Mode::Hide,
//!     include: Some(vec!["node_modules".to_string()]),
//!     ..RunOptions::default()
//! };
//! let report = Engine::new(options).run(&[NormalizedPath::new("/work/app")]);
//! assert!(report.is_success());
//! ```

pub mod config;
pub mod error;
pub mod link;
pub mod policy;
pub mod settings;
pub mod sync;

pub use config::{ConfigResolver, PackageConfig, ResolvedConfig};
pub use error::{Error, ErrorKind, Result};
pub use link::{LinkChanges, LinkFolderManager, Warning};
pub use policy::{Classification, DEFAULT_INCLUDE, ItemClass, Policy, classify};
pub use settings::{FILES_EXCLUDE, SettingsDocument, SettingsSynchronizer, SettingsUpdate};
pub use sync::{Action, Engine, Failure, Mode, PackageReport, RunOptions, RunReport};
