//! Filesystem primitives for hidden-heaven
//!
//! Provides normalized paths, atomic I/O, format-aware config loading and the
//! [`LinkFs`] capability used to manage link folders.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod link;
pub mod path;

pub use config::ConfigStore;
pub use constants::HeavenPath;
pub use error::{Error, Result};
pub use link::{EntryKind, LinkFs, OsLinkFs};
pub use path::NormalizedPath;
