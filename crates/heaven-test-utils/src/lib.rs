//! Shared test utilities for the hidden-heaven workspace.
//!
//! Dev-dependency only, never published.
//!
//! - [`memory`]: [`MemoryLinkFs`], an in-memory [`heaven_fs::LinkFs`]
//! - [`package`]: [`TestPackage`] builder over a temporary directory

pub mod memory;
pub mod package;

pub use memory::MemoryLinkFs;
pub use package::{PackageSnapshot, TestPackage};
