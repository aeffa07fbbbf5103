//! Hide and reset orchestration
//!
//! - [`Engine`] drives both modes over a list of package roots
//! - [`RunReport`] / [`PackageReport`] describe what happened per package

mod engine;
mod report;

pub use engine::{Engine, Mode, RunOptions};
pub use report::{Action, Failure, PackageReport, RunReport};
