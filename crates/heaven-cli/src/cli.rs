//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;
use heaven_core::{Mode, RunOptions};
use heaven_fs::NormalizedPath;

/// hidden-heaven - Tuck package clutter into a link folder and hide it from VS Code
///
/// Examples:
///   hidden-heaven                          # Hide in the current directory
///   hidden-heaven packages/a packages/b    # Hide in several packages
///   hidden-heaven --link-folder-name stash # Use ./stash as the link folder
///   hidden-heaven --reset                  # Undo everything
#[derive(Parser, Debug)]
#[command(name = "hidden-heaven")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Package roots to process (defaults to the current directory)
    pub packages: Vec<PathBuf>,

    /// Name of the link folder created in each package
    #[arg(long, env = "HIDDEN_HEAVEN_LINK_FOLDER_NAME")]
    pub link_folder_name: Option<String>,

    /// Remove link folders and clear editor exclusions instead of hiding
    #[arg(long)]
    pub reset: bool,

    /// Item name or glob to hide (repeatable, replaces the default list)
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Item name or glob to keep visible (repeatable)
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Config file applied to every package instead of .hidden-heaven.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Preview changes without applying them
    #[arg(long)]
    pub dry_run: bool,

    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.reset { Mode::Reset } else { Mode::Hide }
    }

    /// Resolve flags into engine options. Relative paths are taken from `cwd`.
    pub fn run_options(&self, cwd: &std::path::Path) -> RunOptions {
        RunOptions {
            mode: self.mode(),
            link_folder_name: self.link_folder_name.clone(),
            include: non_empty(&self.include),
            exclude: non_empty(&self.exclude),
            config_path: self
                .config
                .as_ref()
                .map(|path| NormalizedPath::new(absolutize(cwd, path))),
            dry_run: self.dry_run,
        }
    }

    /// Package roots as absolute paths, canonicalized where they exist.
    ///
    /// Roots that cannot be canonicalized are kept so the engine reports them
    /// as a failed package instead of aborting the run.
    pub fn package_roots(&self, cwd: &std::path::Path) -> Vec<NormalizedPath> {
        let packages = if self.packages.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.packages.clone()
        };

        packages
            .iter()
            .map(|path| {
                let absolute = absolutize(cwd, path);
                NormalizedPath::new(dunce::canonicalize(&absolute).unwrap_or(absolute))
            })
            .collect()
    }
}

fn absolutize(cwd: &std::path::Path, path: &std::path::Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}
