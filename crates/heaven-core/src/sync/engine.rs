//! Engine implementation
//!
//! Hide: resolve config → list root → classify → link → settings.
//! Reset: resolve config → clear settings → remove link folder.
//!
//! The settings file is parsed before the first link changes, so a malformed
//! file stops the package with its link folder untouched. Settings are
//! written after linking; exclusions left behind by an interrupted run are
//! recognized by their item having vanished and retracted on the next run.

use std::collections::BTreeSet;

use heaven_fs::{EntryKind, HeavenPath, LinkFs, NormalizedPath, OsLinkFs};
use serde::{Deserialize, Serialize};

use super::report::{Action, PackageReport, RunReport};
use crate::config::{ConfigResolver, ResolvedConfig};
use crate::link::LinkFolderManager;
use crate::policy::{Classification, classify};
use crate::settings::{SettingsDocument, SettingsSynchronizer};
use crate::{Error, Result};

/// What a run does to each package.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Link included items and exclude them in the editor
    #[default]
    Hide,
    /// Clear exclusions and delete the link folder
    Reset,
}

/// Options for a run, usually straight from the command line.
///
/// `None` fields fall back to the package config file, then to defaults.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub mode: Mode,
    pub link_folder_name: Option<String>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    /// Config file used for every package instead of the per-package one
    pub config_path: Option<NormalizedPath>,
    /// If true, report changes without modifying anything
    pub dry_run: bool,
}

/// Drives hide and reset over package roots.
///
/// Packages are processed one at a time and independently: a failure is
/// recorded against its package and the run continues with the next one.
pub struct Engine<F: LinkFs = OsLinkFs> {
    fs: F,
    options: RunOptions,
    resolver: ConfigResolver,
}

impl Engine<OsLinkFs> {
    /// Create an engine working on the real filesystem.
    pub fn new(options: RunOptions) -> Self {
        Self::with_fs(OsLinkFs::new(), options)
    }
}

impl<F: LinkFs> Engine<F> {
    /// Create an engine over a custom [`LinkFs`].
    pub fn with_fs(fs: F, options: RunOptions) -> Self {
        Self {
            fs,
            resolver: ConfigResolver::new(options.clone()),
            options,
        }
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Process every package and report on each, in input order.
    pub fn run(&self, packages: &[NormalizedPath]) -> RunReport {
        let mut report = RunReport::new(self.options.mode, self.options.dry_run);

        for root in packages {
            let result = match self.options.mode {
                Mode::Hide => self.hide_package(root),
                Mode::Reset => self.reset_package(root),
            };

            let package = match result {
                Ok(package) => {
                    tracing::info!(
                        root = %root,
                        actions = package.actions.len(),
                        warnings = package.warnings.len(),
                        "package done"
                    );
                    package
                }
                Err(e) => {
                    tracing::error!(root = %root, error = %e, "package failed");
                    PackageReport::failed(root.as_str(), &e)
                }
            };
            report.packages.push(package);
        }

        report
    }

    /// Link the included items of one package and exclude them in its
    /// settings.
    pub fn hide_package(&self, root: &NormalizedPath) -> Result<PackageReport> {
        self.check_root(root)?;
        let config = self.resolver.resolve(root)?;
        let classification = self.classify_package(root, &config)?;

        let manager = LinkFolderManager::new(&self.fs);
        let changes = manager.plan(root, &config.link_folder_name, &classification.included)?;

        let known: BTreeSet<&str> = classification
            .included
            .iter()
            .chain(&classification.excluded)
            .chain(&changes.existing)
            .map(String::as_str)
            .collect();
        let current = absolute_paths(root, &classification.included);
        let settings_path = settings_path(root);
        let update = self.settings().prepare(&settings_path, |doc| {
            let mut stale = absolute_paths(root, &changes.removed);
            stale.extend(orphaned_exclusions(root, doc, &known));
            doc.retract_exclusions(&stale);
            doc.insert_exclusions(&current);
        })?;

        if !self.options.dry_run {
            manager.apply(root, &changes)?;
        }

        let mut report = PackageReport::new(root.as_str());
        report.link_folder_name = Some(config.link_folder_name.clone());
        if changes.create_folder {
            report.actions.push(Action::CreatedLinkFolder {
                path: changes.folder.as_str().to_string(),
            });
        }
        report.actions.extend(
            changes
                .removed
                .iter()
                .map(|name| Action::Unlinked { name: name.clone() }),
        );
        report.actions.extend(
            changes
                .relinked
                .iter()
                .map(|name| Action::Relinked { name: name.clone() }),
        );
        report.actions.extend(
            changes
                .created
                .iter()
                .map(|name| Action::Linked { name: name.clone() }),
        );
        report.warnings = changes.warnings;

        if update.commit()? {
            report.actions.push(Action::UpdatedSettings {
                path: settings_path.as_str().to_string(),
            });
        }

        Ok(report)
    }

    /// Clear the exclusion mapping of one package, then delete its link
    /// folder.
    pub fn reset_package(&self, root: &NormalizedPath) -> Result<PackageReport> {
        self.check_root(root)?;
        let config = self.resolver.resolve(root)?;

        let mut report = PackageReport::new(root.as_str());
        report.link_folder_name = Some(config.link_folder_name.clone());

        let settings_path = settings_path(root);
        if self.settings().clear_exclusions(&settings_path)? {
            report.actions.push(Action::UpdatedSettings {
                path: settings_path.as_str().to_string(),
            });
        }

        let manager = LinkFolderManager::new(&self.fs);
        let removed = if self.options.dry_run {
            manager.link_folder_exists(root, &config.link_folder_name)?
        } else {
            manager.remove_link_folder(root, &config.link_folder_name)?
        };
        if removed {
            report.actions.push(Action::RemovedLinkFolder {
                path: root.join(&config.link_folder_name).as_str().to_string(),
            });
        }

        Ok(report)
    }

    /// Classify the current listing of a package root.
    pub fn classify_package(
        &self,
        root: &NormalizedPath,
        config: &ResolvedConfig,
    ) -> Result<Classification> {
        let policy = config.policy()?;
        let items = self.fs.list(root)?;
        let classification = classify(items, &policy);
        tracing::debug!(
            root = %root,
            included = classification.included.len(),
            excluded = classification.excluded.len(),
            "classified items"
        );
        Ok(classification)
    }

    fn settings(&self) -> SettingsSynchronizer {
        if self.options.dry_run {
            SettingsSynchronizer::dry_run()
        } else {
            SettingsSynchronizer::new()
        }
    }

    fn check_root(&self, root: &NormalizedPath) -> Result<()> {
        if !root.is_absolute() {
            return Err(Error::invalid_argument(format!(
                "package root '{root}' must be an absolute path"
            )));
        }
        match self.fs.kind(root)? {
            Some(EntryKind::Dir | EntryKind::Symlink) => Ok(()),
            Some(_) => Err(Error::invalid_argument(format!(
                "package root '{root}' is not a directory"
            ))),
            None => Err(Error::invalid_argument(format!(
                "package root '{root}' does not exist"
            ))),
        }
    }
}

fn settings_path(root: &NormalizedPath) -> NormalizedPath {
    root.join(HeavenPath::VscodeSettings.as_str())
}

/// Exclusion keys naming a direct child of `root` that is neither in the
/// listing nor in the link folder. Keys for items that still exist are kept.
fn orphaned_exclusions(
    root: &NormalizedPath,
    doc: &SettingsDocument,
    known: &BTreeSet<&str>,
) -> Vec<String> {
    doc.exclusions()
        .keys()
        .filter(|key| {
            let path = NormalizedPath::new(key.as_str());
            path.parent().as_ref() == Some(root)
                && path.file_name().is_some_and(|name| !known.contains(name))
        })
        .cloned()
        .collect()
}

fn absolute_paths<'a>(
    root: &NormalizedPath,
    names: impl IntoIterator<Item = &'a String>,
) -> BTreeSet<String> {
    names
        .into_iter()
        .map(|name| root.join(name).as_str().to_string())
        .collect()
}
