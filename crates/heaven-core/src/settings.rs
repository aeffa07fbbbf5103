//! Editor settings synchronization
//!
//! Only the `files.exclude` mapping of `.vscode/settings.json` is managed.
//! Every other field is carried through verbatim and in its original order.

use std::collections::BTreeSet;

use heaven_fs::{NormalizedPath, io};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Settings key holding the exclusion mapping.
pub const FILES_EXCLUDE: &str = "files.exclude";

/// A parsed settings file.
///
/// `fields` keeps the document as read, including a stale copy of
/// `files.exclude` that only serves to remember the key's position;
/// `exclusions` is the live mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDocument {
    fields: Map<String, Value>,
    exclusions: Map<String, Value>,
}

impl Default for SettingsDocument {
    fn default() -> Self {
        Self::empty()
    }
}

impl SettingsDocument {
    /// `{ "files.exclude": {} }`
    pub fn empty() -> Self {
        Self {
            fields: Map::new(),
            exclusions: Map::new(),
        }
    }

    /// Parse settings content read from `path`.
    ///
    /// Whitespace-only content is treated like a missing file.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedSettings`] if the content is not UTF-8 JSON, the top
    /// level is not an object, or `files.exclude` is present but not an
    /// object.
    pub fn parse(path: &NormalizedPath, content: impl AsRef<[u8]>) -> Result<Self> {
        let content = content.as_ref();
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }

        let malformed = |message: String| Error::MalformedSettings {
            path: path.to_native(),
            message,
        };

        let value: Value = serde_json::from_slice(content).map_err(|e| malformed(e.to_string()))?;
        let Value::Object(fields) = value else {
            return Err(malformed("top level is not a JSON object".to_string()));
        };

        let exclusions = match fields.get(FILES_EXCLUDE) {
            None => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(malformed(format!("'{FILES_EXCLUDE}' is not a JSON object")));
            }
        };

        Ok(Self { fields, exclusions })
    }

    /// The live exclusion mapping.
    pub fn exclusions(&self) -> &Map<String, Value> {
        &self.exclusions
    }

    /// Any top-level field other than `files.exclude`.
    pub fn field(&self, key: &str) -> Option<&Value> {
        if key == FILES_EXCLUDE {
            return None;
        }
        self.fields.get(key)
    }

    /// Map every path to `true`. Entries already present for those paths are
    /// overwritten, all others are kept.
    pub fn insert_exclusions<'p>(&mut self, paths: impl IntoIterator<Item = &'p String>) {
        for path in paths {
            self.exclusions.insert(path.clone(), Value::Bool(true));
        }
    }

    /// Drop the entries for `paths`, leaving everything else.
    pub fn retract_exclusions<'p>(&mut self, paths: impl IntoIterator<Item = &'p String>) {
        for path in paths {
            self.exclusions.remove(path);
        }
    }

    /// Empty the exclusion mapping.
    pub fn clear_exclusions(&mut self) {
        self.exclusions.clear();
    }

    pub fn to_value(&self) -> Value {
        let mut fields = self.fields.clone();
        fields.insert(
            FILES_EXCLUDE.to_string(),
            Value::Object(self.exclusions.clone()),
        );
        Value::Object(fields)
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn render(&self) -> Result<String> {
        let mut content = serde_json::to_string_pretty(&self.to_value())?;
        content.push('\n');
        Ok(content)
    }
}

/// A settings edit that has been read, validated and rendered but not yet
/// written.
///
/// Produced by [`SettingsSynchronizer::prepare`] so a caller can fail on a
/// malformed file before touching anything else, then
/// [`commit`](Self::commit) once its own changes are done.
#[derive(Debug, Clone)]
pub struct SettingsUpdate {
    path: NormalizedPath,
    existing: Option<Vec<u8>>,
    rendered: String,
    exclusions: usize,
    dry_run: bool,
}

impl SettingsUpdate {
    /// Whether committing would change the file.
    pub fn is_change(&self) -> bool {
        self.existing.as_deref() != Some(self.rendered.as_bytes())
    }

    /// Write the rendered document unless it matches the file already.
    /// Returns whether the file changed (or would, in a dry run).
    pub fn commit(self) -> Result<bool> {
        if !self.is_change() {
            return Ok(false);
        }
        if self.dry_run {
            tracing::debug!(path = %self.path, "settings would change");
            return Ok(true);
        }

        io::write_text(&self.path, &self.rendered)?;
        tracing::debug!(
            path = %self.path,
            exclusions = self.exclusions,
            "updated settings"
        );
        Ok(true)
    }
}

/// Reads and rewrites settings files.
///
/// Holds no parsed state between calls; each operation reads the file fresh,
/// so packages never share a document.
#[derive(Debug, Default, Clone, Copy)]
pub struct SettingsSynchronizer {
    dry_run: bool,
}

impl SettingsSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A synchronizer that reports whether a write would happen but never
    /// writes.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Parse the settings file, or return an empty document if it is absent.
    pub fn read_settings(&self, path: &NormalizedPath) -> Result<SettingsDocument> {
        match io::read_bytes_opt(path)? {
            Some(content) => SettingsDocument::parse(path, content),
            None => Ok(SettingsDocument::empty()),
        }
    }

    /// Add `paths` to the exclusion mapping. Returns whether the file changed.
    pub fn apply_exclusions(&self, path: &NormalizedPath, paths: &BTreeSet<String>) -> Result<bool> {
        self.prepare(path, |doc| doc.insert_exclusions(paths))?
            .commit()
    }

    /// Remove `paths` from the exclusion mapping. Returns whether the file
    /// changed.
    pub fn retract_exclusions(
        &self,
        path: &NormalizedPath,
        paths: &BTreeSet<String>,
    ) -> Result<bool> {
        self.prepare(path, |doc| doc.retract_exclusions(paths))?
            .commit()
    }

    /// Reset the exclusion mapping to `{}`. Returns whether the file changed.
    pub fn clear_exclusions(&self, path: &NormalizedPath) -> Result<bool> {
        self.prepare(path, SettingsDocument::clear_exclusions)?
            .commit()
    }

    /// Read the settings file, apply `edit` and render the result without
    /// writing it.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedSettings`] if the existing file cannot be parsed.
    pub fn prepare(
        &self,
        path: &NormalizedPath,
        edit: impl FnOnce(&mut SettingsDocument),
    ) -> Result<SettingsUpdate> {
        let existing = io::read_bytes_opt(path)?;
        let mut doc = match &existing {
            Some(content) => SettingsDocument::parse(path, content)?,
            None => SettingsDocument::empty(),
        };

        edit(&mut doc);

        Ok(SettingsUpdate {
            path: path.clone(),
            rendered: doc.render()?,
            exclusions: doc.exclusions().len(),
            existing,
            dry_run: self.dry_run,
        })
    }
}
