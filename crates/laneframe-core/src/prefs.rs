//! Per-channel display preferences.
//!
//! Selects which decoding scheme applies to each channel. Independent of the
//! channel snapshot in every way that matters: mutated only by explicit user
//! selection, last write wins, and it is the *only* state persisted across
//! restarts - the snapshot is always rebuilt from the live feed.
//!
//! The on-disk form is a single JSON object mapping channel numbers to
//! [`Kind`] ordinals, e.g. `{"2": 1, "5": 2}`. An unknown ordinal in the
//! file is rejected on load rather than silently remapped.

use std::{collections::BTreeMap, fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::Kind;

/// Errors from preference persistence.
#[derive(Error, Debug)]
pub enum PrefsError {
    /// Reading or writing the preference file failed.
    #[error("preference file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The file exists but is not a valid preference map (including any
    /// kind ordinal outside the closed set).
    #[error("malformed preference file: {0}")]
    Malformed(String),
}

/// A user's scheme selection for one channel, as presentation layers
/// deliver it: `{"channel": 2, "format": 1}` with the kind as its ordinal.
///
/// Local only - this shape never crosses the feed socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceUpdate {
    /// Channel the selection applies to.
    pub channel: u32,
    /// Selected decoding scheme.
    pub format: Kind,
}

/// Map of channel number to selected decoding scheme.
///
/// Channels without an entry decode as RAW; [`resolved`](Self::resolved)
/// applies that default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayPreferences {
    kinds: BTreeMap<u32, Kind>,
}

impl DisplayPreferences {
    /// Create an empty preference map (everything decodes as RAW).
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a scheme for a channel. Overwrites any previous selection.
    pub fn set(&mut self, number: u32, kind: Kind) {
        self.kinds.insert(number, kind);
    }

    /// Apply a selection event from a presentation layer.
    pub fn apply(&mut self, update: PreferenceUpdate) {
        self.set(update.channel, update.format);
    }

    /// Explicit selection for a channel, `None` if the default applies.
    pub fn get(&self, number: u32) -> Option<Kind> {
        self.kinds.get(&number).copied()
    }

    /// Selection for a channel with the RAW default applied.
    pub fn resolved(&self, number: u32) -> Kind {
        self.get(number).unwrap_or(Kind::Raw)
    }

    /// Number of explicit selections.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// True if no explicit selections exist.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Load preferences from `path`.
    ///
    /// A missing file is not an error: it yields the empty map, matching a
    /// first run.
    ///
    /// # Errors
    ///
    /// - [`PrefsError::Io`] on read failures other than not-found.
    /// - [`PrefsError::Malformed`] if the contents do not parse.
    pub fn load(path: &Path) -> Result<Self, PrefsError> {
        let raw = match fs::read(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::new()),
            Err(err) => return Err(PrefsError::Io(err)),
        };

        serde_json::from_slice(&raw).map_err(|e| PrefsError::Malformed(e.to_string()))
    }

    /// Write preferences to `path`, replacing any previous file.
    ///
    /// Writes a sibling temp file first and renames it into place so a crash
    /// mid-write cannot truncate existing preferences.
    ///
    /// # Errors
    ///
    /// - [`PrefsError::Io`] on write or rename failure.
    pub fn save(&self, path: &Path) -> Result<(), PrefsError> {
        let json =
            serde_json::to_vec_pretty(self).map_err(|e| PrefsError::Malformed(e.to_string()))?;

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_channel_resolves_to_raw() {
        let prefs = DisplayPreferences::new();
        assert_eq!(prefs.get(3), None);
        assert_eq!(prefs.resolved(3), Kind::Raw);
    }

    #[test]
    fn last_write_wins() {
        let mut prefs = DisplayPreferences::new();
        prefs.set(2, Kind::Clock);
        prefs.set(2, Kind::Lane);
        assert_eq!(prefs.get(2), Some(Kind::Lane));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut prefs = DisplayPreferences::new();
        prefs.set(2, Kind::Clock);
        prefs.set(5, Kind::Event);
        prefs.save(&path).unwrap();

        let loaded = DisplayPreferences::load(&path).unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = DisplayPreferences::load(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn selection_event_shape_uses_the_ordinal() {
        let raw = r#"{"channel": 5, "format": 3}"#;
        let update: PreferenceUpdate = serde_json::from_str(raw).unwrap();
        assert_eq!(update.format, Kind::Event);

        let mut prefs = DisplayPreferences::new();
        prefs.apply(update);
        assert_eq!(prefs.get(5), Some(Kind::Event));
    }

    #[test]
    fn persisted_form_uses_ordinals() {
        let mut prefs = DisplayPreferences::new();
        prefs.set(2, Kind::Lane);

        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json, serde_json::json!({"2": 2}));
    }

    #[test]
    fn unknown_ordinal_in_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, r#"{"2": 9}"#).unwrap();

        assert!(matches!(
            DisplayPreferences::load(&path),
            Err(PrefsError::Malformed(_))
        ));
    }
}
