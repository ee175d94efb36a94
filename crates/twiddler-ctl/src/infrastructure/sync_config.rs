//! TOML settings for the `sync` command.
//!
//! ```toml
//! [twiddler]
//! path = "/media/TWIDDLER"   # where the device is mounted
//! layout = "de_de"           # optional
//!
//! [configs]
//! 1 = "base.ini"
//! 2 = "gaming.cfg"
//! ```
//!
//! Each key under `[configs]` is a device slot (`1`, `2` or `3`); the value
//! is the source file for that slot.  Relative paths, including the device
//! path, are resolved against the directory holding the settings file so a
//! settings file can live next to the configs it names.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// File name `sync` looks for when `--config` is not given.
pub const DEFAULT_SYNC_CONFIG: &str = "twiddler.toml";

/// Config slots the device reads (`1.cfg` … `3.cfg`).
pub const SLOTS: RangeInclusive<u8> = 1..=3;

/// Error type for sync settings.
#[derive(Debug, Error)]
pub enum SyncConfigError {
    /// The settings file could not be read.
    #[error("I/O error accessing sync config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed or lacks a required section.
    #[error("failed to parse sync config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A `[configs]` key is not a device slot.
    #[error("invalid config slot '{0}' (expected 1, 2 or 3)")]
    InvalidSlot(String),
}

// ── Schema types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct SyncFile {
    twiddler: DeviceSection,
    configs: BTreeMap<String, PathBuf>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct DeviceSection {
    path: PathBuf,
    #[serde(default)]
    layout: Option<String>,
}

/// Validated sync settings with paths resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    /// Device mount point; slot files are `<device>/<slot>.cfg`.
    pub device: PathBuf,
    /// Layout for text sources, if the file names one.
    pub layout: Option<String>,
    /// Source file per slot, in slot order.
    pub configs: BTreeMap<u8, PathBuf>,
}

impl SyncPlan {
    /// Loads and validates the settings file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncConfigError::Io`] if the file cannot be read, and the
    /// errors of [`SyncPlan::parse`] otherwise.
    pub fn load(path: &Path) -> Result<Self, SyncConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| SyncConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::parse(&text, base)
    }

    /// Parses settings text, resolving relative paths against `base`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncConfigError::Parse`] for malformed TOML or a missing
    /// `[twiddler]`/`[configs]` section, and [`SyncConfigError::InvalidSlot`]
    /// for a slot key outside 1–3.
    pub fn parse(text: &str, base: &Path) -> Result<Self, SyncConfigError> {
        let file: SyncFile = toml::from_str(text)?;

        let mut configs = BTreeMap::new();
        for (key, source) in file.configs {
            let slot = key
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|slot| SLOTS.contains(slot))
                .ok_or_else(|| SyncConfigError::InvalidSlot(key.clone()))?;
            configs.insert(slot, base.join(source));
        }

        Ok(Self {
            device: base.join(file.twiddler.path),
            layout: file.twiddler.layout,
            configs,
        })
    }

    /// Path of the device file for `slot`.
    pub fn target(&self, slot: u8) -> PathBuf {
        self.device.join(format!("{slot}.cfg"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[twiddler]
path = "/media/TWIDDLER"
layout = "de_de"

[configs]
1 = "base.ini"
3 = "/abs/gaming.cfg"
"#;

    #[test]
    fn test_parse_resolves_relative_sources() {
        // Act
        let plan = SyncPlan::parse(SAMPLE, Path::new("/home/me/twiddler")).unwrap();

        // Assert
        assert_eq!(plan.device, PathBuf::from("/media/TWIDDLER"));
        assert_eq!(plan.layout.as_deref(), Some("de_de"));
        assert_eq!(plan.configs[&1], PathBuf::from("/home/me/twiddler/base.ini"));
        assert_eq!(plan.configs[&3], PathBuf::from("/abs/gaming.cfg"));
        assert!(!plan.configs.contains_key(&2));
    }

    #[test]
    fn test_layout_is_optional() {
        let plan = SyncPlan::parse("[twiddler]\npath = \"dev\"\n[configs]\n2 = \"a.ini\"\n", Path::new("")).unwrap();

        assert_eq!(plan.layout, None);
        assert_eq!(plan.device, PathBuf::from("dev"));
        assert_eq!(plan.target(2), PathBuf::from("dev/2.cfg"));
    }

    #[test]
    fn test_slot_outside_range_is_rejected() {
        let err = SyncPlan::parse("[twiddler]\npath = \"d\"\n[configs]\n4 = \"a.ini\"\n", Path::new("")).unwrap_err();

        assert!(matches!(err, SyncConfigError::InvalidSlot(ref s) if s == "4"));
    }

    #[test]
    fn test_missing_sections_are_parse_errors() {
        assert!(matches!(
            SyncPlan::parse("[configs]\n1 = \"a.ini\"\n", Path::new("")),
            Err(SyncConfigError::Parse(_))
        ));
        assert!(matches!(
            SyncPlan::parse("[twiddler]\npath = \"d\"\n", Path::new("")),
            Err(SyncConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = SyncPlan::load(&dir.path().join(DEFAULT_SYNC_CONFIG)).unwrap_err();

        assert!(matches!(err, SyncConfigError::Io { .. }));
    }
}
