//! Layout database backed by JSON layout files.
//!
//! Each file describes one layout:
//!
//! ```json
//! {
//!   "name": "de_DE",
//!   "parent": "default",
//!   "to_hid_keyboard":   { "0x1C": "Z" },
//!   "from_hid_keyboard": { "Z": "0x1C" }
//! }
//! ```
//!
//! A layout with a `parent` starts from the parent's tables and overrides
//! individual entries.  Three layouts are compiled into the crate; more can be
//! loaded from a directory at runtime.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use super::{LayoutDatabase, LayoutTable};

/// Upper bound on `parent` chain length; longer chains are treated as cycles.
const MAX_PARENT_DEPTH: usize = 8;

const BUILTIN_LAYOUTS: &[(&str, &str)] = &[
    ("default.json", include_str!("../../layouts/default.json")),
    ("en_us.json", include_str!("../../layouts/en_us.json")),
    ("de_de.json", include_str!("../../layouts/de_de.json")),
];

/// Errors loading layout files.
#[derive(Debug, Error)]
pub enum LayoutLoadError {
    #[error("I/O error reading layouts from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse layout file {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk schema of one layout file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub to_hid_keyboard: BTreeMap<String, String>,
    #[serde(default)]
    pub from_hid_keyboard: BTreeMap<String, String>,
    #[serde(default)]
    pub to_hid_consumer: BTreeMap<String, String>,
    #[serde(default)]
    pub from_hid_consumer: BTreeMap<String, String>,
}

impl LayoutFile {
    fn own_table(&self, table: LayoutTable) -> &BTreeMap<String, String> {
        match table {
            LayoutTable::ToHidKeyboard => &self.to_hid_keyboard,
            LayoutTable::FromHidKeyboard => &self.from_hid_keyboard,
            LayoutTable::ToHidConsumer => &self.to_hid_consumer,
            LayoutTable::FromHidConsumer => &self.from_hid_consumer,
        }
    }
}

/// In-memory layout database.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedLayouts {
    layouts: BTreeMap<String, LayoutFile>,
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> LayoutLoadError {
    let path = path.to_path_buf();
    move |source| LayoutLoadError::Io { path, source }
}

impl EmbeddedLayouts {
    /// An empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// The layouts compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutLoadError::Parse`] if a built-in file is malformed.
    pub fn builtin() -> Result<Self, LayoutLoadError> {
        let mut db = Self::new();
        for (file, json) in BUILTIN_LAYOUTS {
            db.add_json(file, json)?;
        }
        Ok(db)
    }

    /// Parses one layout file and adds it, replacing any layout of the same
    /// name.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutLoadError::Parse`] if `json` is not a layout file.
    pub fn add_json(&mut self, file: &str, json: &str) -> Result<(), LayoutLoadError> {
        let layout: LayoutFile = serde_json::from_str(json).map_err(|source| LayoutLoadError::Parse {
            file: file.to_string(),
            source,
        })?;
        self.add(layout);
        Ok(())
    }

    pub fn add(&mut self, layout: LayoutFile) {
        if self.layouts.contains_key(&layout.name) {
            debug!(layout = %layout.name, "replacing layout");
        }
        self.layouts.insert(layout.name.clone(), layout);
    }

    /// Loads every `*.json` file in `dir`, in file name order.
    ///
    /// Returns the number of layouts loaded.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutLoadError::Io`] if the directory or a file cannot be
    /// read, and [`LayoutLoadError::Parse`] for a malformed file.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, LayoutLoadError> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err(dir))? {
            let path = entry.map_err(io_err(dir))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        for path in &files {
            let json = std::fs::read_to_string(path).map_err(io_err(path))?;
            self.add_json(&path.display().to_string(), &json)?;
        }
        debug!(dir = %dir.display(), count = files.len(), "loaded layout files");
        Ok(files.len())
    }

    fn resolve(&self, name: &str, table: LayoutTable, depth: usize) -> Option<BTreeMap<String, String>> {
        let layout = self.layouts.get(name)?;
        let mut merged = match &layout.parent {
            Some(parent) if depth < MAX_PARENT_DEPTH => {
                self.resolve(parent, table, depth + 1).unwrap_or_else(|| {
                    warn!(layout = name, %parent, "parent layout not found");
                    BTreeMap::new()
                })
            }
            Some(parent) => {
                warn!(layout = name, %parent, "layout parent chain too deep");
                BTreeMap::new()
            }
            None => BTreeMap::new(),
        };
        merged.extend(
            layout
                .own_table(table)
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Some(merged)
    }
}

impl LayoutDatabase for EmbeddedLayouts {
    fn list_layouts(&self) -> Vec<String> {
        self.layouts.keys().cloned().collect()
    }

    fn table(&self, layout: &str, table: LayoutTable) -> Option<BTreeMap<String, String>> {
        self.resolve(layout, table, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_layouts_parse() {
        let db = EmbeddedLayouts::builtin().expect("built-in layouts must parse");
        let names = db.list_layouts();
        assert!(names.contains(&"default".to_string()));
        assert!(names.contains(&"en_US".to_string()));
        assert!(names.contains(&"de_DE".to_string()));
    }

    #[test]
    fn test_child_inherits_parent_tables() {
        let db = EmbeddedLayouts::builtin().unwrap();
        let table = db.table("en_US", LayoutTable::ToHidKeyboard).unwrap();
        assert_eq!(table.get("0x04").map(String::as_str), Some("A"));
    }

    #[test]
    fn test_child_overrides_parent_entries() {
        let db = EmbeddedLayouts::builtin().unwrap();
        let table = db.table("de_DE", LayoutTable::ToHidKeyboard).unwrap();
        assert_eq!(table.get("0x1C").map(String::as_str), Some("Z"));
        assert_eq!(table.get("0x1D").map(String::as_str), Some("Y"));
        assert_eq!(table.get("0x05").map(String::as_str), Some("B"));
    }

    #[test]
    fn test_unknown_layout_has_no_tables() {
        let db = EmbeddedLayouts::builtin().unwrap();
        assert!(db.table("klingon", LayoutTable::ToHidKeyboard).is_none());
    }

    #[test]
    fn test_parent_cycle_terminates() {
        let mut db = EmbeddedLayouts::new();
        db.add(LayoutFile {
            name: "a".into(),
            parent: Some("b".into()),
            ..Default::default()
        });
        db.add(LayoutFile {
            name: "b".into(),
            parent: Some("a".into()),
            ..Default::default()
        });
        assert_eq!(db.table("a", LayoutTable::ToHidKeyboard), Some(BTreeMap::new()));
    }

    #[test]
    fn test_add_json_rejects_garbage() {
        let mut db = EmbeddedLayouts::new();
        let err = db.add_json("bad.json", "{ not json").unwrap_err();
        assert!(matches!(err, LayoutLoadError::Parse { .. }));
    }

    #[test]
    fn test_load_dir_reads_json_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("dvorak.json"),
            r#"{"name": "dvorak", "parent": "default", "to_hid_keyboard": {"0x14": "'"}}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("README.txt"), "not a layout").unwrap();

        let mut db = EmbeddedLayouts::builtin().unwrap();
        let loaded = db.load_dir(dir.path()).unwrap();

        assert_eq!(loaded, 1);
        let table = db.table("dvorak", LayoutTable::ToHidKeyboard).unwrap();
        assert_eq!(table.get("0x14").map(String::as_str), Some("'"));
    }
}
