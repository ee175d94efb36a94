//! Memoized name ↔ code translation for one layout database.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use tracing::{debug, warn};

use super::{is_reserved, normalize_name, EmbeddedLayouts, LayoutDatabase, LayoutTable};
use crate::error::ConfigError;

/// HID code → normalized key name.
pub type ForwardMap = HashMap<u16, String>;

/// Normalized key name → HID code.
pub type BackwardMap = HashMap<String, u16>;

type CacheKey = (String, bool);

/// Translates between key names and HID codes for named layouts.
///
/// Each (layout, consumer-table) pair is built once on first use and kept for
/// the lifetime of the translator, including the "not found" result.
pub struct LayoutTranslator<D = EmbeddedLayouts> {
    db: D,
    /// Normalized layout name → name as spelled in the database.
    names: HashMap<String, String>,
    forward_cache: RefCell<HashMap<CacheKey, Option<Rc<ForwardMap>>>>,
    backward_cache: RefCell<HashMap<CacheKey, Option<Rc<BackwardMap>>>>,
}

impl<D: LayoutDatabase> LayoutTranslator<D> {
    pub fn new(db: D) -> Self {
        let names = db
            .list_layouts()
            .into_iter()
            .map(|name| (normalize_name(&name), name))
            .collect();
        Self {
            db,
            names,
            forward_cache: RefCell::new(HashMap::new()),
            backward_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn database(&self) -> &D {
        &self.db
    }

    /// Returns `true` if `name` (in any case/spacing) is a known layout.
    pub fn exists(&self, name: &str) -> bool {
        self.names.contains_key(&normalize_name(name))
    }

    /// Normalized names of every known layout, sorted.
    pub fn layout_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.names.keys().cloned().collect();
        names.sort();
        names
    }

    /// Fails with [`ConfigError::LayoutNotFound`] unless `name` exists.
    pub fn require(&self, name: &str) -> Result<(), ConfigError> {
        if self.exists(name) {
            Ok(())
        } else {
            Err(ConfigError::LayoutNotFound(name.to_string()))
        }
    }

    /// Code → name map for `layout`, or `None` if the layout is unknown.
    pub fn forward(&self, layout: &str, consumer: bool) -> Option<Rc<ForwardMap>> {
        let key = (normalize_name(layout), consumer);
        if let Some(hit) = self.forward_cache.borrow().get(&key) {
            return hit.clone();
        }

        let built = self
            .raw_table(&key.0, LayoutTable::forward(consumer))
            .map(|raw| Rc::new(build_forward(&raw)));
        if let Some(map) = &built {
            debug!(layout = %key.0, consumer, entries = map.len(), "built forward layout map");
        }
        self.forward_cache.borrow_mut().insert(key, built.clone());
        built
    }

    /// Name → code map for `layout`, or `None` if the layout is unknown.
    pub fn backward(&self, layout: &str, consumer: bool) -> Option<Rc<BackwardMap>> {
        let key = (normalize_name(layout), consumer);
        if let Some(hit) = self.backward_cache.borrow().get(&key) {
            return hit.clone();
        }

        let built = self
            .raw_table(&key.0, LayoutTable::backward(consumer))
            .map(|raw| Rc::new(build_backward(&raw)));
        if let Some(map) = &built {
            debug!(layout = %key.0, consumer, entries = map.len(), "built backward layout map");
        }
        self.backward_cache.borrow_mut().insert(key, built.clone());
        built
    }

    fn raw_table(&self, normalized: &str, table: LayoutTable) -> Option<BTreeMap<String, String>> {
        let db_name = self.names.get(normalized)?;
        self.db.table(db_name, table)
    }
}

fn parse_code(raw: &str) -> Option<u16> {
    let digits = raw
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u16::from_str_radix(digits, 16).ok()
}

fn build_forward(raw: &BTreeMap<String, String>) -> ForwardMap {
    let mut map = ForwardMap::with_capacity(raw.len());
    for (code, name) in raw {
        let Some(code) = parse_code(code) else {
            warn!(%code, %name, "skipping layout entry with unparseable code");
            continue;
        };
        if is_reserved(code) {
            continue;
        }
        map.insert(code, normalize_name(name));
    }
    map
}

fn build_backward(raw: &BTreeMap<String, String>) -> BackwardMap {
    let mut map = BackwardMap::with_capacity(raw.len());
    for (name, code) in raw {
        let Some(code) = parse_code(code) else {
            warn!(%code, %name, "skipping layout entry with unparseable code");
            continue;
        };
        if is_reserved(code) {
            continue;
        }
        map.insert(normalize_name(name), code);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MockLayoutDatabase;
    use mockall::predicate::eq;

    fn builtin() -> LayoutTranslator {
        LayoutTranslator::new(EmbeddedLayouts::builtin().unwrap())
    }

    fn raw(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_forward_normalizes_names() {
        let t = builtin();
        let fwd = t.forward("default", false).unwrap();
        assert_eq!(fwd.get(&0x04).map(String::as_str), Some("a"));
        assert_eq!(fwd.get(&0x2F).map(String::as_str), Some("left_bracket"));
    }

    #[test]
    fn test_backward_includes_aliases() {
        let t = builtin();
        let back = t.backward("default", false).unwrap();
        assert_eq!(back.get("enter"), Some(&0x28));
        assert_eq!(back.get("return"), Some(&0x28));
    }

    #[test]
    fn test_reserved_codes_are_dropped_both_ways() {
        let t = builtin();
        assert!(!t.forward("default", false).unwrap().contains_key(&0xF0));
        assert!(!t.backward("default", false).unwrap().contains_key("fun1"));
    }

    #[test]
    fn test_layout_name_lookup_is_case_and_space_insensitive() {
        let t = builtin();
        assert!(t.exists("EN_us"));
        assert!(t.exists(" de DE "));
        assert!(!t.exists("de-de"));
        assert!(t.forward("En_US", false).is_some());
    }

    #[test]
    fn test_consumer_table_is_separate() {
        let t = builtin();
        let back = t.backward("default", true).unwrap();
        assert_eq!(back.get("volume_up"), Some(&0xE9));
        assert!(back.get("a").is_none());
    }

    #[test]
    fn test_unknown_layout_is_none_not_error() {
        let t = builtin();
        assert!(t.forward("klingon", false).is_none());
        assert!(t.backward("klingon", true).is_none());
        assert!(matches!(t.require("klingon"), Err(ConfigError::LayoutNotFound(_))));
    }

    #[test]
    fn test_forward_is_memoized_per_layout_and_table() {
        let mut db = MockLayoutDatabase::new();
        db.expect_list_layouts()
            .times(1)
            .returning(|| vec!["Custom".to_string()]);
        db.expect_table()
            .with(eq("Custom"), eq(LayoutTable::ToHidKeyboard))
            .times(1)
            .returning(|_, _| Some(raw(&[("0x04", "A")])));
        db.expect_table()
            .with(eq("Custom"), eq(LayoutTable::ToHidConsumer))
            .times(1)
            .returning(|_, _| Some(raw(&[("0xE9", "Volume Up")])));

        let t = LayoutTranslator::new(db);
        for _ in 0..3 {
            assert_eq!(t.forward("custom", false).unwrap().len(), 1);
            assert_eq!(t.forward("CUSTOM", true).unwrap().len(), 1);
        }
    }

    #[test]
    fn test_missing_layout_never_reaches_database() {
        let mut db = MockLayoutDatabase::new();
        db.expect_list_layouts().returning(Vec::new);
        db.expect_table().times(0);

        let t = LayoutTranslator::new(db);
        assert!(t.backward("default", false).is_none());
        assert!(t.backward("default", false).is_none());
    }

    #[test]
    fn test_unparseable_codes_are_skipped() {
        let mut db = MockLayoutDatabase::new();
        db.expect_list_layouts()
            .returning(|| vec!["x".to_string()]);
        db.expect_table()
            .returning(|_, _| Some(raw(&[("zz", "Broken"), ("0x05", "B")])));

        let t = LayoutTranslator::new(db);
        let fwd = t.forward("x", false).unwrap();
        assert_eq!(fwd.len(), 1);
        assert_eq!(fwd.get(&0x05).map(String::as_str), Some("b"));
    }
}
