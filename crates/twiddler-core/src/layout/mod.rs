//! Keyboard layout translation.
//!
//! A *layout* names every HID usage code in human terms (`0x04` ↔ `a`,
//! `0x2C` ↔ `space`).  Layouts live in a [`LayoutDatabase`], which exposes the
//! four raw tables of a layout as string maps with hex-encoded codes.  The
//! [`LayoutTranslator`] turns those raw tables into typed forward
//! (code → name) and backward (name → code) maps, normalizes names, drops
//! device-reserved codes, and memoizes the result.
//!
//! # The reserved range
//!
//! Codes `0xF0..=0x121` are used internally by the device firmware and can
//! never be bound through a layout, so they are removed from both directions.

pub mod embedded;
pub mod translator;

use std::collections::BTreeMap;

pub use embedded::{EmbeddedLayouts, LayoutFile, LayoutLoadError};
pub use translator::{BackwardMap, ForwardMap, LayoutTranslator};

/// Name of the layout used when the user does not pick one.
pub const DEFAULT_LAYOUT: &str = "default";

/// The four raw tables a layout provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutTable {
    /// Keyboard page, code → name.
    ToHidKeyboard,
    /// Keyboard page, name → code (may contain aliases).
    FromHidKeyboard,
    /// Consumer page, code → name.
    ToHidConsumer,
    /// Consumer page, name → code (may contain aliases).
    FromHidConsumer,
}

impl LayoutTable {
    pub fn forward(consumer: bool) -> Self {
        if consumer {
            LayoutTable::ToHidConsumer
        } else {
            LayoutTable::ToHidKeyboard
        }
    }

    pub fn backward(consumer: bool) -> Self {
        if consumer {
            LayoutTable::FromHidConsumer
        } else {
            LayoutTable::FromHidKeyboard
        }
    }

    /// Key of this table in a layout JSON file.
    pub fn key(self) -> &'static str {
        match self {
            LayoutTable::ToHidKeyboard => "to_hid_keyboard",
            LayoutTable::FromHidKeyboard => "from_hid_keyboard",
            LayoutTable::ToHidConsumer => "to_hid_consumer",
            LayoutTable::FromHidConsumer => "from_hid_consumer",
        }
    }
}

/// Source of raw layout tables.
///
/// Implementations treat the data as immutable for the lifetime of the
/// process; [`LayoutTranslator`] caches on that assumption.
#[cfg_attr(test, mockall::automock)]
pub trait LayoutDatabase {
    /// Names of every layout, as the database spells them.
    fn list_layouts(&self) -> Vec<String>;

    /// One raw table of `layout` (exact database spelling), or `None` if the
    /// layout does not exist.
    fn table(&self, layout: &str, table: LayoutTable) -> Option<BTreeMap<String, String>>;
}

/// Normalizes a key, command, or layout name: trimmed, spaces become
/// underscores, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().replace(' ', "_").to_lowercase()
}

/// Returns `true` for codes the device reserves and layouts cannot bind.
pub fn is_reserved(code: u16) -> bool {
    (0xF0..=0x121).contains(&code)
}
