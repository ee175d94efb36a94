//! Minimal INI reader for the text config format.
//!
//! Supported syntax:
//!
//! - `[section]` headers; names are normalized.
//! - `key = value` or `key: value`; whichever delimiter comes first splits the
//!   line.  Keys are normalized, values trimmed.
//! - Full-line comments starting with `#` or `;`.
//! - Indented lines continue the previous value (joined with `\n`).
//!
//! Values are kept as strings; interpreting them is up to the caller.

use crate::error::FormatError;
use crate::layout::normalize_name;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    pub key: String,
    pub value: String,
    /// 1-based line of the `key = value` line.
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    pub line: usize,
    pub entries: Vec<IniEntry>,
}

impl IniSection {
    pub fn get(&self, key: &str) -> Option<&IniEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    pub sections: Vec<IniSection>,
}

impl IniDocument {
    /// Looks up a section by normalized name.
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Parses an INI document.
///
/// # Errors
///
/// - [`FormatError::MalformedLine`] for a line with no delimiter, an empty
///   key, or an unterminated section header.
/// - [`FormatError::NoSection`] for an entry before the first header.
/// - [`FormatError::DuplicateSection`] / [`FormatError::DuplicateKey`] when a
///   section or a key within a section repeats.
pub fn parse(text: &str) -> Result<IniDocument, FormatError> {
    let mut doc = IniDocument::default();
    // Whether an indented line may extend the last entry.
    let mut can_continue = false;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        if can_continue && raw.starts_with(char::is_whitespace) {
            if let Some(entry) = doc.sections.last_mut().and_then(|s| s.entries.last_mut()) {
                if !entry.value.is_empty() {
                    entry.value.push('\n');
                }
                entry.value.push_str(trimmed);
                continue;
            }
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let name = rest.strip_suffix(']').ok_or_else(|| malformed(line, raw))?;
            let name = normalize_name(name);
            if doc.section(&name).is_some() {
                return Err(FormatError::DuplicateSection { line, section: name });
            }
            doc.sections.push(IniSection {
                name,
                line,
                entries: Vec::new(),
            });
            can_continue = false;
            continue;
        }

        let split = trimmed.find(['=', ':']).ok_or_else(|| malformed(line, raw))?;
        let key = normalize_name(&trimmed[..split]);
        if key.is_empty() {
            return Err(malformed(line, raw));
        }
        let value = trimmed[split + 1..].trim().to_string();

        let section = doc.sections.last_mut().ok_or(FormatError::NoSection { line })?;
        if section.get(&key).is_some() {
            return Err(FormatError::DuplicateKey {
                line,
                section: section.name.clone(),
                key,
            });
        }
        section.entries.push(IniEntry { key, value, line });
        can_continue = true;
    }

    Ok(doc)
}

fn malformed(line: usize, raw: &str) -> FormatError {
    FormatError::MalformedLine {
        line,
        content: raw.to_string(),
    }
}
