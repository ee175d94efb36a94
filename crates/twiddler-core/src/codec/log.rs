//! Keystroke logs recorded in untethered mode.
//!
//! The device stores one little-endian `u32` HID keyboard code per key press.
//! The text side is the typed characters themselves: letters and digits as
//! their key names, punctuation through [`super::tables::CHAR_NAMES`],
//! anything else as the full key name.  A code the layout does not know reads
//! as `_`.

use std::io::{ErrorKind, Read, Write};

use tracing::debug;

use super::tables::{char_name, name_char};
use crate::error::{ConfigError, FormatError, Result, UnknownIdentifier};
use crate::layout::{LayoutDatabase, LayoutTranslator};

/// Placeholder for a code with no key name.
pub const UNKNOWN_CHAR: char = '_';

const RECORD_LEN: usize = 4;

/// Decodes a binary log into text.
///
/// # Errors
///
/// [`FormatError::Truncated`] if the stream length is not a multiple of four,
/// [`ConfigError::LayoutNotFound`] if `layout` does not exist.
pub fn read_binary<R: Read, D: LayoutDatabase>(
    reader: &mut R,
    translator: &LayoutTranslator<D>,
    layout: &str,
) -> Result<String> {
    let names = translator
        .forward(layout, false)
        .ok_or_else(|| ConfigError::LayoutNotFound(layout.to_string()))?;

    let mut text = String::new();
    let mut records = 0usize;
    loop {
        let mut raw = [0u8; RECORD_LEN];
        let filled = fill(reader, &mut raw)?;
        if filled == 0 {
            break;
        }
        if filled < RECORD_LEN {
            return Err(FormatError::Truncated("keystroke log").into());
        }
        records += 1;

        let name = u16::try_from(u32::from_le_bytes(raw))
            .ok()
            .and_then(|code| names.get(&code));
        match name {
            Some(name) => match name_char(name) {
                Some(c) => text.push(c),
                None => text.push_str(name),
            },
            None => text.push(UNKNOWN_CHAR),
        }
    }

    debug!(records, "read keystroke log");
    Ok(text)
}

/// Encodes text as a binary log, one record per character.
///
/// Letters are written unshifted, so `A` and `a` produce the same record.
///
/// # Errors
///
/// [`UnknownIdentifier::Key`] for a character the layout cannot type,
/// [`ConfigError::LayoutNotFound`] if `layout` does not exist.
pub fn write_binary<W: Write, D: LayoutDatabase>(
    text: &str,
    writer: &mut W,
    translator: &LayoutTranslator<D>,
    layout: &str,
) -> Result<()> {
    let codes = translator
        .backward(layout, false)
        .ok_or_else(|| ConfigError::LayoutNotFound(layout.to_string()))?;

    let mut buf = Vec::with_capacity(text.len() * RECORD_LEN);
    for c in text.chars() {
        let name = match char_name(c) {
            Some(name) => name.to_string(),
            None => c.to_lowercase().collect(),
        };
        let code = codes
            .get(&name)
            .ok_or_else(|| UnknownIdentifier::Key(c.to_string()))?;
        buf.extend_from_slice(&u32::from(*code).to_le_bytes());
    }
    writer.write_all(&buf)?;

    debug!(records = buf.len() / RECORD_LEN, "wrote keystroke log");
    Ok(())
}

/// Reads until `buf` is full or the stream ends; returns the bytes read.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
