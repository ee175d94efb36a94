//! File-level reading and writing of configs and keystroke logs.
//!
//! The codecs in `twiddler_core` work on streams and strings; this module
//! picks the codec for a path, opens the file, and attaches the path to any
//! error so the user sees which file was at fault.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;
use tracing::debug;

use twiddler_core::codec::binary::to_bytes;
use twiddler_core::codec::log;
use twiddler_core::{read_binary, Config, EmbeddedLayouts, LayoutTranslator, TextReader, TextWriter, UnknownPolicy};

use crate::application::Session;

/// Extension that marks a device-native config file.
pub const CONFIG_EXTENSION: &str = "cfg";

/// Extension that marks a device-native keystroke log.
pub const LOG_EXTENSION: &str = "log";

/// On-disk representation of a config or log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FileFormat {
    Text,
    Binary,
}

impl FileFormat {
    /// `Binary` if `path` has `binary_extension` (case-insensitive), else `Text`.
    pub fn detect(path: &Path, binary_extension: &str) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(binary_extension) => Self::Binary,
            _ => Self::Text,
        }
    }

    /// Format of a config file: the explicit choice if given, else by extension.
    pub fn for_config(path: &Path, explicit: Option<Self>) -> Self {
        explicit.unwrap_or_else(|| Self::detect(path, CONFIG_EXTENSION))
    }

    /// Format of a keystroke log: the explicit choice if given, else by extension.
    pub fn for_log(path: &Path, explicit: Option<Self>) -> Self {
        explicit.unwrap_or_else(|| Self::detect(path, LOG_EXTENSION))
    }
}

// ── Layouts ───────────────────────────────────────────────────────────────────

/// Builds the layout translator from the built-in layouts plus, optionally,
/// every `*.json` file in `extra_dir`.
///
/// # Errors
///
/// Fails if a built-in or extra layout file cannot be read or parsed.
pub fn load_layouts(extra_dir: Option<&Path>) -> anyhow::Result<LayoutTranslator> {
    let mut db = EmbeddedLayouts::builtin().context("built-in layout tables are invalid")?;
    if let Some(dir) = extra_dir {
        let count = db
            .load_dir(dir)
            .with_context(|| format!("failed to load layouts from {}", dir.display()))?;
        debug!(dir = %dir.display(), count, "loaded extra layouts");
    }
    Ok(LayoutTranslator::new(db))
}

// ── Configs ───────────────────────────────────────────────────────────────────

/// Reads a config from `path` in the given format.
///
/// `policy` applies to text input only.
///
/// # Errors
///
/// Fails if the file cannot be opened or does not decode.
pub fn read_config(
    path: &Path,
    format: FileFormat,
    session: &Session,
    policy: UnknownPolicy,
) -> anyhow::Result<Config> {
    match format {
        FileFormat::Binary => {
            let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            read_binary(&mut BufReader::new(file))
                .with_context(|| format!("failed to read binary config {}", path.display()))
        }
        FileFormat::Text => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            TextReader::new(session.translator(), session.layout())
                .with_policy(policy)
                .read_str(&text)
                .with_context(|| format!("failed to parse text config {}", path.display()))
        }
    }
}

/// Encodes `config` in the given format.
///
/// # Errors
///
/// Fails if the config cannot be represented in `format`.
pub fn encode_config(config: &Config, format: FileFormat, session: &Session) -> anyhow::Result<Vec<u8>> {
    match format {
        FileFormat::Binary => to_bytes(config).context("failed to encode binary config"),
        FileFormat::Text => TextWriter::new(session.translator(), session.layout())
            .write_string(config)
            .map(String::into_bytes)
            .context("failed to encode text config"),
    }
}

/// Writes `config` to `path` in the given format, replacing any existing file.
///
/// # Errors
///
/// Fails if encoding fails or the file cannot be written.  Nothing is written
/// when encoding fails.
pub fn write_config(path: &Path, config: &Config, format: FileFormat, session: &Session) -> anyhow::Result<()> {
    let bytes = encode_config(config, format, session)
        .with_context(|| format!("cannot write {}", path.display()))?;
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

// ── Keystroke logs ────────────────────────────────────────────────────────────

/// Reads a keystroke log as text.
///
/// A single trailing line break in a text log is dropped, since editors add
/// one and it has no keystroke.
///
/// # Errors
///
/// Fails if the file cannot be read or a binary log is truncated.
pub fn read_log(path: &Path, format: FileFormat, session: &Session) -> anyhow::Result<String> {
    match format {
        FileFormat::Binary => {
            let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            log::read_binary(&mut BufReader::new(file), session.translator(), session.layout())
                .with_context(|| format!("failed to read keystroke log {}", path.display()))
        }
        FileFormat::Text => {
            let mut text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            if text.ends_with('\n') {
                text.pop();
                if text.ends_with('\r') {
                    text.pop();
                }
            }
            Ok(text)
        }
    }
}

/// Writes keystroke text to `path` in the given format.
///
/// # Errors
///
/// Fails if a character cannot be typed in the session layout or the file
/// cannot be written.
pub fn write_log(path: &Path, text: &str, format: FileFormat, session: &Session) -> anyhow::Result<()> {
    let bytes = match format {
        FileFormat::Binary => {
            let mut buf = Vec::new();
            log::write_binary(text, &mut buf, session.translator(), session.layout())
                .with_context(|| format!("cannot write {}", path.display()))?;
            buf
        }
        FileFormat::Text => text.as_bytes().to_vec(),
    };
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}
