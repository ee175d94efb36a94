//! Error types shared by every codec in this crate.
//!
//! Errors fall into three families:
//!
//! - [`FormatError`] – the input does not have the shape of a config
//!   (unsupported version, truncated stream, malformed INI line).  Always fatal
//!   to the current read or write call.
//! - [`UnknownIdentifier`] – a single name or code could not be resolved.
//!   Fatal to the token being parsed; [`crate::TextReader`] can be told to skip
//!   the token instead.
//! - [`ConfigError::LayoutNotFound`] – the requested keyboard layout does not
//!   exist.  Callers check this before any codec work begins.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Top-level error returned by the public read/write operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The input is not a well-formed config.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A name or code has no entry in the relevant table.
    #[error(transparent)]
    UnknownIdentifier(#[from] UnknownIdentifier),

    /// The named keyboard layout is not in the layout database.
    #[error("layout not found: {0}")]
    LayoutNotFound(String),

    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structural problems with a binary or text config.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    /// The version byte at offset 4 is not the supported version.
    #[error("unsupported config version: {found}, expected {expected}")]
    UnsupportedVersion { found: u8, expected: u8 },

    /// The stream ended before a complete structure could be read.
    #[error("unexpected end of data while reading {0}")]
    Truncated(&'static str),

    /// The kind byte of a command is outside 0–7.
    #[error("unknown command kind: 0x{0:02X}")]
    UnknownCommandKind(u8),

    /// A command with a non-zero `b` operand cannot be written as text.
    #[error("{kind} command with operand b=0x{b:02X} has no text form")]
    OperandHasNoTextForm { kind: &'static str, b: u8 },

    /// A value does not fit the binary field it is written to.
    #[error("{field} does not fit the binary format: {value}")]
    Overflow { field: &'static str, value: usize },

    /// An INI line is neither a section header, a comment, nor `key = value`.
    #[error("line {line}: malformed line: {content:?}")]
    MalformedLine { line: usize, content: String },

    /// A `key = value` line appears before the first section header.
    #[error("line {line}: entry outside of any section")]
    NoSection { line: usize },

    /// The same section header appears twice.
    #[error("line {line}: duplicate section [{section}]")]
    DuplicateSection { line: usize, section: String },

    /// The same key appears twice in one INI section.
    #[error("line {line}: duplicate key {key:?} in section [{section}]")]
    DuplicateKey {
        line: usize,
        section: String,
        key: String,
    },

    /// Two entries in `[mappings]` describe the same chord.
    #[error("duplicate chord {0:?} in [mappings]")]
    DuplicateChord(String),

    /// A `[mappings]` entry has no command tokens.
    #[error("mapping {0:?} has no commands")]
    EmptyMapping(String),

    /// A value could not be parsed or is out of range for its key.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    /// A command kind that has no text form was asked to be written as text.
    #[error("command kind {0} has no text form")]
    NoTextForm(&'static str),
}

/// A name (text side) or code (binary side) with no entry in its table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnknownIdentifier {
    #[error("invalid key: {0}")]
    Key(String),

    #[error("unknown modifier: {0}")]
    Modifier(String),

    #[error("unknown system command: {0}")]
    SystemCommand(String),

    #[error("unknown mouse command: {0}")]
    MouseCommand(String),

    #[error("unknown application key: {0}")]
    ApplicationKey(String),

    #[error("unknown command type: {0}")]
    CommandType(String),

    #[error("unknown dedicated key: {0}")]
    DedicatedSlot(String),

    #[error("unknown dedicated action: {0}")]
    DedicatedAction(String),

    #[error("unknown nav direction: {0}")]
    NavDirection(String),

    /// A code read from a binary config that has no name in the given table.
    #[error("no {table} name for code 0x{code:04X}")]
    Code { table: &'static str, code: u16 },
}
