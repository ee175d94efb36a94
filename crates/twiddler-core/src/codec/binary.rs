//! Binary codec for the device-native config format (version 7).
//!
//! File layout:
//! ```text
//! 0x00  [header:0x80]
//!         0x04 version (7)
//!         0x05 flags   bit0 repeat .. bit7 sticky_shift
//!         0x06 nav     bits0-1 up direction, bit2 invert x, bits3-5 sensitivity
//!         0x08 mapping count (u16)
//!         0x0A idle time (u16)
//!         0x0C repeat delay (10 ms units)
//!         0x40 dedicated key actions [20]
//!         0x60 constant table [32]
//! 0x80  [chord:4][command:4] × count
//!       [out-of-line command lists, each terminated by 00 00 00 00]
//! ```
//! All multi-byte integers are little-endian.
//!
//! A mapping with more than one command stores a `CommandList` command whose
//! operand is an offset into the out-of-line area.  Identical serialized
//! lists are stored once and shared.

use std::collections::HashMap;
use std::io::{Cursor, ErrorKind, Read, Seek, SeekFrom, Write};

use tracing::debug;

use super::command::{decode, encode, COMMAND_LEN, END_OF_LIST};
use crate::error::{ConfigError, FormatError, Result};
use crate::model::{Action, Chord, Command, Config, Mapping, NavDirection, CONFIG_VERSION, DEDICATED_SLOTS};

pub const HEADER_LEN: usize = 0x80;
pub const MAPPING_LEN: usize = 8;

const VERSION_OFFSET: usize = 4;
const FLAGS_OFFSET: usize = 5;
const NAV_OFFSET: usize = 6;
const COUNT_OFFSET: usize = 8;
const IDLE_OFFSET: usize = 10;
const REPEAT_DELAY_OFFSET: usize = 12;
const DEDICATED_OFFSET: usize = 0x40;
const CONSTANT_TABLE_OFFSET: usize = 0x60;

/// Written verbatim at `0x60` on every write; ignored on read.
const CONSTANT_TABLE: [u8; 32] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0c, 0x0d, 0x0f, 0x11, 0x14,
    0x16, 0x18, 0x1a, 0x1d, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80,
];

// ── Public API ────────────────────────────────────────────────────────────────

/// Reads a complete config from `reader`, starting at its current position.
///
/// The stream position after a successful read is just past the mapping
/// table.
///
/// # Errors
///
/// - [`FormatError::UnsupportedVersion`] if the version byte is not 7; no
///   mapping is read in that case.
/// - [`FormatError::Truncated`] if the stream ends inside the header, the
///   mapping table, or an out-of-line list.
/// - [`FormatError::UnknownCommandKind`] for a malformed command.
pub fn read_config<R: Read + Seek>(reader: &mut R) -> Result<Config> {
    let start = reader.stream_position()?;

    let mut header = [0u8; HEADER_LEN];
    read_exact(reader, &mut header, "header")?;

    let version = header[VERSION_OFFSET];
    if version != CONFIG_VERSION {
        return Err(FormatError::UnsupportedVersion {
            found: version,
            expected: CONFIG_VERSION,
        }
        .into());
    }

    let mut config = decode_header(&header);
    let count = usize::from(u16_at(&header, COUNT_OFFSET));
    let list_base = start + (HEADER_LEN + count * MAPPING_LEN) as u64;

    config.mappings.reserve(count);
    for _ in 0..count {
        let mut record = [0u8; MAPPING_LEN];
        read_exact(reader, &mut record, "mapping table")?;

        let chord = Chord::from_bits(u32::from_le_bytes([record[0], record[1], record[2], record[3]]));
        let command = decode([record[4], record[5], record[6], record[7]])?;

        let commands = match command.action {
            Action::CommandList(offset) => {
                let resume = reader.stream_position()?;
                reader.seek(SeekFrom::Start(list_base + u64::from(offset)))?;
                let list = read_command_list(reader)?;
                reader.seek(SeekFrom::Start(resume))?;
                list
            }
            _ => vec![command],
        };
        config.mappings.push(Mapping::new(chord, commands));
    }

    debug!(mappings = count, "read binary config");
    Ok(config)
}

/// Writes `config` to `writer`, starting at its current position.
///
/// Mappings are written sorted by chord bitmask.  The version byte is always
/// 7 regardless of `config.version`.  On success the stream is positioned at
/// the end of the written data.
///
/// # Errors
///
/// [`FormatError::Overflow`] if there are more than 65535 mappings or the
/// out-of-line area outgrows a 16-bit offset; I/O errors from `writer` are
/// propagated unchanged.
pub fn write_config<W: Write + Seek>(config: &Config, writer: &mut W) -> Result<()> {
    let start = writer.stream_position()?;
    let count = u16::try_from(config.mappings.len()).map_err(|_| FormatError::Overflow {
        field: "mapping count",
        value: config.mappings.len(),
    })?;

    writer.write_all(&encode_header(config, count))?;

    let list_base = start + (HEADER_LEN + config.mappings.len() * MAPPING_LEN) as u64;
    let mut list_end = 0usize;
    let mut interned: HashMap<Vec<u8>, u16> = HashMap::new();

    let mut sorted: Vec<&Mapping> = config.mappings.iter().collect();
    sorted.sort_by_key(|m| m.chord.to_bits());

    for mapping in sorted {
        writer.write_all(&mapping.chord.to_bits().to_le_bytes())?;

        if let [single] = mapping.commands.as_slice() {
            writer.write_all(&encode(single))?;
            continue;
        }

        let bytes = command_list_bytes(&mapping.commands);
        let offset = match interned.get(&bytes) {
            Some(offset) => *offset,
            None => {
                let offset = u16::try_from(list_end).map_err(|_| FormatError::Overflow {
                    field: "command list offset",
                    value: list_end,
                })?;
                let resume = writer.stream_position()?;
                writer.seek(SeekFrom::Start(list_base + list_end as u64))?;
                writer.write_all(&bytes)?;
                writer.seek(SeekFrom::Start(resume))?;

                list_end += bytes.len();
                interned.insert(bytes, offset);
                offset
            }
        };
        writer.write_all(&encode(&Command::list(offset)))?;
    }

    writer.seek(SeekFrom::Start(list_base + list_end as u64))?;
    debug!(
        mappings = count,
        lists = interned.len(),
        list_bytes = list_end,
        "wrote binary config"
    );
    Ok(())
}

/// Encodes `config` into a new buffer.
///
/// # Errors
///
/// See [`write_config`].
pub fn to_bytes(config: &Config) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_config(config, &mut cursor)?;
    Ok(cursor.into_inner())
}

/// Decodes a config from an in-memory buffer.
///
/// # Errors
///
/// See [`read_config`].
pub fn from_bytes(bytes: &[u8]) -> Result<Config> {
    read_config(&mut Cursor::new(bytes))
}

// ── Header ────────────────────────────────────────────────────────────────────

fn decode_header(header: &[u8; HEADER_LEN]) -> Config {
    let flags = header[FLAGS_OFFSET];
    let nav = header[NAV_OFFSET];
    let bit = |n: u8| flags & (1 << n) != 0;

    let mut dedicated = [0u8; DEDICATED_SLOTS];
    dedicated.copy_from_slice(&header[DEDICATED_OFFSET..DEDICATED_OFFSET + DEDICATED_SLOTS]);

    Config {
        version: header[VERSION_OFFSET],
        repeat: bit(0),
        bluetooth: bit(1),
        direct: bit(2),
        haptic: bit(3),
        sticky_num: bit(4),
        sticky_alt: bit(5),
        sticky_ctrl: bit(6),
        sticky_shift: bit(7),
        nav_up_direction: NavDirection::from_bits(nav),
        nav_invert_x: nav & (1 << 2) != 0,
        nav_sensitivity: (nav >> 3) & 0x07,
        idle_time: u16_at(header, IDLE_OFFSET),
        repeat_delay: header[REPEAT_DELAY_OFFSET],
        dedicated,
        mappings: Vec::new(),
    }
}

fn encode_header(config: &Config, count: u16) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];

    header[VERSION_OFFSET] = CONFIG_VERSION;
    header[FLAGS_OFFSET] = [
        config.repeat,
        config.bluetooth,
        config.direct,
        config.haptic,
        config.sticky_num,
        config.sticky_alt,
        config.sticky_ctrl,
        config.sticky_shift,
    ]
    .iter()
    .enumerate()
    .fold(0u8, |acc, (i, set)| acc | (u8::from(*set) << i));
    header[NAV_OFFSET] = (config.nav_up_direction as u8 & 0x03)
        | (u8::from(config.nav_invert_x) << 2)
        | ((config.nav_sensitivity & 0x07) << 3);

    header[COUNT_OFFSET..COUNT_OFFSET + 2].copy_from_slice(&count.to_le_bytes());
    header[IDLE_OFFSET..IDLE_OFFSET + 2].copy_from_slice(&config.idle_time.to_le_bytes());
    header[REPEAT_DELAY_OFFSET] = config.repeat_delay;

    header[DEDICATED_OFFSET..DEDICATED_OFFSET + DEDICATED_SLOTS].copy_from_slice(&config.dedicated);
    header[CONSTANT_TABLE_OFFSET..HEADER_LEN].copy_from_slice(&CONSTANT_TABLE);
    header
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn u16_at(buf: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

/// Fills `buf`, mapping a short read to [`FormatError::Truncated`].
fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], what: &'static str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => ConfigError::Format(FormatError::Truncated(what)),
        _ => ConfigError::Io(e),
    })
}

fn read_command_list<R: Read>(reader: &mut R) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    loop {
        let mut raw = [0u8; COMMAND_LEN];
        read_exact(reader, &mut raw, "command list")?;
        if raw == END_OF_LIST {
            return Ok(commands);
        }
        commands.push(decode(raw)?);
    }
}

/// Commands back to back, then the sentinel.
fn command_list_bytes(commands: &[Command]) -> Vec<u8> {
    let mut buf = Vec::with_capacity((commands.len() + 1) * COMMAND_LEN);
    for cmd in commands {
        buf.extend_from_slice(&encode(cmd));
    }
    buf.extend_from_slice(&END_OF_LIST);
    buf
}

// ── Tests ─────────────────────────────────────────────────────────────────────
