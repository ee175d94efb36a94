//! INI text format.
//!
//! ```ini
//! [config]
//! repeat = true
//! nav_up_direction = north
//! repeat_delay = 1000
//!
//! [dedicated]
//! T1 = lctrl
//!
//! [mappings]
//! F0R = a
//! T1F2LM = lctrl+c delay:100 system:sleep
//! ```
//!
//! Chord notation is described in [`super::notation`], command tokens in
//! [`super::command`].

use std::collections::HashSet;
use std::io::{Read, Write};

use tracing::{debug, warn};

use super::command;
use super::ini::{self, IniEntry, IniSection};
use super::notation::{chord_from_text, chord_to_text};
use super::tables::{code_of, dedicated_slot, name_of, DEDICATED_ACTIONS, DEDICATED_ORDER};
use crate::error::{ConfigError, FormatError, Result, UnknownIdentifier};
use crate::layout::{normalize_name, EmbeddedLayouts, LayoutDatabase, LayoutTranslator};
use crate::model::{Config, Mapping, NavDirection};

/// Longest repeat delay the device can store, in milliseconds.
const MAX_REPEAT_DELAY_MS: u32 = 2550;

/// What [`TextReader`] does with a name it cannot resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownPolicy {
    /// Fail the whole read.
    #[default]
    Abort,
    /// Log a warning and drop the offending token or entry.
    Skip,
}

// ── Reader ────────────────────────────────────────────────────────────────────

/// Reads the text format into a [`Config`].
pub struct TextReader<'t, D: LayoutDatabase = EmbeddedLayouts> {
    translator: &'t LayoutTranslator<D>,
    layout: String,
    policy: UnknownPolicy,
}

impl<'t, D: LayoutDatabase> TextReader<'t, D> {
    pub fn new(translator: &'t LayoutTranslator<D>, layout: &str) -> Self {
        Self {
            translator,
            layout: layout.to_string(),
            policy: UnknownPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: UnknownPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reads a whole document from `reader`.
    ///
    /// # Errors
    ///
    /// See [`TextReader::read_str`]; I/O and UTF-8 failures are
    /// [`ConfigError::Io`].
    pub fn read<R: Read>(&self, mut reader: R) -> Result<Config> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        self.read_str(&text)
    }

    /// Parses a complete text config.
    ///
    /// Absent keys keep their [`Config::default`] values.  Unknown sections
    /// and unknown `[config]` keys are logged and ignored.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::LayoutNotFound`] before anything is parsed.
    /// - [`FormatError`] for malformed INI, out-of-range values, duplicate
    ///   chords, or mappings without commands.
    /// - [`ConfigError::UnknownIdentifier`] for unresolvable names, unless the
    ///   policy is [`UnknownPolicy::Skip`].
    pub fn read_str(&self, text: &str) -> Result<Config> {
        self.translator.require(&self.layout)?;
        let doc = ini::parse(text)?;

        let mut config = Config::default();
        for section in &doc.sections {
            match section.name.as_str() {
                "config" => read_settings(section, &mut config)?,
                "dedicated" => self.read_dedicated(section, &mut config)?,
                "mappings" => config.mappings = self.read_mappings(section)?,
                other => warn!(section = other, line = section.line, "ignoring unknown section"),
            }
        }

        debug!(mappings = config.mappings.len(), layout = %self.layout, "read text config");
        Ok(config)
    }

    /// Applies the unknown-identifier policy to one fallible step.
    ///
    /// Returns `Ok(None)` when the step failed on an unknown name and the
    /// policy says to skip it.
    fn tolerate<T>(&self, entry: &IniEntry, result: Result<T>) -> Result<Option<T>> {
        match (result, self.policy) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(ConfigError::UnknownIdentifier(err)), UnknownPolicy::Skip) => {
                warn!(line = entry.line, key = %entry.key, %err, "skipping unknown identifier");
                Ok(None)
            }
            (Err(err), _) => Err(err),
        }
    }

    fn read_dedicated(&self, section: &IniSection, config: &mut Config) -> Result<()> {
        for entry in &section.entries {
            let resolved = self.tolerate(entry, resolve_dedicated(entry))?;
            if let Some((slot, action)) = resolved {
                config.dedicated[slot] = action;
            }
        }
        Ok(())
    }

    fn read_mappings(&self, section: &IniSection) -> Result<Vec<Mapping>> {
        let mut seen = HashSet::new();
        let mut mappings = Vec::with_capacity(section.entries.len());

        for entry in &section.entries {
            let chord = chord_from_text(&entry.key);
            if seen.contains(&chord.to_bits()) {
                return Err(FormatError::DuplicateChord(entry.key.clone()).into());
            }

            let tokens: Vec<&str> = entry.value.split_whitespace().collect();
            if tokens.is_empty() {
                return Err(FormatError::EmptyMapping(entry.key.clone()).into());
            }

            let mut commands = Vec::with_capacity(tokens.len());
            for token in tokens {
                let parsed = command::from_text(token, self.translator, &self.layout);
                if let Some(cmd) = self.tolerate(entry, parsed)? {
                    commands.push(cmd);
                }
            }

            if commands.is_empty() {
                warn!(line = entry.line, chord = %entry.key, "dropping mapping with no usable commands");
                continue;
            }
            // Only kept mappings claim their chord.
            seen.insert(chord.to_bits());
            mappings.push(Mapping::new(chord, commands));
        }
        Ok(mappings)
    }
}

fn resolve_dedicated(entry: &IniEntry) -> Result<(usize, u8)> {
    let slot = dedicated_slot(&entry.key).ok_or_else(|| UnknownIdentifier::DedicatedSlot(entry.key.clone()))?;
    let action_name = normalize_name(&entry.value);
    let action = code_of(DEDICATED_ACTIONS, &action_name).ok_or(UnknownIdentifier::DedicatedAction(action_name))?;
    Ok((slot, action))
}

fn read_settings(section: &IniSection, config: &mut Config) -> Result<()> {
    for entry in &section.entries {
        let value = entry.value.as_str();
        match entry.key.as_str() {
            "repeat" => config.repeat = parse_bool(entry)?,
            "bluetooth" => config.bluetooth = parse_bool(entry)?,
            "direct" => config.direct = parse_bool(entry)?,
            "haptic" => config.haptic = parse_bool(entry)?,
            "sticky_num" => config.sticky_num = parse_bool(entry)?,
            "sticky_alt" => config.sticky_alt = parse_bool(entry)?,
            "sticky_ctrl" => config.sticky_ctrl = parse_bool(entry)?,
            "sticky_shift" => config.sticky_shift = parse_bool(entry)?,
            "nav_up_direction" => {
                let name = normalize_name(value);
                config.nav_up_direction =
                    NavDirection::from_name(&name).ok_or(UnknownIdentifier::NavDirection(name))?;
            }
            "nav_invert_x" => config.nav_invert_x = parse_bool(entry)?,
            "nav_sensitivity" => {
                config.nav_sensitivity = value
                    .parse::<u8>()
                    .ok()
                    .filter(|s| *s <= 7)
                    .ok_or_else(|| invalid(entry))?;
            }
            "idle_time" => config.idle_time = value.parse().map_err(|_| invalid(entry))?,
            "repeat_delay" => {
                let ms = value
                    .parse::<u32>()
                    .ok()
                    .filter(|ms| *ms <= MAX_REPEAT_DELAY_MS)
                    .ok_or_else(|| invalid(entry))?;
                config.repeat_delay = u8::try_from(ms / 10).map_err(|_| invalid(entry))?;
            }
            other => warn!(key = other, line = entry.line, "ignoring unknown [config] key"),
        }
    }
    Ok(())
}

fn parse_bool(entry: &IniEntry) -> Result<bool> {
    match entry.value.to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(true),
        "0" | "no" | "false" | "off" => Ok(false),
        _ => Err(invalid(entry).into()),
    }
}

fn invalid(entry: &IniEntry) -> FormatError {
    FormatError::InvalidValue {
        key: entry.key.clone(),
        value: entry.value.clone(),
    }
}

// ── Writer ────────────────────────────────────────────────────────────────────

/// Writes a [`Config`] in the text format.
pub struct TextWriter<'t, D: LayoutDatabase = EmbeddedLayouts> {
    translator: &'t LayoutTranslator<D>,
    layout: String,
}

impl<'t, D: LayoutDatabase> TextWriter<'t, D> {
    pub fn new(translator: &'t LayoutTranslator<D>, layout: &str) -> Self {
        Self {
            translator,
            layout: layout.to_string(),
        }
    }

    /// Writes `config` to `writer`.
    ///
    /// # Errors
    ///
    /// See [`TextWriter::write_string`]; write failures are
    /// [`ConfigError::Io`].
    pub fn write<W: Write>(&self, config: &Config, mut writer: W) -> Result<()> {
        let text = self.write_string(config)?;
        writer.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Renders `config` as a text document.
    ///
    /// Mappings are written in their in-memory order.  A mapping with no
    /// commands cannot be expressed and is skipped with a warning.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::LayoutNotFound`] before anything is rendered.
    /// - [`UnknownIdentifier::Code`] for a code with no name.
    /// - [`FormatError::NoTextForm`] for `None` or `CommandList` commands.
    pub fn write_string(&self, config: &Config) -> Result<String> {
        self.translator.require(&self.layout)?;

        let mut lines = vec![
            "[config]".to_string(),
            format!("repeat = {}", config.repeat),
            format!("bluetooth = {}", config.bluetooth),
            format!("direct = {}", config.direct),
            format!("haptic = {}", config.haptic),
            format!("sticky_num = {}", config.sticky_num),
            format!("sticky_alt = {}", config.sticky_alt),
            format!("sticky_ctrl = {}", config.sticky_ctrl),
            format!("sticky_shift = {}", config.sticky_shift),
            format!("nav_up_direction = {}", config.nav_up_direction.name()),
            format!("nav_invert_x = {}", config.nav_invert_x),
            format!("nav_sensitivity = {}", config.nav_sensitivity),
            format!("idle_time = {}", config.idle_time),
            format!("repeat_delay = {}", u32::from(config.repeat_delay) * 10),
            String::new(),
            "[dedicated]".to_string(),
        ];

        for (slot, &code) in DEDICATED_ORDER.iter().zip(config.dedicated.iter()) {
            if code == 0 {
                continue;
            }
            let action = name_of(DEDICATED_ACTIONS, code).ok_or(UnknownIdentifier::Code {
                table: "dedicated",
                code: u16::from(code),
            })?;
            lines.push(format!("{} = {action}", slot.to_uppercase()));
        }

        lines.push(String::new());
        lines.push("[mappings]".to_string());
        for mapping in &config.mappings {
            let notation = chord_to_text(&mapping.chord);
            if mapping.commands.is_empty() {
                warn!(chord = %notation, "skipping mapping with no commands");
                continue;
            }
            let tokens = mapping
                .commands
                .iter()
                .map(|cmd| command::to_text(cmd, self.translator, &self.layout))
                .collect::<Result<Vec<_>>>()?;
            lines.push(format!("{notation} = {}", tokens.join(" ")));
        }

        let mut text = lines.join("\n");
        text.push('\n');
        Ok(text)
    }
}
