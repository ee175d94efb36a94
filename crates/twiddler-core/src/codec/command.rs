//! Single-command encoding, binary and text.
//!
//! Binary form (little-endian):
//! ```text
//! [kind:1][a:2][b:1]
//! ```
//! `00 00 00 00` is the end-of-list sentinel.
//!
//! Text form is `type:value` or a bare keyboard value:
//!
//! | type                | value                                   |
//! |---------------------|-----------------------------------------|
//! | `system` / `sys`    | system command name                     |
//! | `keyboard` / `kb`   | `mod+mod+key`, a macro name, or a char  |
//! | `mouse` / `ms`      | mouse command name                      |
//! | `application`/`con` | consumer-page key name                  |
//! | `delay` / `dly`     | milliseconds, stored in 10 ms units     |
//! | `haptic` / `hap`    | hex byte                                |

use tracing::trace;

use super::tables::{
    char_name, code_of, collapse_macro, expand_macro, modifier_flag, name_of, MODIFIERS,
    MOUSE_COMMANDS, SYSTEM_COMMANDS,
};
use crate::error::{ConfigError, FormatError, Result, UnknownIdentifier};
use crate::layout::{normalize_name, LayoutDatabase, LayoutTranslator};
use crate::model::{Action, Command, CommandKind, KeyStroke, ModifierFlags};

/// Size of one encoded command.
pub const COMMAND_LEN: usize = 4;

/// Terminates an out-of-line command list.
pub const END_OF_LIST: [u8; COMMAND_LEN] = [0; COMMAND_LEN];

// ── Binary ────────────────────────────────────────────────────────────────────

pub fn encode(cmd: &Command) -> [u8; COMMAND_LEN] {
    let a = cmd.operand().to_le_bytes();
    [cmd.kind() as u8, a[0], a[1], cmd.b]
}

/// Decodes one command.  The `b` byte is kept as stored.
///
/// # Errors
///
/// [`FormatError::UnknownCommandKind`] for a kind byte above 7.
pub fn decode(bytes: [u8; COMMAND_LEN]) -> std::result::Result<Command, FormatError> {
    let kind = CommandKind::try_from(bytes[0]).map_err(|()| FormatError::UnknownCommandKind(bytes[0]))?;
    Ok(Command::from_parts(kind, u16::from_le_bytes([bytes[1], bytes[2]]), bytes[3]))
}

// ── Text ──────────────────────────────────────────────────────────────────────

/// Parses one command token using `layout` for key names.
///
/// # Errors
///
/// [`ConfigError::UnknownIdentifier`] for names with no code,
/// [`FormatError::InvalidValue`] for malformed delay/haptic values, and
/// [`ConfigError::LayoutNotFound`] if `layout` does not exist.
pub fn from_text<D: LayoutDatabase>(
    token: &str,
    translator: &LayoutTranslator<D>,
    layout: &str,
) -> Result<Command> {
    let token = token.trim();
    // A lone ':' is a key, not an empty type prefix.
    let (kind, value) = match token.split_once(':') {
        Some((kind, value)) if token.chars().count() > 1 => (normalize_name(kind), value),
        _ => ("keyboard".to_string(), token),
    };

    let cmd = match kind.as_str() {
        "system" | "sys" => {
            let name = normalize_name(value);
            let code = code_of(SYSTEM_COMMANDS, &name).ok_or(UnknownIdentifier::SystemCommand(name))?;
            Command::system(code)
        }
        "keyboard" | "kb" => Command::new(Action::Keyboard(keystroke_from_text(value, translator, layout)?)),
        "mouse" | "ms" => {
            let name = normalize_name(value);
            let code = code_of(MOUSE_COMMANDS, &name).ok_or(UnknownIdentifier::MouseCommand(name))?;
            Command::mouse(code)
        }
        "application" | "con" => {
            let names = translator
                .backward(layout, true)
                .ok_or_else(|| ConfigError::LayoutNotFound(layout.to_string()))?;
            let name = normalize_name(value);
            let code = names
                .get(&name)
                .copied()
                .ok_or(UnknownIdentifier::ApplicationKey(name))?;
            Command::application(code)
        }
        "delay" | "dly" => {
            let ms: u32 = value.trim().parse().map_err(|_| invalid("delay", value))?;
            let units = u16::try_from(ms / 10).map_err(|_| invalid("delay", value))?;
            Command::delay(units)
        }
        "haptic" | "hap" => {
            let pattern = u8::from_str_radix(value.trim(), 16).map_err(|_| invalid("haptic", value))?;
            Command::haptic(u16::from(pattern))
        }
        _ => return Err(UnknownIdentifier::CommandType(kind).into()),
    };
    trace!(token, ?cmd, "parsed command");
    Ok(cmd)
}

/// Formats one command as a text token.
///
/// # Errors
///
/// [`UnknownIdentifier::Code`] for a code with no name,
/// [`FormatError::NoTextForm`] for `None` and `CommandList`,
/// [`FormatError::OperandHasNoTextForm`] when `b` is set, and
/// [`ConfigError::LayoutNotFound`] if `layout` does not exist.
pub fn to_text<D: LayoutDatabase>(
    cmd: &Command,
    translator: &LayoutTranslator<D>,
    layout: &str,
) -> Result<String> {
    if cmd.b != 0 {
        return Err(FormatError::OperandHasNoTextForm {
            kind: cmd.kind().name(),
            b: cmd.b,
        }
        .into());
    }
    let text = match cmd.action {
        Action::System(code) => {
            let name = name_of(SYSTEM_COMMANDS, code).ok_or(UnknownIdentifier::Code {
                table: "system",
                code,
            })?;
            format!("system:{name}")
        }
        Action::Keyboard(stroke) => keystroke_to_text(stroke, translator, layout)?,
        Action::Mouse(code) => {
            let name = name_of(MOUSE_COMMANDS, code).ok_or(UnknownIdentifier::Code { table: "mouse", code })?;
            format!("mouse:{name}")
        }
        Action::Application(code) => {
            let names = translator
                .forward(layout, true)
                .ok_or_else(|| ConfigError::LayoutNotFound(layout.to_string()))?;
            let name = names.get(&code).ok_or(UnknownIdentifier::Code {
                table: "application",
                code,
            })?;
            format!("application:{name}")
        }
        Action::Delay(units) => format!("delay:{}", u32::from(units) * 10),
        Action::Haptic(pattern) => format!("haptic:{pattern:02x}"),
        Action::None(_) | Action::CommandList(_) => {
            return Err(FormatError::NoTextForm(cmd.kind().name()).into())
        }
    };
    Ok(text)
}

fn invalid(key: &str, value: &str) -> FormatError {
    FormatError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Resolves `mod+mod+key`, a macro name, or a single character.
fn keystroke_from_text<D: LayoutDatabase>(
    value: &str,
    translator: &LayoutTranslator<D>,
    layout: &str,
) -> Result<KeyStroke> {
    let value = value.trim();
    let mut chars = value.chars();
    let named = match (chars.next(), chars.next()) {
        (Some(c), None) => char_name(c).unwrap_or(value),
        _ => value,
    };
    let expanded = expand_macro(named)
        .or_else(|| expand_macro(&normalize_name(named)))
        .map(|e| e.into_owned())
        .unwrap_or_else(|| named.to_string());

    let mut parts: Vec<&str> = expanded.split('+').collect();
    let key = parts.pop().unwrap_or_default();

    let mut modifiers = 0u8;
    for part in parts {
        let name = normalize_name(part);
        modifiers |= modifier_flag(&name).ok_or(UnknownIdentifier::Modifier(name))?;
    }

    let names = translator
        .backward(layout, false)
        .ok_or_else(|| ConfigError::LayoutNotFound(layout.to_string()))?;
    let keycode = names
        .get(&normalize_name(key))
        .and_then(|code| u8::try_from(*code).ok())
        .ok_or_else(|| UnknownIdentifier::Key(value.to_string()))?;

    Ok(KeyStroke::new(keycode, modifiers))
}

fn keystroke_to_text<D: LayoutDatabase>(
    stroke: KeyStroke,
    translator: &LayoutTranslator<D>,
    layout: &str,
) -> Result<String> {
    let names = translator
        .forward(layout, false)
        .ok_or_else(|| ConfigError::LayoutNotFound(layout.to_string()))?;
    let key = names
        .get(&u16::from(stroke.keycode))
        .ok_or(UnknownIdentifier::Code {
            table: "keyboard",
            code: u16::from(stroke.keycode),
        })?;

    let mut text = modifier_prefix(stroke.modifiers);
    text.push_str(key);
    Ok(match collapse_macro(&text) {
        Some(name) => name.into_owned(),
        None => text,
    })
}

/// `lctrl+rshift+` style prefix, modifiers in canonical order.
fn modifier_prefix(modifiers: ModifierFlags) -> String {
    MODIFIERS
        .iter()
        .filter(|(_, flag)| modifiers.contains(*flag))
        .map(|(name, _)| format!("{name}+"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::EmbeddedLayouts;

    fn translator() -> LayoutTranslator {
        LayoutTranslator::new(EmbeddedLayouts::builtin().unwrap())
    }

    fn parse(token: &str) -> Result<Command> {
        from_text(token, &translator(), "default")
    }

    fn format(cmd: Command) -> String {
        to_text(&cmd, &translator(), "default").unwrap()
    }

    // ── Binary ───────────────────────────────────────────────────────────────

    #[test]
    fn test_encode_is_little_endian() {
        assert_eq!(encode(&Command::key(0x04, 0x20)), [0x02, 0x20, 0x04, 0x00]);
        assert_eq!(encode(&Command::list(0x0110)), [0x07, 0x10, 0x01, 0x00]);
        assert_eq!(encode(&Command::with_b(Action::Haptic(0x10), 0x05)), [0x06, 0x10, 0x00, 0x05]);
    }

    #[test]
    fn test_decode_inverts_encode() {
        for cmd in [
            Command::system(0x311),
            Command::key(0x28, ModifierFlags::LEFT_CTRL),
            Command::mouse(4),
            Command::application(0x192),
            Command::delay(7),
            Command::haptic(0x7F),
        ] {
            assert_eq!(decode(encode(&cmd)), Ok(cmd));
        }
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        assert_eq!(decode([0x08, 0, 0, 0]), Err(FormatError::UnknownCommandKind(8)));
    }

    #[test]
    fn test_decode_keeps_nonzero_b() {
        let cmd = decode([0x02, 0x00, 0x04, 0x01]).unwrap();

        assert_eq!(cmd, Command::with_b(Action::Keyboard(KeyStroke::new(0x04, 0)), 0x01));
        assert_eq!(encode(&cmd), [0x02, 0x00, 0x04, 0x01]);
    }

    #[test]
    fn test_sentinel_decodes_to_none_zero() {
        assert_eq!(decode(END_OF_LIST), Ok(Command::new(Action::None(0))));
    }

    // ── Text parsing ─────────────────────────────────────────────────────────

    #[test]
    fn test_bare_token_is_keyboard() {
        assert_eq!(parse("a").unwrap(), Command::key(0x04, 0));
        assert_eq!(parse("kb:a").unwrap(), Command::key(0x04, 0));
        assert_eq!(parse("keyboard:Enter").unwrap(), Command::key(0x28, 0));
    }

    #[test]
    fn test_modifiers_accumulate() {
        let cmd = parse("lctrl+lalt+delete").unwrap();
        assert_eq!(
            cmd,
            Command::key(0x4C, ModifierFlags::LEFT_CTRL | ModifierFlags::LEFT_ALT)
        );
    }

    #[test]
    fn test_uppercase_letter_is_shifted() {
        assert_eq!(parse("Q").unwrap(), Command::key(0x14, ModifierFlags::RIGHT_SHIFT));
    }

    #[test]
    fn test_punctuation_char_expands_through_macro() {
        assert_eq!(parse("!").unwrap(), Command::key(0x1E, ModifierFlags::RIGHT_SHIFT));
        assert_eq!(parse("+").unwrap(), Command::key(0x2E, ModifierFlags::RIGHT_SHIFT));
        assert_eq!(parse(":").unwrap(), Command::key(0x33, ModifierFlags::RIGHT_SHIFT));
        assert_eq!(parse("kb::").unwrap(), Command::key(0x33, ModifierFlags::RIGHT_SHIFT));
        assert_eq!(parse(",").unwrap(), Command::key(0x36, 0));
    }

    #[test]
    fn test_question_and_pipe_use_their_own_keys() {
        assert_eq!(parse("question").unwrap(), Command::key(0x38, ModifierFlags::RIGHT_SHIFT));
        assert_eq!(parse("pipe").unwrap(), Command::key(0x31, ModifierFlags::RIGHT_SHIFT));
    }

    #[test]
    fn test_unknown_key_is_invalid_key() {
        let err = parse("kb:nope").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownIdentifier(UnknownIdentifier::Key(ref k)) if k == "nope"
        ));
    }

    #[test]
    fn test_unknown_modifier_is_rejected() {
        let err = parse("hyper+a").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownIdentifier(UnknownIdentifier::Modifier(_))
        ));
    }

    #[test]
    fn test_system_and_mouse_names() {
        assert_eq!(parse("sys:Select Config 3").unwrap(), Command::system(0x311));
        assert_eq!(parse("ms:left").unwrap(), Command::mouse(2));
        assert!(parse("system:reboot").is_err());
        assert!(parse("mouse:side").is_err());
    }

    #[test]
    fn test_application_uses_consumer_table() {
        assert_eq!(parse("con:volume_up").unwrap(), Command::application(0xE9));
        assert_eq!(parse("application:Calc").unwrap(), Command::application(0x192));
    }

    #[test]
    fn test_delay_truncates_to_ten_ms_units() {
        assert_eq!(parse("delay:250").unwrap(), Command::delay(25));
        assert_eq!(parse("dly:259").unwrap(), Command::delay(25));
        assert!(parse("delay:fast").is_err());
        assert!(parse("delay:900000").is_err());
    }

    #[test]
    fn test_haptic_is_hex_byte() {
        assert_eq!(parse("hap:7f").unwrap(), Command::haptic(0x7F));
        assert!(parse("haptic:1ff").is_err());
    }

    #[test]
    fn test_unknown_type_prefix() {
        let err = parse("joystick:up").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownIdentifier(UnknownIdentifier::CommandType(ref t)) if t == "joystick"
        ));
    }

    #[test]
    fn test_missing_layout_is_reported() {
        let err = from_text("a", &translator(), "klingon").unwrap_err();
        assert!(matches!(err, ConfigError::LayoutNotFound(_)));
    }

    // ── Text formatting ──────────────────────────────────────────────────────

    #[test]
    fn test_format_collapses_macros() {
        assert_eq!(format(Command::key(0x1E, ModifierFlags::RIGHT_SHIFT)), "exclamation");
        assert_eq!(format(Command::key(0x04, ModifierFlags::RIGHT_SHIFT)), "A");
        assert_eq!(format(Command::key(0x04, ModifierFlags::LEFT_SHIFT)), "lshift+a");
    }

    #[test]
    fn test_format_orders_modifiers() {
        let cmd = Command::key(
            0x4C,
            ModifierFlags::RIGHT_ALT | ModifierFlags::LEFT_CTRL | ModifierFlags::LEFT_META,
        );
        assert_eq!(format(cmd), "lctrl+lmeta+ralt+delete");
    }

    #[test]
    fn test_format_non_keyboard_kinds() {
        assert_eq!(format(Command::system(0x0E)), "system:cycle_config");
        assert_eq!(format(Command::mouse(0)), "mouse:release");
        assert_eq!(format(Command::application(0xE9)), "application:volume_up");
        assert_eq!(format(Command::delay(25)), "delay:250");
        assert_eq!(format(Command::haptic(0x0A)), "haptic:0a");
    }

    #[test]
    fn test_command_list_has_no_text_form() {
        let err = to_text(&Command::list(0), &translator(), "default").unwrap_err();
        assert!(matches!(err, ConfigError::Format(FormatError::NoTextForm("command_list"))));
    }

    #[test]
    fn test_nonzero_b_has_no_text_form() {
        let cmd = Command::with_b(Action::Haptic(0x10), 0x05);

        let err = to_text(&cmd, &translator(), "default").unwrap_err();

        assert!(matches!(
            err,
            ConfigError::Format(FormatError::OperandHasNoTextForm { kind: "haptic", b: 0x05 })
        ));
    }

    #[test]
    fn test_unnamed_code_is_reported() {
        let err = to_text(&Command::system(0x99), &translator(), "default").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::UnknownIdentifier(UnknownIdentifier::Code { table: "system", code: 0x99 })
        ));
    }

    #[test]
    fn test_text_round_trip_for_canonical_forms() {
        let t = translator();
        for cmd in [
            Command::system(0x211),
            Command::key(0x2F, ModifierFlags::RIGHT_SHIFT),
            Command::key(0x2C, ModifierFlags::LEFT_CTRL | ModifierFlags::RIGHT_META),
            Command::mouse(4),
            Command::application(0x223),
            Command::delay(100),
            Command::haptic(0xFF),
        ] {
            let text = to_text(&cmd, &t, "default").unwrap();
            assert_eq!(from_text(&text, &t, "default").unwrap(), cmd, "{text}");
        }
    }

    #[test]
    fn test_layout_changes_key_names() {
        let t = translator();
        assert_eq!(from_text("z", &t, "de_de").unwrap(), Command::key(0x1C, 0));
        assert_eq!(to_text(&Command::key(0x1C, 0), &t, "de_de").unwrap(), "z");
        assert_eq!(to_text(&Command::key(0x1C, 0), &t, "default").unwrap(), "y");
    }
}
