//! Fixed name ↔ code tables shared by the text codec, the log codec and the
//! `dump` command.
//!
//! Everything here is firmware-defined and independent of keyboard layout.
//! Layout-dependent key names live in [`crate::layout`].

use std::borrow::Cow;

use crate::model::DEDICATED_SLOTS;

/// Dedicated key slot names, in the order their action bytes are stored at
/// header offset `0x40`.
pub const DEDICATED_ORDER: [&str; DEDICATED_SLOTS] = [
    "t1", "f1r", "f1m", "f1l", "t2", "f2r", "f2m", "f2l", "t3", "f3r", "f3m", "f3l", "t4",
    "f4r", "f4m", "f4l", "f0r", "f0m", "f0l", "t0",
];

/// Actions a dedicated key can be bound to.  Code 0 means "unset".
pub const DEDICATED_ACTIONS: &[(&str, u8)] = &[
    ("lctrl", 0x01),
    ("lshift", 0x02),
    ("lalt", 0x03),
    ("lmeta", 0x04),
    ("rctrl", 0x05),
    ("rshift", 0x06),
    ("ralt", 0x07),
    ("rmeta", 0x08),
    ("mouse_left", 0x09),
    ("mouse_right", 0x0A),
    ("mouse_middle", 0x0B),
    ("sticky", 0x0C),
    ("hyper", 0x0D),
];

/// Keyboard modifier names in the order they are written.
pub const MODIFIERS: [(&str, u8); 8] = [
    ("lctrl", 0x01),
    ("lshift", 0x02),
    ("lalt", 0x04),
    ("lmeta", 0x08),
    ("rctrl", 0x10),
    ("rshift", 0x20),
    ("ralt", 0x40),
    ("rmeta", 0x80),
];

pub const SYSTEM_COMMANDS: &[(&str, u16)] = &[
    ("sleep", 0x01),
    ("print_system_info", 0x02),
    ("toggle_test_mode", 0x03),
    ("show_cycle_config", 0x04),
    ("show_cycle_bluetooth_host", 0x05),
    ("clear_bluetooth_hosts", 0x06),
    ("toggle_untethered_mode", 0x07),
    ("clear_untethered_mode", 0x08),
    ("play_untethered_mode", 0x09),
    ("show_battery_level", 0x0A),
    ("show_cycle_nav_mode", 0x0B),
    ("show_keyboard_leds", 0x0C),
    ("print_system_stats", 0x0D),
    ("cycle_config", 0x0E),
    ("cycle_bluetooth_host", 0x0F),
    ("cycle_nav_mode", 0x10),
    ("select_config_0", 0x11),
    ("select_bluetooth_host", 0x12),
    ("select_nav_mode", 0x13),
    ("select_config_1", 0x111),
    ("select_config_2", 0x211),
    ("select_config_3", 0x311),
];

pub const MOUSE_COMMANDS: &[(&str, u16)] = &[
    ("release", 0x00),
    ("right", 0x01),
    ("left", 0x02),
    ("middle", 0x04),
];

/// Named shortcuts for shifted keys on a US layout.
///
/// Uppercase letters are macros too (`A` → `rshift+a`); they are handled by
/// [`expand_macro`] rather than listed here.
pub const KEY_MACROS: &[(&str, &str)] = &[
    ("tilde", "rshift+backtick"),
    ("exclamation", "rshift+1"),
    ("at", "rshift+2"),
    ("hash", "rshift+3"),
    ("dollar", "rshift+4"),
    ("percent", "rshift+5"),
    ("caret", "rshift+6"),
    ("ampersand", "rshift+7"),
    ("asterisk", "rshift+8"),
    ("left_parenthesis", "rshift+9"),
    ("right_parenthesis", "rshift+0"),
    ("left_curly_bracket", "rshift+left_bracket"),
    ("right_curly_bracket", "rshift+right_bracket"),
    ("question", "rshift+slash"),
    ("plus", "rshift+equal"),
    ("pipe", "rshift+backslash"),
    ("underscore", "rshift+minus"),
    ("colon", "rshift+semicolon"),
    ("double_quote", "rshift+quote"),
    ("less_than", "rshift+comma"),
    ("greater_than", "rshift+period"),
];

/// Printable characters and the key or macro name that types them.
pub const CHAR_NAMES: &[(char, &str)] = &[
    (' ', "space"),
    ('.', "period"),
    (',', "comma"),
    ('-', "minus"),
    ('=', "equal"),
    ('[', "left_bracket"),
    (']', "right_bracket"),
    ('\\', "backslash"),
    (';', "semicolon"),
    ('\'', "quote"),
    ('`', "backtick"),
    ('/', "slash"),
    ('~', "tilde"),
    ('!', "exclamation"),
    ('@', "at"),
    ('#', "hash"),
    ('$', "dollar"),
    ('%', "percent"),
    ('^', "caret"),
    ('&', "ampersand"),
    ('*', "asterisk"),
    ('(', "left_parenthesis"),
    (')', "right_parenthesis"),
    ('{', "left_curly_bracket"),
    ('}', "right_curly_bracket"),
    ('?', "question"),
    ('+', "plus"),
    ('|', "pipe"),
    ('_', "underscore"),
    (':', "colon"),
    ('"', "double_quote"),
    ('<', "less_than"),
    ('>', "greater_than"),
];

// ── Lookups ───────────────────────────────────────────────────────────────────

/// Finds the code for `name` in a name/code table.
pub fn code_of<T: Copy>(table: &[(&str, T)], name: &str) -> Option<T> {
    table.iter().find(|(n, _)| *n == name).map(|(_, code)| *code)
}

/// Finds the first name for `code` in a name/code table.
pub fn name_of<T: Copy + PartialEq>(table: &[(&'static str, T)], code: T) -> Option<&'static str> {
    table.iter().find(|(_, c)| *c == code).map(|(name, _)| *name)
}

pub fn dedicated_slot(name: &str) -> Option<usize> {
    DEDICATED_ORDER.iter().position(|slot| *slot == name)
}

pub fn modifier_flag(name: &str) -> Option<u8> {
    code_of(&MODIFIERS, name)
}

/// Name typed by `c`, if it is one of the punctuation characters with a name.
pub fn char_name(c: char) -> Option<&'static str> {
    CHAR_NAMES.iter().find(|(ch, _)| *ch == c).map(|(_, name)| *name)
}

/// Character a key or macro name types, if it is in [`CHAR_NAMES`].
pub fn name_char(name: &str) -> Option<char> {
    CHAR_NAMES.iter().find(|(_, n)| *n == name).map(|(ch, _)| *ch)
}

/// Expands a macro name to its `modifier+key` form.
///
/// `name` is matched as written, so `A` expands but `a` does not.
pub fn expand_macro(name: &str) -> Option<Cow<'static, str>> {
    if let Some(expansion) = KEY_MACROS.iter().find(|(n, _)| *n == name).map(|(_, e)| *e) {
        return Some(Cow::Borrowed(expansion));
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => {
            Some(Cow::Owned(format!("rshift+{}", c.to_ascii_lowercase())))
        }
        _ => None,
    }
}

/// Inverse of [`expand_macro`]: the macro name for an expansion, if any.
pub fn collapse_macro(expansion: &str) -> Option<Cow<'static, str>> {
    if let Some(name) = KEY_MACROS.iter().find(|(_, e)| *e == expansion).map(|(n, _)| *n) {
        return Some(Cow::Borrowed(name));
    }
    let key = expansion.strip_prefix("rshift+")?;
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_lowercase() => {
            Some(Cow::Owned(c.to_ascii_uppercase().to_string()))
        }
        _ => None,
    }
}
