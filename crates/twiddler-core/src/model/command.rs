//! Output commands fired by a chord.
//!
//! On the device a command is a kind byte plus two operands, `a` (u16) and
//! `b` (u8).  [`Action`] has one variant per kind carrying the meaning of
//! `a`; [`Command`] pairs it with `b`.  No text token sets `b`, but the binary
//! codec keeps whatever the device stored so binary files convert losslessly.

/// Command kind ordinal as stored in the first byte of a binary command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandKind {
    None = 0,
    System = 1,
    Keyboard = 2,
    Mouse = 3,
    Application = 4,
    Delay = 5,
    Haptic = 6,
    CommandList = 7,
}

impl CommandKind {
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::None => "none",
            CommandKind::System => "system",
            CommandKind::Keyboard => "keyboard",
            CommandKind::Mouse => "mouse",
            CommandKind::Application => "application",
            CommandKind::Delay => "delay",
            CommandKind::Haptic => "haptic",
            CommandKind::CommandList => "command_list",
        }
    }
}

impl TryFrom<u8> for CommandKind {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(CommandKind::None),
            1 => Ok(CommandKind::System),
            2 => Ok(CommandKind::Keyboard),
            3 => Ok(CommandKind::Mouse),
            4 => Ok(CommandKind::Application),
            5 => Ok(CommandKind::Delay),
            6 => Ok(CommandKind::Haptic),
            7 => Ok(CommandKind::CommandList),
            _ => Err(()),
        }
    }
}

/// HID keyboard modifier bitmask (the low byte of a keyboard command's `a`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModifierFlags(pub u8);

impl ModifierFlags {
    pub const LEFT_CTRL: u8 = 1 << 0;
    pub const LEFT_SHIFT: u8 = 1 << 1;
    pub const LEFT_ALT: u8 = 1 << 2;
    pub const LEFT_META: u8 = 1 << 3;
    pub const RIGHT_CTRL: u8 = 1 << 4;
    pub const RIGHT_SHIFT: u8 = 1 << 5;
    pub const RIGHT_ALT: u8 = 1 << 6;
    pub const RIGHT_META: u8 = 1 << 7;

    pub fn contains(&self, flag: u8) -> bool {
        self.0 & flag == flag
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// A HID key usage plus the modifiers held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    /// HID keyboard usage ID.
    pub keycode: u8,
    pub modifiers: ModifierFlags,
}

impl KeyStroke {
    pub fn new(keycode: u8, modifiers: u8) -> Self {
        Self {
            keycode,
            modifiers: ModifierFlags(modifiers),
        }
    }

    /// Packs into a keyboard command operand: `(keycode << 8) | modifiers`.
    pub fn to_operand(self) -> u16 {
        (u16::from(self.keycode) << 8) | u16::from(self.modifiers.0)
    }

    pub fn from_operand(a: u16) -> Self {
        Self::new((a >> 8) as u8, (a & 0xFF) as u8)
    }
}

/// What a command does: its kind and `a` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Kind 0.  With `a == 0` and `b == 0` this is the end-of-list sentinel
    /// and never appears inside a decoded command list.
    None(u16),
    /// Device system function code (sleep, cycle config, ...).
    System(u16),
    Keyboard(KeyStroke),
    /// Mouse button code.
    Mouse(u16),
    /// HID consumer-page usage (media keys, application launchers).
    Application(u16),
    /// Delay in 10 ms units.
    Delay(u16),
    /// Raw haptic pattern.
    Haptic(u16),
    /// Byte offset into the out-of-line area of a binary config.  Only the
    /// binary codec creates these.
    CommandList(u16),
}

impl Action {
    pub fn kind(&self) -> CommandKind {
        match self {
            Action::None(_) => CommandKind::None,
            Action::System(_) => CommandKind::System,
            Action::Keyboard(_) => CommandKind::Keyboard,
            Action::Mouse(_) => CommandKind::Mouse,
            Action::Application(_) => CommandKind::Application,
            Action::Delay(_) => CommandKind::Delay,
            Action::Haptic(_) => CommandKind::Haptic,
            Action::CommandList(_) => CommandKind::CommandList,
        }
    }

    /// The `a` operand as stored on the device.
    pub fn operand(&self) -> u16 {
        match *self {
            Action::Keyboard(stroke) => stroke.to_operand(),
            Action::None(a)
            | Action::System(a)
            | Action::Mouse(a)
            | Action::Application(a)
            | Action::Delay(a)
            | Action::Haptic(a)
            | Action::CommandList(a) => a,
        }
    }

    /// Rebuilds an action from its kind and `a` operand.
    pub fn from_parts(kind: CommandKind, a: u16) -> Self {
        match kind {
            CommandKind::None => Action::None(a),
            CommandKind::System => Action::System(a),
            CommandKind::Keyboard => Action::Keyboard(KeyStroke::from_operand(a)),
            CommandKind::Mouse => Action::Mouse(a),
            CommandKind::Application => Action::Application(a),
            CommandKind::Delay => Action::Delay(a),
            CommandKind::Haptic => Action::Haptic(a),
            CommandKind::CommandList => Action::CommandList(a),
        }
    }
}

/// One output command: an [`Action`] plus the raw `b` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command {
    pub action: Action,
    /// Second operand byte; 0 for everything the text format produces.
    pub b: u8,
}

impl Command {
    pub fn new(action: Action) -> Self {
        Self { action, b: 0 }
    }

    pub fn with_b(action: Action, b: u8) -> Self {
        Self { action, b }
    }

    pub fn kind(&self) -> CommandKind {
        self.action.kind()
    }

    pub fn operand(&self) -> u16 {
        self.action.operand()
    }

    /// Rebuilds a command from its three binary fields.
    pub fn from_parts(kind: CommandKind, a: u16, b: u8) -> Self {
        Self::with_b(Action::from_parts(kind, a), b)
    }

    /// Shorthand for a keyboard command.
    pub fn key(keycode: u8, modifiers: u8) -> Self {
        Self::new(Action::Keyboard(KeyStroke::new(keycode, modifiers)))
    }

    pub fn system(code: u16) -> Self {
        Self::new(Action::System(code))
    }

    pub fn mouse(code: u16) -> Self {
        Self::new(Action::Mouse(code))
    }

    pub fn application(code: u16) -> Self {
        Self::new(Action::Application(code))
    }

    pub fn delay(units: u16) -> Self {
        Self::new(Action::Delay(units))
    }

    pub fn haptic(pattern: u16) -> Self {
        Self::new(Action::Haptic(pattern))
    }

    /// Reference to an out-of-line command list.
    pub fn list(offset: u16) -> Self {
        Self::new(Action::CommandList(offset))
    }
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        Self::new(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_byte_round_trip() {
        for byte in 0u8..=7 {
            let kind = CommandKind::try_from(byte).expect("0-7 are valid kinds");
            assert_eq!(kind as u8, byte);
        }
        assert!(CommandKind::try_from(8).is_err());
    }

    #[test]
    fn test_keystroke_operand_packs_keycode_high() {
        let stroke = KeyStroke::new(0x04, ModifierFlags::RIGHT_SHIFT);
        assert_eq!(stroke.to_operand(), 0x0420);
        assert_eq!(KeyStroke::from_operand(0x0420), stroke);
    }

    #[test]
    fn test_from_parts_inverts_operands() {
        let samples = [
            Command::new(Action::None(3)),
            Command::system(0x0211),
            Command::key(0x28, ModifierFlags::LEFT_CTRL | ModifierFlags::LEFT_ALT),
            Command::mouse(4),
            Command::with_b(Action::Application(0xE9), 0x01),
            Command::delay(25),
            Command::with_b(Action::Haptic(0x7F), 0xFF),
            Command::list(0x40),
        ];
        for cmd in samples {
            assert_eq!(Command::from_parts(cmd.kind(), cmd.operand(), cmd.b), cmd);
        }
    }

    #[test]
    fn test_b_distinguishes_otherwise_equal_commands() {
        assert_ne!(Command::haptic(0x10), Command::with_b(Action::Haptic(0x10), 5));
        assert_eq!(Command::from(Action::Delay(2)), Command::delay(2));
    }

    #[test]
    fn test_modifier_flags_contains() {
        let flags = ModifierFlags(ModifierFlags::LEFT_CTRL | ModifierFlags::RIGHT_META);
        assert!(flags.contains(ModifierFlags::LEFT_CTRL));
        assert!(!flags.contains(ModifierFlags::LEFT_SHIFT));
        assert!(ModifierFlags::default().is_empty());
    }
}
