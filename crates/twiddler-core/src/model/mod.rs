//! Configuration data model.
//!
//! [`Config`] is the whole device state.  It is built fresh with defaults,
//! populated by one codec's read operation, and consumed by another codec's
//! write operation.  Nothing in this crate mutates a `Config` part-way through
//! a write.

pub mod chord;
pub mod command;

pub use chord::{Chord, FingerColumn};
pub use command::{Action, Command, CommandKind, KeyStroke, ModifierFlags};

/// The only binary config version this crate reads or writes.
pub const CONFIG_VERSION: u8 = 7;

/// Number of dedicated (non-chording) key slots on the device.
pub const DEDICATED_SLOTS: usize = 20;

/// A chord bound to the commands it fires, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub chord: Chord,
    pub commands: Vec<Command>,
}

impl Mapping {
    pub fn new(chord: Chord, commands: Vec<Command>) -> Self {
        Self { chord, commands }
    }
}

/// Which way the navigation stick treats as "up".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum NavDirection {
    #[default]
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl NavDirection {
    /// Decodes the low two bits of the nav byte.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => NavDirection::North,
            1 => NavDirection::East,
            2 => NavDirection::South,
            _ => NavDirection::West,
        }
    }

    /// Lowercase name used in the text format.
    pub fn name(self) -> &'static str {
        match self {
            NavDirection::North => "north",
            NavDirection::East => "east",
            NavDirection::South => "south",
            NavDirection::West => "west",
        }
    }

    /// Parses a text-format direction name (already normalized).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "north" => Some(NavDirection::North),
            "east" => Some(NavDirection::East),
            "south" => Some(NavDirection::South),
            "west" => Some(NavDirection::West),
            _ => None,
        }
    }
}

/// Complete device configuration.
///
/// `repeat_delay` is kept in the device's 10 ms units; the text format shows
/// it in milliseconds.  `dedicated` holds one action code per slot in
/// [`crate::codec::tables::DEDICATED_ORDER`], with 0 meaning "unset".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub version: u8,

    pub repeat: bool,
    pub bluetooth: bool,
    pub direct: bool,
    pub haptic: bool,
    pub sticky_num: bool,
    pub sticky_alt: bool,
    pub sticky_ctrl: bool,
    pub sticky_shift: bool,

    pub nav_up_direction: NavDirection,
    pub nav_invert_x: bool,
    /// 0–7; only the low three bits are stored.
    pub nav_sensitivity: u8,

    /// Idle timeout in device ticks.
    pub idle_time: u16,
    /// Key repeat delay in 10 ms units.
    pub repeat_delay: u8,

    pub dedicated: [u8; DEDICATED_SLOTS],
    pub mappings: Vec<Mapping>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            repeat: true,
            bluetooth: true,
            direct: false,
            haptic: true,
            sticky_num: false,
            sticky_alt: false,
            sticky_ctrl: false,
            sticky_shift: false,
            nav_up_direction: NavDirection::North,
            nav_invert_x: false,
            nav_sensitivity: 0,
            idle_time: 600,
            repeat_delay: 100,
            dedicated: [0; DEDICATED_SLOTS],
            mappings: Vec::new(),
        }
    }
}

impl Config {
    /// Returns the mapping bound to `chord`, if any.
    pub fn mapping(&self, chord: &Chord) -> Option<&Mapping> {
        self.mappings.iter().find(|m| m.chord == *chord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_device_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.version, CONFIG_VERSION);
        assert!(cfg.repeat && cfg.bluetooth && cfg.haptic);
        assert!(!cfg.direct);
        assert_eq!(cfg.idle_time, 600);
        assert_eq!(cfg.repeat_delay, 100);
        assert!(cfg.dedicated.iter().all(|&d| d == 0));
        assert!(cfg.mappings.is_empty());
    }

    #[test]
    fn test_nav_direction_bits_round_trip() {
        for dir in [
            NavDirection::North,
            NavDirection::East,
            NavDirection::South,
            NavDirection::West,
        ] {
            assert_eq!(NavDirection::from_bits(dir as u8), dir);
            assert_eq!(NavDirection::from_name(dir.name()), Some(dir));
        }
    }

    #[test]
    fn test_nav_direction_ignores_high_bits() {
        assert_eq!(NavDirection::from_bits(0b1111_1101), NavDirection::East);
    }

    #[test]
    fn test_mapping_lookup_by_chord() {
        let chord = Chord::from_bits(1 << 16);
        let mut cfg = Config::default();
        cfg.mappings.push(Mapping::new(chord, vec![Command::delay(5)]));
        assert!(cfg.mapping(&chord).is_some());
        assert!(cfg.mapping(&Chord::default()).is_none());
    }
}
