//! # twiddler-core
//!
//! Shared library for `twiddler-ctl` containing the device configuration
//! model, keyboard layout translation, and the two config codecs.
//!
//! It has no dependencies on the CLI, the terminal, or the device mount
//! point; everything here works on in-memory values and `std::io` streams.
//!
//! # Architecture overview
//!
//! The Twiddler is a one-handed chorded keyboard.  A *chord* is a set of keys
//! pressed together (five thumb keys plus a 5×3 grid of finger keys), and the
//! device configuration binds each chord to a list of output commands.
//!
//! - **`model`** – The configuration data model: [`Chord`], [`Command`],
//!   [`Mapping`], [`Config`].
//!
//! - **`layout`** – Name ↔ HID keycode tables for a named keyboard layout,
//!   backed by a [`layout::LayoutDatabase`] and memoized by
//!   [`LayoutTranslator`].
//!
//! - **`codec`** – The device-native binary format (`N.cfg` files), the INI
//!   text format users edit, and the keystroke-log format of untethered
//!   recordings.

pub mod codec;
pub mod error;
pub mod layout;
pub mod model;

pub use codec::binary::{read_config as read_binary, write_config as write_binary};
pub use codec::text::{TextReader, TextWriter, UnknownPolicy};
pub use error::{ConfigError, FormatError, Result, UnknownIdentifier};
pub use layout::{EmbeddedLayouts, LayoutTranslator};
pub use model::{Action, Chord, Command, CommandKind, Config, Mapping, ModifierFlags, NavDirection};
