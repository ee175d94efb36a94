//! Config and keystroke-log codecs.
//!
//! - [`binary`] – the device-native `N.cfg` format (config version 7).
//! - [`text`] – the INI format users edit, built on [`ini`] and [`notation`].
//! - [`command`] – one [`crate::Command`] to and from 4 bytes or a text token.
//! - [`log`] – untethered keystroke recordings.
//! - [`tables`] – firmware-defined name tables used by all of the above.

pub mod binary;
pub mod command;
pub mod ini;
pub mod log;
pub mod notation;
pub mod tables;
pub mod text;
