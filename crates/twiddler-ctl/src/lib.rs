//! twiddler-ctl library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # Layout
//!
//! ```text
//! application/     One module per subcommand: convert, convert-log, sync,
//!                  dump, visualize.  Works on paths and a [`Session`].
//! infrastructure/
//!   files          Format detection and file-level read/write of configs
//!                  and keystroke logs.
//!   sync_config    The TOML file that tells `sync` where the device is.
//! ```
//!
//! [`Session`]: application::Session

pub mod application;
pub mod infrastructure;
