//! Infrastructure layer: everything that touches the filesystem.
//!
//! **Dependency rule**: this layer may depend on `twiddler_core` and on the
//! [`Session`](crate::application::Session) handle, but the codecs it calls
//! never see a path.

pub mod files;
pub mod sync_config;
