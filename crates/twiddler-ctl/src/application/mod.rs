//! Application layer: one module per subcommand.
//!
//! Every command runs against a [`Session`], which pairs the layout
//! translator with the layout chosen on the command line.  A session can only
//! be built for a layout that exists, so an unknown layout is reported before
//! any input file is opened.

pub mod convert;
pub mod convert_log;
pub mod dump;
pub mod sync;
pub mod visualize;

use twiddler_core::{ConfigError, LayoutTranslator};

/// Layout translator plus the active layout name.
pub struct Session {
    translator: LayoutTranslator,
    layout: String,
}

impl Session {
    /// Creates a session for `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LayoutNotFound`] if the translator does not know
    /// `layout`.
    pub fn new(translator: LayoutTranslator, layout: impl Into<String>) -> Result<Self, ConfigError> {
        let layout = layout.into();
        translator.require(&layout)?;
        Ok(Self { translator, layout })
    }

    pub fn translator(&self) -> &LayoutTranslator {
        &self.translator
    }

    pub fn layout(&self) -> &str {
        &self.layout
    }
}
