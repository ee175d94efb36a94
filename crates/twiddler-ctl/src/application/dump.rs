//! `dump`: list the identifiers valid in the text format.

use clap::ValueEnum;

use twiddler_core::codec::tables::{DEDICATED_ACTIONS, KEY_MACROS, MOUSE_COMMANDS, SYSTEM_COMMANDS};
use twiddler_core::ConfigError;

use super::Session;

/// Which identifier table to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Table {
    /// Keyboard key names of the session layout, then the macro names.
    #[default]
    Keys,
    /// Consumer-page key names (`con:` / `application:` tokens).
    ApplicationKeys,
    /// `system:` command names.
    System,
    /// `mouse:` command names.
    Mouse,
    /// Actions accepted in the `[dedicated]` section.
    DedicatedKeys,
}

/// Identifiers in `table`, one per entry.  Layout tables are ordered by code.
///
/// # Errors
///
/// Returns [`ConfigError::LayoutNotFound`] if the session layout has no table
/// of the requested kind.
pub fn entries(table: Table, session: &Session) -> Result<Vec<String>, ConfigError> {
    let names = |consumer: bool| -> Result<Vec<String>, ConfigError> {
        let map = session
            .translator()
            .forward(session.layout(), consumer)
            .ok_or_else(|| ConfigError::LayoutNotFound(session.layout().to_string()))?;
        let mut codes: Vec<(&u16, &String)> = map.iter().collect();
        codes.sort();
        Ok(codes.into_iter().map(|(_, name)| name.clone()).collect())
    };

    Ok(match table {
        Table::Keys => {
            let mut keys = names(false)?;
            keys.extend(KEY_MACROS.iter().map(|(name, _)| name.to_string()));
            keys
        }
        Table::ApplicationKeys => names(true)?,
        Table::System => SYSTEM_COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
        Table::Mouse => MOUSE_COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
        Table::DedicatedKeys => DEDICATED_ACTIONS.iter().map(|(name, _)| name.to_string()).collect(),
    })
}
