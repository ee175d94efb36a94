//! `sync`: push configs to a mounted device.
//!
//! For each slot named in the settings file the binary image is built (text
//! sources are converted, `.cfg` sources are copied byte for byte) and
//! compared against `<device>/<slot>.cfg`.  A slot file is rewritten only when
//! the bytes differ, which keeps the device's flash writes and mtime stable
//! across repeated runs.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use twiddler_core::codec::binary::to_bytes;
use twiddler_core::UnknownPolicy;

use super::Session;
use crate::infrastructure::files::{read_config, FileFormat};
use crate::infrastructure::sync_config::SyncPlan;

/// A slot file that was (re)written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotUpdate {
    pub slot: u8,
    pub source: PathBuf,
    pub target: PathBuf,
}

/// Brings every slot in `plan` up to date.
///
/// Returns the slots that were written, in slot order.
///
/// # Errors
///
/// Fails on the first source that cannot be read or converted, or target
/// that cannot be read or written.  Slots before it stay updated.
pub fn sync(plan: &SyncPlan, session: &Session) -> anyhow::Result<Vec<SlotUpdate>> {
    let mut updates = Vec::new();

    for (&slot, source) in &plan.configs {
        let image = slot_image(source, session)?;
        let target = plan.target(slot);

        let current = match fs::read(&target) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", target.display())),
        };
        if current.as_deref() == Some(image.as_slice()) {
            debug!(slot, "slot is up to date");
            continue;
        }

        fs::write(&target, &image).with_context(|| format!("failed to write {}", target.display()))?;
        info!(slot, source = %source.display(), bytes = image.len(), "updated slot");
        updates.push(SlotUpdate {
            slot,
            source: source.clone(),
            target,
        });
    }

    Ok(updates)
}

/// Binary image of a source file.
fn slot_image(source: &Path, session: &Session) -> anyhow::Result<Vec<u8>> {
    match FileFormat::for_config(source, None) {
        FileFormat::Binary => fs::read(source).with_context(|| format!("failed to read {}", source.display())),
        FileFormat::Text => {
            let config = read_config(source, FileFormat::Text, session, UnknownPolicy::Abort)?;
            to_bytes(&config).with_context(|| format!("failed to encode {}", source.display()))
        }
    }
}
