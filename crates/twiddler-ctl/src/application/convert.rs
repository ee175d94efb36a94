//! `convert`: re-encode a config between the text and binary formats.

use std::path::Path;

use tracing::info;

use twiddler_core::UnknownPolicy;

use super::Session;
use crate::infrastructure::files::{read_config, write_config, FileFormat};

/// Options for [`convert`].  Formats left as `None` are detected from the
/// file extension.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    pub input_format: Option<FileFormat>,
    pub output_format: Option<FileFormat>,
    pub policy: UnknownPolicy,
}

/// Reads `input` and writes it to `output`.
///
/// Returns the number of mappings written.
///
/// # Errors
///
/// Fails if `input` cannot be read or decoded, or `output` cannot be encoded
/// or written.  `output` is left untouched when decoding or encoding fails.
pub fn convert(session: &Session, input: &Path, output: &Path, options: ConvertOptions) -> anyhow::Result<usize> {
    let input_format = FileFormat::for_config(input, options.input_format);
    let output_format = FileFormat::for_config(output, options.output_format);

    let config = read_config(input, input_format, session, options.policy)?;
    write_config(output, &config, output_format, session)?;

    info!(
        input = %input.display(),
        output = %output.display(),
        ?input_format,
        ?output_format,
        mappings = config.mappings.len(),
        "converted config"
    );
    Ok(config.mappings.len())
}
