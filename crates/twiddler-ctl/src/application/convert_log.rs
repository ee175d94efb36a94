//! `convert-log`: re-encode an untethered keystroke recording.

use std::path::Path;

use tracing::info;

use super::Session;
use crate::infrastructure::files::{read_log, write_log, FileFormat};

/// Reads the log at `input` and writes it to `output`.  Formats left as
/// `None` are detected from the file extension.
///
/// Returns the number of characters converted.
///
/// # Errors
///
/// Fails if either file cannot be accessed, the input is not a whole number of
/// records, or a character cannot be typed in the session layout.
pub fn convert_log(
    session: &Session,
    input: &Path,
    output: &Path,
    input_format: Option<FileFormat>,
    output_format: Option<FileFormat>,
) -> anyhow::Result<usize> {
    let input_format = FileFormat::for_log(input, input_format);
    let output_format = FileFormat::for_log(output, output_format);

    let text = read_log(input, input_format, session)?;
    write_log(output, &text, output_format, session)?;

    let chars = text.chars().count();
    info!(input = %input.display(), output = %output.display(), chars, "converted keystroke log");
    Ok(chars)
}
