//! Command output on stdout

use crate::errors::{CliError, Result};
use serde::Serialize;
use std::io::Write;

/// Write `value` as pretty JSON followed by a newline
///
/// # Errors
///
/// Returns error if serialization or the write fails
pub fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(|e| CliError::Output {
        source: std::io::Error::other(e),
    })?;
    writeln!(out).map_err(|source| CliError::Output { source })
}
