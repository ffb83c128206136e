//! Result printing.
//!
//! Rows are written one per line and followed by a line holding the
//! completion marker, which downstream readers use to detect the end of
//! the result set.

use std::io::Write;

use crate::db::{Row, Value, COLUMN_SEPARATOR};
use crate::error::{HiveError, Result};

/// Line written after the last row.
pub const COMPLETION_MARKER: &str = "0";

/// How rows are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Cells separated by TAB, as HiveServer serializes rows.
    #[default]
    Text,
    /// One JSON array per row.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// Renders one row as a single line, without the trailing newline.
///
/// Text cells are written as the bytes the server sent, even when they are
/// not valid UTF-8.
pub fn format_row(row: &Row, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Text => {
            let cells: Vec<_> = row.iter().map(Value::display_bytes).collect();
            Ok(cells.join(COLUMN_SEPARATOR.as_bytes()))
        }
        OutputFormat::Json => serde_json::to_vec(row)
            .map_err(|e| HiveError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))),
    }
}

/// Writes every row followed by the completion marker and flushes `out`.
pub fn write_rows<W: Write>(out: &mut W, rows: &[Row], format: OutputFormat) -> Result<()> {
    for row in rows {
        out.write_all(&format_row(row, format)?)?;
        out.write_all(b"\n")?;
    }
    writeln!(out, "{COMPLETION_MARKER}")?;
    out.flush()?;
    Ok(())
}
