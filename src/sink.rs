//! CSV output for collected search results.
//!
//! The document always starts with the `Title,Link,Snippet` header, even when no
//! rows were collected.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use csv::WriterBuilder;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::models::ResultRow;

/// Output header, in column order.
pub const HEADER: [&str; 3] = ["Title", "Link", "Snippet"];

/// Default file name for downloaded results.
pub const DEFAULT_OUTPUT_FILE: &str = "search_results.csv";

/// Errors raised while writing results.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writes the header and rows to `writer` as CSV, one `\r\n`-terminated line per record.
pub fn write_rows<W: Write>(rows: &[ResultRow], writer: W) -> Result<W, SinkError> {
    let mut csv_writer = WriterBuilder::new().from_writer(writer);

    csv_writer.write_record(HEADER)?;
    for row in rows {
        csv_writer.write_record(row.as_record())?;
    }

    csv_writer
        .into_inner()
        .map_err(|e| SinkError::Csv(csv::Error::from(e.into_error())))
}

/// Serializes rows to an in-memory UTF-8 CSV document.
///
/// # Examples
///
/// ```
/// use sheetquery::{ResultRow, sink};
///
/// let bytes = sink::serialize(&[ResultRow::new("Acme Corp", "acme.com", "contact us")]).unwrap();
/// assert_eq!(
///     String::from_utf8(bytes).unwrap(),
///     "Title,Link,Snippet\r\nAcme Corp,acme.com,contact us\r\n"
/// );
/// ```
pub fn serialize(rows: &[ResultRow]) -> Result<Vec<u8>, SinkError> {
    write_rows(rows, Vec::new())
}

/// Writes rows to `path` atomically.
///
/// The document is written to a temporary file in the destination directory and
/// renamed into place only once complete.
pub fn write_to_path(rows: &[ResultRow], path: &Path) -> Result<PathBuf, SinkError> {
    let io_error = |source: std::io::Error| SinkError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let temp_file = NamedTempFile::new_in(&parent).map_err(io_error)?;
    let buf_writer = write_rows(rows, BufWriter::new(temp_file))?;
    let temp_file = buf_writer
        .into_inner()
        .map_err(|e| io_error(e.into_error()))?;

    temp_file.persist(path).map_err(|e| io_error(e.error))?;

    log::info!("Wrote {} result rows to {}", rows.len(), path.display());
    Ok(path.to_path_buf())
}
