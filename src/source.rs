//! Tabular input: uploaded CSV/XLSX files and shared Google Sheets.
//!
//! Every source produces a [`Table`] of ordered [`Record`]s. Nothing here knows
//! about searching; the pipeline only needs one column's string form.

mod csv_file;
mod excel;
mod google_sheet;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::Record;

pub use csv_file::read_csv;
pub use excel::{read_excel, table_from_rows};
pub use google_sheet::{DEFAULT_EXPORT_BASE, GoogleSheetSource, GoogleSheetSourceBuilder};

/// File extensions accepted by [`load_file`].
pub const ALLOWED_FILE_TYPES: [&str; 2] = ["csv", "xlsx"];

/// Errors raised while loading a table.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported file type '{}': expected one of {}", .path.display(), ALLOWED_FILE_TYPES.join(", "))]
    UnsupportedFileType { path: PathBuf },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    #[error("Invalid sheet key '{0}'")]
    InvalidSheetKey(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    #[error("Sheet is not publicly exported; share it or set GOOGLE_SHEETS_TOKEN")]
    SheetNotAccessible,

    #[error("Column '{column}' not found; available columns: {}", .available.join(", "))]
    UnknownColumn {
        column: String,
        available: Vec<String>,
    },
}

/// An ordered set of records sharing one header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    pub fn new(columns: Vec<String>, records: Vec<Record>) -> Self {
        Self { columns, records }
    }

    /// Returns column names in source order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the first `n` records.
    pub fn preview(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    /// Fails unless `column` names one of the table's columns.
    pub fn require_column(&self, column: &str) -> Result<(), SourceError> {
        if self.columns.iter().any(|c| c == column) {
            Ok(())
        } else {
            Err(SourceError::UnknownColumn {
                column: column.to_string(),
                available: self.columns.clone(),
            })
        }
    }
}

/// Names a header cell, substituting `column_N` for blanks.
pub(crate) fn column_name(index: usize, raw: &str) -> String {
    if raw.trim().is_empty() {
        format!("column_{}", index + 1)
    } else {
        raw.to_string()
    }
}

/// Loads a CSV or XLSX file, chosen by extension.
///
/// # Errors
///
/// Returns `SourceError::UnsupportedFileType` for other extensions, and I/O or
/// parse errors from the underlying reader.
pub fn load_file(path: &Path) -> Result<Table, SourceError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let table = match extension.as_str() {
        "csv" => {
            let file = std::fs::File::open(path).map_err(|source| SourceError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            read_csv(file)?
        }
        "xlsx" => read_excel(path)?,
        _ => {
            return Err(SourceError::UnsupportedFileType {
                path: path.to_path_buf(),
            });
        }
    };

    log::info!(
        "Loaded {} records with {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );

    Ok(table)
}
