//! Download encoders for filtered registry views.
//!
//! # Responsibility
//! - Serialize a table to `;`-delimited UTF-8 text.
//! - Serialize a table to a single-sheet spreadsheet workbook.
//!
//! # Invariants
//! - Exports are pure: they never touch the registry file.

use crate::model::table::Table;
use crate::repo::table_repo::write_delimited;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod xlsx;

pub use xlsx::{to_xlsx, SHEET_NAME};

pub const CSV_FILE_NAME: &str = "registros.csv";
pub const CSV_MIME: &str = "text/csv";
pub const XLSX_FILE_NAME: &str = "registros.xlsx";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub type ExportResult<T> = Result<T, ExportError>;

/// Encoding failure while building a download.
#[derive(Debug)]
pub enum ExportError {
    Csv(csv::Error),
    Zip(zip::result::ZipError),
    Io(std::io::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "csv export failed: {err}"),
            Self::Zip(err) => write!(f, "workbook export failed: {err}"),
            Self::Io(err) => write!(f, "export write failed: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Zip(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(value: zip::result::ZipError) -> Self {
        Self::Zip(value)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Encodes `table` as `;`-delimited UTF-8 text with internal column names.
pub fn to_delimited(table: &Table) -> ExportResult<Vec<u8>> {
    let bytes = write_delimited(table, Vec::new())?;
    info!(
        "event=export_csv module=export status=ok rows={} bytes={}",
        table.len(),
        bytes.len()
    );
    Ok(bytes)
}
