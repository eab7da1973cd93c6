//! Delimited-file table repository.
//!
//! # Responsibility
//! - Load the registry file into a [`Table`], skipping malformed lines.
//! - Rewrite the whole file from a [`Table`].
//!
//! # Invariants
//! - All cells are read as text, so zero-padded codes, DNIs and phone
//!   numbers keep their exact spelling.
//! - `load_table(save_table(t))` reproduces every visible cell of `t`.

use crate::model::column::{is_unnamed, normalize_headers};
use crate::model::table::{Record, Table};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Field separator used by the registry file and CSV exports.
pub const FIELD_DELIMITER: u8 = b';';

/// Storage file used when the caller does not pick one.
pub const DEFAULT_DATA_PATH: &str = "registro2.csv";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage error for registry file reads and writes.
#[derive(Debug)]
pub enum RepoError {
    /// The file could not be opened, created or flushed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file content could not be decoded or encoded as delimited text.
    Csv { path: PathBuf, source: csv::Error },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "registry file `{}` is not accessible: {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "registry file `{}` is not valid delimited text: {source}", path.display())
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
        }
    }
}

/// Repository interface for whole-table registry persistence.
pub trait TableRepository {
    /// Loads the full registry table.
    fn load_table(&self) -> RepoResult<Table>;
    /// Replaces the stored registry with `table`.
    fn save_table(&self, table: &Table) -> RepoResult<()>;
}

/// Repository backed by one `;`-delimited UTF-8 file.
#[derive(Debug, Clone)]
pub struct CsvTableRepository {
    path: PathBuf,
}

impl CsvTableRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for CsvTableRepository {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }
}

impl TableRepository for CsvTableRepository {
    fn load_table(&self) -> RepoResult<Table> {
        load_table(&self.path)
    }

    fn save_table(&self, table: &Table) -> RepoResult<()> {
        save_table(table, &self.path)
    }
}

/// Loads a registry file.
///
/// Header names are normalized and `unnamed*` columns removed. Lines whose
/// field count differs from the header are dropped silently.
///
/// # Errors
/// - `RepoError::Io` when the file is missing or unreadable.
/// - `RepoError::Csv` when the content is not valid UTF-8 delimited text.
pub fn load_table(path: impl AsRef<Path>) -> RepoResult<Table> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=table_load module=repo status=start path={}", path.display());

    let file = File::open(path).map_err(|source| {
        error!(
            "event=table_load module=repo status=error error_code=open_failed duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            source
        );
        RepoError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let (table, skipped_rows) = read_delimited(file).map_err(|source| {
        error!(
            "event=table_load module=repo status=error error_code=decode_failed duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            source
        );
        RepoError::Csv {
            path: path.to_path_buf(),
            source,
        }
    })?;

    info!(
        "event=table_load module=repo status=ok rows={} skipped_rows={} columns={} duration_ms={}",
        table.len(),
        skipped_rows,
        table.columns().len(),
        started_at.elapsed().as_millis()
    );
    Ok(table)
}

/// Writes `table` to `path`, replacing any previous content.
///
/// The write is not atomic: a reader racing with it can observe a partial
/// file.
///
/// # Errors
/// - `RepoError::Io` when the file cannot be created or flushed.
/// - `RepoError::Csv` when a record cannot be encoded.
pub fn save_table(table: &Table, path: impl AsRef<Path>) -> RepoResult<()> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!(
        "event=table_save module=repo status=start path={} rows={}",
        path.display(),
        table.len()
    );

    let file = File::create(path).map_err(|source| {
        error!(
            "event=table_save module=repo status=error error_code=create_failed duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            source
        );
        RepoError::Io {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let result = write_delimited(table, file).and_then(|mut file| {
        file.flush().map_err(csv::Error::from)?;
        Ok(())
    });
    if let Err(source) = result {
        error!(
            "event=table_save module=repo status=error error_code=write_failed duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            source
        );
        return Err(RepoError::Csv {
            path: path.to_path_buf(),
            source,
        });
    }

    info!(
        "event=table_save module=repo status=ok rows={} duration_ms={}",
        table.len(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}

/// Decodes delimited text into a table and returns it with the number of
/// malformed lines that were skipped.
pub(crate) fn read_delimited<R: Read>(reader: R) -> csv::Result<(Table, usize)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let columns = normalize_headers(reader.headers()?.iter());
    let mut records = Vec::new();
    let mut skipped_rows = 0usize;

    for result in reader.records() {
        let fields = result?;
        if fields.len() != columns.len() {
            skipped_rows += 1;
            debug!(
                "event=table_load module=repo status=skip line={} fields={} expected={}",
                fields.position().map_or(0, |pos| pos.line()),
                fields.len(),
                columns.len()
            );
            continue;
        }

        records.push(
            columns
                .iter()
                .zip(fields.iter())
                .map(|(column, value)| (column.as_str(), value))
                .collect::<Record>(),
        );
    }

    let mut table = Table::from_records(columns, records);
    table.retain_columns(|column| !is_unnamed(column));
    Ok((table, skipped_rows))
}

/// Encodes a table as delimited text, header first, skipping `unnamed*`
/// columns. Returns the underlying writer once everything is flushed.
pub(crate) fn write_delimited<W: Write>(table: &Table, writer: W) -> csv::Result<W> {
    let columns: Vec<&str> = table
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|column| !is_unnamed(column))
        .collect();

    let mut writer = csv::WriterBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .from_writer(writer);

    writer.write_record(&columns)?;
    for row in table.rows() {
        writer.write_record(columns.iter().map(|column| row.record.get(column)))?;
    }

    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}
