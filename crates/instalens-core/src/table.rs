//! CSV interchange files: UTF-8 with a byte-order mark, fixed header row.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::rows::TableRow;

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("unexpected header: expected {expected:?}, found {found:?}")]
    Header {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Serialize `rows` to `writer`: BOM, header, one record per row. The header
/// is written even when `rows` is empty.
///
/// # Errors
///
/// Returns [`TableError::Csv`] if serialization or the underlying write fails.
pub fn write_rows<T: TableRow, W: Write>(mut writer: W, rows: &[T]) -> Result<(), TableError> {
    writer
        .write_all(BOM)
        .map_err(|e| TableError::Csv(csv::Error::from(e)))?;

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(T::COLUMNS)?;
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer
        .flush()
        .map_err(|e| TableError::Csv(csv::Error::from(e)))?;
    Ok(())
}

/// Parse table bytes, tolerating a leading BOM.
///
/// # Errors
///
/// Returns [`TableError::Header`] when the header row differs from
/// `T::COLUMNS`, or [`TableError::Csv`] for malformed records.
pub fn parse_rows<T: TableRow>(bytes: &[u8]) -> Result<Vec<T>, TableError> {
    let body = bytes.strip_prefix(BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body);

    let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if found != T::COLUMNS {
        return Err(TableError::Header {
            expected: T::COLUMNS.iter().map(ToString::to_string).collect(),
            found,
        });
    }

    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(TableError::from)
}

/// Write `rows` to `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`TableError::Io`] if the file cannot be created.
pub fn write_table<T: TableRow>(path: &Path, rows: &[T]) -> Result<(), TableError> {
    let file = std::fs::File::create(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_rows(std::io::BufWriter::new(file), rows)
}

/// Read every row of the table at `path`.
///
/// # Errors
///
/// Returns [`TableError::Io`] if the file cannot be read, or any
/// [`parse_rows`] error.
pub fn read_table<T: TableRow>(path: &Path) -> Result<Vec<T>, TableError> {
    let bytes = std::fs::read(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rows(&bytes)
}

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;
