//! CSV table reader

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use docket_core::table::DEFAULT_MISSING_MARKERS;
use docket_core::{DocketError, Record, RecordTable};
use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Debug, Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to open file: {0}")]
    OpenFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(String),
}

/// Result type for I/O operations
pub type IoResult<T> = Result<T, IoError>;

impl From<IoError> for DocketError {
    fn from(err: IoError) -> Self {
        DocketError::Io(err.to_string())
    }
}

impl From<csv::Error> for IoError {
    fn from(err: csv::Error) -> Self {
        IoError::InvalidFormat(err.to_string())
    }
}

impl From<std::io::Error> for IoError {
    fn from(err: std::io::Error) -> Self {
        IoError::Io(err.to_string())
    }
}

/// CSV parsing options
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Field texts read as missing values
    pub missing_markers: Vec<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            missing_markers: DEFAULT_MISSING_MARKERS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl CsvOptions {
    pub fn with_missing_markers(markers: &[String]) -> Self {
        Self {
            missing_markers: markers.to_vec(),
            ..Self::default()
        }
    }
}

/// Read a CSV file with a header row into a table
pub fn read_table(path: impl AsRef<Path>, options: &CsvOptions) -> IoResult<RecordTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path).map_err(|e| IoError::OpenFailed(format!("{}: {}", path.display(), e)))?;
    let table = read_table_from(BufReader::new(file), options)?;

    tracing::info!(
        "read {} rows x {} columns from {}",
        table.len(),
        table.headers().len(),
        path.display()
    );
    Ok(table)
}

/// Read CSV data with a header row from any reader
///
/// Fields that are not valid UTF-8 are decoded lossily. Rows may have fewer
/// or more fields than the header.
pub fn read_table_from<R: Read>(reader: R, options: &CsvOptions) -> IoResult<RecordTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(IoError::InvalidFormat("missing header row".to_string()));
    }

    let mut rows = Vec::new();
    let mut lossy = 0usize;
    for result in reader.byte_records() {
        let record = result?;
        let fields = record
            .iter()
            .map(|field| match std::str::from_utf8(field) {
                Ok(text) => text.to_string(),
                Err(_) => {
                    lossy += 1;
                    String::from_utf8_lossy(field).into_owned()
                }
            })
            .collect();
        rows.push(Record::new(fields));
    }
    if lossy > 0 {
        tracing::warn!("{} fields were not valid UTF-8 and were decoded lossily", lossy);
    }

    Ok(RecordTable::with_missing_markers(
        headers,
        rows,
        options.missing_markers.clone(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_core::{CellValue, ColumnType};

    #[test]
    fn test_read_table_from_str() {
        let data = "Plaintiff Name(s),Case Outcome,Amount\n\
                    Midland Funding LLC,Dismissed,100\n\
                    \"Midland Funding, LLC\",NULL,250\n";
        let table = read_table_from(data.as_bytes(), &CsvOptions::default()).unwrap();

        assert_eq!(table.headers(), ["Plaintiff Name(s)", "Case Outcome", "Amount"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, 0), CellValue::Text("Midland Funding, LLC"));
        assert_eq!(table.cell(1, 1), CellValue::Missing);
        assert_eq!(table.column_type(2), Some(ColumnType::Int64));
    }

    #[test]
    fn test_ragged_rows_padded() {
        let data = "A,B,C\n1\n1,2,3,4\n";
        let table = read_table_from(data.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(table.rows()[0].fields().len(), 3);
        assert_eq!(table.rows()[1].fields().len(), 3);
        assert_eq!(table.cell(0, 2), CellValue::Missing);
    }

    #[test]
    fn test_invalid_utf8_decoded_lossily() {
        let data: &[u8] = b"Plaintiff Name(s)\nCaf\xe9 Holdings\n";
        let table = read_table_from(data, &CsvOptions::default()).unwrap();
        assert_eq!(table.rows()[0].get(0), Some("Caf\u{FFFD} Holdings"));
    }

    #[test]
    fn test_custom_missing_markers() {
        let data = "Case Outcome\n-\nDismissed\n";
        let options = CsvOptions::with_missing_markers(&["-".to_string()]);
        let table = read_table_from(data.as_bytes(), &options).unwrap();
        assert_eq!(table.cell(0, 0), CellValue::Missing);
        assert_eq!(table.cell(1, 0), CellValue::Text("Dismissed"));
    }

    #[test]
    fn test_missing_file() {
        let err = read_table("/nonexistent/cases.csv", &CsvOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::FileNotFound(_)));
        let core: DocketError = err.into();
        assert!(matches!(core, DocketError::Io(_)));
    }
}
