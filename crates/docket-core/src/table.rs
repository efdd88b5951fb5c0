//! Row model for court-record tables
//!
//! A [`RecordTable`] keeps every field exactly as it was read, plus a column
//! type inferred over the whole column. Cleaning rules look at fields through
//! [`CellValue`], the typed view, so a numeric column handed to a text rule is
//! detected instead of being silently stringified.

use serde::{Deserialize, Serialize};

/// Raw texts treated as a missing value when no configuration says otherwise
pub const DEFAULT_MISSING_MARKERS: &[&str] = &[
    "", "NULL", "null", "NA", "N/A", "n/a", "NaN", "nan", "None", "#N/A", "<NA>",
];

/// Inferred column data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Int64,
    Float64,
    Bool,
    String,
}

/// Typed view of a single field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Missing,
    Text(&'a str),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl<'a> CellValue<'a> {
    /// Short name of the value kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            CellValue::Missing => "missing",
            CellValue::Text(_) => "text",
            CellValue::Integer(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Bool(_) => "boolean",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

/// One row of the source table, all fields as raw text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|s| s.as_str())
    }
}

/// A table of records with a header and per-column types
#[derive(Debug, Clone)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Record>,
    column_types: Vec<ColumnType>,
    missing_markers: Vec<String>,
}

impl RecordTable {
    /// Build a table using the default missing markers
    pub fn new(headers: Vec<String>, rows: Vec<Record>) -> Self {
        let markers = DEFAULT_MISSING_MARKERS.iter().map(|s| s.to_string()).collect();
        Self::with_missing_markers(headers, rows, markers)
    }

    /// Build a table, treating any field equal to one of `missing_markers` as missing
    ///
    /// Short rows are padded with empty fields and long rows truncated so that
    /// every record has exactly one field per header.
    pub fn with_missing_markers(
        headers: Vec<String>,
        rows: Vec<Record>,
        missing_markers: Vec<String>,
    ) -> Self {
        let width = headers.len();
        let rows: Vec<Record> = rows
            .into_iter()
            .map(|mut record| {
                record.fields.resize(width, String::new());
                record
            })
            .collect();

        let column_types = (0..width)
            .map(|col| {
                let values: Vec<&str> = rows
                    .iter()
                    .map(|r| r.fields[col].as_str())
                    .filter(|v| !missing_markers.iter().any(|m| m == v))
                    .collect();
                infer_type(&values)
            })
            .collect();

        Self {
            headers,
            rows,
            column_types,
            missing_markers,
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Get column index by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column_type(&self, index: usize) -> Option<ColumnType> {
        self.column_types.get(index).copied()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Typed view of one field
    ///
    /// Panics if `row` or `col` is out of range.
    pub fn cell(&self, row: usize, col: usize) -> CellValue<'_> {
        let raw = self.rows[row].fields[col].as_str();
        if self.is_missing_marker(raw) {
            return CellValue::Missing;
        }
        match self.column_types[col] {
            ColumnType::Int64 => raw
                .trim()
                .parse()
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Text(raw)),
            ColumnType::Float64 => raw
                .trim()
                .parse()
                .map(CellValue::Float)
                .unwrap_or(CellValue::Text(raw)),
            ColumnType::Bool => CellValue::Bool(raw.trim().eq_ignore_ascii_case("true")),
            ColumnType::String => CellValue::Text(raw),
        }
    }

    fn is_missing_marker(&self, raw: &str) -> bool {
        self.missing_markers.iter().any(|m| m == raw)
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Record> {
        &mut self.rows
    }
}

/// Infer column type from its non-missing values
fn infer_type(values: &[&str]) -> ColumnType {
    if values.is_empty() {
        return ColumnType::String;
    }

    if values.iter().all(|s| s.trim().parse::<i64>().is_ok()) {
        return ColumnType::Int64;
    }

    if values.iter().all(|s| s.trim().parse::<f64>().is_ok()) {
        return ColumnType::Float64;
    }

    if values.iter().all(|s| {
        let s = s.trim();
        s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false")
    }) {
        return ColumnType::Bool;
    }

    ColumnType::String
}
