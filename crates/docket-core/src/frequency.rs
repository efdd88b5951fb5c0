//! Duplicate-row removal and frequency counts of cleaned values

use std::collections::{HashMap, HashSet};

use crate::config::{AnomalyConfig, AnomalyPolicy};
use crate::error::{DocketError, Result};
use crate::normalization::{FieldNormalizer, NormalizeError};
use crate::table::{Record, RecordTable};

/// Outcome of exact-duplicate removal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateReport {
    pub rows_before: usize,
    pub duplicates_removed: usize,
}

impl DuplicateReport {
    pub fn rows_after(&self) -> usize {
        self.rows_before - self.duplicates_removed
    }
}

/// Drop rows whose every field equals an earlier row, keeping the first
pub fn remove_duplicates(table: &mut RecordTable) -> DuplicateReport {
    let rows_before = table.len();
    let rows = std::mem::take(table.rows_mut());

    let mut seen: HashSet<Record> = HashSet::with_capacity(rows.len());
    let kept: Vec<Record> = rows
        .into_iter()
        .filter(|record| seen.insert(record.clone()))
        .collect();

    let duplicates_removed = rows_before - kept.len();
    *table.rows_mut() = kept;

    tracing::info!("{} duplicates found", duplicates_removed);

    DuplicateReport {
        rows_before,
        duplicates_removed,
    }
}

/// Unique cleaned values with their occurrence counts
///
/// Ordered by count (highest first); equal counts keep the order in which the
/// values first appeared. This order indexes the similarity matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistinctCounts {
    entries: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl DistinctCounts {
    /// Count values in input order
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<(String, usize)> = Vec::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for value in values {
            let value = value.as_ref();
            match first_seen.get(value) {
                Some(&pos) => entries[pos].1 += 1,
                None => {
                    first_seen.insert(value.to_string(), entries.len());
                    entries.push((value.to_string(), 1));
                }
            }
        }

        // Stable sort keeps first-appearance order among equal counts
        entries.sort_by(|a, b| b.1.cmp(&a.1));

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        Self { entries, index }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Occurrence count of a value
    pub fn count(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|&i| self.entries[i].1)
    }

    /// Position of a value in canonical order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Values in canonical order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }
}

/// Kind of data-quality defect found while cleaning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnomalyKind {
    InvalidInputKind,
    EmptyResult,
}

/// A row that failed a cleaning rule and was kept with the placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anomaly {
    pub row: usize,
    pub column: String,
    pub kind: AnomalyKind,
    pub raw: String,
}

/// One column after cleaning
#[derive(Debug, Clone)]
pub struct CountedColumn {
    pub column: String,
    /// Cleaned value of every row, aligned with the table rows
    pub cleaned: Vec<String>,
    pub counts: DistinctCounts,
    pub anomalies: Vec<Anomaly>,
}

/// Clean every row of `column` and count the cleaned values
///
/// Rows that fail a rule are handled according to `policy`: flagged rows get
/// the placeholder value so that the cleaned column keeps one entry per row.
pub fn count_distinct<N: FieldNormalizer + ?Sized>(
    table: &RecordTable,
    column: &str,
    normalizer: &N,
    policy: &AnomalyConfig,
) -> Result<CountedColumn> {
    let col = table
        .column_index(column)
        .ok_or_else(|| DocketError::MissingColumn(column.to_string()))?;

    let mut cleaned = Vec::with_capacity(table.len());
    let mut anomalies = Vec::new();

    for row in 0..table.len() {
        match normalizer.normalize(table.cell(row, col)) {
            Ok(value) => cleaned.push(value),
            Err(err) => {
                let (kind, action) = match err {
                    NormalizeError::InvalidInputKind { .. } => {
                        (AnomalyKind::InvalidInputKind, policy.invalid_input)
                    }
                    NormalizeError::EmptyResult { .. } => {
                        (AnomalyKind::EmptyResult, policy.empty_result)
                    }
                };
                if action == AnomalyPolicy::Abort {
                    return Err(DocketError::from_normalize(err, row, column));
                }

                let raw = table.rows()[row].get(col).unwrap_or_default().to_string();
                tracing::warn!(
                    "row {}, column '{}': {}; flagged as '{}'",
                    row,
                    column,
                    err,
                    policy.placeholder
                );
                anomalies.push(Anomaly {
                    row,
                    column: column.to_string(),
                    kind,
                    raw,
                });
                cleaned.push(policy.placeholder.clone());
            }
        }
    }

    let counts = DistinctCounts::from_values(&cleaned);
    tracing::info!(
        "'{}': {} rows, {} distinct cleaned values, {} anomalies",
        column,
        cleaned.len(),
        counts.len(),
        anomalies.len()
    );

    Ok(CountedColumn {
        column: column.to_string(),
        cleaned,
        counts,
        anomalies,
    })
}
