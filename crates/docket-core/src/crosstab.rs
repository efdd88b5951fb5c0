//! Cluster name by outcome contingency table

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{DocketError, Result};
use crate::labeling::Labeling;

/// Suffix of default contingency table file names
pub const CROSSTAB_FILE_SUFFIX: &str = "comparedPO.csv";

/// One row of the contingency table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTabRow {
    pub cluster_name: String,
    /// Whether the name represents a discovered cluster rather than noise
    pub clustered: bool,
    /// Counts aligned with [`ContingencyTable::outcomes`]
    pub counts: Vec<usize>,
}

/// Row counts per (cluster name, cleaned outcome)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContingencyTable {
    outcomes: Vec<String>,
    rows: Vec<CrossTabRow>,
}

impl ContingencyTable {
    /// Outcome columns, sorted
    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    /// Rows sorted by cluster name
    pub fn rows(&self) -> &[CrossTabRow] {
        &self.rows
    }

    pub fn row(&self, cluster_name: &str) -> Option<&CrossTabRow> {
        self.rows
            .binary_search_by(|r| r.cluster_name.as_str().cmp(cluster_name))
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Count for one pair; 0 when either side is absent
    pub fn count(&self, cluster_name: &str, outcome: &str) -> usize {
        let Some(col) = self.outcomes.iter().position(|o| o == outcome) else {
            return 0;
        };
        self.row(cluster_name).map_or(0, |r| r.counts[col])
    }

    /// Sum over all cells
    pub fn total(&self) -> usize {
        self.rows.iter().flat_map(|r| &r.counts).sum()
    }
}

/// Cross-tabulate row cluster names against cleaned outcomes
///
/// `outcomes` must be aligned with the labeled rows.
pub fn crosstab(labeling: &Labeling, outcomes: &[String]) -> Result<ContingencyTable> {
    let labels = labeling.rows();
    if labels.len() != outcomes.len() {
        return Err(DocketError::InvalidParameter(format!(
            "{} row labels but {} outcomes",
            labels.len(),
            outcomes.len()
        )));
    }

    let columns: BTreeSet<&str> = outcomes.iter().map(String::as_str).collect();
    let column_index: BTreeMap<&str, usize> = columns.iter().enumerate().map(|(i, &o)| (o, i)).collect();

    let mut table: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (label, outcome) in labels.iter().zip(outcomes) {
        let counts = table
            .entry(label.cluster_name.as_str())
            .or_insert_with(|| vec![0; columns.len()]);
        counts[column_index[outcome.as_str()]] += 1;
    }

    let rows = table
        .into_iter()
        .map(|(name, counts)| CrossTabRow {
            cluster_name: name.to_string(),
            clustered: labeling.is_representative(name),
            counts,
        })
        .collect();

    Ok(ContingencyTable {
        outcomes: columns.into_iter().map(String::from).collect(),
        rows,
    })
}
