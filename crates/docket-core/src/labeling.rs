//! Cluster representatives and per-row labels

use std::collections::HashSet;

use serde::Serialize;

use crate::cluster::{ClusterAssignment, ClusterLabel};
use crate::error::{DocketError, Result};
use crate::frequency::DistinctCounts;
use crate::table::{Record, RecordTable};

/// Columns appended to the source table in annotated output
pub const ANNOTATION_COLUMNS: [&str; 4] = ["PlaintiffCleaned", "OutcomeCleaned", "ClusterNum", "ClusterName"];

/// Canonical name chosen for one cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Representative {
    pub cluster_id: usize,
    pub name: String,
    /// Distinct names in the cluster
    pub member_count: usize,
    /// Table rows whose cleaned plaintiff is in the cluster
    pub row_count: usize,
}

/// Cluster number and name given to one table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLabel {
    pub cluster_num: i64,
    pub cluster_name: String,
}

/// Labels for every row plus the cluster representatives
#[derive(Debug, Clone)]
pub struct Labeling {
    rows: Vec<RowLabel>,
    representatives: Vec<Representative>,
    representative_names: HashSet<String>,
}

impl Labeling {
    /// Row labels aligned with the table rows
    pub fn rows(&self) -> &[RowLabel] {
        &self.rows
    }

    /// One representative per cluster, ordered by cluster id
    pub fn representatives(&self) -> &[Representative] {
        &self.representatives
    }

    /// Whether `name` is the representative of a discovered cluster
    pub fn is_representative(&self, name: &str) -> bool {
        self.representative_names.contains(name)
    }
}

/// Pick a representative per cluster and label every row
///
/// The representative is the member occurring in the most rows; ties go to
/// the lexicographically smallest name. Noise rows keep their own cleaned
/// name with cluster number -1. A cleaned name without a cluster label means
/// the matrix was built from other data and fails the whole labeling.
pub fn label(assignment: &ClusterAssignment, distinct: &DistinctCounts, cleaned: &[String]) -> Result<Labeling> {
    let representatives: Vec<Representative> = (0..assignment.cluster_count())
        .filter_map(|id| {
            let members = assignment.members(id);
            let name = members
                .iter()
                .copied()
                .max_by(|a, b| {
                    let count = |n: &str| distinct.count(n).unwrap_or(0);
                    count(*a).cmp(&count(*b)).then_with(|| b.cmp(a))
                })?
                .to_string();
            Some(Representative {
                cluster_id: id,
                name,
                member_count: members.len(),
                row_count: members.iter().map(|m| distinct.count(m).unwrap_or(0)).sum(),
            })
        })
        .collect();

    let rows = cleaned
        .iter()
        .map(|name| match assignment.label_of(name) {
            Some(ClusterLabel::Cluster(id)) => Ok(RowLabel {
                cluster_num: id as i64,
                cluster_name: representatives[id].name.clone(),
            }),
            Some(ClusterLabel::Noise) => Ok(RowLabel {
                cluster_num: ClusterLabel::NOISE_ID,
                cluster_name: name.clone(),
            }),
            None => Err(DocketError::MalformedPersistedMatrix(format!(
                "cleaned plaintiff '{}' has no cluster label",
                name
            ))),
        })
        .collect::<Result<Vec<_>>>()?;

    let representative_names = representatives.iter().map(|r| r.name.clone()).collect();

    Ok(Labeling {
        rows,
        representatives,
        representative_names,
    })
}

/// A source record with its cleaned values and cluster label
#[derive(Debug, Clone, Copy)]
pub struct AnnotatedRecord<'a> {
    pub record: &'a Record,
    pub plaintiff_cleaned: &'a str,
    pub outcome_cleaned: &'a str,
    pub label: &'a RowLabel,
}

impl AnnotatedRecord<'_> {
    /// Source fields followed by the [`ANNOTATION_COLUMNS`] values
    pub fn fields(&self) -> Vec<String> {
        let mut fields = self.record.fields().to_vec();
        fields.push(self.plaintiff_cleaned.to_string());
        fields.push(self.outcome_cleaned.to_string());
        fields.push(self.label.cluster_num.to_string());
        fields.push(self.label.cluster_name.clone());
        fields
    }
}

/// Zip table rows with their cleaned values and labels
///
/// All slices must be aligned with the table rows.
pub fn annotate<'a>(
    table: &'a RecordTable,
    plaintiffs: &'a [String],
    outcomes: &'a [String],
    labeling: &'a Labeling,
) -> Result<Vec<AnnotatedRecord<'a>>> {
    let n = table.len();
    if plaintiffs.len() != n || outcomes.len() != n || labeling.rows().len() != n {
        return Err(DocketError::InvalidParameter(format!(
            "annotation inputs are not aligned: {} rows, {} plaintiffs, {} outcomes, {} labels",
            n,
            plaintiffs.len(),
            outcomes.len(),
            labeling.rows().len()
        )));
    }

    Ok(table
        .rows()
        .iter()
        .zip(plaintiffs)
        .zip(outcomes)
        .zip(labeling.rows())
        .map(|(((record, plaintiff), outcome), label)| AnnotatedRecord {
            record,
            plaintiff_cleaned: plaintiff,
            outcome_cleaned: outcome,
            label,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(names: &[&str], labels: &[ClusterLabel]) -> ClusterAssignment {
        ClusterAssignment::new(
            names.iter().map(|s| s.to_string()).collect(),
            labels.to_vec(),
            vec![false; names.len()],
        )
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_representative_is_most_frequent() {
        let cleaned = strings(&["XYZ", "XYZ CO", "XYZ CO", "ABC"]);
        let counts = DistinctCounts::from_values(&cleaned);
        let a = assignment(
            &["XYZ CO", "XYZ", "ABC"],
            &[ClusterLabel::Cluster(0), ClusterLabel::Cluster(0), ClusterLabel::Noise],
        );

        let labeling = label(&a, &counts, &cleaned).unwrap();
        assert_eq!(labeling.representatives().len(), 1);
        let rep = &labeling.representatives()[0];
        assert_eq!(rep.name, "XYZ CO");
        assert_eq!(rep.member_count, 2);
        assert_eq!(rep.row_count, 3);

        assert_eq!(
            labeling.rows()[0],
            RowLabel {
                cluster_num: 0,
                cluster_name: "XYZ CO".to_string()
            }
        );
        assert_eq!(
            labeling.rows()[3],
            RowLabel {
                cluster_num: -1,
                cluster_name: "ABC".to_string()
            }
        );
        assert!(labeling.is_representative("XYZ CO"));
        assert!(!labeling.is_representative("ABC"));
    }

    #[test]
    fn test_tie_breaks_lexicographically() {
        let cleaned = strings(&["ZETA", "ALPHA", "MU"]);
        let counts = DistinctCounts::from_values(&cleaned);
        let a = assignment(&["ZETA", "ALPHA", "MU"], &[ClusterLabel::Cluster(0); 3]);

        let labeling = label(&a, &counts, &cleaned).unwrap();
        assert_eq!(labeling.representatives()[0].name, "ALPHA");
        assert!(labeling.rows().iter().all(|r| r.cluster_name == "ALPHA"));
    }

    #[test]
    fn test_unlabelled_name_fails() {
        let cleaned = strings(&["ABC", "NEW NAME"]);
        let counts = DistinctCounts::from_values(&cleaned);
        let a = assignment(&["ABC"], &[ClusterLabel::Noise]);

        let err = label(&a, &counts, &cleaned).unwrap_err();
        assert!(matches!(err, DocketError::MalformedPersistedMatrix(msg) if msg.contains("NEW NAME")));
    }

    #[test]
    fn test_annotate_alignment() {
        let table = RecordTable::new(
            strings(&["Plaintiff Name(s)", "Case Outcome"]),
            vec![Record::new(strings(&["Abc Corp", "Dismissed."]))],
        );
        let cleaned = strings(&["ABC"]);
        let outcomes = strings(&["Dismissed"]);
        let counts = DistinctCounts::from_values(&cleaned);
        let labeling = label(&assignment(&["ABC"], &[ClusterLabel::Noise]), &counts, &cleaned).unwrap();

        let rows = annotate(&table, &cleaned, &outcomes, &labeling).unwrap();
        assert_eq!(
            rows[0].fields(),
            strings(&["Abc Corp", "Dismissed.", "ABC", "Dismissed", "-1", "ABC"])
        );

        assert!(annotate(&table, &cleaned, &[], &labeling).is_err());
    }
}
