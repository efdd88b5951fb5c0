//! End-to-end resolution of a court-record table
//!
//! A run is split in three steps so that the expensive matrix can be built
//! once and reused:
//!
//! 1. [`prepare`] removes duplicate rows and cleans both columns
//! 2. [`obtain_matrix`] builds or loads the similarity matrix
//! 3. [`resolve`] clusters, labels and cross-tabulates

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;

use crate::cluster::{cluster_excluding, ClusterAssignment, SampleWeights};
use crate::config::{ClusteringConfig, DocketConfig};
use crate::crosstab::{crosstab, ContingencyTable};
use crate::error::{DocketError, Result};
use crate::frequency::{count_distinct, remove_duplicates, CountedColumn, DuplicateReport};
use crate::labeling::{annotate, label, AnnotatedRecord, Labeling};
use crate::normalization::{OutcomeCleaner, PlaintiffCleaner, BLANK_LABEL};
use crate::similarity::{self, ProgressSink, SimilarityMatrix, SimilarityScorer};
use crate::table::RecordTable;

/// A deduplicated table with both columns cleaned and counted
#[derive(Debug, Clone)]
pub struct Prepared {
    pub table: RecordTable,
    pub duplicates: DuplicateReport,
    pub plaintiffs: CountedColumn,
    pub outcomes: CountedColumn,
    /// Cleaned plaintiff values standing for missing or flagged input
    ///
    /// These never form clusters and pass through as their own name.
    pub placeholders: Vec<String>,
}

impl Prepared {
    pub fn anomaly_count(&self) -> usize {
        self.plaintiffs.anomalies.len() + self.outcomes.anomalies.len()
    }
}

/// Deduplicate `table` and clean its plaintiff and outcome columns
pub fn prepare(mut table: RecordTable, config: &DocketConfig) -> Result<Prepared> {
    let start = Instant::now();
    let duplicates = remove_duplicates(&mut table);

    let plaintiff_cleaner = PlaintiffCleaner::new(config.normalization.entity_terms());
    let plaintiffs = count_distinct(&table, &config.columns.plaintiff, &plaintiff_cleaner, &config.anomalies)?;
    let outcomes = count_distinct(&table, &config.columns.outcome, &OutcomeCleaner, &config.anomalies)?;

    tracing::info!(
        "prepared {} rows: {} distinct plaintiffs, {} distinct outcomes in {:.2}s",
        table.len(),
        plaintiffs.counts.len(),
        outcomes.counts.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(Prepared {
        table,
        duplicates,
        plaintiffs,
        outcomes,
        placeholders: vec![BLANK_LABEL.to_string(), config.anomalies.placeholder.clone()],
    })
}

/// Deduplicate `table` and clean only its outcome column
pub fn prepare_outcomes(mut table: RecordTable, config: &DocketConfig) -> Result<(DuplicateReport, CountedColumn)> {
    let duplicates = remove_duplicates(&mut table);
    let outcomes = count_distinct(&table, &config.columns.outcome, &OutcomeCleaner, &config.anomalies)?;
    Ok((duplicates, outcomes))
}

/// Where the similarity matrix of a run comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixSource {
    /// Score every pair of distinct plaintiffs now
    Build,
    /// Reuse a matrix saved by an earlier run
    Load(PathBuf),
}

/// Build or load the matrix for the prepared plaintiffs
///
/// A loaded matrix must carry exactly the current distinct plaintiffs.
pub fn obtain_matrix(
    prepared: &Prepared,
    source: &MatrixSource,
    scorer: &dyn SimilarityScorer,
    progress: &dyn ProgressSink,
) -> Result<SimilarityMatrix> {
    let start = Instant::now();
    let matrix = match source {
        MatrixSource::Build => {
            let names = prepared.plaintiffs.counts.names();
            tracing::info!(
                "scoring {} distinct plaintiffs with {}",
                names.len(),
                scorer.name()
            );
            similarity::build(&names, scorer, progress)?
        }
        MatrixSource::Load(path) => {
            let matrix = similarity::load(path)?;
            matrix.check_labels(&prepared.plaintiffs.counts)?;
            if matrix.scorer_name() != scorer.name() {
                tracing::warn!(
                    "matrix {} was scored with {}, not the configured {}",
                    path.display(),
                    matrix.scorer_name(),
                    scorer.name()
                );
            }
            matrix
        }
    };
    tracing::info!("similarity matrix ready in {:.2}s", start.elapsed().as_secs_f64());
    Ok(matrix)
}

/// Counts describing a finished run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionSummary {
    pub rows: usize,
    pub duplicates_removed: usize,
    pub anomalies: usize,
    pub distinct_plaintiffs: usize,
    pub distinct_outcomes: usize,
    pub clusters: usize,
    pub core_points: usize,
    pub noise_names: usize,
    pub clustered_rows: usize,
    pub eps: f64,
    pub min_samples: usize,
    pub weight_by_count: bool,
}

/// Everything a run produces after clustering
#[derive(Debug, Clone)]
pub struct Resolution {
    pub assignment: ClusterAssignment,
    pub labeling: Labeling,
    pub crosstab: ContingencyTable,
    pub summary: ResolutionSummary,
}

impl Resolution {
    /// Source rows joined with their cleaned values and labels
    pub fn annotated<'a>(&'a self, prepared: &'a Prepared) -> Result<Vec<AnnotatedRecord<'a>>> {
        annotate(
            &prepared.table,
            &prepared.plaintiffs.cleaned,
            &prepared.outcomes.cleaned,
            &self.labeling,
        )
    }
}

/// Cluster the prepared plaintiffs and tabulate them against outcomes
///
/// Placeholder names are kept out of clustering and labelled as noise. Fails with [`DocketError::MissingClusterInput`] when no matrix is given.
pub fn resolve(
    prepared: &Prepared,
    matrix: Option<&SimilarityMatrix>,
    clustering: &ClusteringConfig,
) -> Result<Resolution> {
    let matrix = matrix.ok_or(DocketError::MissingClusterInput)?;
    matrix.check_labels(&prepared.plaintiffs.counts)?;

    let start = Instant::now();
    let params = clustering.params();
    let weights = if clustering.weight_by_count {
        SampleWeights::Counts(&prepared.plaintiffs.counts)
    } else {
        SampleWeights::Uniform
    };
    let assignment = cluster_excluding(matrix, &params, weights, &prepared.placeholders)?;
    tracing::info!(
        "clustered {} names into {} clusters in {:.2}s",
        assignment.len(),
        assignment.cluster_count(),
        start.elapsed().as_secs_f64()
    );

    let labeling = label(&assignment, &prepared.plaintiffs.counts, &prepared.plaintiffs.cleaned)?;
    for rep in labeling.representatives() {
        tracing::debug!(
            "cluster {} '{}': {} names, {} rows",
            rep.cluster_id,
            rep.name,
            rep.member_count,
            rep.row_count
        );
    }

    let crosstab = crosstab(&labeling, &prepared.outcomes.cleaned)?;

    let summary = ResolutionSummary {
        rows: prepared.table.len(),
        duplicates_removed: prepared.duplicates.duplicates_removed,
        anomalies: prepared.anomaly_count(),
        distinct_plaintiffs: prepared.plaintiffs.counts.len(),
        distinct_outcomes: prepared.outcomes.counts.len(),
        clusters: assignment.cluster_count(),
        core_points: assignment.core_count(),
        noise_names: assignment.noise().len(),
        clustered_rows: labeling.rows().iter().filter(|r| r.cluster_num >= 0).count(),
        eps: params.eps,
        min_samples: params.min_samples,
        weight_by_count: clustering.weight_by_count,
    };
    tracing::info!(
        "{} clusters cover {} of {} rows; {} outcome columns, {} cluster names",
        summary.clusters,
        summary.clustered_rows,
        summary.rows,
        crosstab.outcomes().len(),
        crosstab.rows().len()
    );

    Ok(Resolution {
        assignment,
        labeling,
        crosstab,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::{NoProgress, ScorerKind};
    use crate::table::Record;

    fn table(rows: &[(&str, &str)]) -> RecordTable {
        RecordTable::new(
            vec!["Plaintiff Name(s)".to_string(), "Case Outcome".to_string()],
            rows.iter()
                .map(|(p, o)| Record::new(vec![p.to_string(), o.to_string()]))
                .collect(),
        )
    }

    #[test]
    fn test_resolve_without_matrix() {
        let prepared = prepare(table(&[("Acme", "Dismissed")]), &DocketConfig::default()).unwrap();
        let err = resolve(&prepared, None, &ClusteringConfig::default()).unwrap_err();
        assert!(matches!(err, DocketError::MissingClusterInput));
    }

    #[test]
    fn test_prepare_reports_duplicates() {
        let prepared = prepare(
            table(&[("Acme", "Dismissed"), ("Acme", "Dismissed"), ("Beta", "Withdrawn")]),
            &DocketConfig::default(),
        )
        .unwrap();
        assert_eq!(prepared.duplicates.duplicates_removed, 1);
        assert_eq!(prepared.table.len(), 2);
        assert_eq!(prepared.plaintiffs.cleaned, vec!["ACME", "BETA"]);
    }

    #[test]
    fn test_stale_matrix_rejected() {
        let prepared = prepare(table(&[("Acme", "Dismissed"), ("Beta", "Withdrawn")]), &DocketConfig::default())
            .unwrap();
        let other = similarity::build(
            &["ACME".to_string(), "GAMMA".to_string()],
            &ScorerKind::Jaro,
            &NoProgress,
        )
        .unwrap();
        let err = resolve(&prepared, Some(&other), &ClusteringConfig::default()).unwrap_err();
        assert!(matches!(err, DocketError::MalformedPersistedMatrix(_)));
    }

    #[test]
    fn test_placeholders_pass_through() {
        let prepared = prepare(
            table(&[
                ("", "Dismissed"),
                ("", "Withdrawn"),
                ("Acme", "Dismissed"),
                ("???", "Dismissed"),
                ("!!!", "Withdrawn"),
            ]),
            &DocketConfig::default(),
        )
        .unwrap();
        assert_eq!(prepared.placeholders, vec!["Blank or NULL", "UNRESOLVED"]);
        assert_eq!(prepared.plaintiffs.counts.count("Blank or NULL"), Some(2));
        assert_eq!(prepared.plaintiffs.counts.count("UNRESOLVED"), Some(2));

        let matrix = similarity::build(&prepared.plaintiffs.counts.names(), &ScorerKind::Jaro, &NoProgress)
            .unwrap();
        let resolution = resolve(&prepared, Some(&matrix), &ClusteringConfig::default()).unwrap();

        assert_eq!(resolution.summary.clusters, 0);
        assert!(resolution.labeling.rows().iter().all(|r| r.cluster_num == -1));
        assert_eq!(resolution.labeling.rows()[0].cluster_name, "Blank or NULL");
        assert_eq!(resolution.labeling.rows()[3].cluster_name, "UNRESOLVED");
        assert!(!resolution.crosstab.row("Blank or NULL").unwrap().clustered);
        assert!(!resolution.crosstab.row("UNRESOLVED").unwrap().clustered);
        assert_eq!(resolution.crosstab.count("UNRESOLVED", "Withdrawn"), 1);
    }

    #[test]
    fn test_prepare_outcomes_only() {
        let t = RecordTable::new(
            vec!["Case Outcome".to_string()],
            vec![
                Record::new(vec!["Dismissed 07/17/2017 1:15 PM".to_string()]),
                Record::new(vec!["Dismissed".to_string()]),
            ],
        );
        let (dups, outcomes) = prepare_outcomes(t, &DocketConfig::default()).unwrap();
        assert_eq!(dups.duplicates_removed, 0);
        assert_eq!(outcomes.counts.count("Dismissed"), Some(2));
    }
}
