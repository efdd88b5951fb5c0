//! End-to-end resolution tests

use std::collections::BTreeSet;

use docket_core::cluster::{cluster, eps_range, sweep_eps};
use docket_core::config::ClusteringConfig;
use docket_core::pipeline::{obtain_matrix, prepare, resolve, MatrixSource, Prepared};
use docket_core::similarity::{self, build, NoProgress, ScorerKind};
use docket_core::{ClusterParams, DocketConfig, DocketError, Record, RecordTable, SampleWeights};
use proptest::prelude::*;

fn table(rows: &[(&str, &str)]) -> RecordTable {
    RecordTable::new(
        vec![
            "Case Number".to_string(),
            "Plaintiff Name(s)".to_string(),
            "Case Outcome".to_string(),
        ],
        rows.iter()
            .enumerate()
            .map(|(i, (p, o))| Record::new(vec![format!("CV-{:04}", i), p.to_string(), o.to_string()]))
            .collect(),
    )
}

fn scenario() -> Prepared {
    prepare(
        table(&[
            ("Midland Funding LLC", "Judgment for Plaintiff"),
            ("Midland Funding, LLC", "Dismissed 07/17/2017 1:15 PM"),
            ("ABC Corp", "Dismissed"),
            ("XYZ Inc", "Judgment for Plaintiff. FINAL"),
            ("XYZ Incorporated", "Withdrawn"),
        ]),
        &DocketConfig::default(),
    )
    .unwrap()
}

fn clustering(eps: f64, weight_by_count: bool) -> ClusteringConfig {
    ClusteringConfig {
        eps,
        min_samples: 2,
        weight_by_count,
    }
}

fn names(list: &[&str]) -> BTreeSet<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// === End-to-End Scenario ===

#[test]
fn test_midland_xyz_abc_scenario() {
    let prepared = scenario();
    assert_eq!(prepared.plaintiffs.counts.names(), vec!["MIDLAND FUNDING", "XYZ", "ABC"]);

    let matrix = build(&prepared.plaintiffs.counts.names(), &ScorerKind::Jaro, &NoProgress).unwrap();
    let resolution = resolve(&prepared, Some(&matrix), &clustering(0.15, true)).unwrap();

    assert_eq!(resolution.summary.clusters, 2);
    assert_eq!(
        resolution.assignment.partition(),
        BTreeSet::from([names(&["MIDLAND FUNDING"]), names(&["XYZ"])])
    );

    let rows = resolution.labeling.rows();
    assert_eq!(rows[0].cluster_name, "MIDLAND FUNDING");
    assert_eq!(rows[1].cluster_name, "MIDLAND FUNDING");
    assert_eq!(rows[0].cluster_num, rows[1].cluster_num);
    assert_eq!(rows[3].cluster_name, "XYZ");
    assert_eq!(rows[3].cluster_num, rows[4].cluster_num);
    assert_ne!(rows[0].cluster_num, rows[3].cluster_num);
    assert_eq!(rows[2].cluster_num, -1);
    assert_eq!(rows[2].cluster_name, "ABC");

    let crosstab = &resolution.crosstab;
    assert_eq!(
        crosstab.outcomes(),
        ["Dismissed", "Judgment for Plaintiff", "Withdrawn"]
    );
    assert_eq!(crosstab.count("MIDLAND FUNDING", "Dismissed"), 1);
    assert_eq!(crosstab.count("MIDLAND FUNDING", "Judgment for Plaintiff"), 1);
    assert_eq!(crosstab.count("XYZ", "Judgment for Plaintiff"), 1);
    assert_eq!(crosstab.count("XYZ", "Withdrawn"), 1);
    assert!(crosstab.row("XYZ").unwrap().clustered);
    assert!(!crosstab.row("ABC").unwrap().clustered);
    assert_eq!(crosstab.total(), 5);
}

#[test]
fn test_unweighted_collapsed_names_stay_noise() {
    let prepared = scenario();
    let matrix = build(&prepared.plaintiffs.counts.names(), &ScorerKind::Jaro, &NoProgress).unwrap();
    let resolution = resolve(&prepared, Some(&matrix), &clustering(0.15, false)).unwrap();

    assert_eq!(resolution.summary.clusters, 0);
    assert_eq!(resolution.summary.clustered_rows, 0);
    assert!(resolution.labeling.rows().iter().all(|r| r.cluster_num == -1));
}

#[test]
fn test_spelling_variants_cluster() {
    let prepared = prepare(
        table(&[
            ("Midland Funding LLC", "Dismissed"),
            ("Midland Funding LLC", "Judgment for Plaintiff"),
            ("Midland Fundng LLC", "Dismissed"),
            ("Portfolio Recovery Associates, LLC", "Dismissed"),
            ("Portfolio Recovery Assoc", "Withdrawn"),
            ("ABC Corp", "Dismissed"),
        ]),
        &DocketConfig::default(),
    )
    .unwrap();
    let matrix = build(&prepared.plaintiffs.counts.names(), &ScorerKind::Jaro, &NoProgress).unwrap();
    let resolution = resolve(&prepared, Some(&matrix), &clustering(0.1, false)).unwrap();

    assert_eq!(
        resolution.assignment.partition(),
        BTreeSet::from([
            names(&["MIDLAND FUNDING", "MIDLAND FUNDNG"]),
            names(&["PORTFOLIO RECOVERY ASSOCIATES", "PORTFOLIO RECOVERY ASSOC"]),
        ])
    );

    let labels: Vec<&str> = resolution
        .labeling
        .rows()
        .iter()
        .map(|r| r.cluster_name.as_str())
        .collect();
    assert_eq!(
        labels,
        vec![
            "MIDLAND FUNDING",
            "MIDLAND FUNDING",
            "MIDLAND FUNDING",
            "PORTFOLIO RECOVERY ASSOC",
            "PORTFOLIO RECOVERY ASSOC",
            "ABC",
        ]
    );
    assert_eq!(resolution.crosstab.count("MIDLAND FUNDING", "Dismissed"), 2);
}

#[test]
fn test_annotated_rows_cover_table() {
    let prepared = scenario();
    let matrix = build(&prepared.plaintiffs.counts.names(), &ScorerKind::Jaro, &NoProgress).unwrap();
    let resolution = resolve(&prepared, Some(&matrix), &clustering(0.15, true)).unwrap();

    let annotated = resolution.annotated(&prepared).unwrap();
    assert_eq!(annotated.len(), prepared.table.len());
    let cluster_num = resolution.labeling.rows()[1].cluster_num.to_string();
    assert_eq!(
        annotated[1].fields(),
        vec![
            "CV-0001",
            "Midland Funding, LLC",
            "Dismissed 07/17/2017 1:15 PM",
            "MIDLAND FUNDING",
            "Dismissed",
            cluster_num.as_str(),
            "MIDLAND FUNDING",
        ]
    );
}

// === Matrix Persistence ===

#[test]
fn test_saved_matrix_gives_same_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("20240101120000-similarity.bin");
    let prepared = scenario();

    let built = obtain_matrix(&prepared, &MatrixSource::Build, &ScorerKind::Jaro, &NoProgress).unwrap();
    similarity::save(&built, &path).unwrap();
    let loaded = obtain_matrix(&prepared, &MatrixSource::Load(path), &ScorerKind::Jaro, &NoProgress).unwrap();
    assert_eq!(loaded, built);

    let a = resolve(&prepared, Some(&built), &clustering(0.15, true)).unwrap();
    let b = resolve(&prepared, Some(&loaded), &clustering(0.15, true)).unwrap();
    assert_eq!(a.assignment.partition(), b.assignment.partition());
    assert_eq!(a.crosstab, b.crosstab);
}

#[test]
fn test_matrix_from_other_table_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stale.bin");

    let other = prepare(table(&[("Acme Inc", "Dismissed")]), &DocketConfig::default()).unwrap();
    let stale = obtain_matrix(&other, &MatrixSource::Build, &ScorerKind::Jaro, &NoProgress).unwrap();
    similarity::save(&stale, &path).unwrap();

    let err = obtain_matrix(&scenario(), &MatrixSource::Load(path), &ScorerKind::Jaro, &NoProgress)
        .unwrap_err();
    assert!(matches!(err, DocketError::MalformedPersistedMatrix(_)));
}

#[test]
fn test_no_matrix_is_missing_cluster_input() {
    let err = resolve(&scenario(), None, &ClusteringConfig::default()).unwrap_err();
    assert!(matches!(err, DocketError::MissingClusterInput));
}

// === Property-Based Tests ===

fn name_sets() -> impl Strategy<Value = Vec<String>> {
    prop::collection::btree_set("[A-D]{1,3}( [A-D]{1,3})?", 1..12).prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn test_matrix_symmetric_unit_diagonal(names in name_sets()) {
        let m = build(&names, &ScorerKind::Jaro, &NoProgress).unwrap();
        for i in 0..names.len() {
            prop_assert_eq!(m.get(i, i), 1.0);
            for j in 0..names.len() {
                prop_assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
    }

    #[test]
    fn test_clustering_deterministic_and_covering(names in name_sets(), eps in 0.0f64..0.4) {
        let m = build(&names, &ScorerKind::Jaro, &NoProgress).unwrap();
        let params = ClusterParams { eps, min_samples: 2 };
        let first = cluster(&m, &params, SampleWeights::Uniform).unwrap();
        let second = cluster(&m, &params, SampleWeights::Uniform).unwrap();
        prop_assert_eq!(first.partition(), second.partition());

        let mut seen: Vec<String> = first.noise().iter().map(|s| s.to_string()).collect();
        for id in 0..first.cluster_count() {
            seen.extend(first.members(id).iter().map(|s| s.to_string()));
        }
        seen.sort();
        let mut expected = names.clone();
        expected.sort();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn test_sweep_monotone_in_clustered_names(names in name_sets()) {
        let m = build(&names, &ScorerKind::Jaro, &NoProgress).unwrap();
        let grid = eps_range(0.01, 0.24, 0.01).unwrap();
        let points = sweep_eps(&m, &grid, 2, SampleWeights::Uniform, &[]).unwrap();
        for pair in points.windows(2) {
            prop_assert!(pair[0].clustered_names <= pair[1].clustered_names);
            prop_assert!(pair[0].core_points <= pair[1].core_points);
        }
    }
}
