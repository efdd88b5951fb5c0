//! docket-core: entity resolution for plaintiff names in court-record tables
//!
//! Raw plaintiff and outcome strings are cleaned, distinct plaintiff names
//! are scored pairwise, and DBSCAN over the resulting distances groups the
//! spellings of one real-world party. Each group gets a representative name,
//! and the table is cross-tabulated by representative and outcome.
//!
//! # Example
//!
//! ```
//! use docket_core::pipeline::{prepare, resolve};
//! use docket_core::similarity::{build, NoProgress, ScorerKind};
//! use docket_core::{DocketConfig, Record, RecordTable};
//!
//! let rows = [
//!     ("Midland Funding LLC", "Judgment for Plaintiff"),
//!     ("Midland Funding, LLC", "Dismissed"),
//!     ("ABC Corp", "Dismissed"),
//! ];
//! let table = RecordTable::new(
//!     vec!["Plaintiff Name(s)".into(), "Case Outcome".into()],
//!     rows.iter()
//!         .map(|(p, o)| Record::new(vec![p.to_string(), o.to_string()]))
//!         .collect(),
//! );
//!
//! let config = DocketConfig::default();
//! let prepared = prepare(table, &config).unwrap();
//! let matrix = build(&prepared.plaintiffs.counts.names(), &ScorerKind::Jaro, &NoProgress).unwrap();
//! let resolution = resolve(&prepared, Some(&matrix), &config.clustering).unwrap();
//!
//! assert_eq!(resolution.labeling.rows()[0].cluster_name, "MIDLAND FUNDING");
//! assert_eq!(resolution.labeling.rows()[2].cluster_num, -1);
//! ```

pub mod cluster;
pub mod config;
pub mod crosstab;
pub mod error;
pub mod frequency;
pub mod labeling;
pub mod normalization;
pub mod pipeline;
pub mod similarity;
pub mod table;

pub use cluster::{ClusterAssignment, ClusterLabel, ClusterParams, SampleWeights, SweepPoint};
pub use config::{AnomalyPolicy, ConfigError, DocketConfig};
pub use crosstab::{ContingencyTable, CrossTabRow};
pub use error::{DocketError, Result};
pub use frequency::{Anomaly, AnomalyKind, CountedColumn, DistinctCounts, DuplicateReport};
pub use labeling::{AnnotatedRecord, Labeling, Representative, RowLabel};
pub use normalization::{EntityTerms, FieldNormalizer, NormalizeError, OutcomeCleaner, PlaintiffCleaner, BLANK_LABEL};
pub use similarity::{ScorerKind, SimilarityMatrix, SimilarityScorer};
pub use table::{CellValue, ColumnType, Record, RecordTable};
