//! Run configuration loaded from TOML
//!
//! Every section is optional; omitted keys take the defaults below.
//!
//! ```toml
//! [columns]
//! plaintiff = "Plaintiff Name(s)"
//! outcome = "Case Outcome"
//!
//! [normalization]
//! missing_markers = ["", "NULL", "NA"]
//! entity_terms = ["inc", "corp", "co", "llc"]
//!
//! [similarity]
//! scorer = "jaro"
//!
//! [clustering]
//! eps = 0.1
//! min_samples = 2
//! weight_by_count = true
//!
//! [anomalies]
//! empty_result = "flag"
//! invalid_input = "abort"
//! placeholder = "UNRESOLVED"
//!
//! [output]
//! directory = "."
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cluster::ClusterParams;
use crate::normalization::{EntityTerms, DEFAULT_ENTITY_TERMS};
use crate::similarity::ScorerKind;
use crate::table::DEFAULT_MISSING_MARKERS;

/// Errors that can occur when loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("TOML parse error: {0}")]
    Parse(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocketConfig {
    pub columns: ColumnConfig,
    pub normalization: NormalizationConfig,
    pub similarity: SimilarityConfig,
    pub clustering: ClusteringConfig,
    pub anomalies: AnomalyConfig,
    pub output: OutputConfig,
}

impl DocketConfig {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_toml(&text)
    }

    /// Parse and validate configuration text
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: DocketConfig =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.plaintiff.is_empty() || self.columns.outcome.is_empty() {
            return Err(ConfigError::Invalid("column names must not be empty".to_string()));
        }
        if !self.clustering.eps.is_finite() || self.clustering.eps < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "clustering.eps must be a non-negative number, got {}",
                self.clustering.eps
            )));
        }
        if self.clustering.min_samples == 0 {
            return Err(ConfigError::Invalid(
                "clustering.min_samples must be at least 1".to_string(),
            ));
        }
        if self.anomalies.placeholder.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "anomalies.placeholder must not be blank".to_string(),
            ));
        }
        Ok(())
    }
}

/// Names of the columns the pipeline reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub plaintiff: String,
    pub outcome: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            plaintiff: "Plaintiff Name(s)".to_string(),
            outcome: "Case Outcome".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Raw field texts read as missing values
    pub missing_markers: Vec<String>,
    /// Entity designators stripped from the end of plaintiff names
    pub entity_terms: Vec<String>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            missing_markers: DEFAULT_MISSING_MARKERS.iter().map(|s| s.to_string()).collect(),
            entity_terms: DEFAULT_ENTITY_TERMS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl NormalizationConfig {
    pub fn entity_terms(&self) -> EntityTerms {
        EntityTerms::new(&self.entity_terms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    pub scorer: ScorerKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Largest distance (1 - similarity) at which two names are neighbours
    pub eps: f64,
    /// Neighbourhood weight needed for a core point
    pub min_samples: usize,
    /// Weight each name by its occurrence count instead of 1
    pub weight_by_count: bool,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            eps: 0.1,
            min_samples: 2,
            weight_by_count: true,
        }
    }
}

impl ClusteringConfig {
    pub fn params(&self) -> ClusterParams {
        ClusterParams {
            eps: self.eps,
            min_samples: self.min_samples,
        }
    }
}

/// What to do when a row fails a cleaning rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyPolicy {
    /// Keep the row with the placeholder value and record the anomaly
    Flag,
    /// Fail the run
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    pub empty_result: AnomalyPolicy,
    pub invalid_input: AnomalyPolicy,
    /// Cleaned value given to flagged rows
    pub placeholder: String,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            empty_result: AnomalyPolicy::Flag,
            invalid_input: AnomalyPolicy::Abort,
            placeholder: "UNRESOLVED".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for timestamped output files
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl OutputConfig {
    /// `<directory>/<YYYYMMDDHHMMSS>-<suffix>`
    pub fn timestamped_path(&self, now: NaiveDateTime, suffix: &str) -> PathBuf {
        self.directory.join(timestamped_name(now, suffix))
    }
}

/// File name prefixed with a second-resolution timestamp
pub fn timestamped_name(now: NaiveDateTime, suffix: &str) -> String {
    format!("{}-{}", now.format("%Y%m%d%H%M%S"), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DocketConfig::from_toml("").unwrap();
        assert_eq!(config.columns.plaintiff, "Plaintiff Name(s)");
        assert_eq!(config.columns.outcome, "Case Outcome");
        assert_eq!(config.clustering.eps, 0.1);
        assert_eq!(config.clustering.min_samples, 2);
        assert!(config.clustering.weight_by_count);
        assert_eq!(config.similarity.scorer, ScorerKind::Jaro);
        assert_eq!(config.anomalies.empty_result, AnomalyPolicy::Flag);
        assert_eq!(config.anomalies.invalid_input, AnomalyPolicy::Abort);
    }

    #[test]
    fn test_partial_sections() {
        let config = DocketConfig::from_toml(
            r#"
            [clustering]
            eps = 0.15

            [similarity]
            scorer = "jaro_winkler"

            [anomalies]
            invalid_input = "flag"
            "#,
        )
        .unwrap();
        assert_eq!(config.clustering.eps, 0.15);
        assert_eq!(config.clustering.min_samples, 2);
        assert_eq!(config.similarity.scorer, ScorerKind::JaroWinkler);
        assert_eq!(config.anomalies.invalid_input, AnomalyPolicy::Flag);
        assert_eq!(config.anomalies.placeholder, "UNRESOLVED");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            DocketConfig::from_toml("[clustering]\neps = -0.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DocketConfig::from_toml("[clustering]\nmin_samples = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            DocketConfig::from_toml("[clustering\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_custom_entity_terms() {
        let config = DocketConfig::from_toml("[normalization]\nentity_terms = [\"bank\"]").unwrap();
        let terms = config.normalization.entity_terms();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms.strip_suffixes("First Bank"), "First");
    }

    #[test]
    fn test_timestamped_path() {
        let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 9)
            .unwrap();
        assert_eq!(timestamped_name(now, "comparedPO.csv"), "20240305140709-comparedPO.csv");

        let output = OutputConfig {
            directory: PathBuf::from("out"),
        };
        assert_eq!(
            output.timestamped_path(now, "similarity.bin"),
            PathBuf::from("out/20240305140709-similarity.bin")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = DocketConfig::load("/nonexistent/docket.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
