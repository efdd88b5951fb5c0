//! Pluggable string similarity functions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strsim::{jaro, jaro_winkler, normalized_levenshtein, sorensen_dice};

/// A similarity function over cleaned names
///
/// Implementations must be symmetric, bounded in [0, 1], and score identical
/// strings as 1.0 for the resulting matrix to be a valid clustering input.
pub trait SimilarityScorer: Send + Sync {
    /// Name recorded in persisted matrices
    fn name(&self) -> &str;

    fn score(&self, a: &str, b: &str) -> f64;
}

/// Built-in scorers backed by `strsim`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScorerKind {
    #[default]
    Jaro,
    JaroWinkler,
    NormalizedLevenshtein,
    SorensenDice,
}

impl ScorerKind {
    pub const ALL: [ScorerKind; 4] = [
        ScorerKind::Jaro,
        ScorerKind::JaroWinkler,
        ScorerKind::NormalizedLevenshtein,
        ScorerKind::SorensenDice,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScorerKind::Jaro => "jaro",
            ScorerKind::JaroWinkler => "jaro_winkler",
            ScorerKind::NormalizedLevenshtein => "normalized_levenshtein",
            ScorerKind::SorensenDice => "sorensen_dice",
        }
    }
}

impl fmt::Display for ScorerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScorerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        ScorerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "unknown scorer '{}', expected one of: {}",
                    s,
                    ScorerKind::ALL.map(|k| k.as_str()).join(", ")
                )
            })
    }
}

impl SimilarityScorer for ScorerKind {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn score(&self, a: &str, b: &str) -> f64 {
        match self {
            ScorerKind::Jaro => jaro(a, b),
            ScorerKind::JaroWinkler => jaro_winkler(a, b),
            ScorerKind::NormalizedLevenshtein => normalized_levenshtein(a, b),
            ScorerKind::SorensenDice => sorensen_dice(a, b),
        }
    }
}

/// Adapter turning a closure into a named scorer
pub struct FnScorer<F> {
    name: String,
    f: F,
}

impl<F> FnScorer<F>
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> SimilarityScorer for FnScorer<F>
where
    F: Fn(&str, &str) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, a: &str, b: &str) -> f64 {
        (self.f)(a, b)
    }
}
