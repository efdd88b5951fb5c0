//! Density clustering of names over a precomputed similarity matrix

mod dbscan;
mod sweep;

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::error::{DocketError, Result};
use crate::frequency::DistinctCounts;
use crate::similarity::SimilarityMatrix;

pub use dbscan::{cluster, cluster_excluding};
pub use sweep::{eps_range, sweep_eps, SweepPoint};

/// Cluster membership of one name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClusterLabel {
    Cluster(usize),
    Noise,
}

impl ClusterLabel {
    /// Numeric form written to output tables
    pub const NOISE_ID: i64 = -1;

    pub fn as_i64(&self) -> i64 {
        match self {
            ClusterLabel::Cluster(id) => *id as i64,
            ClusterLabel::Noise => Self::NOISE_ID,
        }
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, ClusterLabel::Noise)
    }

    pub fn cluster_id(&self) -> Option<usize> {
        match self {
            ClusterLabel::Cluster(id) => Some(*id),
            ClusterLabel::Noise => None,
        }
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i64())
    }
}

/// DBSCAN parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    /// Largest distance (1 - similarity) at which two names are neighbours
    pub eps: f64,
    /// Neighbourhood weight a core point needs, itself included
    pub min_samples: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            eps: 0.1,
            min_samples: 2,
        }
    }
}

impl ClusterParams {
    pub fn validate(&self) -> Result<()> {
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(DocketError::InvalidParameter(format!(
                "eps must be a non-negative number, got {}",
                self.eps
            )));
        }
        if self.min_samples == 0 {
            return Err(DocketError::InvalidParameter(
                "min_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// How much each name contributes to a neighbourhood
#[derive(Debug, Clone, Copy)]
pub enum SampleWeights<'a> {
    /// Every name counts once
    Uniform,
    /// Every name counts as many times as it occurs in the table
    Counts(&'a DistinctCounts),
}

impl SampleWeights<'_> {
    /// Weight of each matrix index
    ///
    /// Names absent from the counts weigh 1.
    pub(crate) fn resolve(&self, matrix: &SimilarityMatrix) -> Vec<usize> {
        match self {
            SampleWeights::Uniform => vec![1; matrix.len()],
            SampleWeights::Counts(counts) => matrix
                .names()
                .iter()
                .map(|name| counts.count(name).unwrap_or(1))
                .collect(),
        }
    }
}

/// Result of clustering: one label per matrix name
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    names: Vec<String>,
    labels: Vec<ClusterLabel>,
    core: Vec<bool>,
    cluster_count: usize,
    index: HashMap<String, usize>,
}

impl ClusterAssignment {
    pub(crate) fn new(names: Vec<String>, labels: Vec<ClusterLabel>, core: Vec<bool>) -> Self {
        let cluster_count = labels
            .iter()
            .filter_map(|l| l.cluster_id())
            .max()
            .map_or(0, |max| max + 1);
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            labels,
            core,
            cluster_count,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn label_of(&self, name: &str) -> Option<ClusterLabel> {
        self.index.get(name).map(|&i| self.labels[i])
    }

    pub fn is_core(&self, name: &str) -> bool {
        self.index.get(name).is_some_and(|&i| self.core[i])
    }

    pub fn cluster_count(&self) -> usize {
        self.cluster_count
    }

    pub fn core_count(&self) -> usize {
        self.core.iter().filter(|&&c| c).count()
    }

    /// Names in cluster `id`, in matrix order
    pub fn members(&self, id: usize) -> Vec<&str> {
        self.names_where(|label| label == ClusterLabel::Cluster(id))
    }

    /// Names outside every cluster, in matrix order
    pub fn noise(&self) -> Vec<&str> {
        self.names_where(|label| label.is_noise())
    }

    /// Clusters as sets of names, independent of cluster ids
    pub fn partition(&self) -> BTreeSet<BTreeSet<String>> {
        (0..self.cluster_count)
            .map(|id| self.members(id).into_iter().map(String::from).collect())
            .collect()
    }

    fn names_where(&self, keep: impl Fn(ClusterLabel) -> bool) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.labels)
            .filter(|(_, &label)| keep(label))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
