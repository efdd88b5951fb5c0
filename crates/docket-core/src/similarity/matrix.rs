//! All-pairs similarity matrix over distinct cleaned names

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::scorer::SimilarityScorer;
use crate::error::{DocketError, Result};
use crate::frequency::DistinctCounts;

/// Number of progress reports over a full build (one per 5%)
const PROGRESS_STEPS: usize = 20;

/// Symmetric similarity matrix with named axes
///
/// Only the upper triangle (diagonal included) is stored, row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    names: Vec<String>,
    index: HashMap<String, usize>,
    values: Vec<f64>,
    scorer: String,
}

impl SimilarityMatrix {
    /// Assemble a matrix from its packed upper triangle
    ///
    /// Fails with [`DocketError::MalformedPersistedMatrix`] when the parts are
    /// inconsistent: wrong value count, duplicate names, a score outside
    /// [0, 1] or a diagonal entry other than 1.
    pub fn from_packed(names: Vec<String>, values: Vec<f64>, scorer: impl Into<String>) -> Result<Self> {
        let n = names.len();
        let expected = packed_len(n);
        if values.len() != expected {
            return Err(DocketError::MalformedPersistedMatrix(format!(
                "{} names need {} packed scores, found {}",
                n,
                expected,
                values.len()
            )));
        }

        let index = name_index(&names)?;

        if let Some(pos) = values.iter().position(|v| !(0.0..=1.0).contains(v)) {
            return Err(DocketError::MalformedPersistedMatrix(format!(
                "score {} at packed position {} is outside [0, 1]",
                values[pos], pos
            )));
        }
        for i in 0..n {
            if values[packed_index(n, i, i)] != 1.0 {
                return Err(DocketError::MalformedPersistedMatrix(format!(
                    "self-similarity of '{}' is not 1",
                    names[i]
                )));
            }
        }

        Ok(Self {
            names,
            index,
            values,
            scorer: scorer.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Axis labels in index order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of the scorer that produced the scores
    pub fn scorer_name(&self) -> &str {
        &self.scorer
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Similarity of two indices
    ///
    /// Panics if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let n = self.len();
        assert!(i < n && j < n, "index ({}, {}) out of range for {} names", i, j, n);
        self.values[packed_index(n, i, j)]
    }

    /// Distance (1 - similarity) of two indices
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        1.0 - self.get(i, j)
    }

    /// Similarity of two names, if both are on the axes
    pub fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        Some(self.get(self.position(a)?, self.position(b)?))
    }

    /// Packed upper triangle, row-major
    pub fn packed_values(&self) -> &[f64] {
        &self.values
    }

    /// Check that the axes hold exactly the names in `distinct`
    ///
    /// Order is not compared, so a matrix built from the same names in a
    /// different order is still accepted.
    pub fn check_labels(&self, distinct: &DistinctCounts) -> Result<()> {
        let missing: Vec<&str> = distinct
            .iter()
            .map(|(name, _)| name)
            .filter(|name| !self.index.contains_key(*name))
            .collect();
        let extra = self
            .names
            .iter()
            .filter(|name| !distinct.contains(name))
            .count();

        if missing.is_empty() && extra == 0 {
            return Ok(());
        }

        let example = missing
            .first()
            .map(|name| format!(" (e.g. '{}')", name))
            .unwrap_or_default();
        Err(DocketError::MalformedPersistedMatrix(format!(
            "matrix labels do not match the table: {} names missing{}, {} names not in the table",
            missing.len(),
            example,
            extra
        )))
    }
}

/// Progress of a matrix build, in scored cells of the upper triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildProgress {
    pub cells_done: usize,
    pub cells_total: usize,
    pub elapsed: Duration,
}

impl BuildProgress {
    pub fn fraction(&self) -> f64 {
        if self.cells_total == 0 {
            1.0
        } else {
            self.cells_done as f64 / self.cells_total as f64
        }
    }

    /// Remaining time extrapolated from the rate so far
    pub fn remaining(&self) -> Option<Duration> {
        if self.cells_done == 0 {
            return None;
        }
        let left = (self.cells_total - self.cells_done) as f64;
        Some(self.elapsed.mul_f64(left / self.cells_done as f64))
    }
}

/// Receiver of build progress reports
///
/// Called from worker threads, roughly every 5% of the work.
pub trait ProgressSink: Sync {
    fn report(&self, progress: &BuildProgress);
}

/// Logs progress through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, progress: &BuildProgress) {
        tracing::info!(
            "similarity matrix {:.0}% ({} of {} pairs), {:.1}s elapsed, ~{:.1}s remaining",
            progress.fraction() * 100.0,
            progress.cells_done,
            progress.cells_total,
            progress.elapsed.as_secs_f64(),
            progress.remaining().unwrap_or_default().as_secs_f64()
        );
    }
}

/// Discards progress reports
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _progress: &BuildProgress) {}
}

/// Score every pair of `names`
///
/// Rows of the upper triangle are scored in parallel, each into its own
/// slice of the packed storage. Self-similarity is fixed at 1.
pub fn build<S>(names: &[String], scorer: &S, progress: &dyn ProgressSink) -> Result<SimilarityMatrix>
where
    S: SimilarityScorer + ?Sized,
{
    let n = names.len();
    let index = name_index(names)?;
    let total = packed_len(n);
    let mut values = vec![0.0; total];

    let mut rows: Vec<(usize, &mut [f64])> = Vec::with_capacity(n);
    let mut rest = values.as_mut_slice();
    for i in 0..n {
        let (row, tail) = std::mem::take(&mut rest).split_at_mut(n - i);
        rows.push((i, row));
        rest = tail;
    }

    let start = Instant::now();
    let done = AtomicUsize::new(0);

    rows.into_par_iter().try_for_each(|(i, row)| -> Result<()> {
        row[0] = 1.0;
        for (offset, cell) in row.iter_mut().enumerate().skip(1) {
            let j = i + offset;
            let score = scorer.score(&names[i], &names[j]);
            if !(0.0..=1.0).contains(&score) {
                return Err(DocketError::ScoreOutOfRange {
                    a: names[i].clone(),
                    b: names[j].clone(),
                    score,
                });
            }
            *cell = score;
        }

        let len = row.len();
        let after = done.fetch_add(len, Ordering::Relaxed) + len;
        let before = after - len;
        if after * PROGRESS_STEPS / total > before * PROGRESS_STEPS / total {
            progress.report(&BuildProgress {
                cells_done: after,
                cells_total: total,
                elapsed: start.elapsed(),
            });
        }
        Ok(())
    })?;

    tracing::debug!(
        "scored {} pairs of {} names with {} in {:.2}s",
        total,
        n,
        scorer.name(),
        start.elapsed().as_secs_f64()
    );

    Ok(SimilarityMatrix {
        names: names.to_vec(),
        index,
        values,
        scorer: scorer.name().to_string(),
    })
}

/// Projected duration of a full matrix build
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildEstimate {
    pub names: usize,
    pub sampled_rows: usize,
    pub sample_elapsed: Duration,
    pub per_comparison: Duration,
    pub estimated_total: Duration,
}

/// Time `sample` full rows of the matrix and extrapolate to the n(n-1)/2
/// pairs a build scores
pub fn estimate_build_time<S>(names: &[String], scorer: &S, sample: usize) -> Result<BuildEstimate>
where
    S: SimilarityScorer + ?Sized,
{
    if sample == 0 {
        return Err(DocketError::InvalidParameter(
            "sample size must be at least 1".to_string(),
        ));
    }

    let n = names.len();
    let sampled_rows = sample.min(n);
    let start = Instant::now();

    let checksum: f64 = names[..sampled_rows]
        .par_iter()
        .map(|a| names.iter().map(|b| scorer.score(a, b)).sum::<f64>())
        .sum();
    let sample_elapsed = start.elapsed();
    tracing::debug!("estimate sample checksum {}", checksum);

    let comparisons = sampled_rows * n;
    let per_comparison = if comparisons == 0 {
        Duration::ZERO
    } else {
        sample_elapsed.div_f64(comparisons as f64)
    };
    // The diagonal is fixed at 1, so a build scores only the strict upper triangle
    let estimated_total = per_comparison.mul_f64(scored_pairs(n) as f64);

    Ok(BuildEstimate {
        names: n,
        sampled_rows,
        sample_elapsed,
        per_comparison,
        estimated_total,
    })
}

fn packed_len(n: usize) -> usize {
    n * (n + 1) / 2
}

fn scored_pairs(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Position of (i, j) in the packed upper triangle
fn packed_index(n: usize, i: usize, j: usize) -> usize {
    let (i, j) = if i <= j { (i, j) } else { (j, i) };
    i * (2 * n - i + 1) / 2 + (j - i)
}

fn name_index(names: &[String]) -> Result<HashMap<String, usize>> {
    let mut seen = HashSet::with_capacity(names.len());
    if let Some(dup) = names.iter().find(|name| !seen.insert(name.as_str())) {
        return Err(DocketError::MalformedPersistedMatrix(format!(
            "duplicate name '{}' on matrix axes",
            dup
        )));
    }
    Ok(names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect())
}
