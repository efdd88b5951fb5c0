//! Epsilon sweep diagnostic

use serde::Serialize;

use super::{cluster_excluding, ClusterParams, SampleWeights};
use crate::error::{DocketError, Result};
use crate::similarity::SimilarityMatrix;

/// Clustering statistics at one epsilon
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub eps: f64,
    pub clusters: usize,
    pub core_points: usize,
    pub clustered_names: usize,
    pub noise_names: usize,
}

/// Evenly spaced epsilon values from `min` to `max`, both included
pub fn eps_range(min: f64, max: f64, step: f64) -> Result<Vec<f64>> {
    if !(step.is_finite() && step > 0.0) {
        return Err(DocketError::InvalidParameter(format!(
            "sweep step must be positive, got {}",
            step
        )));
    }
    if !(min.is_finite() && max.is_finite()) || min < 0.0 || max < min {
        return Err(DocketError::InvalidParameter(format!(
            "sweep range [{}, {}] is not a non-negative interval",
            min, max
        )));
    }

    // Multiply instead of accumulating so rounding does not drift
    let steps = ((max - min) / step + 1e-9).floor() as usize + 1;
    Ok((0..steps).map(|k| min + k as f64 * step).collect())
}

/// Cluster at each epsilon and record how the result changes
///
/// Names in `excluded` are kept out of clustering as in [`cluster_excluding`].
pub fn sweep_eps(
    matrix: &SimilarityMatrix,
    eps_values: &[f64],
    min_samples: usize,
    weights: SampleWeights<'_>,
    excluded: &[String],
) -> Result<Vec<SweepPoint>> {
    eps_values
        .iter()
        .map(|&eps| {
            let params = ClusterParams { eps, min_samples };
            let assignment = cluster_excluding(matrix, &params, weights, excluded)?;
            let noise_names = assignment.noise().len();
            let point = SweepPoint {
                eps,
                clusters: assignment.cluster_count(),
                core_points: assignment.core_count(),
                clustered_names: assignment.len() - noise_names,
                noise_names,
            };
            tracing::info!(
                "eps {:.3}: {} clusters, {} core points, {} noise",
                point.eps,
                point.clusters,
                point.core_points,
                point.noise_names
            );
            Ok(point)
        })
        .collect()
}
