//! DBSCAN over a precomputed distance matrix

use std::collections::VecDeque;

use rayon::prelude::*;

use super::{ClusterAssignment, ClusterLabel, ClusterParams, SampleWeights};
use crate::error::Result;
use crate::similarity::SimilarityMatrix;

/// Group the names of `matrix` into density clusters
///
/// A name is a core point when the weights of all names within `eps` of it
/// (itself included) sum to at least `min_samples`. Clusters grow from core
/// points in matrix order; a border point joins the first cluster that reaches
/// it. Everything else is noise.
pub fn cluster(
    matrix: &SimilarityMatrix,
    params: &ClusterParams,
    weights: SampleWeights<'_>,
) -> Result<ClusterAssignment> {
    cluster_excluding(matrix, params, weights, &[])
}

/// [`cluster`] with some names kept out of every neighbourhood
///
/// Excluded names are never core points and never reachable, so they always
/// end up as noise. Names in `excluded` that are not on the matrix axes are
/// ignored.
pub fn cluster_excluding(
    matrix: &SimilarityMatrix,
    params: &ClusterParams,
    weights: SampleWeights<'_>,
    excluded: &[String],
) -> Result<ClusterAssignment> {
    params.validate()?;

    let mut skip = vec![false; matrix.len()];
    for i in excluded.iter().filter_map(|name| matrix.position(name)) {
        skip[i] = true;
    }

    let neighbours = neighbourhoods(matrix, params.eps, &skip);
    let weights = weights.resolve(matrix);
    let core = core_points(&neighbours, &weights, params.min_samples);
    let labels = expand(&neighbours, &core);

    let assignment = ClusterAssignment::new(matrix.names().to_vec(), labels, core);
    tracing::debug!(
        "dbscan eps={} min_samples={}: {} clusters, {} core points, {} noise",
        params.eps,
        params.min_samples,
        assignment.cluster_count(),
        assignment.core_count(),
        assignment.noise().len()
    );
    Ok(assignment)
}

/// Indices within `eps` of each index; skipped indices have no neighbours
/// and appear in no neighbourhood
fn neighbourhoods(matrix: &SimilarityMatrix, eps: f64, skip: &[bool]) -> Vec<Vec<usize>> {
    let n = matrix.len();
    (0..n)
        .into_par_iter()
        .map(|i| {
            if skip[i] {
                return Vec::new();
            }
            (0..n)
                .filter(|&j| !skip[j] && matrix.distance(i, j) <= eps)
                .collect()
        })
        .collect()
}

fn core_points(neighbours: &[Vec<usize>], weights: &[usize], min_samples: usize) -> Vec<bool> {
    neighbours
        .iter()
        .map(|hood| hood.iter().map(|&j| weights[j]).sum::<usize>() >= min_samples)
        .collect()
}

/// Breadth-first cluster expansion from core points
fn expand(neighbours: &[Vec<usize>], core: &[bool]) -> Vec<ClusterLabel> {
    let n = neighbours.len();
    let mut labels: Vec<Option<usize>> = vec![None; n];
    let mut next_id = 0;
    let mut queue = VecDeque::new();

    for seed in 0..n {
        if labels[seed].is_some() || !core[seed] {
            continue;
        }

        labels[seed] = Some(next_id);
        queue.push_back(seed);
        while let Some(p) = queue.pop_front() {
            for &q in &neighbours[p] {
                if labels[q].is_none() {
                    labels[q] = Some(next_id);
                    // Border points are labelled but not expanded
                    if core[q] {
                        queue.push_back(q);
                    }
                }
            }
        }
        next_id += 1;
    }

    labels
        .into_iter()
        .map(|l| l.map_or(ClusterLabel::Noise, ClusterLabel::Cluster))
        .collect()
}
