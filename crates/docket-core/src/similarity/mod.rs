//! Pairwise similarity of distinct cleaned names
//!
//! The matrix is computed once over every pair of distinct names and can be
//! saved and reloaded, since the quadratic build dominates a run.

mod matrix;
pub mod persist;
mod scorer;

pub use matrix::{
    build, estimate_build_time, BuildEstimate, BuildProgress, LogProgress, NoProgress,
    ProgressSink, SimilarityMatrix,
};
pub use persist::{load, save};
pub use scorer::{FnScorer, ScorerKind, SimilarityScorer};
