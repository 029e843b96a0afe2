//! Model training module
//!
//! Provides the hybrid training pipeline:
//! - Typed stage configuration (KMeans, SVC) and the training request
//! - Seeded, stratified train/test split
//! - K-Means clustering (k-means++ / random init, restarts)
//! - Support Vector Classifier (SMO, one-vs-rest, Platt probabilities)
//! - [`HybridTrainer`] orchestrating load → ... → persist

mod config;
mod engine;
pub mod clustering;
pub mod split;
pub mod svm;

pub use config::{
    ClassifierConfig, ClustererConfig, Gamma, GammaHeuristic, InitMethod, KernelKind, NInit,
    TrainingRequest, TrainingStage,
};
pub use engine::{HybridTrainer, TrainingResult};
pub use clustering::KMeans;
pub use split::{take_rows, train_test_split, SplitIndices};
pub use svm::{KernelType, SvmClassifier};

use crate::error::{PipelineError, Result};
use ndarray::{Array1, Array2, Axis};

/// Append the cluster assignment as one extra trailing feature column.
///
/// Training and inference both go through this so the augmented layout is
/// identical on both sides.
pub fn augment_with_clusters(x: &Array2<f64>, clusters: &Array1<usize>) -> Result<Array2<f64>> {
    if x.nrows() != clusters.len() {
        return Err(PipelineError::fit(
            "augment",
            format!("{} rows but {} cluster assignments", x.nrows(), clusters.len()),
        ));
    }
    let column = clusters.mapv(|c| c as f64).insert_axis(Axis(1));
    ndarray::concatenate(Axis(1), &[x.view(), column.view()])
        .map_err(|e| PipelineError::fit("augment", e.to_string()))
}

/// Fraction of positions where prediction and truth agree
pub fn accuracy(predicted: &[String], truth: &[String]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let hits = predicted.iter().zip(truth).filter(|(p, t)| p == t).count();
    hits as f64 / truth.len() as f64
}
