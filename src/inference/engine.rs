//! Inference engine implementation
//!
//! Replays the training-time chain on new rows with the loaded, fitted
//! components only: transform → cluster-assign → augment → classify. Nothing
//! is ever refit here.

use super::InferenceConfig;
use crate::error::{PipelineError, Result};
use crate::export::{ArtifactStore, HybridModel};
use crate::training::augment_with_clusters;
use crate::utils::{file_extension, load_csv_with_text_columns};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-row output of a hybrid model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Predicted class label per row
    pub labels: Vec<String>,
    /// Probability per class per row, columns in `classes` order
    pub probabilities: Vec<Vec<f64>>,
    pub classes: Vec<String>,
}

/// One flagged row in a scan summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatSample {
    pub item_index_in_file: usize,
    /// Positive-class probability rounded to 4 decimals
    pub probability_of_threat: f64,
}

/// Aggregate view of a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub summary: String,
    pub total_items_scanned: usize,
    pub threats_detected_count: usize,
    pub is_overall_threat_detected: bool,
    pub detailed_threat_info_sample: Vec<ThreatSample>,
}

/// Prediction plus its summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Prediction,
    pub summary: ScanSummary,
}

/// Run a loaded hybrid model over unlabeled rows.
///
/// Columns are matched by name. A column the preprocessor expects but the
/// input lacks is a schema error; columns it does not know are ignored.
pub fn predict(rows: &DataFrame, model: &HybridModel) -> Result<Prediction> {
    let preprocessor = model.preprocessor();
    let expected = preprocessor.expected_columns();

    let extra: Vec<String> = rows
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .filter(|c| !expected.contains(c))
        .collect();
    if !extra.is_empty() {
        warn!(columns = ?extra, "Ignoring input columns unknown to the model");
    }

    let x = preprocessor.transform(rows)?;
    let clusters = model.clusterer().predict(&x)?;
    let x = augment_with_clusters(&x, &clusters)?;
    debug!(shape = ?x.dim(), "Augmented inference features");

    let classifier = model.classifier();
    let labels = classifier.predict(&x)?;
    let proba = classifier.predict_proba(&x)?;

    Ok(Prediction {
        labels,
        probabilities: proba.outer_iter().map(|row| row.to_vec()).collect(),
        classes: classifier.classes().to_vec(),
    })
}

/// Summarize a prediction with respect to a positive class.
///
/// When the positive class is not among the classifier's classes every
/// reported probability is 0.0.
pub fn summarize(prediction: &Prediction, positive_class: &str, max_samples: usize) -> ScanSummary {
    let class_idx = prediction.classes.iter().position(|c| c == positive_class);
    if class_idx.is_none() {
        warn!(
            positive_class,
            classes = ?prediction.classes,
            "Positive class not among the model's classes, threat probabilities reported as 0"
        );
    }

    let flagged: Vec<usize> = prediction
        .labels
        .iter()
        .enumerate()
        .filter(|(_, label)| label.as_str() == positive_class)
        .map(|(i, _)| i)
        .collect();

    let detailed_threat_info_sample = flagged
        .iter()
        .take(max_samples)
        .map(|&i| {
            let p = class_idx
                .and_then(|k| prediction.probabilities.get(i).and_then(|row| row.get(k)))
                .copied()
                .unwrap_or(0.0);
            ThreatSample {
                item_index_in_file: i,
                probability_of_threat: (p * 10_000.0).round() / 10_000.0,
            }
        })
        .collect();

    let total = prediction.labels.len();
    ScanSummary {
        summary: format!(
            "Scan completed. {} potential threat(s) detected out of {} items processed.",
            flagged.len(),
            total
        ),
        total_items_scanned: total,
        threats_detected_count: flagged.len(),
        is_overall_threat_detected: !flagged.is_empty(),
        detailed_threat_info_sample,
    }
}

/// Inference engine over one loaded hybrid model
#[derive(Debug, Clone)]
pub struct InferenceEngine {
    config: InferenceConfig,
    model: Arc<HybridModel>,
}

impl InferenceEngine {
    /// Wrap an already-loaded model
    pub fn new(config: InferenceConfig, model: Arc<HybridModel>) -> Self {
        Self { config, model }
    }

    /// Load a model artifact from disk
    pub fn load(config: InferenceConfig, artifact: impl AsRef<Path>) -> Result<Self> {
        let model = ArtifactStore::load(artifact)?;
        Ok(Self::new(config, Arc::new(model)))
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    pub fn model(&self) -> &Arc<HybridModel> {
        &self.model
    }

    /// Labels and class probabilities for each row
    pub fn predict(&self, rows: &DataFrame) -> Result<Prediction> {
        predict(rows, &self.model)
    }

    /// Summary of a prediction under this engine's positive class
    pub fn summarize(&self, prediction: &Prediction) -> ScanSummary {
        summarize(
            prediction,
            &self.config.positive_class,
            self.config.max_flagged_samples,
        )
    }

    /// Predict and summarize
    pub fn scan(&self, rows: &DataFrame) -> Result<PredictionResult> {
        let start = Instant::now();
        let prediction = self.predict(rows)?;
        let summary = self.summarize(&prediction);
        info!(
            model = %self.model.name(),
            rows = summary.total_items_scanned,
            flagged = summary.threats_detected_count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scan complete"
        );
        Ok(PredictionResult { prediction, summary })
    }

    /// Scan a data file with a model artifact.
    ///
    /// The file type is checked before the artifact is touched.
    pub fn scan_file(
        config: InferenceConfig,
        artifact: impl AsRef<Path>,
        data: impl AsRef<Path>,
    ) -> Result<PredictionResult> {
        let data = data.as_ref();
        let ext = file_extension(data).unwrap_or_default();
        if !config.accepts_extension(&ext) {
            return Err(PipelineError::UnsupportedInput(format!(
                "'{}' is not a supported data file (accepted: {})",
                data.display(),
                config.allowed_extensions.join(", ")
            )));
        }

        let engine = Self::load(config, artifact)?;
        if !data.is_file() {
            return Err(PipelineError::DatasetIo(format!(
                "data file '{}' does not exist",
                data.display()
            )));
        }
        // Categorical columns are read as text so their values match training
        let rows = load_csv_with_text_columns(data, engine.model.preprocessor().categorical_columns())?;
        if rows.height() == 0 {
            return Err(PipelineError::DatasetIo(format!(
                "data file '{}' has no rows",
                data.display()
            )));
        }
        engine.scan(&rows)
    }
}
