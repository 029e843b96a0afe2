//! Inference engine module
//!
//! Applies a persisted hybrid model to unlabeled rows:
//! - Exact replay of the fitted preprocessor, clusterer and classifier
//! - Class labels with per-class probabilities
//! - Scan summaries against a configurable positive class
//! - File scanning with an extension allow-list checked up front

mod config;
mod engine;

pub use config::InferenceConfig;
pub use engine::{
    predict, summarize, InferenceEngine, Prediction, PredictionResult, ScanSummary, ThreatSample,
};
