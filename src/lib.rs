//! hybridscan - Hybrid clustering + classification pipeline
//!
//! Trains a two-stage model where a K-Means cluster assignment is appended
//! as an extra feature for a Support Vector Classifier, persists the fitted
//! (preprocessor, clusterer, classifier) triple as one artifact, and replays
//! the exact chain on new data to flag positive (threat) rows.
//!
//! # Modules
//!
//! - [`preprocessing`] - Feature profiling, scaling, one-hot encoding
//! - [`training`] - KMeans, SVC, split, [`training::HybridTrainer`]
//! - [`inference`] - Prediction and scan summaries
//! - [`export`] - Parameter records and model artifacts
//! - [`config`] - Environment-driven settings
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;
pub mod config;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod inference;

// Utilities
pub mod export;
pub mod utils;

// Services
pub mod cli;

pub use error::{PipelineError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{PipelineError, Result};

    // Settings
    pub use crate::config::PipelineSettings;

    // Preprocessing
    pub use crate::preprocessing::{build_preprocessor, profile_dataset, DataPreprocessor, FeaturePartition};

    // Training
    pub use crate::training::{
        ClassifierConfig, ClustererConfig, HybridTrainer, KMeans, SvmClassifier, TrainingRequest,
        TrainingResult,
    };

    // Inference
    pub use crate::inference::{InferenceConfig, InferenceEngine, Prediction, PredictionResult, ScanSummary};

    // Export
    pub use crate::export::{serialize_params_dict, ArtifactStore, HybridModel, ParamMap, ParamValue};
}
