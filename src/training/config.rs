//! Typed hyperparameter configuration for the training stages
//!
//! Each stage takes a serde struct with documented defaults; a missing key
//! falls back to the default, an unknown key or out-of-range value is a
//! hyperparameter error raised before any fitting work starts.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Centroid initialization strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InitMethod {
    #[default]
    #[serde(rename = "k-means++")]
    KMeansPlusPlus,
    #[serde(rename = "random")]
    Random,
}

impl fmt::Display for InitMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitMethod::KMeansPlusPlus => write!(f, "k-means++"),
            InitMethod::Random => write!(f, "random"),
        }
    }
}

/// Number of restarts, either explicit or `"auto"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NInit {
    Count(usize),
    Auto(AutoMarker),
}

/// The literal string `"auto"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoMarker {
    #[serde(rename = "auto")]
    Auto,
}

impl NInit {
    /// Number of restarts actually run
    pub fn resolve(&self) -> usize {
        match self {
            NInit::Count(n) => *n,
            NInit::Auto(_) => 10,
        }
    }
}

impl Default for NInit {
    fn default() -> Self {
        NInit::Count(10)
    }
}

/// KMeans configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClustererConfig {
    pub n_clusters: usize,
    pub init: InitMethod,
    pub n_init: NInit,
    pub max_iter: usize,
    pub tol: f64,
    pub random_state: Option<u64>,
}

impl Default for ClustererConfig {
    fn default() -> Self {
        Self {
            n_clusters: 3,
            init: InitMethod::default(),
            n_init: NInit::default(),
            max_iter: 300,
            tol: 1e-4,
            random_state: None,
        }
    }
}

impl ClustererConfig {
    /// Parse from a JSON object; blank input means all defaults
    pub fn from_json(input: &str) -> Result<Self> {
        let config: Self = parse_stage_json("kmeans", input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_n_clusters(mut self, n_clusters: usize) -> Self {
        self.n_clusters = n_clusters;
        self
    }

    pub fn with_init(mut self, init: InitMethod) -> Self {
        self.init = init;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = NInit::Count(n_init);
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_clusters == 0 {
            return Err(PipelineError::Hyperparameter(
                "kmeans: n_clusters must be at least 1".to_string(),
            ));
        }
        if self.n_init.resolve() == 0 {
            return Err(PipelineError::Hyperparameter(
                "kmeans: n_init must be at least 1".to_string(),
            ));
        }
        if self.max_iter == 0 {
            return Err(PipelineError::Hyperparameter(
                "kmeans: max_iter must be at least 1".to_string(),
            ));
        }
        if !(self.tol.is_finite() && self.tol >= 0.0) {
            return Err(PipelineError::Hyperparameter(format!(
                "kmeans: tol must be a non-negative number, got {}",
                self.tol
            )));
        }
        Ok(())
    }
}

/// SVM kernel family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelKind {
    Linear,
    #[serde(rename = "poly")]
    Polynomial,
    #[default]
    Rbf,
    Sigmoid,
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            KernelKind::Linear => "linear",
            KernelKind::Polynomial => "poly",
            KernelKind::Rbf => "rbf",
            KernelKind::Sigmoid => "sigmoid",
        };
        write!(f, "{}", name)
    }
}

/// Kernel coefficient: a heuristic name or an explicit positive value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Gamma {
    Named(GammaHeuristic),
    Value(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GammaHeuristic {
    /// 1 / (n_features * variance of X)
    Scale,
    /// 1 / n_features
    Auto,
}

impl Default for Gamma {
    fn default() -> Self {
        Gamma::Named(GammaHeuristic::Scale)
    }
}

impl fmt::Display for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gamma::Named(GammaHeuristic::Scale) => write!(f, "scale"),
            Gamma::Named(GammaHeuristic::Auto) => write!(f, "auto"),
            Gamma::Value(v) => write!(f, "{}", v),
        }
    }
}

/// SVC configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    #[serde(rename = "C")]
    pub c: f64,
    pub kernel: KernelKind,
    pub gamma: Gamma,
    pub degree: u32,
    pub coef0: f64,
    pub tol: f64,
    pub max_iter: usize,
    pub probability: bool,
    pub random_state: Option<u64>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            kernel: KernelKind::default(),
            gamma: Gamma::default(),
            degree: 3,
            coef0: 0.0,
            tol: 1e-3,
            max_iter: 1000,
            probability: true,
            random_state: None,
        }
    }
}

impl ClassifierConfig {
    /// Parse from a JSON object; blank input means all defaults
    pub fn from_json(input: &str) -> Result<Self> {
        let config: Self = parse_stage_json("svm", input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_c(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    pub fn with_kernel(mut self, kernel: KernelKind) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_gamma(mut self, gamma: Gamma) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(PipelineError::Hyperparameter(format!(
                "svm: C must be a positive number, got {}",
                self.c
            )));
        }
        if let Gamma::Value(g) = self.gamma {
            if !(g.is_finite() && g > 0.0) {
                return Err(PipelineError::Hyperparameter(format!(
                    "svm: gamma must be 'scale', 'auto' or a positive number, got {}",
                    g
                )));
            }
        }
        if self.max_iter == 0 {
            return Err(PipelineError::Hyperparameter(
                "svm: max_iter must be at least 1".to_string(),
            ));
        }
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(PipelineError::Hyperparameter(format!(
                "svm: tol must be a positive number, got {}",
                self.tol
            )));
        }
        if !self.probability {
            return Err(PipelineError::Hyperparameter(
                "svm: probability estimates are required by the pipeline".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_stage_json<T: Default + for<'de> Deserialize<'de>>(stage: &str, input: &str) -> Result<T> {
    if input.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(input)
        .map_err(|e| PipelineError::Hyperparameter(format!("{}: {}", stage, e)))
}

/// Linear training state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingStage {
    Loaded,
    Partitioned,
    Split,
    Preprocessed,
    Clustered,
    Augmented,
    Classified,
    Evaluated,
    Persisted,
}

impl fmt::Display for TrainingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrainingStage::Loaded => "LOADED",
            TrainingStage::Partitioned => "PARTITIONED",
            TrainingStage::Split => "SPLIT",
            TrainingStage::Preprocessed => "PREPROCESSED",
            TrainingStage::Clustered => "CLUSTERED",
            TrainingStage::Augmented => "AUGMENTED",
            TrainingStage::Classified => "CLASSIFIED",
            TrainingStage::Evaluated => "EVALUATED",
            TrainingStage::Persisted => "PERSISTED",
        };
        write!(f, "{}", name)
    }
}

/// Inputs of one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRequest {
    pub dataset_path: PathBuf,
    /// Prefix of the artifact name
    pub model_name: String,
    pub target_column: Option<String>,
    pub kmeans: ClustererConfig,
    pub svm: ClassifierConfig,
    /// Held-out fraction, within [0.1, 0.5]
    pub test_size: f64,
    pub random_state: Option<u64>,
}

impl TrainingRequest {
    pub fn new(dataset_path: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            dataset_path: dataset_path.into(),
            model_name: model_name.into(),
            target_column: None,
            kmeans: ClustererConfig::default(),
            svm: ClassifierConfig::default(),
            test_size: 0.2,
            random_state: None,
        }
    }

    pub fn with_target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    pub fn with_kmeans(mut self, config: ClustererConfig) -> Self {
        self.kmeans = config;
        self
    }

    pub fn with_svm(mut self, config: ClassifierConfig) -> Self {
        self.svm = config;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Check every hyperparameter before any work starts
    pub fn validate(&self) -> Result<()> {
        if !(0.1..=0.5).contains(&self.test_size) {
            return Err(PipelineError::Hyperparameter(format!(
                "test_size must lie in [0.1, 0.5], got {}",
                self.test_size
            )));
        }
        if self.model_name.trim().is_empty() {
            return Err(PipelineError::Hyperparameter(
                "model name must not be empty".to_string(),
            ));
        }
        self.kmeans.validate()?;
        self.svm.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        assert_eq!(ClustererConfig::from_json("").unwrap(), ClustererConfig::default());
        assert_eq!(ClassifierConfig::from_json("  ").unwrap(), ClassifierConfig::default());
    }

    #[test]
    fn test_partial_kmeans_config() {
        let config = ClustererConfig::from_json(r#"{"n_clusters": 5, "n_init": "auto"}"#).unwrap();
        assert_eq!(config.n_clusters, 5);
        assert_eq!(config.n_init.resolve(), 10);
        assert_eq!(config.max_iter, 300);
        assert_eq!(config.init, InitMethod::KMeansPlusPlus);
    }

    #[test]
    fn test_svm_config_wire_names() {
        let config =
            ClassifierConfig::from_json(r#"{"C": 2.5, "kernel": "poly", "gamma": 0.5}"#).unwrap();
        assert_eq!(config.c, 2.5);
        assert_eq!(config.kernel, KernelKind::Polynomial);
        assert_eq!(config.gamma, Gamma::Value(0.5));

        let config = ClassifierConfig::from_json(r#"{"gamma": "auto"}"#).unwrap();
        assert_eq!(config.gamma, Gamma::Named(GammaHeuristic::Auto));
    }

    #[test]
    fn test_rejected_configs() {
        for bad in [
            r#"{"n_clusters": 0}"#,
            r#"{"n_clusters": "three"}"#,
            r#"{"unknown_key": 1}"#,
            r#"{"n_init": "sometimes"}"#,
            "{not json",
        ] {
            let err = ClustererConfig::from_json(bad).unwrap_err();
            assert_eq!(err.kind(), "hyperparameter", "input: {bad}");
        }
        for bad in [
            r#"{"C": -1}"#,
            r#"{"kernel": "cubic"}"#,
            r#"{"gamma": -0.1}"#,
            r#"{"probability": false}"#,
        ] {
            let err = ClassifierConfig::from_json(bad).unwrap_err();
            assert_eq!(err.kind(), "hyperparameter", "input: {bad}");
        }
    }

    #[test]
    fn test_request_test_size_bounds() {
        let request = TrainingRequest::new("data.csv", "m");
        assert!(request.clone().with_test_size(0.1).validate().is_ok());
        assert!(request.clone().with_test_size(0.5).validate().is_ok());
        assert!(request.clone().with_test_size(0.05).validate().is_err());
        assert!(request.with_test_size(0.6).validate().is_err());
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(TrainingStage::Persisted.to_string(), "PERSISTED");
        assert_eq!(KernelKind::Polynomial.to_string(), "poly");
        assert_eq!(Gamma::default().to_string(), "scale");
    }
}
