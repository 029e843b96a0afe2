//! Inference configuration

use crate::config::{PipelineSettings, DEFAULT_POSITIVE_CLASS};
use serde::{Deserialize, Serialize};

/// Configuration for scanning data with a trained hybrid model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Label value that counts as a positive (threat) finding
    pub positive_class: String,

    /// Maximum number of flagged rows reported in a scan summary
    pub max_flagged_samples: usize,

    /// Data file extensions accepted by `scan_file`, lowercase, no dot
    pub allowed_extensions: Vec<String>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            positive_class: DEFAULT_POSITIVE_CLASS.to_string(),
            max_flagged_samples: 5,
            allowed_extensions: vec!["csv".to_string()],
        }
    }
}

impl InferenceConfig {
    /// Take the positive class and sample limit from ambient settings
    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self {
            positive_class: settings.positive_class.clone(),
            max_flagged_samples: settings.max_flagged_samples,
            ..Self::default()
        }
    }

    pub fn with_positive_class(mut self, class: impl Into<String>) -> Self {
        self.positive_class = class.into();
        self
    }

    pub fn with_max_flagged_samples(mut self, n: usize) -> Self {
        self.max_flagged_samples = n;
        self
    }

    /// Whether a file extension is accepted (case-insensitive)
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|e| *e == ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = InferenceConfig::default();
        assert_eq!(config.positive_class, "1");
        assert_eq!(config.max_flagged_samples, 5);
        assert!(config.accepts_extension("CSV"));
        assert!(!config.accepts_extension("xlsx"));
    }
}
