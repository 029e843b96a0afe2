//! Process-level settings
//!
//! Values come from the environment with fallbacks. Nothing here touches the
//! filesystem: the artifact directory is created by the store on first write.

use std::path::PathBuf;

/// Default location for persisted hybrid models
pub const DEFAULT_ARTIFACTS_DIR: &str = "./data/trained_models";

/// Label value treated as a positive (threat) finding unless overridden
pub const DEFAULT_POSITIVE_CLASS: &str = "1";

/// Settings shared by the CLI and embedding applications
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Directory the artifact store writes models into
    pub artifacts_dir: PathBuf,
    /// Positive class label used for scan summaries
    pub positive_class: String,
    /// Maximum number of flagged rows reported in a scan summary
    pub max_flagged_samples: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            artifacts_dir: std::env::var("HYBRIDSCAN_ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACTS_DIR)),
            positive_class: std::env::var("HYBRIDSCAN_POSITIVE_CLASS")
                .unwrap_or_else(|_| DEFAULT_POSITIVE_CLASS.to_string()),
            max_flagged_samples: std::env::var("HYBRIDSCAN_MAX_FLAGGED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        }
    }
}

impl PipelineSettings {
    /// Settings resolved from the environment
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Override the artifacts directory
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    /// Override the positive class label
    pub fn with_positive_class(mut self, label: impl Into<String>) -> Self {
        self.positive_class = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let settings = PipelineSettings::default()
            .with_artifacts_dir("/tmp/models")
            .with_positive_class("attack");
        assert_eq!(settings.artifacts_dir, PathBuf::from("/tmp/models"));
        assert_eq!(settings.positive_class, "attack");
    }
}
