//! Hybrid model artifacts
//!
//! One artifact bundles the fitted preprocessor, clusterer and classifier.
//! On disk it is a bincode envelope (magic, format version, xxh3 checksum)
//! around the bincode-encoded bundle, written to a temporary file and then
//! renamed so readers never observe a partial artifact.

use crate::error::{PipelineError, Result};
use crate::preprocessing::DataPreprocessor;
use crate::training::{KMeans, SvmClassifier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use xxhash_rust::xxh3::xxh3_64;

const MAGIC: [u8; 4] = *b"HYBM";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    format_version: u32,
    checksum: u64,
    payload: Vec<u8>,
}

// Components are optional so that a structurally valid artifact missing one
// of them is reported as corrupt instead of failing to decode.
#[derive(Debug, Serialize, Deserialize)]
struct ArtifactPayload {
    model_name: String,
    /// Artifact file name without extension
    model_base_name: String,
    trained_at: DateTime<Utc>,
    preprocessor: Option<DataPreprocessor>,
    kmeans: Option<KMeans>,
    svm: Option<SvmClassifier>,
}

/// Fully fitted model loaded from an artifact.
///
/// Read-only after load; share it behind an `Arc` for concurrent inference.
#[derive(Debug, Clone)]
pub struct HybridModel {
    name: String,
    trained_at: DateTime<Utc>,
    preprocessor: DataPreprocessor,
    clusterer: KMeans,
    classifier: SvmClassifier,
}

impl HybridModel {
    pub fn new(
        name: impl Into<String>,
        preprocessor: DataPreprocessor,
        clusterer: KMeans,
        classifier: SvmClassifier,
    ) -> Self {
        Self {
            name: name.into(),
            trained_at: Utc::now(),
            preprocessor,
            clusterer,
            classifier,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn preprocessor(&self) -> &DataPreprocessor {
        &self.preprocessor
    }

    pub fn clusterer(&self) -> &KMeans {
        &self.clusterer
    }

    pub fn classifier(&self) -> &SvmClassifier {
        &self.classifier
    }
}

/// Directory of hybrid model artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// The directory is created lazily on the first save
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Base-name tag for a model name prefix: spaces become underscores
    pub fn base_name(prefix: &str) -> String {
        format!("{}_hybrid", prefix.replace(' ', "_"))
    }

    /// Artifact file name for a model name prefix
    pub fn artifact_name(prefix: &str) -> String {
        format!("{}.bin", Self::base_name(prefix))
    }

    /// Full path an artifact with this base name is saved to
    pub fn artifact_path(&self, prefix: &str) -> PathBuf {
        self.root.join(Self::artifact_name(prefix))
    }

    /// Persist a fitted model, replacing any artifact of the same name
    pub fn save(&self, model: &HybridModel) -> Result<PathBuf> {
        fs::create_dir_all(&self.root)?;
        let path = self.artifact_path(&model.name);

        let payload = ArtifactPayload {
            model_name: model.name.clone(),
            model_base_name: Self::base_name(&model.name),
            trained_at: model.trained_at,
            preprocessor: Some(model.preprocessor.clone()),
            kmeans: Some(model.clusterer.clone()),
            svm: Some(model.classifier.clone()),
        };
        let payload = bincode::serialize(&payload).map_err(|e| {
            PipelineError::SerializationError(format!("Failed to serialize model: {}", e))
        })?;
        let envelope = Envelope {
            magic: MAGIC,
            format_version: FORMAT_VERSION,
            checksum: xxh3_64(&payload),
            payload,
        };

        let tmp_path = path.with_extension("bin.tmp");
        let written = write_envelope(&tmp_path, &envelope).and_then(|()| {
            fs::rename(&tmp_path, &path)?;
            Ok(())
        });
        if let Err(e) = written {
            // A failed save leaves no partial file behind
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        info!(path = %path.display(), bytes = envelope.payload.len(), "Model artifact saved");
        Ok(path)
    }

    /// Load and validate an artifact
    pub fn load(path: impl AsRef<Path>) -> Result<HybridModel> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PipelineError::ArtifactNotFound(path.display().to_string()));
        }

        let mut bytes = Vec::new();
        BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
        let corrupt = |reason: String| {
            PipelineError::ArtifactCorrupt(format!("{}: {}", path.display(), reason))
        };

        let envelope: Envelope =
            bincode::deserialize(&bytes).map_err(|e| corrupt(format!("unreadable envelope ({})", e)))?;
        if envelope.magic != MAGIC {
            return Err(corrupt("not a hybrid model artifact".to_string()));
        }
        if envelope.format_version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {}",
                envelope.format_version
            )));
        }
        if xxh3_64(&envelope.payload) != envelope.checksum {
            return Err(corrupt("checksum mismatch".to_string()));
        }

        let payload: ArtifactPayload = bincode::deserialize(&envelope.payload)
            .map_err(|e| corrupt(format!("unreadable payload ({})", e)))?;

        let preprocessor = payload
            .preprocessor
            .ok_or_else(|| corrupt("missing component 'preprocessor'".to_string()))?;
        let clusterer = payload
            .kmeans
            .ok_or_else(|| corrupt("missing component 'kmeans'".to_string()))?;
        let classifier = payload
            .svm
            .ok_or_else(|| corrupt("missing component 'svm'".to_string()))?;

        info!(
            path = %path.display(),
            base_name = %payload.model_base_name,
            "Model artifact loaded"
        );
        Ok(HybridModel {
            name: payload.model_name,
            trained_at: payload.trained_at,
            preprocessor,
            clusterer,
            classifier,
        })
    }
}

fn write_envelope(path: &Path, envelope: &Envelope) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, envelope).map_err(|e| {
        PipelineError::SerializationError(format!("Failed to write artifact: {}", e))
    })?;
    writer.flush()?;
    Ok(())
}
