//! Hybrid training engine
//!
//! Runs the linear stage sequence
//! `LOADED → PARTITIONED → SPLIT → PREPROCESSED → CLUSTERED → AUGMENTED →
//! CLASSIFIED → EVALUATED → PERSISTED`. Any stage failure aborts the run and
//! nothing is written.

use super::config::{TrainingRequest, TrainingStage};
use super::{accuracy, augment_with_clusters, take_rows, train_test_split, KMeans, SvmClassifier};
use crate::config::PipelineSettings;
use crate::error::Result;
use crate::export::{serialize_params_dict, ArtifactStore, HybridModel, ParamMap, ParamValue};
use crate::preprocessing::{build_preprocessor, profile_dataset, FeatureProfile};
use crate::utils::load_dataset;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Outcome of a successful training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingResult {
    /// Fraction of held-out rows predicted correctly
    pub accuracy: f64,
    pub model_path: PathBuf,
    /// JSON-safe record of every setting and fitted parameter
    pub parameters: Value,
}

/// Trains hybrid models and persists them into an artifact store
#[derive(Debug, Clone)]
pub struct HybridTrainer {
    store: ArtifactStore,
}

impl HybridTrainer {
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }

    pub fn from_settings(settings: &PipelineSettings) -> Self {
        Self::new(ArtifactStore::new(&settings.artifacts_dir))
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Run the full pipeline for one request
    pub fn train(&self, request: &TrainingRequest) -> Result<TrainingResult> {
        let start = Instant::now();
        let stage = |s: TrainingStage| {
            info!(stage = %s, elapsed_ms = start.elapsed().as_millis() as u64, "Training stage reached");
        };

        // Hyperparameters are checked before any data is touched
        request.validate()?;

        let df = load_dataset(&request.dataset_path)?;
        stage(TrainingStage::Loaded);

        let profile = profile_dataset(&df, request.target_column.as_deref())?;
        stage(TrainingStage::Partitioned);

        let split = train_test_split(&profile.labels, request.test_size, request.random_state)?;
        let train_df = take_rows(&profile.features, &split.train)?;
        let test_df = take_rows(&profile.features, &split.test)?;
        let y_train: Vec<String> = split.train.iter().map(|&i| profile.labels[i].clone()).collect();
        let y_test: Vec<String> = split.test.iter().map(|&i| profile.labels[i].clone()).collect();
        stage(TrainingStage::Split);

        let mut preprocessor = build_preprocessor(
            &profile.partition.numerical_features,
            &profile.partition.categorical_features,
        );
        let x_train = preprocessor.fit_transform(&train_df)?;
        let x_test = preprocessor.transform(&test_df)?;
        debug!(train = ?x_train.dim(), test = ?x_test.dim(), "Features transformed");
        stage(TrainingStage::Preprocessed);

        let mut kmeans = KMeans::from_config(&request.kmeans, request.random_state);
        kmeans.fit(&x_train)?;
        let train_clusters = kmeans.labels()?.clone();
        let test_clusters = kmeans.predict(&x_test)?;
        stage(TrainingStage::Clustered);

        let x_train = augment_with_clusters(&x_train, &train_clusters)?;
        let x_test = augment_with_clusters(&x_test, &test_clusters)?;
        stage(TrainingStage::Augmented);

        let mut svm = SvmClassifier::from_config(&request.svm, request.random_state);
        svm.fit(&x_train, &y_train)?;
        stage(TrainingStage::Classified);

        let predicted = svm.predict(&x_test)?;
        let accuracy = accuracy(&predicted, &y_test);
        stage(TrainingStage::Evaluated);

        let model = HybridModel::new(request.model_name.clone(), preprocessor, kmeans, svm);
        let parameters = parameter_record(request, &profile, &model, split.stratified);
        let model_path = self.store.save(&model)?;
        stage(TrainingStage::Persisted);

        info!(
            model = %request.model_name,
            accuracy,
            path = %model_path.display(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Training complete"
        );

        Ok(TrainingResult {
            accuracy,
            model_path,
            parameters,
        })
    }
}

fn parameter_record(
    request: &TrainingRequest,
    profile: &FeatureProfile,
    model: &HybridModel,
    stratified: bool,
) -> Value {
    let mut preprocessing = ParamMap::new();
    preprocessing.insert(
        "numerical_features_identified".to_string(),
        ParamValue::from(profile.partition.numerical_features.clone()),
    );
    preprocessing.insert(
        "categorical_features_identified".to_string(),
        ParamValue::from(profile.partition.categorical_features.clone()),
    );
    preprocessing.insert(
        "transformers_applied_config".to_string(),
        model.preprocessor().spec().to_param_value(),
    );

    let target = if profile.target_defaulted {
        "last_column_default".to_string()
    } else {
        profile.target_column.clone()
    };

    let mut record = ParamMap::new();
    record.insert("kmeans_params_used".to_string(), ParamValue::Map(model.clusterer().get_params()));
    record.insert("svm_params_used".to_string(), ParamValue::Map(model.classifier().get_params()));
    record.insert("preprocessing_details".to_string(), ParamValue::Map(preprocessing));
    record.insert("target_column_used".to_string(), ParamValue::from(target));
    record.insert(
        "dataset_source_file_path".to_string(),
        ParamValue::from(request.dataset_path.display().to_string()),
    );
    record.insert("training_test_split_size".to_string(), ParamValue::from(request.test_size));
    record.insert(
        "training_random_state_for_split".to_string(),
        ParamValue::from(request.random_state),
    );
    record.insert("stratified_split".to_string(), ParamValue::Bool(stratified));

    serialize_params_dict(&record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::ClustererConfig;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_csv(rows: usize) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "bytes,duration,proto,label").unwrap();
        for i in 0..rows {
            let label = i % 2;
            let bytes = if label == 1 { 900.0 + i as f64 } else { 10.0 + i as f64 };
            let proto = ["tcp", "udp", "icmp"][i % 3];
            writeln!(file, "{},{},{},{}", bytes, (i % 7) as f64 * 0.5, proto, label).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_train_small_dataset() {
        let data = write_csv(40);
        let dir = tempdir().unwrap();
        let trainer = HybridTrainer::new(ArtifactStore::new(dir.path().join("models")));
        let request = TrainingRequest::new(data.path(), "small net")
            .with_kmeans(ClustererConfig::default().with_n_clusters(2))
            .with_random_state(42);

        let result = trainer.train(&request).unwrap();
        assert!((0.0..=1.0).contains(&result.accuracy));
        assert!(result.model_path.ends_with("small_net_hybrid.bin"));
        assert!(result.model_path.exists());
        assert_eq!(result.parameters["target_column_used"], "last_column_default");
        assert_eq!(
            result.parameters["preprocessing_details"]["categorical_features_identified"],
            serde_json::json!(["proto"])
        );
    }

    #[test]
    fn test_bad_hyperparameters_write_nothing() {
        let data = write_csv(20);
        let dir = tempdir().unwrap();
        let root = dir.path().join("models");
        let trainer = HybridTrainer::new(ArtifactStore::new(&root));
        let request = TrainingRequest::new(data.path(), "m").with_test_size(0.9);

        let err = trainer.train(&request).unwrap_err();
        assert_eq!(err.kind(), "hyperparameter");
        assert!(!root.exists());
    }

    #[test]
    fn test_too_many_clusters_is_fit_error() {
        let data = write_csv(10);
        let dir = tempdir().unwrap();
        let root = dir.path().join("models");
        let trainer = HybridTrainer::new(ArtifactStore::new(&root));
        let request = TrainingRequest::new(data.path(), "m")
            .with_kmeans(ClustererConfig::default().with_n_clusters(50))
            .with_random_state(1);

        let err = trainer.train(&request).unwrap_err();
        assert_eq!(err.kind(), "fit");
        assert!(!root.exists());
    }
}
