//! Integration test: Full pipeline (load → preprocess → cluster → classify → persist → scan)

use hybridscan::export::ArtifactStore;
use hybridscan::inference::{InferenceConfig, InferenceEngine};
use hybridscan::training::{ClassifierConfig, ClustererConfig, HybridTrainer, TrainingRequest};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn create_traffic_dataset(n: usize) -> DataFrame {
    let mut bytes = Vec::with_capacity(n);
    let mut duration = Vec::with_capacity(n);
    let mut packets = Vec::with_capacity(n);
    let mut ratio = Vec::with_capacity(n);
    let mut proto = Vec::with_capacity(n);
    let mut label = Vec::with_capacity(n);

    for i in 0..n {
        let x = i as f64;
        let threat = i % 4 == 0;
        bytes.push(if threat { 5000.0 + x * 3.0 } else { 200.0 + (x * 0.7).sin() * 50.0 });
        duration.push(if threat { 0.2 + (x * 0.1).cos().abs() } else { 4.0 + (x * 0.3).sin() });
        packets.push((i % 13) as f64 + if threat { 40.0 } else { 2.0 });
        ratio.push((x * 0.05).sin());
        proto.push(["tcp", "udp", "icmp"][i % 3]);
        label.push(if threat { 1i64 } else { 0 });
    }

    df!(
        "bytes" => &bytes,
        "duration" => &duration,
        "packets" => &packets,
        "ratio" => &ratio,
        "proto" => &proto,
        "label" => &label
    )
    .unwrap()
}

fn write_csv(dir: &Path, name: &str, df: &mut DataFrame) -> PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();
    path
}

fn trained(dir: &TempDir, df: &mut DataFrame) -> (hybridscan::training::TrainingResult, PathBuf) {
    let data = write_csv(dir.path(), "traffic.csv", df);
    let trainer = HybridTrainer::new(ArtifactStore::new(dir.path().join("models")));
    let request = TrainingRequest::new(&data, "net monitor")
        .with_kmeans(ClustererConfig::default().with_n_clusters(3))
        .with_svm(ClassifierConfig::default())
        .with_test_size(0.2)
        .with_random_state(42);
    (trainer.train(&request).unwrap(), data)
}

#[test]
fn test_train_then_scan() {
    let dir = tempdir().unwrap();
    let mut df = create_traffic_dataset(100);
    let (result, _) = trained(&dir, &mut df);

    assert!(result.accuracy > 0.8, "accuracy {}", result.accuracy);
    assert!(result.model_path.exists());
    assert!(result.model_path.ends_with("net_monitor_hybrid.bin"));

    let params = &result.parameters;
    for key in [
        "kmeans_params_used",
        "svm_params_used",
        "preprocessing_details",
        "target_column_used",
        "dataset_source_file_path",
        "training_test_split_size",
        "training_random_state_for_split",
    ] {
        assert!(params.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(params["kmeans_params_used"]["n_clusters"], 3);
    assert_eq!(params["svm_params_used"]["kernel"], "rbf");
    assert_eq!(params["training_test_split_size"], 0.2);
    assert_eq!(params["training_random_state_for_split"], 42);
    assert_eq!(params["stratified_split"], true);
    assert_eq!(
        params["preprocessing_details"]["numerical_features_identified"],
        serde_json::json!(["bytes", "duration", "packets", "ratio"])
    );

    // Unlabeled rows, scanned through the saved artifact
    let mut rows = create_traffic_dataset(5).drop("label").unwrap();
    let rows_path = write_csv(dir.path(), "rows.csv", &mut rows);
    let scan = InferenceEngine::scan_file(InferenceConfig::default(), &result.model_path, &rows_path)
        .unwrap();

    assert_eq!(scan.prediction.labels.len(), 5);
    assert_eq!(scan.prediction.classes, vec!["0", "1"]);
    for row in &scan.prediction.probabilities {
        let total: f64 = row.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }
    assert_eq!(scan.summary.total_items_scanned, 5);
    assert_eq!(scan.prediction.labels[0], "1");
    assert!(scan.summary.is_overall_threat_detected);
    assert_eq!(scan.summary.detailed_threat_info_sample[0].item_index_in_file, 0);
}

#[test]
fn test_training_is_deterministic_for_a_seed() {
    let first_dir = tempdir().unwrap();
    let second_dir = tempdir().unwrap();
    let mut df = create_traffic_dataset(100);
    let (first, _) = trained(&first_dir, &mut df);
    let (second, _) = trained(&second_dir, &mut df);

    assert_eq!(first.accuracy, second.accuracy);
    assert_eq!(
        first.parameters["kmeans_params_used"]["cluster_centers"],
        second.parameters["kmeans_params_used"]["cluster_centers"]
    );

    let rows = create_traffic_dataset(20).drop("label").unwrap();
    let a = InferenceEngine::load(InferenceConfig::default(), &first.model_path).unwrap();
    let b = InferenceEngine::load(InferenceConfig::default(), &second.model_path).unwrap();
    assert_eq!(a.predict(&rows).unwrap(), b.predict(&rows).unwrap());
}

#[test]
fn test_single_class_dataset_trains() {
    let dir = tempdir().unwrap();
    let mut df = create_traffic_dataset(40);
    df.with_column(Series::new("label".into(), vec![0i64; 40])).unwrap();
    let (result, _) = trained(&dir, &mut df);

    assert_eq!(result.accuracy, 1.0);
    assert_eq!(result.parameters["stratified_split"], false);

    let rows = create_traffic_dataset(6).drop("label").unwrap();
    let engine = InferenceEngine::load(InferenceConfig::default(), &result.model_path).unwrap();
    let scan = engine.scan(&rows).unwrap();
    assert!(scan.prediction.labels.iter().all(|l| l == "0"));
    assert!(!scan.summary.is_overall_threat_detected);
}

#[test]
fn test_explicit_target_column() {
    let dir = tempdir().unwrap();
    let df = create_traffic_dataset(60);
    // Move the label away from the last position
    let mut df = df.select(["label", "bytes", "duration", "packets", "ratio", "proto"]).unwrap();
    let data = write_csv(dir.path(), "reordered.csv", &mut df);

    let trainer = HybridTrainer::new(ArtifactStore::new(dir.path().join("models")));
    let request = TrainingRequest::new(&data, "reordered")
        .with_target_column("label")
        .with_kmeans(ClustererConfig::default().with_n_clusters(2))
        .with_random_state(7);
    let result = trainer.train(&request).unwrap();

    assert_eq!(result.parameters["target_column_used"], "label");
    assert_eq!(
        result.parameters["preprocessing_details"]["categorical_features_identified"],
        serde_json::json!(["proto"])
    );
}

#[test]
fn test_column_types_change_late_in_file() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("late_types.csv");
    let mut body = String::from("code,bytes,label\n");
    for i in 0..150 {
        // `code` turns textual and `bytes` fractional past row 100
        let code = if i < 120 { i.to_string() } else { format!("x{}", i % 7) };
        let bytes = if i < 120 { (i * 10).to_string() } else { format!("{}.5", i * 10) };
        body.push_str(&format!("{},{},{}\n", code, bytes, i % 2));
    }
    std::fs::write(&data, body).unwrap();

    let trainer = HybridTrainer::new(ArtifactStore::new(dir.path().join("models")));
    let request = TrainingRequest::new(&data, "late types")
        .with_kmeans(ClustererConfig::default().with_n_clusters(2))
        .with_random_state(3);
    let result = trainer.train(&request).unwrap();

    let details = &result.parameters["preprocessing_details"];
    assert_eq!(details["numerical_features_identified"], serde_json::json!(["bytes"]));
    assert_eq!(details["categorical_features_identified"], serde_json::json!(["code"]));
}
