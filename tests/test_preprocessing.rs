//! Integration test: feature profiling and the fitted preprocessor

use hybridscan::preprocessing::{build_preprocessor, profile_dataset, PreprocessorSpec};
use hybridscan::PipelineError;
use polars::prelude::*;

fn train_frame() -> DataFrame {
    df!(
        "bytes" => &[100.0, 200.0, 300.0, 400.0],
        "port" => &[22i64, 80, 443, 80],
        "proto" => &["tcp", "udp", "tcp", "icmp"],
        "label" => &[0i64, 1, 0, 1]
    )
    .unwrap()
}

#[test]
fn test_profile_then_fit_transform() {
    let profile = profile_dataset(&train_frame(), None).unwrap();
    assert_eq!(profile.partition.numerical_features, vec!["bytes", "port"]);
    assert_eq!(profile.partition.categorical_features, vec!["proto"]);

    let mut pre = build_preprocessor(
        &profile.partition.numerical_features,
        &profile.partition.categorical_features,
    );
    let x = pre.fit_transform(&profile.features).unwrap();

    // 2 scaled numeric + 3 one-hot columns
    assert_eq!(x.dim(), (4, 5));
    assert_eq!(
        pre.feature_names_out(),
        vec!["num__bytes", "num__port", "cat__proto_icmp", "cat__proto_tcp", "cat__proto_udp"]
    );

    let bytes_mean: f64 = x.column(0).iter().sum::<f64>() / 4.0;
    assert!(bytes_mean.abs() < 1e-9);
    for row in x.rows() {
        let hot: f64 = row.iter().skip(2).sum();
        assert_eq!(hot, 1.0);
    }
}

#[test]
fn test_transform_reuses_fitted_statistics() {
    let profile = profile_dataset(&train_frame(), None).unwrap();
    let mut pre = build_preprocessor(
        &profile.partition.numerical_features,
        &profile.partition.categorical_features,
    );
    let x_train = pre.fit_transform(&profile.features).unwrap();

    // Same rows in a different column order transform identically
    let reordered = profile.features.select(["proto", "port", "bytes"]).unwrap();
    let x_again = pre.transform(&reordered).unwrap();
    assert_eq!(x_train, x_again);

    // A single row is scaled with the training mean, not its own
    let one = df!(
        "bytes" => &[250.0],
        "port" => &[80i64],
        "proto" => &["udp"]
    )
    .unwrap();
    let x = pre.transform(&one).unwrap();
    assert!(x[[0, 0]].abs() < 1e-9);
}

#[test]
fn test_unknown_category_encodes_as_zeros() {
    let profile = profile_dataset(&train_frame(), None).unwrap();
    let mut pre = build_preprocessor(
        &profile.partition.numerical_features,
        &profile.partition.categorical_features,
    );
    pre.fit(&profile.features).unwrap();

    let unseen = df!(
        "bytes" => &[100.0],
        "port" => &[22i64],
        "proto" => &["sctp"]
    )
    .unwrap();
    let x = pre.transform(&unseen).unwrap();
    assert_eq!(x.dim(), (1, 5));
    assert!(x.row(0).iter().skip(2).all(|&v| v == 0.0));
}

#[test]
fn test_missing_column_is_schema_error() {
    let profile = profile_dataset(&train_frame(), None).unwrap();
    let mut pre = build_preprocessor(
        &profile.partition.numerical_features,
        &profile.partition.categorical_features,
    );
    pre.fit(&profile.features).unwrap();

    let partial = profile.features.drop("port").unwrap();
    match pre.transform(&partial) {
        Err(PipelineError::Schema { column, .. }) => assert_eq!(column, "port"),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_empty_partition_is_passthrough() {
    let pre = build_preprocessor(&[], &[]);
    assert!(pre.is_passthrough());
    assert!(matches!(pre.spec(), PreprocessorSpec::Passthrough));
}

#[test]
fn test_missing_target_is_schema_error() {
    let err = profile_dataset(&train_frame(), Some("verdict")).unwrap_err();
    assert_eq!(err.kind(), "schema");
}
