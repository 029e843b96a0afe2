//! Integration test: parameter records of fitted components are plain JSON

use hybridscan::export::{serialize_params_dict, ParamMap, ParamValue};
use hybridscan::training::{ClassifierConfig, ClustererConfig, KMeans, SvmClassifier};
use ndarray::{array, Array2};
use serde_json::{json, Value};

fn blobs() -> (Array2<f64>, Vec<String>) {
    let x = array![
        [0.0, 0.1],
        [0.2, 0.0],
        [0.1, 0.3],
        [5.0, 5.1],
        [5.2, 4.9],
        [4.8, 5.0],
    ];
    let y = ["0", "0", "0", "1", "1", "1"].iter().map(|s| s.to_string()).collect();
    (x, y)
}

fn assert_plain_json(value: &Value) {
    match value {
        Value::Object(map) => map.values().for_each(assert_plain_json),
        Value::Array(items) => items.iter().for_each(assert_plain_json),
        Value::Number(n) => assert!(n.as_f64().map_or(true, f64::is_finite)),
        _ => {}
    }
}

#[test]
fn test_kmeans_params_serialize() {
    let (x, _) = blobs();
    let config = ClustererConfig::default().with_n_clusters(2).with_random_state(3);
    let mut kmeans = KMeans::from_config(&config, None);
    kmeans.fit(&x).unwrap();

    let params = serialize_params_dict(&kmeans.get_params());
    assert_plain_json(&params);
    assert_eq!(params["n_clusters"], 2);
    assert_eq!(params["init"], "k-means++");
    assert_eq!(params["random_state"], 3);
    assert_eq!(params["dtype"], "f64");

    let centers = params["cluster_centers"].as_array().unwrap();
    assert_eq!(centers.len(), 2);
    assert_eq!(centers[0].as_array().unwrap().len(), 2);

    // Survives a text round trip unchanged
    let text = serde_json::to_string(&params).unwrap();
    assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), params);
}

#[test]
fn test_svm_params_serialize() {
    let (x, y) = blobs();
    let config = ClassifierConfig::default().with_random_state(11);
    let mut svm = SvmClassifier::from_config(&config, None);
    svm.fit(&x, &y).unwrap();

    let params = serialize_params_dict(&svm.get_params());
    assert_plain_json(&params);
    assert_eq!(params["C"], 1.0);
    assert_eq!(params["kernel"], "rbf");
    assert_eq!(params["gamma"], "scale");
    assert_eq!(params["probability"], true);
    assert_eq!(params["classes"], json!(["0", "1"]));
    assert!(params["kernel_resolved"].is_object() || params["kernel_resolved"].is_string());
}

#[test]
fn test_unusual_values_never_fail() {
    let mut nested = ParamMap::new();
    nested.insert("weights".to_string(), ParamValue::from_array(array![[1.0, f64::NAN], [f64::INFINITY, 2.0]]));

    let mut params = ParamMap::new();
    params.insert("dtype".to_string(), ParamValue::type_of::<String>());
    params.insert("nested".to_string(), ParamValue::Map(nested));
    params.insert("missing".to_string(), ParamValue::from(None::<f64>));
    params.insert("label".to_string(), ParamValue::display(&std::net::Ipv4Addr::LOCALHOST));
    params.insert("list".to_string(), ParamValue::from(vec![1usize, 2, 3]));

    let out = serialize_params_dict(&params);
    assert_eq!(out["dtype"], "String");
    assert_eq!(out["nested"]["weights"], json!([[1.0, "NaN"], ["inf", 2.0]]));
    assert_eq!(out["missing"], Value::Null);
    assert_eq!(out["label"], "127.0.0.1");
    assert_eq!(out["list"], json!([1, 2, 3]));
}
