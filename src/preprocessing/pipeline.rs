//! Feature transformation pipeline
//!
//! A [`DataPreprocessor`] is either a passthrough (no feature groups) or a
//! column transformer with a `num` group (standardization) followed by a
//! `cat` group (one-hot). It is fit exactly once on the training split and
//! then applied unchanged to the held-out split and every inference call.

use crate::error::{PipelineError, Result};
use crate::export::{ParamMap, ParamValue};
use super::{numeric_values, OneHotEncoder, StandardScaler};
use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Build an unfitted preprocessor for the given feature groups.
///
/// Both groups empty yields the passthrough (identity) preprocessor.
pub fn build_preprocessor(numerical: &[String], categorical: &[String]) -> DataPreprocessor {
    DataPreprocessor {
        numeric_columns: numerical.to_vec(),
        categorical_columns: categorical.to_vec(),
        scaler: (!numerical.is_empty()).then(|| StandardScaler::new(numerical.to_vec())),
        encoder: (!categorical.is_empty()).then(|| OneHotEncoder::new(categorical.to_vec())),
        passthrough_columns: Vec::new(),
        is_fitted: false,
    }
}

/// Description of one transformer group
#[derive(Debug, Clone)]
pub struct TransformerSpec {
    pub name: String,
    pub transformer_class: String,
    pub parameters: ParamMap,
    pub columns: Vec<String>,
}

/// Description of the whole transformation
#[derive(Debug, Clone)]
pub enum PreprocessorSpec {
    Passthrough,
    Transformers(Vec<TransformerSpec>),
}

impl PreprocessorSpec {
    /// Parameter-record form: the string `"passthrough"` or a list of groups
    pub fn to_param_value(&self) -> ParamValue {
        match self {
            PreprocessorSpec::Passthrough => ParamValue::from("passthrough"),
            PreprocessorSpec::Transformers(groups) => ParamValue::Seq(
                groups
                    .iter()
                    .map(|g| {
                        let mut entry = ParamMap::new();
                        entry.insert("name".to_string(), ParamValue::from(g.name.as_str()));
                        entry.insert(
                            "transformer_class".to_string(),
                            ParamValue::from(g.transformer_class.as_str()),
                        );
                        entry.insert("parameters".to_string(), ParamValue::Map(g.parameters.clone()));
                        entry.insert("columns".to_string(), ParamValue::from(g.columns.clone()));
                        ParamValue::Map(entry)
                    })
                    .collect(),
            ),
        }
    }
}

/// Fitted (or to-be-fitted) feature transformation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPreprocessor {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    scaler: Option<StandardScaler>,
    encoder: Option<OneHotEncoder>,
    /// Input columns recorded at fit time when running as passthrough
    passthrough_columns: Vec<String>,
    is_fitted: bool,
}

impl DataPreprocessor {
    pub fn is_passthrough(&self) -> bool {
        self.scaler.is_none() && self.encoder.is_none()
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Fit on the training features only
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        if self.is_fitted {
            return Err(PipelineError::fit("preprocessor", "already fitted"));
        }
        let start = Instant::now();

        if self.is_passthrough() {
            self.passthrough_columns = df
                .get_column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect();
        }
        if let Some(scaler) = self.scaler.as_mut() {
            scaler.fit(df)?;
        }
        if let Some(encoder) = self.encoder.as_mut() {
            encoder.fit(df)?;
        }

        self.is_fitted = true;
        debug!(
            rows = df.height(),
            outputs = self.n_features_out(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Preprocessor fitted"
        );
        Ok(self)
    }

    /// Apply the fitted transform; output columns are `num` then `cat`.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }
        self.check_columns(df)?;

        if self.is_passthrough() {
            return self.transform_passthrough(df);
        }

        let n_rows = df.height();
        let numeric = match &self.scaler {
            Some(scaler) => scaler.transform(df)?,
            None => Array2::zeros((n_rows, 0)),
        };
        let categorical = match &self.encoder {
            Some(encoder) => encoder.transform(df)?,
            None => Array2::zeros((n_rows, 0)),
        };

        concatenate(Axis(1), &[numeric.view(), categorical.view()]).map_err(|e| {
            PipelineError::SerializationError(format!("cannot assemble feature matrix: {}", e))
        })
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<Array2<f64>> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Input columns this preprocessor reads, in fit order
    pub fn expected_columns(&self) -> Vec<String> {
        if self.is_passthrough() {
            return self.passthrough_columns.clone();
        }
        self.numeric_columns
            .iter()
            .chain(&self.categorical_columns)
            .cloned()
            .collect()
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Width of the transformed matrix
    pub fn n_features_out(&self) -> usize {
        if self.is_passthrough() {
            return self.passthrough_columns.len();
        }
        self.numeric_columns.len() + self.encoder.as_ref().map_or(0, |e| e.n_outputs())
    }

    /// Output column names in matrix order
    pub fn feature_names_out(&self) -> Vec<String> {
        if self.is_passthrough() {
            return self.passthrough_columns.clone();
        }
        let numeric = self.numeric_columns.iter().map(|c| format!("num__{}", c));
        let categorical = self
            .encoder
            .iter()
            .flat_map(|e| e.feature_names_out())
            .map(|c| format!("cat__{}", c));
        numeric.chain(categorical).collect()
    }

    /// Description of the transformation for the parameter record
    pub fn spec(&self) -> PreprocessorSpec {
        if self.is_passthrough() {
            return PreprocessorSpec::Passthrough;
        }
        let mut groups = Vec::new();
        if let Some(scaler) = &self.scaler {
            groups.push(TransformerSpec {
                name: "num".to_string(),
                transformer_class: "StandardScaler".to_string(),
                parameters: scaler.get_params(),
                columns: scaler.columns().to_vec(),
            });
        }
        if let Some(encoder) = &self.encoder {
            groups.push(TransformerSpec {
                name: "cat".to_string(),
                transformer_class: "OneHotEncoder".to_string(),
                parameters: encoder.get_params(),
                columns: encoder.columns().to_vec(),
            });
        }
        PreprocessorSpec::Transformers(groups)
    }

    fn check_columns(&self, df: &DataFrame) -> Result<()> {
        let present: Vec<String> = df
            .get_column_names()
            .into_iter()
            .map(|s| s.to_string())
            .collect();
        match self
            .expected_columns()
            .into_iter()
            .find(|c| !present.contains(c))
        {
            Some(missing) => Err(PipelineError::schema(
                missing,
                "is expected by the fitted preprocessor but missing from the input",
            )),
            None => Ok(()),
        }
    }

    fn transform_passthrough(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let n_rows = df.height();
        let mut out = Array2::zeros((n_rows, self.passthrough_columns.len()));
        for (j, col_name) in self.passthrough_columns.iter().enumerate() {
            for (i, value) in numeric_values(df, col_name)?.into_iter().enumerate() {
                out[[i, j]] = value.unwrap_or(0.0);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_groups_are_passthrough() {
        let pre = build_preprocessor(&[], &[]);
        assert!(pre.is_passthrough());
        assert!(matches!(pre.spec(), PreprocessorSpec::Passthrough));
    }

    #[test]
    fn test_column_order_numeric_then_categorical() {
        let df = df!(
            "proto" => &["tcp", "udp", "tcp"],
            "bytes" => &[1.0, 2.0, 3.0]
        )
        .unwrap();
        let mut pre = build_preprocessor(&names(&["bytes"]), &names(&["proto"]));
        let x = pre.fit_transform(&df).unwrap();

        assert_eq!(x.dim(), (3, 3));
        assert_eq!(
            pre.feature_names_out(),
            vec!["num__bytes", "cat__proto_tcp", "cat__proto_udp"]
        );
        assert_eq!(x[[1, 2]], 1.0);
    }

    #[test]
    fn test_missing_column_at_transform() {
        let train = df!("a" => &[1.0, 2.0], "b" => &["x", "y"]).unwrap();
        let scan = df!("a" => &[1.0]).unwrap();
        let mut pre = build_preprocessor(&names(&["a"]), &names(&["b"]));
        pre.fit(&train).unwrap();

        match pre.transform(&scan).unwrap_err() {
            PipelineError::Schema { column, .. } => assert_eq!(column, "b"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_transform_before_fit() {
        let df = df!("a" => &[1.0]).unwrap();
        let pre = build_preprocessor(&names(&["a"]), &[]);
        assert!(matches!(pre.transform(&df), Err(PipelineError::ModelNotFitted)));
    }

    #[test]
    fn test_spec_param_value() {
        let df = df!("a" => &[1.0, 2.0], "b" => &["x", "y"]).unwrap();
        let mut pre = build_preprocessor(&names(&["a"]), &names(&["b"]));
        pre.fit(&df).unwrap();

        match pre.spec().to_param_value() {
            ParamValue::Seq(groups) => assert_eq!(groups.len(), 2),
            other => panic!("unexpected value: {other:?}"),
        }
    }
}
