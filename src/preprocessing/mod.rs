//! Data preprocessing module
//!
//! Provides the feature side of the hybrid pipeline:
//! - Column profiling into numerical / categorical feature sets
//! - Standardization of numerical columns (fit once, reused verbatim)
//! - One-hot encoding of categorical columns with unknown categories ignored
//! - A fitted [`DataPreprocessor`] producing dense, stably ordered matrices

mod encoder;
mod pipeline;
mod profiler;
mod scaler;

pub use encoder::OneHotEncoder;
pub use pipeline::{build_preprocessor, DataPreprocessor, PreprocessorSpec, TransformerSpec};
pub use profiler::{profile_dataset, FeaturePartition, FeatureProfile};
pub use scaler::StandardScaler;

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Column data type for preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}

impl ColumnType {
    /// A column is numeric iff its values are uniformly numeric-typed
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 |
            DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 |
            DataType::Float32 | DataType::Float64 => ColumnType::Numeric,
            _ => ColumnType::Categorical,
        }
    }
}

/// Read a column as floats; values that cannot be cast are a schema mismatch.
pub(crate) fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::schema(name, "is missing from the input"))?;
    let series = column.as_materialized_series();
    let casted = series.strict_cast(&DataType::Float64).map_err(|_| {
        PipelineError::schema(name, format!("expected numeric values, found {}", series.dtype()))
    })?;
    let ca = casted
        .f64()
        .map_err(|e| PipelineError::schema(name, e.to_string()))?;
    Ok(ca.into_iter().collect())
}

/// Read a column as strings (categorical view)
pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| PipelineError::schema(name, "is missing from the input"))?;
    let casted = column
        .as_materialized_series()
        .cast(&DataType::String)
        .map_err(|e| PipelineError::schema(name, e.to_string()))?;
    let ca = casted
        .str()
        .map_err(|e| PipelineError::schema(name, e.to_string()))?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

/// Render label values as strings.
///
/// Integers keep no decimals, integral floats are rendered as integers so a
/// `1.0` label and a `1` label name the same class.
pub fn label_values(column: &Column) -> Result<Vec<String>> {
    let name = column.name().to_string();
    let series = column.as_materialized_series();

    let values: Vec<Option<String>> = match series.dtype() {
        DataType::Float32 | DataType::Float64 => {
            let casted = series.cast(&DataType::Float64)?;
            casted.f64()?.into_iter().map(|v| v.map(format_label_number)).collect()
        }
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        _ => {
            let casted = series.cast(&DataType::String)?;
            casted.str()?.into_iter().map(|v| v.map(str::to_string)).collect()
        }
    };

    values
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| {
                PipelineError::DatasetIo(format!(
                    "label column '{}' has a missing value at row {}",
                    name, row
                ))
            })
        })
        .collect()
}

fn format_label_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_type() {
        assert_eq!(ColumnType::of(&DataType::Int64), ColumnType::Numeric);
        assert_eq!(ColumnType::of(&DataType::Float32), ColumnType::Numeric);
        assert_eq!(ColumnType::of(&DataType::String), ColumnType::Categorical);
        assert_eq!(ColumnType::of(&DataType::Boolean), ColumnType::Categorical);
    }

    #[test]
    fn test_label_values_float_rendered_as_int() {
        let df = df!("y" => &[0.0, 1.0, 2.5]).unwrap();
        let labels = label_values(df.column("y").unwrap()).unwrap();
        assert_eq!(labels, vec!["0", "1", "2.5"]);
    }

    #[test]
    fn test_numeric_values_rejects_text() {
        let df = df!("a" => &["x", "y"]).unwrap();
        let err = numeric_values(&df, "a").unwrap_err();
        assert!(matches!(err, PipelineError::Schema { .. }));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let df = df!("a" => &[1.0]).unwrap();
        let err = string_values(&df, "b").unwrap_err();
        match err {
            PipelineError::Schema { column, .. } => assert_eq!(column, "b"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
