//! Feature profiling: split a table into label and typed feature sets

use crate::error::{PipelineError, Result};
use super::{label_values, ColumnType};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Disjoint, ordered numeric and categorical feature names.
///
/// Together they cover every non-label column exactly once, in the table's
/// original column order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeaturePartition {
    pub numerical_features: Vec<String>,
    pub categorical_features: Vec<String>,
}

impl FeaturePartition {
    /// Partition every column of a feature table by value type
    pub fn from_frame(features: &DataFrame) -> Self {
        let mut partition = Self::default();
        for column in features.get_columns() {
            let name = column.name().to_string();
            match ColumnType::of(column.dtype()) {
                ColumnType::Numeric => partition.numerical_features.push(name),
                ColumnType::Categorical => partition.categorical_features.push(name),
            }
        }
        partition
    }

    /// Number of feature columns
    pub fn len(&self) -> usize {
        self.numerical_features.len() + self.categorical_features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Output of profiling a dataset
#[derive(Debug, Clone)]
pub struct FeatureProfile {
    /// Feature columns (label removed), original order
    pub features: DataFrame,
    /// Label value per row
    pub labels: Vec<String>,
    /// Name of the column used as the label
    pub target_column: String,
    /// True when no target was requested and the last column was used
    pub target_defaulted: bool,
    pub partition: FeaturePartition,
}

/// Separate the label from the features and partition the features.
///
/// With no `target_column`, the last column is the label by convention.
/// A requested target that is absent from the table is a schema error.
pub fn profile_dataset(df: &DataFrame, target_column: Option<&str>) -> Result<FeatureProfile> {
    let columns: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let (target, defaulted) = match target_column {
        Some(name) => {
            if !columns.iter().any(|c| c == name) {
                return Err(PipelineError::schema(
                    name,
                    "requested as target but not found in dataset",
                ));
            }
            (name.to_string(), false)
        }
        None => {
            let last = columns.last().ok_or_else(|| {
                PipelineError::DatasetIo("dataset has no columns".to_string())
            })?;
            (last.clone(), true)
        }
    };

    let label_column = df
        .column(&target)
        .map_err(|_| PipelineError::schema(target.as_str(), "not found in dataset"))?;
    let labels = label_values(label_column)?;

    let features = df.drop(&target)?;
    let partition = FeaturePartition::from_frame(&features);

    debug!(
        target = %target,
        numerical = partition.numerical_features.len(),
        categorical = partition.categorical_features.len(),
        "Dataset profiled"
    );

    Ok(FeatureProfile {
        features,
        labels,
        target_column: target,
        target_defaulted: defaulted,
        partition,
    })
}
