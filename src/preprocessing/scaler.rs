//! Standardization of numerical features

use crate::error::{PipelineError, Result};
use crate::export::{ParamMap, ParamValue};
use super::numeric_values;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Zero-mean / unit-variance scaler: (x - mean) / std
///
/// Statistics are computed on the training split only and stored per column
/// in the order the columns were given. Missing values map to the column mean
/// (0.0 after scaling).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    columns: Vec<String>,
    means: Vec<f64>,
    scales: Vec<f64>,
    is_fitted: bool,
}

impl StandardScaler {
    /// Create a new scaler over the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            means: Vec::new(),
            scales: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        if self.is_fitted {
            return Err(PipelineError::fit("standard_scaler", "already fitted"));
        }

        let mut means = Vec::with_capacity(self.columns.len());
        let mut scales = Vec::with_capacity(self.columns.len());

        for col_name in &self.columns {
            let values: Vec<f64> = numeric_values(df, col_name)?
                .into_iter()
                .flatten()
                .filter(|v| v.is_finite())
                .collect();

            if values.is_empty() {
                means.push(0.0);
                scales.push(1.0);
                continue;
            }

            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            // Population variance (ddof = 0)
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = var.sqrt();

            means.push(mean);
            scales.push(if std == 0.0 { 1.0 } else { std });
        }

        self.means = means;
        self.scales = scales;
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data into a dense (rows × columns) matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut out = Array2::zeros((n_rows, self.columns.len()));

        for (j, col_name) in self.columns.iter().enumerate() {
            let (mean, scale) = (self.means[j], self.scales[j]);
            for (i, value) in numeric_values(df, col_name)?.into_iter().enumerate() {
                out[[i, j]] = match value {
                    Some(v) if v.is_finite() => (v - mean) / scale,
                    _ => 0.0,
                };
            }
        }

        Ok(out)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Fitted per-column means
    pub fn mean(&self) -> &[f64] {
        &self.means
    }

    /// Fitted per-column scales
    pub fn scale(&self) -> &[f64] {
        &self.scales
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Construction parameters
    pub fn get_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("copy".to_string(), ParamValue::Bool(true));
        params.insert("with_mean".to_string(), ParamValue::Bool(true));
        params.insert("with_std".to_string(), ParamValue::Bool(true));
        params
    }
}
