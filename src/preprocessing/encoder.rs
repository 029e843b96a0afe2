//! One-hot encoding of categorical features

use crate::error::{PipelineError, Result};
use crate::export::{ParamMap, ParamValue};
use super::string_values;
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// One-hot encoder with unknown categories ignored
///
/// Categories are learned per column at fit time and kept sorted. A value
/// not seen during fitting (or a missing value) encodes as an all-zero
/// indicator block for that column instead of failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    columns: Vec<String>,
    categories: Vec<Vec<String>>,
    is_fitted: bool,
}

impl OneHotEncoder {
    /// Create a new encoder over the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            categories: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the encoder to the data
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        if self.is_fitted {
            return Err(PipelineError::fit("one_hot_encoder", "already fitted"));
        }

        let mut categories = Vec::with_capacity(self.columns.len());
        for col_name in &self.columns {
            let seen: BTreeSet<String> = string_values(df, col_name)?
                .into_iter()
                .flatten()
                .collect();
            categories.push(seen.into_iter().collect());
        }

        self.categories = categories;
        self.is_fitted = true;
        Ok(self)
    }

    /// Number of output indicator columns
    pub fn n_outputs(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Transform the data into a dense indicator matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(PipelineError::ModelNotFitted);
        }

        let n_rows = df.height();
        let mut out = Array2::zeros((n_rows, self.n_outputs()));
        let mut offset = 0;

        for (col_name, cats) in self.columns.iter().zip(&self.categories) {
            let lookup: HashMap<&str, usize> = cats
                .iter()
                .enumerate()
                .map(|(idx, c)| (c.as_str(), idx))
                .collect();

            for (i, value) in string_values(df, col_name)?.iter().enumerate() {
                if let Some(&idx) = value.as_deref().and_then(|v| lookup.get(v)) {
                    out[[i, offset + idx]] = 1.0;
                }
            }
            offset += cats.len();
        }

        Ok(out)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Learned categories per column, sorted
    pub fn categories(&self) -> &[Vec<String>] {
        &self.categories
    }

    /// Output column names, `<column>_<category>`
    pub fn feature_names_out(&self) -> Vec<String> {
        self.columns
            .iter()
            .zip(&self.categories)
            .flat_map(|(col, cats)| cats.iter().map(move |c| format!("{}_{}", col, c)))
            .collect()
    }

    /// Construction parameters
    pub fn get_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("categories".to_string(), ParamValue::from("auto"));
        params.insert("dtype".to_string(), ParamValue::type_of::<f64>());
        params.insert("handle_unknown".to_string(), ParamValue::from("ignore"));
        params.insert("sparse_output".to_string(), ParamValue::Bool(false));
        params
    }
}
