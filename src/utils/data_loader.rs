//! Dataset loading

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Load a header-ful CSV file into a DataFrame.
///
/// Column types are inferred from every row, so a column that turns textual
/// (or fractional) late in the file is read as such instead of failing.
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    load_csv_with_text_columns(path, &[])
}

/// Load a CSV, reading the named columns as text regardless of their values.
///
/// Categorical features must keep their training-time spelling: `007` read
/// as an integer would come back as `7`.
pub fn load_csv_with_text_columns(path: &Path, text_columns: &[String]) -> Result<DataFrame> {
    // Overrides naming a column the file lacks are a polars error; leave
    // missing columns to the caller's schema check instead.
    let present = if text_columns.is_empty() {
        Vec::new()
    } else {
        csv_header(path)?
    };
    let overrides = text_columns
        .iter()
        .filter(|name| present.contains(name))
        .map(|name| Field::new(name.as_str().into(), DataType::String))
        .collect::<Schema>();
    let overrides = (!overrides.is_empty()).then(|| Arc::new(overrides));

    let file = open(path)?;

    let reader = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_schema_overwrite(overrides)
        .into_reader_with_file_handle(file);

    reader.finish().map_err(|e| {
        PipelineError::DatasetIo(format!("cannot parse '{}': {}", path.display(), e))
    })
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        PipelineError::DatasetIo(format!("cannot open '{}': {}", path.display(), e))
    })
}

/// Column names from the header row
fn csv_header(path: &Path) -> Result<Vec<String>> {
    let header = CsvReadOptions::default()
        .with_has_header(true)
        .with_n_rows(Some(0))
        .into_reader_with_file_handle(open(path)?)
        .finish()
        .map_err(|e| {
            PipelineError::DatasetIo(format!("cannot parse '{}': {}", path.display(), e))
        })?;
    Ok(header
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect())
}

/// Load a training dataset and enforce the table invariants:
/// at least one row and at least two columns (one becomes the label).
pub fn load_dataset(path: &Path) -> Result<DataFrame> {
    let start = Instant::now();

    if !path.exists() {
        return Err(PipelineError::DatasetIo(format!(
            "dataset file '{}' does not exist",
            path.display()
        )));
    }

    let df = load_csv(path)?;

    if df.height() == 0 {
        return Err(PipelineError::DatasetIo(format!(
            "dataset '{}' has no rows",
            path.display()
        )));
    }
    if df.width() < 2 {
        return Err(PipelineError::DatasetIo(format!(
            "dataset '{}' needs at least two columns, found {}",
            path.display(),
            df.width()
        )));
    }

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Dataset loaded"
    );
    Ok(df)
}

/// Lowercased file extension, if any
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}
