//! Seeded train/test split over row indices

use crate::error::{PipelineError, Result};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Row indices of each partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    /// False when the label had a single distinct value
    pub stratified: bool,
}

/// Split `labels.len()` rows into train and test partitions.
///
/// The test partition gets `ceil(test_size * n)` rows. When the label has
/// more than one distinct value every class keeps its proportion (largest
/// remainder allocation, at least one row of each class stays in train);
/// otherwise the split is a plain shuffle.
pub fn train_test_split(labels: &[String], test_size: f64, seed: Option<u64>) -> Result<SplitIndices> {
    let n = labels.len();
    // Float noise must not push an exact product up to the next integer
    let n_test = (test_size * n as f64 - 1e-9).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PipelineError::fit(
            "split",
            format!(
                "test_size={} with {} rows leaves an empty train or test partition",
                test_size, n
            ),
        ));
    }

    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, label) in labels.iter().enumerate() {
        groups.entry(label.as_str()).or_default().push(i);
    }

    let (mut train, mut test, stratified) = if groups.len() > 1 {
        let quotas = allocate(&groups, n_test, n);
        let mut train = Vec::with_capacity(n - n_test);
        let mut test = Vec::with_capacity(n_test);
        for (indices, quota) in groups.values().zip(quotas) {
            let mut indices = indices.clone();
            indices.shuffle(&mut rng);
            test.extend_from_slice(&indices[..quota]);
            train.extend_from_slice(&indices[quota..]);
        }
        (train, test, true)
    } else {
        warn!("Label has a single distinct value, falling back to an unstratified split");
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);
        let train = indices.split_off(n_test);
        (train, indices, false)
    };

    if train.is_empty() || test.is_empty() {
        return Err(PipelineError::fit("split", "empty train or test partition"));
    }
    train.shuffle(&mut rng);
    test.shuffle(&mut rng);

    debug!(train = train.len(), test = test.len(), stratified, "Rows split");
    Ok(SplitIndices { train, test, stratified })
}

// Largest-remainder allocation of `n_test` rows across classes
fn allocate(groups: &BTreeMap<&str, Vec<usize>>, n_test: usize, n: usize) -> Vec<usize> {
    let sizes: Vec<usize> = groups.values().map(Vec::len).collect();
    let caps: Vec<usize> = sizes.iter().map(|&s| s.saturating_sub(1)).collect();
    let exact: Vec<f64> = sizes
        .iter()
        .map(|&s| s as f64 * n_test as f64 / n as f64)
        .collect();

    let mut quotas: Vec<usize> = exact
        .iter()
        .zip(&caps)
        .map(|(e, &cap)| (e.floor() as usize).min(cap))
        .collect();

    let mut order: Vec<usize> = (0..sizes.len()).collect();
    order.sort_by(|&a, &b| {
        let ra = exact[a] - exact[a].floor();
        let rb = exact[b] - exact[b].floor();
        rb.partial_cmp(&ra).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
    });

    let mut remaining = n_test.saturating_sub(quotas.iter().sum());
    while remaining > 0 {
        let mut progressed = false;
        for &k in &order {
            if remaining == 0 {
                break;
            }
            if quotas[k] < caps[k] {
                quotas[k] += 1;
                remaining -= 1;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }
    quotas
}

/// Rows of `df` at `indices`, in that order
pub fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}
