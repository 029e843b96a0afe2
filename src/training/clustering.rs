//! K-Means clustering stage
//!
//! Unsupervised: takes X only. Fitted once on the transformed training
//! features; afterwards only `predict` is used, for the held-out split and
//! for inference.

use super::config::{ClustererConfig, InitMethod};
use crate::error::{PipelineError, Result};
use crate::export::{ParamMap, ParamValue};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// K-Means with k-means++ (or random) initialization and `n_init` restarts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeans {
    pub n_clusters: usize,
    pub init: InitMethod,
    pub n_init: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub random_state: Option<u64>,
    /// Fitted cluster centroids (n_clusters × n_features)
    centroids: Option<Array2<f64>>,
    /// Cluster labels assigned during fit
    labels: Option<Array1<usize>>,
    /// Sum of squared distances to nearest centroid
    inertia: Option<f64>,
    n_iter: usize,
    is_fitted: bool,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(3)
    }
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            init: InitMethod::KMeansPlusPlus,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            random_state: None,
            centroids: None,
            labels: None,
            inertia: None,
            n_iter: 0,
            is_fitted: false,
        }
    }

    /// Build from a stage config; `fallback_seed` applies when the config has none
    pub fn from_config(config: &ClustererConfig, fallback_seed: Option<u64>) -> Self {
        Self {
            init: config.init,
            n_init: config.n_init.resolve(),
            max_iter: config.max_iter,
            tol: config.tol,
            random_state: config.random_state.or(fallback_seed),
            ..Self::new(config.n_clusters)
        }
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// K-means++ initialization: pick centroids spread apart
    fn kmeans_pp_init(x: &Array2<f64>, k: usize, rng: &mut ChaCha8Rng) -> Array2<f64> {
        let n_samples = x.nrows();
        let mut centroids = Array2::zeros((k, x.ncols()));

        let first = rng.gen_range(0..n_samples);
        centroids.row_mut(0).assign(&x.row(first));

        for c in 1..k {
            let dists: Vec<f64> = (0..n_samples)
                .map(|i| {
                    (0..c)
                        .map(|j| Self::euclidean_sq(&x.row(i), &centroids.row(j)))
                        .fold(f64::MAX, f64::min)
                })
                .collect();

            // Weighted random selection proportional to D²
            let total: f64 = dists.iter().sum();
            if total <= 0.0 {
                let idx = rng.gen_range(0..n_samples);
                centroids.row_mut(c).assign(&x.row(idx));
                continue;
            }

            let r = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = n_samples - 1;
            for (i, &d) in dists.iter().enumerate() {
                cumulative += d;
                if cumulative >= r {
                    chosen = i;
                    break;
                }
            }
            centroids.row_mut(c).assign(&x.row(chosen));
        }

        centroids
    }

    /// Random initialization: k distinct rows
    fn random_init(x: &Array2<f64>, k: usize, rng: &mut ChaCha8Rng) -> Array2<f64> {
        let mut centroids = Array2::zeros((k, x.ncols()));
        for (c, idx) in index::sample(rng, x.nrows(), k).into_iter().enumerate() {
            centroids.row_mut(c).assign(&x.row(idx));
        }
        centroids
    }

    fn euclidean_sq(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
    }

    fn nearest(row: &ArrayView1<f64>, centroids: &Array2<f64>) -> (usize, f64) {
        let mut best_c = 0;
        let mut best_dist = f64::MAX;
        for (c, centroid) in centroids.outer_iter().enumerate() {
            let d = Self::euclidean_sq(row, &centroid);
            if d < best_dist {
                best_dist = d;
                best_c = c;
            }
        }
        (best_c, best_dist)
    }

    fn assign(x: &Array2<f64>, centroids: &Array2<f64>) -> Vec<(usize, f64)> {
        (0..x.nrows())
            .into_par_iter()
            .map(|i| Self::nearest(&x.row(i), centroids))
            .collect()
    }

    /// One Lloyd run from the given starting centroids
    fn lloyd(
        &self,
        x: &Array2<f64>,
        mut centroids: Array2<f64>,
        rng: &mut ChaCha8Rng,
    ) -> (Array2<f64>, Array1<usize>, f64, usize) {
        let n_samples = x.nrows();
        let mut labels: Array1<usize> = Array1::from_elem(n_samples, usize::MAX);
        let mut n_iter = 0;

        for iter in 0..self.max_iter {
            n_iter = iter + 1;

            // Assignment step
            let new_labels: Array1<usize> =
                Self::assign(x, &centroids).into_iter().map(|(c, _)| c).collect();
            let changed = new_labels
                .iter()
                .zip(labels.iter())
                .filter(|(a, b)| a != b)
                .count();
            labels = new_labels;

            // Update step
            let mut new_centroids = Array2::zeros(centroids.dim());
            let mut counts = vec![0usize; self.n_clusters];
            for (i, &c) in labels.iter().enumerate() {
                counts[c] += 1;
                let mut target = new_centroids.row_mut(c);
                target += &x.row(i);
            }
            for c in 0..self.n_clusters {
                if counts[c] > 0 {
                    new_centroids.row_mut(c).mapv_inplace(|v| v / counts[c] as f64);
                } else {
                    // Empty cluster: reseed from a random row
                    let idx = rng.gen_range(0..n_samples);
                    new_centroids.row_mut(c).assign(&x.row(idx));
                }
            }

            let shift: f64 = centroids
                .iter()
                .zip(new_centroids.iter())
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            centroids = new_centroids;

            if changed == 0 || shift < self.tol {
                break;
            }
        }

        // Final labels and inertia against the final centroids
        let assigned = Self::assign(x, &centroids);
        let inertia = assigned.iter().map(|(_, d)| d).sum();
        let labels = assigned.into_iter().map(|(c, _)| c).collect();
        (centroids, labels, inertia, n_iter)
    }

    /// Fit the model (unsupervised, no y)
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if self.is_fitted {
            return Err(PipelineError::fit("kmeans", "already fitted"));
        }
        let n_samples = x.nrows();
        if self.n_clusters == 0 {
            return Err(PipelineError::fit("kmeans", "n_clusters must be at least 1"));
        }
        if n_samples < self.n_clusters {
            return Err(PipelineError::fit(
                "kmeans",
                format!("n_samples={} should be >= n_clusters={}", n_samples, self.n_clusters),
            ));
        }

        let mut rng = match self.random_state {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut best: Option<(Array2<f64>, Array1<usize>, f64, usize)> = None;
        for run in 0..self.n_init.max(1) {
            let start = match self.init {
                InitMethod::KMeansPlusPlus => Self::kmeans_pp_init(x, self.n_clusters, &mut rng),
                InitMethod::Random => Self::random_init(x, self.n_clusters, &mut rng),
            };
            let candidate = self.lloyd(x, start, &mut rng);
            debug!(run, inertia = candidate.2, n_iter = candidate.3, "KMeans run finished");
            if best.as_ref().map_or(true, |b| candidate.2 < b.2) {
                best = Some(candidate);
            }
        }

        let (centroids, labels, inertia, n_iter) =
            best.ok_or_else(|| PipelineError::fit("kmeans", "no initialization run completed"))?;

        self.centroids = Some(centroids);
        self.labels = Some(labels);
        self.inertia = Some(inertia);
        self.n_iter = n_iter;
        self.is_fitted = true;
        Ok(self)
    }

    /// Assign new rows to the nearest fitted centroid
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        let centroids = self.centroids.as_ref().ok_or(PipelineError::ModelNotFitted)?;
        if x.ncols() != centroids.ncols() {
            return Err(PipelineError::schema(
                "<features>",
                format!(
                    "width {} does not match the {} features the clusterer was fit on",
                    x.ncols(),
                    centroids.ncols()
                ),
            ));
        }
        Ok(Self::assign(x, centroids).into_iter().map(|(c, _)| c).collect())
    }

    /// Labels of the training rows, from the fit
    pub fn labels(&self) -> Result<&Array1<usize>> {
        self.labels.as_ref().ok_or(PipelineError::ModelNotFitted)
    }

    pub fn centroids(&self) -> Option<&Array2<f64>> {
        self.centroids.as_ref()
    }

    pub fn inertia(&self) -> Option<f64> {
        self.inertia
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Construction parameters plus fitted state
    pub fn get_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("n_clusters".to_string(), ParamValue::from(self.n_clusters));
        params.insert("init".to_string(), ParamValue::from(self.init.to_string()));
        params.insert("n_init".to_string(), ParamValue::from(self.n_init));
        params.insert("max_iter".to_string(), ParamValue::from(self.max_iter));
        params.insert("tol".to_string(), ParamValue::from(self.tol));
        params.insert("random_state".to_string(), ParamValue::from(self.random_state));
        params.insert("algorithm".to_string(), ParamValue::from("lloyd"));
        params.insert("dtype".to_string(), ParamValue::type_of::<f64>());
        if let Some(centroids) = &self.centroids {
            params.insert(
                "cluster_centers".to_string(),
                ParamValue::from_array(centroids.clone()),
            );
        }
        params.insert("inertia".to_string(), ParamValue::from(self.inertia));
        params.insert("n_iter".to_string(), ParamValue::from(self.n_iter));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> Array2<f64> {
        array![
            [0.9, 1.1], [1.4, 1.6], [1.1, 1.2],
            [7.8, 8.1], [8.4, 8.6], [8.1, 8.2],
        ]
    }

    #[test]
    fn test_blobs_separate() {
        let mut model = KMeans::new(2).with_random_state(42);
        model.fit(&two_blobs()).unwrap();
        assert!(model.is_fitted());

        let labels = model.labels().unwrap().to_vec();
        assert_eq!(labels.len(), 6);
        assert!(labels[..3].iter().all(|&l| l == labels[0]));
        assert!(labels[3..].iter().all(|&l| l == labels[3]));
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_predict_matches_fit_labels() {
        let x = array![[0.0, 0.0], [0.5, 0.5], [10.0, 10.0], [10.5, 10.5]];
        let mut model = KMeans::new(2).with_random_state(7);
        model.fit(&x).unwrap();

        let labels = model.predict(&array![[0.1, 0.1], [10.1, 10.1]]).unwrap();
        assert_ne!(labels[0], labels[1]);
        assert_eq!(labels[0], model.labels().unwrap()[0]);
    }

    #[test]
    fn test_random_init() {
        let mut model = KMeans::new(2).with_random_state(3);
        model.init = InitMethod::Random;
        model.fit(&two_blobs()).unwrap();
        assert!(model.inertia().unwrap() < 2.0);
    }

    #[test]
    fn test_same_seed_same_centroids() {
        let mut a = KMeans::new(2).with_random_state(11);
        let mut b = KMeans::new(2).with_random_state(11);
        a.fit(&two_blobs()).unwrap();
        b.fit(&two_blobs()).unwrap();
        assert_eq!(a.centroids(), b.centroids());
    }

    #[test]
    fn test_too_few_samples() {
        let x = array![[0.0], [1.0]];
        let err = KMeans::new(3).fit(&x).unwrap_err();
        assert_eq!(err.kind(), "fit");
    }

    #[test]
    fn test_refit_rejected() {
        let mut model = KMeans::new(2).with_random_state(1);
        model.fit(&two_blobs()).unwrap();
        assert!(matches!(model.fit(&two_blobs()), Err(PipelineError::Fit { .. })));
    }

    #[test]
    fn test_params_include_centers() {
        let mut model = KMeans::new(2).with_random_state(1);
        model.fit(&two_blobs()).unwrap();
        let params = model.get_params();
        assert!(matches!(params.get("cluster_centers"), Some(ParamValue::Array(a)) if a.shape() == [2, 2]));
        assert_eq!(params.get("init"), Some(&ParamValue::from("k-means++")));
    }
}
