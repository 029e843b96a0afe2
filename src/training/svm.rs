//! Support Vector Classifier with probability estimates
//!
//! Binary problems train one SMO (Sequential Minimal Optimization) machine;
//! more classes train one machine per class (one-vs-rest). Each machine gets
//! a Platt sigmoid fit on its decision values so the classifier can return a
//! probability distribution over its classes.

use super::config::{ClassifierConfig, KernelKind};
use crate::error::{PipelineError, Result};
use crate::export::{ParamMap, ParamValue};
use ndarray::{Array1, Array2, ArrayView1};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Maximum number of samples for eager kernel matrix computation.
/// Beyond this, training returns an error to prevent OOM.
const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Kernel function with its coefficients resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KernelType {
    /// K(x, y) = x · y
    Linear,
    /// K(x, y) = (γ * x · y + r)^d
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
    /// K(x, y) = exp(-γ * ||x - y||²)
    RBF { gamma: f64 },
    /// K(x, y) = tanh(γ * x · y + r)
    Sigmoid { gamma: f64, coef0: f64 },
}

impl KernelType {
    fn apply(&self, a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        match self {
            KernelType::Linear => a.dot(&b),
            KernelType::Polynomial { degree, gamma, coef0 } => {
                (gamma * a.dot(&b) + coef0).powi(*degree as i32)
            }
            KernelType::RBF { gamma } => {
                let norm_sq: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * norm_sq).exp()
            }
            KernelType::Sigmoid { gamma, coef0 } => (gamma * a.dot(&b) + coef0).tanh(),
        }
    }

    /// Gram matrix, upper triangle rows computed in parallel
    fn gram(&self, x: &Array2<f64>) -> Array2<f64> {
        let n = x.nrows();
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| (i..n).map(|j| self.apply(x.row(i), x.row(j))).collect())
            .collect();

        let mut k = Array2::zeros((n, n));
        for (i, row_vals) in rows.into_iter().enumerate() {
            for (offset, val) in row_vals.into_iter().enumerate() {
                let j = i + offset;
                k[[i, j]] = val;
                k[[j, i]] = val;
            }
        }
        k
    }
}

/// Sigmoid map from decision value to probability: P = 1 / (1 + exp(-(A*f + B)))
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PlattSigmoid {
    a: f64,
    b: f64,
}

impl PlattSigmoid {
    fn sigmoid(x: f64) -> f64 {
        1.0 / (1.0 + (-x).exp())
    }

    /// Newton fit with Platt's smoothed targets
    fn fit(decisions: &[f64], positive: &[bool]) -> Self {
        let n_pos = positive.iter().filter(|&&p| p).count() as f64;
        let n_neg = positive.len() as f64 - n_pos;
        let target_pos = (n_pos + 1.0) / (n_pos + 2.0);
        let target_neg = 1.0 / (n_neg + 2.0);
        let targets: Vec<f64> = positive
            .iter()
            .map(|&p| if p { target_pos } else { target_neg })
            .collect();

        let mut a = 1.0;
        let mut b = 0.0;
        for _ in 0..100 {
            let mut grad_a = 0.0;
            let mut grad_b = 0.0;
            let mut hess_aa = 1e-6;
            let mut hess_ab = 0.0;
            let mut hess_bb = 1e-6;

            for (&f, &t) in decisions.iter().zip(&targets) {
                let p = Self::sigmoid(a * f + b);
                let d1 = p - t;
                let d2 = p * (1.0 - p);
                grad_a += f * d1;
                grad_b += d1;
                hess_aa += f * f * d2;
                hess_ab += f * d2;
                hess_bb += d2;
            }

            // 2x2 Newton step via Cramer's rule
            let det = hess_aa * hess_bb - hess_ab * hess_ab;
            if det.abs() < 1e-12 {
                break;
            }
            let delta_a = (hess_bb * grad_a - hess_ab * grad_b) / det;
            let delta_b = (hess_aa * grad_b - hess_ab * grad_a) / det;
            a -= delta_a;
            b -= delta_b;

            if delta_a.abs() < 1e-7 && delta_b.abs() < 1e-7 {
                break;
            }
        }

        Self { a, b }
    }

    fn probability(&self, decision: f64) -> f64 {
        Self::sigmoid(self.a * decision + self.b)
    }
}

/// One binary machine: positive class vs the rest
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BinarySvm {
    support_vectors: Array2<f64>,
    /// alpha_i * y_i per support vector
    dual_coef: Array1<f64>,
    bias: f64,
    platt: PlattSigmoid,
}

impl BinarySvm {
    fn decision(&self, kernel: &KernelType, sample: ArrayView1<f64>) -> f64 {
        self.support_vectors
            .outer_iter()
            .zip(self.dual_coef.iter())
            .map(|(sv, coef)| coef * kernel.apply(sample, sv))
            .sum::<f64>()
            + self.bias
    }

    fn n_support(&self) -> usize {
        self.support_vectors.nrows()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Estimator {
    /// Only one class was seen during fit
    Constant,
    /// Positive class is `classes[1]`
    Binary(BinarySvm),
    /// One machine per class, in class order
    OneVsRest(Vec<BinarySvm>),
}

/// Support Vector Classifier over string class labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvmClassifier {
    pub c: f64,
    pub kernel_kind: KernelKind,
    /// Gamma as configured ("scale", "auto" or a number)
    pub gamma_spec: String,
    pub degree: u32,
    pub coef0: f64,
    pub tol: f64,
    pub max_iter: usize,
    pub random_state: Option<u64>,
    kernel: Option<KernelType>,
    classes: Vec<String>,
    estimator: Option<Estimator>,
    n_features: usize,
    is_fitted: bool,
}

impl SvmClassifier {
    /// Build from a stage config; `fallback_seed` applies when the config has none
    pub fn from_config(config: &ClassifierConfig, fallback_seed: Option<u64>) -> Self {
        Self {
            c: config.c,
            kernel_kind: config.kernel,
            gamma_spec: config.gamma.to_string(),
            degree: config.degree,
            coef0: config.coef0,
            tol: config.tol,
            max_iter: config.max_iter,
            random_state: config.random_state.or(fallback_seed),
            kernel: None,
            classes: Vec::new(),
            estimator: None,
            n_features: 0,
            is_fitted: false,
        }
    }

    /// Resolve gamma against the training matrix
    fn resolve_gamma(&self, x: &Array2<f64>) -> Result<f64> {
        let n_features = x.ncols().max(1) as f64;
        match self.gamma_spec.as_str() {
            "scale" => {
                let var = x.var(0.0);
                Ok(if var > 0.0 { 1.0 / (n_features * var) } else { 1.0 })
            }
            "auto" => Ok(1.0 / n_features),
            other => other.parse::<f64>().map_err(|_| {
                PipelineError::Hyperparameter(format!("svm: invalid gamma '{}'", other))
            }),
        }
    }

    fn build_kernel(&self, gamma: f64) -> KernelType {
        match self.kernel_kind {
            KernelKind::Linear => KernelType::Linear,
            KernelKind::Polynomial => KernelType::Polynomial {
                degree: self.degree,
                gamma,
                coef0: self.coef0,
            },
            KernelKind::Rbf => KernelType::RBF { gamma },
            KernelKind::Sigmoid => KernelType::Sigmoid {
                gamma,
                coef0: self.coef0,
            },
        }
    }

    /// Fit on a feature matrix and one label per row
    pub fn fit(&mut self, x: &Array2<f64>, y: &[String]) -> Result<&mut Self> {
        if self.is_fitted {
            return Err(PipelineError::fit("svm", "already fitted"));
        }
        if x.nrows() != y.len() {
            return Err(PipelineError::fit(
                "svm",
                format!("{} feature rows but {} labels", x.nrows(), y.len()),
            ));
        }
        if x.nrows() == 0 {
            return Err(PipelineError::fit("svm", "no training rows"));
        }
        if x.nrows() > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(PipelineError::fit(
                "svm",
                format!(
                    "{} samples exceed the maximum {} for the kernel matrix",
                    x.nrows(),
                    MAX_KERNEL_MATRIX_SAMPLES
                ),
            ));
        }

        let classes = sorted_classes(y);
        let kernel = self.build_kernel(self.resolve_gamma(x)?);

        let estimator = match classes.len() {
            1 => {
                warn!(class = %classes[0], "Only one class in training labels, fitting a constant classifier");
                Estimator::Constant
            }
            2 => {
                let gram = kernel.gram(x);
                let positive: Vec<bool> = y.iter().map(|v| *v == classes[1]).collect();
                Estimator::Binary(self.fit_binary(&gram, x, &positive, 0))
            }
            _ => {
                // One Gram matrix shared by every one-vs-rest machine
                let gram = kernel.gram(x);
                let machines = classes
                    .iter()
                    .enumerate()
                    .map(|(k, cls)| {
                        let positive: Vec<bool> = y.iter().map(|v| v == cls).collect();
                        self.fit_binary(&gram, x, &positive, k as u64)
                    })
                    .collect();
                Estimator::OneVsRest(machines)
            }
        };

        debug!(
            classes = classes.len(),
            kernel = %self.kernel_kind,
            rows = x.nrows(),
            features = x.ncols(),
            "SVM fitted"
        );

        self.kernel = Some(kernel);
        self.classes = classes;
        self.estimator = Some(estimator);
        self.n_features = x.ncols();
        self.is_fitted = true;
        Ok(self)
    }

    fn fit_binary(&self, gram: &Array2<f64>, x: &Array2<f64>, positive: &[bool], stream: u64) -> BinarySvm {
        let y: Array1<f64> = positive.iter().map(|&p| if p { 1.0 } else { -1.0 }).collect();
        let (alphas, bias) = self.smo_train(gram, &y, stream);

        let support: Vec<usize> = alphas
            .iter()
            .enumerate()
            .filter(|(_, &a)| a > 1e-8)
            .map(|(i, _)| i)
            .collect();

        let mut support_vectors = Array2::zeros((support.len(), x.ncols()));
        let mut dual_coef = Array1::zeros(support.len());
        for (row, &idx) in support.iter().enumerate() {
            support_vectors.row_mut(row).assign(&x.row(idx));
            dual_coef[row] = alphas[idx] * y[idx];
        }

        // Decision values on the training rows, straight from the Gram matrix
        let decisions: Vec<f64> = (0..x.nrows())
            .map(|i| {
                support
                    .iter()
                    .zip(dual_coef.iter())
                    .map(|(&s, coef)| coef * gram[[s, i]])
                    .sum::<f64>()
                    + bias
            })
            .collect();
        let platt = PlattSigmoid::fit(&decisions, positive);

        BinarySvm {
            support_vectors,
            dual_coef,
            bias,
            platt,
        }
    }

    /// Simplified SMO over a precomputed Gram matrix
    fn smo_train(&self, k: &Array2<f64>, y: &Array1<f64>, stream: u64) -> (Array1<f64>, f64) {
        let n = y.len();
        let c = self.c;
        let mut alphas: Array1<f64> = Array1::zeros(n);
        let mut bias = 0.0;
        if n <= 1 {
            return (alphas, bias);
        }

        let mut rng = match self.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed.wrapping_add(stream)),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        let decision = |alphas: &Array1<f64>, bias: f64, idx: usize| -> f64 {
            (0..n).map(|i| alphas[i] * y[i] * k[[i, idx]]).sum::<f64>() + bias
        };

        let mut passes = 0;
        let max_passes = 5;
        let mut total_iter = 0;

        while passes < max_passes && total_iter < self.max_iter {
            let mut num_changed = 0;

            for i in 0..n {
                let e_i = decision(&alphas, bias, i) - y[i];

                // KKT violation check
                if (y[i] * e_i < -self.tol && alphas[i] < c) || (y[i] * e_i > self.tol && alphas[i] > 0.0) {
                    let j = loop {
                        let j = rng.gen_range(0..n);
                        if j != i {
                            break j;
                        }
                    };
                    let e_j = decision(&alphas, bias, j) - y[j];

                    let alpha_i_old = alphas[i];
                    let alpha_j_old = alphas[j];

                    let (l, h) = if y[i] != y[j] {
                        ((alphas[j] - alphas[i]).max(0.0), (c + alphas[j] - alphas[i]).min(c))
                    } else {
                        ((alphas[i] + alphas[j] - c).max(0.0), (alphas[i] + alphas[j]).min(c))
                    };
                    if (l - h).abs() < 1e-10 {
                        continue;
                    }

                    let eta = 2.0 * k[[i, j]] - k[[i, i]] - k[[j, j]];
                    if eta >= 0.0 {
                        continue;
                    }

                    alphas[j] = (alphas[j] - y[j] * (e_i - e_j) / eta).clamp(l, h);
                    if (alphas[j] - alpha_j_old).abs() < 1e-5 {
                        continue;
                    }
                    alphas[i] += y[i] * y[j] * (alpha_j_old - alphas[j]);

                    let b1 = bias
                        - e_i
                        - y[i] * (alphas[i] - alpha_i_old) * k[[i, i]]
                        - y[j] * (alphas[j] - alpha_j_old) * k[[i, j]];
                    let b2 = bias
                        - e_j
                        - y[i] * (alphas[i] - alpha_i_old) * k[[i, j]]
                        - y[j] * (alphas[j] - alpha_j_old) * k[[j, j]];

                    bias = if alphas[i] > 0.0 && alphas[i] < c {
                        b1
                    } else if alphas[j] > 0.0 && alphas[j] < c {
                        b2
                    } else {
                        (b1 + b2) / 2.0
                    };

                    num_changed += 1;
                }
            }

            total_iter += 1;
            if num_changed == 0 {
                passes += 1;
            } else {
                passes = 0;
            }
        }

        (alphas, bias)
    }

    fn fitted(&self) -> Result<(&KernelType, &Estimator)> {
        match (&self.kernel, &self.estimator) {
            (Some(kernel), Some(estimator)) if self.is_fitted => Ok((kernel, estimator)),
            _ => Err(PipelineError::ModelNotFitted),
        }
    }

    fn check_width(&self, x: &Array2<f64>) -> Result<()> {
        if x.ncols() != self.n_features {
            return Err(PipelineError::schema(
                "<features>",
                format!(
                    "width {} does not match the {} features the classifier was fit on",
                    x.ncols(),
                    self.n_features
                ),
            ));
        }
        Ok(())
    }

    /// Predicted class label per row
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>> {
        let (kernel, estimator) = self.fitted()?;
        self.check_width(x)?;

        let picks: Vec<usize> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let sample = x.row(i);
                match estimator {
                    Estimator::Constant => 0,
                    Estimator::Binary(m) => usize::from(m.decision(kernel, sample) >= 0.0),
                    Estimator::OneVsRest(machines) => machines
                        .iter()
                        .map(|m| m.decision(kernel, sample))
                        .enumerate()
                        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
                        .map_or(0, |(k, _)| k),
                }
            })
            .collect();

        Ok(picks.into_iter().map(|k| self.classes[k].clone()).collect())
    }

    /// Class probabilities, one row per sample, columns in `classes()` order
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let (kernel, estimator) = self.fitted()?;
        self.check_width(x)?;

        let n_classes = self.classes.len();
        let rows: Vec<Vec<f64>> = (0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let sample = x.row(i);
                match estimator {
                    Estimator::Constant => vec![1.0],
                    Estimator::Binary(m) => {
                        let p = m.platt.probability(m.decision(kernel, sample));
                        vec![1.0 - p, p]
                    }
                    Estimator::OneVsRest(machines) => {
                        let raw: Vec<f64> = machines
                            .iter()
                            .map(|m| m.platt.probability(m.decision(kernel, sample)))
                            .collect();
                        let total: f64 = raw.iter().sum();
                        if total > 0.0 {
                            raw.into_iter().map(|p| p / total).collect()
                        } else {
                            vec![1.0 / n_classes as f64; n_classes]
                        }
                    }
                }
            })
            .collect();

        let mut out = Array2::zeros((x.nrows(), n_classes));
        for (i, row) in rows.into_iter().enumerate() {
            for (k, p) in row.into_iter().enumerate() {
                out[[i, k]] = p;
            }
        }
        Ok(out)
    }

    /// Class labels in probability-column order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }

    /// Support vectors per machine
    pub fn n_support(&self) -> Vec<usize> {
        match &self.estimator {
            Some(Estimator::Binary(m)) => vec![m.n_support()],
            Some(Estimator::OneVsRest(machines)) => machines.iter().map(BinarySvm::n_support).collect(),
            _ => Vec::new(),
        }
    }

    /// Construction parameters plus fitted summary
    pub fn get_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("C".to_string(), ParamValue::from(self.c));
        params.insert("kernel".to_string(), ParamValue::from(self.kernel_kind.to_string()));
        params.insert(
            "gamma".to_string(),
            match self.gamma_spec.parse::<f64>() {
                Ok(v) => ParamValue::from(v),
                Err(_) => ParamValue::from(self.gamma_spec.as_str()),
            },
        );
        params.insert("degree".to_string(), ParamValue::from(self.degree as u64));
        params.insert("coef0".to_string(), ParamValue::from(self.coef0));
        params.insert("tol".to_string(), ParamValue::from(self.tol));
        params.insert("max_iter".to_string(), ParamValue::from(self.max_iter));
        params.insert("probability".to_string(), ParamValue::Bool(true));
        params.insert("decision_function_shape".to_string(), ParamValue::from("ovr"));
        params.insert("random_state".to_string(), ParamValue::from(self.random_state));
        if let Some(kernel) = &self.kernel {
            params.insert("kernel_resolved".to_string(), ParamValue::opaque(kernel));
        }
        params.insert("classes".to_string(), ParamValue::from(self.classes.clone()));
        params.insert("n_support".to_string(), ParamValue::from(self.n_support()));
        params
    }
}

/// Distinct labels, numeric order when every label parses as a number
fn sorted_classes(y: &[String]) -> Vec<String> {
    let mut classes: Vec<String> = y.to_vec();
    classes.sort();
    classes.dedup();

    let numeric: Option<Vec<f64>> = classes.iter().map(|c| c.parse::<f64>().ok()).collect();
    if let Some(values) = numeric {
        let mut paired: Vec<(f64, String)> = values.into_iter().zip(classes).collect();
        paired.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        classes = paired.into_iter().map(|(_, c)| c).collect();
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn seeded(kernel: KernelKind) -> SvmClassifier {
        SvmClassifier::from_config(&ClassifierConfig::default().with_kernel(kernel), Some(42))
    }

    #[test]
    fn test_binary_classification() {
        let x = array![
            [0.0, 0.0], [0.2, 0.1], [0.1, 0.3], [0.3, 0.2],
            [3.0, 3.0], [3.2, 2.9], [2.8, 3.1], [3.1, 3.3],
        ];
        let y = labels(&["0", "0", "0", "0", "1", "1", "1", "1"]);

        let mut svm = seeded(KernelKind::Rbf);
        svm.fit(&x, &y).unwrap();
        assert_eq!(svm.predict(&x).unwrap(), y);

        let proba = svm.predict_proba(&x).unwrap();
        assert_eq!(proba.dim(), (8, 2));
        for row in proba.outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
        assert!(proba[[7, 1]] > proba[[0, 1]]);
    }

    #[test]
    fn test_multiclass_one_vs_rest() {
        let x = array![
            [0.0, 0.0], [0.1, 0.2], [0.2, 0.1],
            [5.0, 0.0], [5.1, 0.2], [4.9, 0.1],
            [0.0, 5.0], [0.2, 5.1], [0.1, 4.9],
        ];
        let y = labels(&["a", "a", "a", "b", "b", "b", "c", "c", "c"]);

        let mut svm = seeded(KernelKind::Linear);
        svm.fit(&x, &y).unwrap();
        assert_eq!(svm.classes(), &["a", "b", "c"]);
        assert_eq!(svm.n_support().len(), 3);

        let proba = svm.predict_proba(&x).unwrap();
        for row in proba.outer_iter() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_one_vs_rest_machines_share_kernel_matrix() {
        let x = array![
            [0.0, 0.0], [0.1, 0.2], [0.2, 0.1],
            [5.0, 0.0], [5.1, 0.2], [4.9, 0.1],
            [0.0, 5.0], [0.2, 5.1], [0.1, 4.9],
        ];
        let y = labels(&["a", "a", "a", "b", "b", "b", "c", "c", "c"]);
        let mut svm = seeded(KernelKind::Rbf);
        svm.fit(&x, &y).unwrap();

        let kernel = svm.kernel.clone().unwrap();
        let gram = kernel.gram(&x);
        let Some(Estimator::OneVsRest(machines)) = &svm.estimator else {
            panic!("expected one-vs-rest estimator");
        };
        for (k, cls) in ["a", "b", "c"].iter().enumerate() {
            let positive: Vec<bool> = y.iter().map(|v| v == cls).collect();
            let alone = svm.fit_binary(&gram, &x, &positive, k as u64);
            assert_eq!(machines[k].dual_coef, alone.dual_coef);
            assert_eq!(machines[k].bias, alone.bias);
        }
        assert_eq!(svm.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_single_class_is_constant() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = labels(&["1", "1", "1"]);
        let mut svm = seeded(KernelKind::Rbf);
        svm.fit(&x, &y).unwrap();

        assert_eq!(svm.predict(&array![[9.0]]).unwrap(), vec!["1"]);
        assert_eq!(svm.predict_proba(&array![[9.0]]).unwrap()[[0, 0]], 1.0);
    }

    #[test]
    fn test_numeric_class_order() {
        assert_eq!(sorted_classes(&labels(&["10", "2", "1", "2"])), vec!["1", "2", "10"]);
        assert_eq!(sorted_classes(&labels(&["b", "10", "a"])), vec!["10", "a", "b"]);
    }

    #[test]
    fn test_errors() {
        let x = array![[0.0], [1.0]];
        let svm = seeded(KernelKind::Rbf);
        assert!(matches!(svm.predict(&x), Err(PipelineError::ModelNotFitted)));

        let mut svm = seeded(KernelKind::Rbf);
        svm.fit(&x, &labels(&["0", "1"])).unwrap();
        assert!(matches!(svm.fit(&x, &labels(&["0", "1"])), Err(PipelineError::Fit { .. })));
        assert!(matches!(svm.predict(&array![[0.0, 1.0]]), Err(PipelineError::Schema { .. })));
    }

    #[test]
    fn test_params_record() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let mut svm = seeded(KernelKind::Rbf);
        svm.fit(&x, &labels(&["0", "0", "1", "1"])).unwrap();
        let params = svm.get_params();
        assert_eq!(params.get("gamma"), Some(&ParamValue::from("scale")));
        assert_eq!(params.get("probability"), Some(&ParamValue::Bool(true)));
        assert_eq!(params.get("classes"), Some(&ParamValue::from(vec!["0", "1"])));
    }
}
