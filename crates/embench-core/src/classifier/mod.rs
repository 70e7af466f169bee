//! Lightweight classifiers trained on top of frozen embeddings.
//!
//! Each bootstrap experiment asks the template for a [`Classifier::fresh`]
//! copy, so no fitted state ever leaks from one experiment into the next.

pub mod knn;
pub mod logistic;

pub use knn::KnnClassifier;
pub use logistic::LogisticRegression;

use std::fmt::Debug;

use ndarray::{Array2, ArrayView2};

use crate::config::{ClassifierConfig, ClassifierKind};
use crate::error::{EvalResult, EvaluationError};
use crate::evaluation::metrics;

/// Fixed-width training/prediction targets.
#[derive(Debug, Clone, PartialEq)]
pub enum Targets {
    /// One class index per row (single-label tasks)
    Classes { labels: Vec<usize>, n_classes: usize },
    /// Binary indicator matrix, one column per label (multi-label tasks)
    MultiLabel(Array2<u8>),
}

impl Targets {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Classes { labels, .. } => labels.len(),
            Self::MultiLabel(m) => m.nrows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of classes or label columns.
    pub fn width(&self) -> usize {
        match self {
            Self::Classes { n_classes, .. } => *n_classes,
            Self::MultiLabel(m) => m.ncols(),
        }
    }

    /// Dense 0/1 matrix view of the targets (one-hot for class indices).
    pub fn indicator_matrix(&self) -> Array2<u8> {
        match self {
            Self::Classes { labels, n_classes } => {
                let mut m = Array2::zeros((labels.len(), *n_classes));
                for (r, &c) in labels.iter().enumerate() {
                    m[[r, c]] = 1;
                }
                m
            }
            Self::MultiLabel(m) => m.clone(),
        }
    }
}

/// A classifier with a scikit-learn style fit/predict/score contract.
pub trait Classifier: Send + Sync + Debug {
    /// Short family name, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Hyperparameters, recorded alongside scores.
    fn params(&self) -> serde_json::Value;

    /// An unfitted copy carrying the same hyperparameters.
    fn fresh(&self) -> Box<dyn Classifier>;

    fn fit(&mut self, x: ArrayView2<'_, f32>, y: &Targets) -> EvalResult<()>;

    fn predict(&self, x: ArrayView2<'_, f32>) -> EvalResult<Targets>;

    /// Exact-match accuracy of `predict(x)` against `y`.
    fn score(&self, x: ArrayView2<'_, f32>, y: &Targets) -> EvalResult<f64> {
        let predicted = self.predict(x)?;
        metrics::accuracy(y, &predicted)
    }
}

/// Build the classifier template described by `config`.
pub fn from_config(config: &ClassifierConfig) -> Box<dyn Classifier> {
    match config.kind {
        ClassifierKind::Knn => Box::new(KnnClassifier::new(config.n_neighbors)),
        ClassifierKind::Logistic => Box::new(LogisticRegression::new(
            config.max_iter,
            config.c,
            config.learning_rate,
        )),
    }
}

/// Shared precondition for `fit`: non-empty, matching row counts.
pub(crate) fn check_fit_shapes(
    name: &str,
    x: &ArrayView2<'_, f32>,
    y: &Targets,
) -> EvalResult<()> {
    if x.nrows() == 0 {
        return Err(EvaluationError::Classifier {
            classifier: name.to_string(),
            message: "cannot fit on an empty training set".into(),
        });
    }
    if x.nrows() != y.len() {
        return Err(EvaluationError::Classifier {
            classifier: name.to_string(),
            message: format!("{} training rows but {} targets", x.nrows(), y.len()),
        });
    }
    Ok(())
}

pub(crate) fn not_fitted(name: &str) -> EvaluationError {
    EvaluationError::Classifier {
        classifier: name.to_string(),
        message: "predict called before fit".into(),
    }
}
