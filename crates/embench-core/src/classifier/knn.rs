//! Brute-force k-nearest-neighbour classifier.

use ndarray::{Array2, ArrayView2};

use crate::error::{EvalResult, EvaluationError};
use crate::math::squared_euclidean;

use super::{check_fit_shapes, not_fitted, Classifier, Targets};

const NAME: &str = "knn";

/// Euclidean k-NN with uniform weights.
///
/// Single-label: majority class among the neighbours, ties to the lowest
/// class index. Multi-label: each label column is voted independently and a
/// tie resolves to 0.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    n_neighbors: usize,
    fitted: Option<(Array2<f32>, Targets)>,
}

impl KnnClassifier {
    pub fn new(n_neighbors: usize) -> Self {
        Self {
            n_neighbors,
            fitted: None,
        }
    }

    /// Positions of the `k` training rows closest to `query` (ties by position).
    fn neighbours(train: &Array2<f32>, query: &[f32], k: usize) -> Vec<usize> {
        let mut dists: Vec<(f32, usize)> = train
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let d = match row.as_slice() {
                    Some(r) => squared_euclidean(r, query),
                    None => squared_euclidean(&row.to_vec(), query),
                };
                (d, i)
            })
            .collect();
        dists.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        dists.into_iter().take(k).map(|(_, i)| i).collect()
    }
}

impl Classifier for KnnClassifier {
    fn name(&self) -> &'static str {
        NAME
    }

    fn params(&self) -> serde_json::Value {
        serde_json::json!({ "n_neighbors": self.n_neighbors, "metric": "euclidean" })
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(Self::new(self.n_neighbors))
    }

    fn fit(&mut self, x: ArrayView2<'_, f32>, y: &Targets) -> EvalResult<()> {
        check_fit_shapes(NAME, &x, y)?;
        if self.n_neighbors > x.nrows() {
            return Err(EvaluationError::Classifier {
                classifier: NAME.to_string(),
                message: format!(
                    "n_neighbors ({}) exceeds the {} training rows",
                    self.n_neighbors,
                    x.nrows()
                ),
            });
        }
        self.fitted = Some((x.to_owned(), y.clone()));
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f32>) -> EvalResult<Targets> {
        let (train, targets) = self.fitted.as_ref().ok_or_else(|| not_fitted(NAME))?;
        if x.ncols() != train.ncols() {
            return Err(EvaluationError::DimensionMismatch {
                expected: train.ncols(),
                actual: x.ncols(),
            });
        }

        let k = self.n_neighbors;
        match targets {
            Targets::Classes { labels, n_classes } => {
                let mut predicted = Vec::with_capacity(x.nrows());
                for row in x.rows() {
                    let query = row.to_vec();
                    let mut votes = vec![0usize; *n_classes];
                    for i in Self::neighbours(train, &query, k) {
                        votes[labels[i]] += 1;
                    }
                    // first maximum wins
                    let mut best = 0;
                    for (c, &v) in votes.iter().enumerate() {
                        if v > votes[best] {
                            best = c;
                        }
                    }
                    predicted.push(best);
                }
                Ok(Targets::Classes {
                    labels: predicted,
                    n_classes: *n_classes,
                })
            }
            Targets::MultiLabel(matrix) => {
                let mut predicted = Array2::<u8>::zeros((x.nrows(), matrix.ncols()));
                for (r, row) in x.rows().into_iter().enumerate() {
                    let query = row.to_vec();
                    let neighbours = Self::neighbours(train, &query, k);
                    for c in 0..matrix.ncols() {
                        let ones = neighbours.iter().filter(|&&i| matrix[[i, c]] == 1).count();
                        if 2 * ones > neighbours.len() {
                            predicted[[r, c]] = 1;
                        }
                    }
                }
                Ok(Targets::MultiLabel(predicted))
            }
        }
    }
}
