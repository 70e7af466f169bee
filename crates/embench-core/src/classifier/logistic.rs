//! One-vs-rest logistic regression fitted by full-batch gradient descent.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{EvalResult, EvaluationError};
use crate::math::sigmoid;

use super::{check_fit_shapes, not_fitted, Classifier, Targets};

const NAME: &str = "logistic_regression";

#[derive(Debug, Clone)]
struct Fitted {
    /// `dim × outputs`
    weights: Array2<f64>,
    bias: Array1<f64>,
    multilabel: bool,
}

/// L2-regularised logistic regression, one binary model per class or label.
///
/// Minimises `0.5·‖w‖² + c·Σ log-loss` per output. Single-label prediction is
/// the argmax of the decision values; multi-label prediction thresholds each
/// decision value at 0.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    max_iter: usize,
    c: f64,
    learning_rate: f64,
    fitted: Option<Fitted>,
}

impl LogisticRegression {
    pub fn new(max_iter: usize, c: f64, learning_rate: f64) -> Self {
        Self {
            max_iter,
            c,
            learning_rate,
            fitted: None,
        }
    }

    fn decision(fitted: &Fitted, x: &ArrayView2<'_, f32>) -> Array2<f64> {
        let x = x.mapv(f64::from);
        x.dot(&fitted.weights) + &fitted.bias
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(100, 1.0, 0.5)
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        NAME
    }

    fn params(&self) -> serde_json::Value {
        serde_json::json!({
            "max_iter": self.max_iter,
            "c": self.c,
            "learning_rate": self.learning_rate,
        })
    }

    fn fresh(&self) -> Box<dyn Classifier> {
        Box::new(Self::new(self.max_iter, self.c, self.learning_rate))
    }

    fn fit(&mut self, x: ArrayView2<'_, f32>, y: &Targets) -> EvalResult<()> {
        check_fit_shapes(NAME, &x, y)?;
        if y.width() == 0 {
            return Err(EvaluationError::Classifier {
                classifier: NAME.to_string(),
                message: "targets have no classes".into(),
            });
        }

        let n = x.nrows() as f64;
        let xs = x.mapv(f64::from);
        let ys = y.indicator_matrix().mapv(f64::from);
        let mut weights = Array2::<f64>::zeros((xs.ncols(), ys.ncols()));
        let mut bias = Array1::<f64>::zeros(ys.ncols());
        let penalty = 1.0 / (self.c * n);

        for _ in 0..self.max_iter {
            let z = xs.dot(&weights) + &bias;
            let residual = z.mapv(sigmoid) - &ys;
            let grad_w = xs.t().dot(&residual) / n + &weights * penalty;
            let grad_b = residual.sum_axis(Axis(0)) / n;
            weights = weights - grad_w * self.learning_rate;
            bias = bias - grad_b * self.learning_rate;
        }

        if weights.iter().any(|w| !w.is_finite()) {
            return Err(EvaluationError::Classifier {
                classifier: NAME.to_string(),
                message: "gradient descent diverged; lower classifier.learning_rate".into(),
            });
        }

        self.fitted = Some(Fitted {
            weights,
            bias,
            multilabel: matches!(y, Targets::MultiLabel(_)),
        });
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f32>) -> EvalResult<Targets> {
        let fitted = self.fitted.as_ref().ok_or_else(|| not_fitted(NAME))?;
        if x.ncols() != fitted.weights.nrows() {
            return Err(EvaluationError::DimensionMismatch {
                expected: fitted.weights.nrows(),
                actual: x.ncols(),
            });
        }
        let scores = Self::decision(fitted, &x);

        if fitted.multilabel {
            return Ok(Targets::MultiLabel(scores.mapv(|s| u8::from(s > 0.0))));
        }
        let labels = scores
            .rows()
            .into_iter()
            .map(|row| {
                let mut best = 0;
                for (c, &s) in row.iter().enumerate() {
                    if s > row[best] {
                        best = c;
                    }
                }
                best
            })
            .collect();
        Ok(Targets::Classes {
            labels,
            n_classes: scores.ncols(),
        })
    }
}
