//! Classification metrics: exact-match accuracy, macro F1 and
//! label-ranking average precision.

use std::collections::BTreeSet;

use ndarray::{Array2, ArrayView2};

use crate::classifier::Targets;
use crate::error::{EvalResult, EvaluationError};

fn shape_error(message: String) -> EvaluationError {
    EvaluationError::Configuration(message)
}

fn check_pair(y_true: &Targets, y_pred: &Targets) -> EvalResult<()> {
    if y_true.is_empty() {
        return Err(shape_error("cannot score an empty test set".into()));
    }
    if y_true.len() != y_pred.len() || y_true.width() != y_pred.width() {
        return Err(shape_error(format!(
            "prediction shape ({}, {}) does not match targets ({}, {})",
            y_pred.len(),
            y_pred.width(),
            y_true.len(),
            y_true.width()
        )));
    }
    Ok(())
}

/// Fraction of rows predicted exactly right (every label for multi-label rows).
pub fn accuracy(y_true: &Targets, y_pred: &Targets) -> EvalResult<f64> {
    check_pair(y_true, y_pred)?;
    let correct = match (y_true, y_pred) {
        (Targets::Classes { labels: t, .. }, Targets::Classes { labels: p, .. }) => {
            t.iter().zip(p).filter(|(a, b)| a == b).count()
        }
        (Targets::MultiLabel(t), Targets::MultiLabel(p)) => t
            .rows()
            .into_iter()
            .zip(p.rows())
            .filter(|(a, b)| a == b)
            .count(),
        _ => return Err(shape_error("cannot mix class and multi-label targets".into())),
    };
    Ok(correct as f64 / y_true.len() as f64)
}

fn f1(tp: usize, fp: usize, fn_: usize) -> f64 {
    let denom = 2 * tp + fp + fn_;
    if denom == 0 {
        0.0
    } else {
        2.0 * tp as f64 / denom as f64
    }
}

/// Unweighted mean of per-class F1.
///
/// Single-label: averaged over classes present in either truth or prediction.
/// Multi-label: averaged over every label column; a column with no positives
/// on either side scores 0.
pub fn f1_macro(y_true: &Targets, y_pred: &Targets) -> EvalResult<f64> {
    check_pair(y_true, y_pred)?;
    match (y_true, y_pred) {
        (Targets::Classes { labels: t, .. }, Targets::Classes { labels: p, .. }) => {
            let present: BTreeSet<usize> = t.iter().chain(p).copied().collect();
            let total: f64 = present
                .iter()
                .map(|&c| {
                    let tp = t.iter().zip(p).filter(|(a, b)| **a == c && **b == c).count();
                    let fp = t.iter().zip(p).filter(|(a, b)| **a != c && **b == c).count();
                    let fn_ = t.iter().zip(p).filter(|(a, b)| **a == c && **b != c).count();
                    f1(tp, fp, fn_)
                })
                .sum();
            Ok(total / present.len() as f64)
        }
        (Targets::MultiLabel(t), Targets::MultiLabel(p)) => {
            if t.ncols() == 0 {
                return Ok(0.0);
            }
            let total: f64 = t
                .columns()
                .into_iter()
                .zip(p.columns())
                .map(|(tc, pc)| {
                    let mut tp = 0;
                    let mut fp = 0;
                    let mut fn_ = 0;
                    for (&a, &b) in tc.iter().zip(pc.iter()) {
                        match (a, b) {
                            (1, 1) => tp += 1,
                            (0, 1) => fp += 1,
                            (1, 0) => fn_ += 1,
                            _ => {}
                        }
                    }
                    f1(tp, fp, fn_)
                })
                .sum();
            Ok(total / t.ncols() as f64)
        }
        _ => Err(shape_error("cannot mix class and multi-label targets".into())),
    }
}

/// Label-ranking average precision of `scores` against indicator truth.
///
/// For each row and each relevant label, precision is the share of relevant
/// labels among those scored at least as high. Rows with no relevant labels,
/// or with every label relevant, score 1.
pub fn label_ranking_average_precision(
    y_true: &Array2<u8>,
    scores: ArrayView2<'_, f64>,
) -> EvalResult<f64> {
    if y_true.shape() != scores.shape() {
        return Err(shape_error(format!(
            "score shape {:?} does not match targets {:?}",
            scores.shape(),
            y_true.shape()
        )));
    }
    if y_true.nrows() == 0 {
        return Err(shape_error("cannot score an empty test set".into()));
    }

    let n_labels = y_true.ncols();
    let mut total = 0.0;
    for (truth, score) in y_true.rows().into_iter().zip(scores.rows()) {
        let relevant: Vec<usize> = (0..n_labels).filter(|&j| truth[j] == 1).collect();
        if relevant.is_empty() || relevant.len() == n_labels {
            total += 1.0;
            continue;
        }
        let mut row_sum = 0.0;
        for &j in &relevant {
            let rank = (0..n_labels).filter(|&k| score[k] >= score[j]).count();
            let hits = relevant.iter().filter(|&&k| score[k] >= score[j]).count();
            row_sum += hits as f64 / rank as f64;
        }
        total += row_sum / relevant.len() as f64;
    }
    Ok(total / y_true.nrows() as f64)
}
