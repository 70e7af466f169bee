//! Label-set encoding into fixed-width classifier targets.

use std::collections::{BTreeSet, HashMap};

use ndarray::Array2;

use crate::classifier::Targets;
use crate::error::{EvalResult, EvaluationError};

/// Maps label strings onto a sorted, fixed column space.
#[derive(Debug, Clone)]
pub struct LabelBinarizer {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelBinarizer {
    /// Fit the label space from every label seen in `rows`.
    pub fn fit<'a>(rows: impl IntoIterator<Item = &'a [String]>) -> Self {
        let classes: BTreeSet<&String> = rows.into_iter().flatten().collect();
        let classes: Vec<String> = classes.into_iter().cloned().collect();
        let index = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self { classes, index }
    }

    /// Sorted label names; column `i` of the targets is `classes()[i]`.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// One-hot indicator matrix, one row per label set.
    ///
    /// Labels outside the fitted space are dropped with a warning.
    pub fn multilabel(&self, rows: &[&[String]]) -> Targets {
        let mut matrix = Array2::<u8>::zeros((rows.len(), self.n_classes()));
        let mut unknown = BTreeSet::new();
        for (r, labels) in rows.iter().enumerate() {
            for label in labels.iter() {
                match self.index.get(label) {
                    Some(&c) => matrix[[r, c]] = 1,
                    None => {
                        unknown.insert(label.as_str());
                    }
                }
            }
        }
        if !unknown.is_empty() {
            tracing::warn!(
                "Ignoring {} label(s) not present in the fitted label space: {:?}",
                unknown.len(),
                unknown
            );
        }
        Targets::MultiLabel(matrix)
    }

    /// Class indices for single-label rows.
    ///
    /// Every row must carry exactly one label from the fitted space.
    pub fn single_label(&self, rows: &[&[String]]) -> EvalResult<Targets> {
        let mut labels = Vec::with_capacity(rows.len());
        for (r, row) in rows.iter().enumerate() {
            let [label] = *row else {
                return Err(EvaluationError::InvalidLabels {
                    index: r,
                    message: format!("expected exactly one label, found {}", row.len()),
                });
            };
            let class = self
                .index
                .get(label)
                .ok_or_else(|| EvaluationError::InvalidLabels {
                    index: r,
                    message: format!("label '{label}' is outside the fitted label space"),
                })?;
            labels.push(*class);
        }
        Ok(Targets::Classes {
            labels,
            n_classes: self.n_classes(),
        })
    }
}
