//! Deduplicated embeddings for the union of all bootstrap samples.
//!
//! Bootstrap samples overlap heavily, and encoding dominates evaluation time,
//! so every distinct training row is encoded exactly once per evaluation call.

use std::collections::{BTreeSet, HashMap};

use ndarray::{Array2, ArrayView1, Axis};

use crate::data::Split;
use crate::error::{EvalResult, EvaluationError};

use super::{encode_matrix, EncodeOptions, Encoder};

/// Read-only lookup from split position to embedding.
#[derive(Debug, Clone)]
pub struct EmbeddingCache {
    /// Split position -> row in `matrix`
    rows: HashMap<usize, usize>,
    matrix: Array2<f32>,
}

impl EmbeddingCache {
    /// Encode the sorted union of `samples` with a single encoder call.
    pub fn build<E: Encoder + ?Sized>(
        encoder: &E,
        split: &Split<E::Input>,
        samples: &[Vec<usize>],
        options: &EncodeOptions,
    ) -> EvalResult<Self> {
        let unique: BTreeSet<usize> = samples.iter().flatten().copied().collect();
        if let Some(&out_of_range) = unique.range(split.len()..).next() {
            return Err(EvaluationError::Configuration(format!(
                "sample index {out_of_range} is out of range for a split of {} records",
                split.len()
            )));
        }
        let indices: Vec<usize> = unique.into_iter().collect();

        let total: usize = samples.iter().map(Vec::len).sum();
        tracing::debug!(
            "Embedding cache: {} unique rows for {} sampled rows across {} experiments",
            indices.len(),
            total,
            samples.len()
        );

        let matrix = encode_matrix(encoder, &split.inputs_at(&indices), options)?;
        let rows = indices.into_iter().enumerate().map(|(r, i)| (i, r)).collect();
        Ok(Self { rows, matrix })
    }

    /// Number of cached rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Embedding width (0 when empty).
    pub fn dim(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.rows.contains_key(&index)
    }

    /// Embedding of split position `index`, if cached.
    pub fn get(&self, index: usize) -> Option<ArrayView1<'_, f32>> {
        self.rows.get(&index).map(|&r| self.matrix.row(r))
    }

    /// Gather the embeddings of `indices`, in that order, into a new matrix.
    pub fn matrix(&self, indices: &[usize]) -> EvalResult<Array2<f32>> {
        let rows = indices
            .iter()
            .map(|i| {
                self.rows.get(i).copied().ok_or_else(|| {
                    EvaluationError::Configuration(format!(
                        "split position {i} is not in the embedding cache"
                    ))
                })
            })
            .collect::<EvalResult<Vec<usize>>>()?;
        Ok(self.matrix.select(Axis(0), &rows))
    }
}
