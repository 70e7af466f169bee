//! Labeled splits and multi-subset datasets.

use std::collections::BTreeMap;

use crate::error::{EvalResult, EvaluationError};

/// Subset name used for monolingual datasets.
pub const DEFAULT_SUBSET: &str = "default";

/// An ordered sequence of records, each an input payload plus a label set.
#[derive(Debug, Clone)]
pub struct Split<I> {
    inputs: Vec<I>,
    labels: Vec<Vec<String>>,
}

impl<I> Split<I> {
    /// Build a split from parallel input and label columns.
    ///
    /// Fails when the columns have different lengths.
    pub fn new(inputs: Vec<I>, labels: Vec<Vec<String>>) -> EvalResult<Self> {
        if inputs.len() != labels.len() {
            return Err(EvaluationError::Configuration(format!(
                "split has {} inputs but {} label sets",
                inputs.len(),
                labels.len()
            )));
        }
        Ok(Self { inputs, labels })
    }

    /// Build a single-label split (one label per record).
    pub fn single_label(inputs: Vec<I>, labels: Vec<String>) -> EvalResult<Self> {
        Self::new(inputs, labels.into_iter().map(|l| vec![l]).collect())
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// The feature column.
    pub fn inputs(&self) -> &[I] {
        &self.inputs
    }

    /// The label column.
    pub fn labels(&self) -> &[Vec<String>] {
        &self.labels
    }

    /// Borrow the inputs at the given positions, in the given order.
    pub fn inputs_at(&self, indices: &[usize]) -> Vec<&I> {
        indices.iter().map(|&i| &self.inputs[i]).collect()
    }

    /// Borrow the label sets at the given positions, in the given order.
    pub fn labels_at(&self, indices: &[usize]) -> Vec<&[String]> {
        indices.iter().map(|&i| self.labels[i].as_slice()).collect()
    }

    /// Projection onto the given positions, keeping both columns.
    pub fn select(&self, indices: &[usize]) -> Split<I>
    where
        I: Clone,
    {
        Split {
            inputs: indices.iter().map(|&i| self.inputs[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }
}

/// Named subsets (languages, domains), each holding named splits.
#[derive(Debug, Clone)]
pub struct Dataset<I> {
    subsets: BTreeMap<String, BTreeMap<String, Split<I>>>,
}

impl<I> Default for Dataset<I> {
    fn default() -> Self {
        Self {
            subsets: BTreeMap::new(),
        }
    }
}

impl<I> Dataset<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a split, creating the subset on first use.
    pub fn insert(&mut self, subset: &str, split_name: &str, split: Split<I>) {
        self.subsets
            .entry(subset.to_string())
            .or_default()
            .insert(split_name.to_string(), split);
    }

    /// Builder form of [`Dataset::insert`].
    pub fn with_split(mut self, subset: &str, split_name: &str, split: Split<I>) -> Self {
        self.insert(subset, split_name, split);
        self
    }

    /// Subset names in sorted order.
    pub fn subset_names(&self) -> Vec<&str> {
        self.subsets.keys().map(String::as_str).collect()
    }

    /// True when the dataset carries anything other than a lone default subset.
    pub fn is_multilingual(&self) -> bool {
        !(self.subsets.len() == 1 && self.subsets.contains_key(DEFAULT_SUBSET))
    }

    /// Look up a split inside a subset.
    pub fn split(&self, subset: &str, split_name: &str) -> EvalResult<&Split<I>> {
        let splits = self
            .subsets
            .get(subset)
            .ok_or_else(|| EvaluationError::MissingSubset(subset.to_string()))?;
        splits
            .get(split_name)
            .ok_or_else(|| EvaluationError::MissingSplit {
                subset: subset.to_string(),
                split: split_name.to_string(),
            })
    }
}
