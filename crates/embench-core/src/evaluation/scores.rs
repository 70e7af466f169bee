//! Score records produced by the evaluators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EvalResult, EvaluationError};
use crate::math::mean;

/// Metric name -> value for one experiment (or an average over experiments).
pub type ScoreDict = BTreeMap<String, f64>;

/// Aggregated scores for one dataset subset.
///
/// Serialized flat: the averaged metrics sit next to `main_score`,
/// `hf_subset` and the raw per-experiment records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetScores {
    /// Subset name ("default" for monolingual data)
    pub hf_subset: String,

    /// Value of the task's main metric
    pub main_score: f64,

    /// Experiment-averaged metrics
    #[serde(flatten)]
    pub metrics: ScoreDict,

    /// One score dict per bootstrap experiment, in experiment order
    #[serde(default)]
    pub scores_per_experiment: Vec<ScoreDict>,

    /// Additional per-fold or per-cluster score arrays (e.g. v-measures)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub distributions: BTreeMap<String, Vec<f64>>,
}

impl SubsetScores {
    /// Values of `metric` across experiments, in experiment order.
    pub fn per_experiment(&self, metric: &str) -> Vec<f64> {
        self.scores_per_experiment
            .iter()
            .filter_map(|s| s.get(metric).copied())
            .collect()
    }
}

/// Per-subset scores of one task.
pub type TaskScores = BTreeMap<String, SubsetScores>;

/// Arithmetic mean of every metric across experiments.
///
/// The key set is taken from the first experiment. Fails when no experiment ran.
pub fn aggregate(scores: &[ScoreDict]) -> EvalResult<ScoreDict> {
    let first = scores.first().ok_or_else(|| {
        EvaluationError::Configuration("at least one experiment must run".into())
    })?;
    let mut averaged = ScoreDict::new();
    for key in first.keys() {
        let values: Vec<f64> = scores.iter().filter_map(|s| s.get(key).copied()).collect();
        if values.len() != scores.len() {
            return Err(EvaluationError::Configuration(format!(
                "metric '{key}' is missing from some experiments"
            )));
        }
        if let Some(m) = mean(&values) {
            averaged.insert(key.clone(), m);
        }
    }
    Ok(averaged)
}
