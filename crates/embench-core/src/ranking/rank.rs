//! Leaderboard ranking with ties for statistically indistinguishable models.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::config::SignificanceConfig;
use crate::error::{EvalResult, EvaluationError};
use crate::math::mean;
use crate::output::ToMarkdown;

use super::significance::bootstrap_p_value;

/// One model's score distribution (per sub-task, fold, cluster level, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScores {
    pub model: String,
    pub scores: Vec<f64>,
}

impl ModelScores {
    pub fn new(model: impl Into<String>, scores: Vec<f64>) -> Self {
        Self {
            model: model.into(),
            scores,
        }
    }
}

/// Models in descending mean order with naive and significant ranks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTable {
    pub models: Vec<String>,
    pub means: Vec<f64>,
    /// 1..K in table order
    pub rank: Vec<usize>,
    /// Non-decreasing; increments only where a model differs from its predecessor
    pub significant_rank: Vec<usize>,
    /// p-value of each model against its predecessor (`None` for the first)
    pub p_values: Vec<Option<f64>>,
}

impl RankTable {
    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl ToMarkdown for RankTable {
    /// Table in rank order.
    fn to_markdown(&self) -> String {
        let mut out = String::from("| Model | Rank | Significant rank |\n|---|---|---|\n");
        for ((model, rank), significant) in self
            .models
            .iter()
            .zip(&self.rank)
            .zip(&self.significant_rank)
        {
            let _ = writeln!(out, "| {model} | {rank} | {significant} |");
        }
        out
    }
}

/// Groups adjacent models whose distributions a bootstrap test cannot tell apart.
#[derive(Debug, Clone)]
pub struct SignificanceRanker {
    config: SignificanceConfig,
    cancel: CancellationToken,
}

impl SignificanceRanker {
    pub fn new(config: SignificanceConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Attach a cancellation token, checked between resampling chunks.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &SignificanceConfig {
        &self.config
    }

    /// p-value that `b` beats `a`, seeded with the configured seed.
    ///
    /// Every call starts from the same seed, so tests within one ranking pass
    /// share their random stream.
    pub fn p_value(&self, a: &[f64], b: &[f64]) -> EvalResult<f64> {
        bootstrap_p_value(
            a,
            b,
            self.config.n_resamples,
            self.config.seed,
            &self.cancel,
        )
    }

    /// Sort models by descending mean and assign significant ranks.
    ///
    /// Exact mean ties keep input order. Each model is tested against its
    /// immediate predecessor; the significant rank increments when
    /// `p < threshold`.
    pub fn rank(&self, models: &[ModelScores]) -> EvalResult<RankTable> {
        if models.is_empty() {
            return Err(EvaluationError::Configuration(
                "cannot rank an empty set of models".into(),
            ));
        }
        let mut seen = HashSet::new();
        let mut means = Vec::with_capacity(models.len());
        for m in models {
            if !seen.insert(m.model.as_str()) {
                return Err(EvaluationError::Configuration(format!(
                    "model '{}' appears more than once",
                    m.model
                )));
            }
            if m.scores.iter().any(|s| !s.is_finite()) {
                return Err(EvaluationError::Configuration(format!(
                    "model '{}' has non-finite scores",
                    m.model
                )));
            }
            let avg = mean(&m.scores).ok_or_else(|| {
                EvaluationError::Configuration(format!(
                    "model '{}' has an empty score distribution",
                    m.model
                ))
            })?;
            means.push(avg);
        }

        let mut order: Vec<usize> = (0..models.len()).collect();
        order.sort_by(|&i, &j| means[j].total_cmp(&means[i]));

        let mut significant_rank = Vec::with_capacity(order.len());
        let mut p_values = Vec::with_capacity(order.len());
        let mut current = 1;
        significant_rank.push(current);
        p_values.push(None);
        for pair in order.windows(2) {
            let (predecessor, successor) = (&models[pair[0]], &models[pair[1]]);
            let p = self.p_value(&successor.scores, &predecessor.scores)?;
            tracing::debug!(
                "{} vs {}: p = {:.4}",
                predecessor.model,
                successor.model,
                p
            );
            if p < self.config.threshold {
                current += 1;
            }
            significant_rank.push(current);
            p_values.push(Some(p));
        }

        Ok(RankTable {
            models: order.iter().map(|&i| models[i].model.clone()).collect(),
            means: order.iter().map(|&i| means[i]).collect(),
            rank: (1..=order.len()).collect(),
            significant_rank,
            p_values,
        })
    }
}

/// Rank `models` with a one-off [`SignificanceRanker`].
pub fn compute_significant_rank(
    models: &[ModelScores],
    config: &SignificanceConfig,
) -> EvalResult<RankTable> {
    SignificanceRanker::new(config.clone()).rank(models)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SignificanceConfig {
        SignificanceConfig {
            n_resamples: 2000,
            ..Default::default()
        }
    }

    /// Alternating `center ± spread`.
    fn noisy(center: f64, spread: f64, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| if i % 2 == 0 { center - spread } else { center + spread })
            .collect()
    }

    #[test]
    fn test_close_models_share_rank_and_distant_model_drops() {
        let models = vec![
            ModelScores::new("A", noisy(10.0, 1.0, 20)),
            ModelScores::new("B", noisy(10.01, 1.0, 20)),
            ModelScores::new("C", vec![5.0; 20]),
        ];
        let table = compute_significant_rank(&models, &config()).unwrap();
        assert_eq!(table.models, vec!["B", "A", "C"]);
        assert_eq!(table.rank, vec![1, 2, 3]);
        assert_eq!(table.significant_rank[0], table.significant_rank[1]);
        assert!(table.significant_rank[2] > table.significant_rank[1]);
        assert!(table.p_values[0].is_none());
    }

    #[test]
    fn test_constant_distributions_with_a_gap_are_distinct() {
        let models = vec![
            ModelScores::new("A", vec![10.0; 20]),
            ModelScores::new("B", vec![10.01; 20]),
        ];
        let table = compute_significant_rank(&models, &config()).unwrap();
        assert_eq!(table.significant_rank, vec![1, 2]);
    }

    #[test]
    fn test_identical_distributions_tie() {
        let models = vec![
            ModelScores::new("first", vec![0.5; 8]),
            ModelScores::new("second", vec![0.5; 8]),
        ];
        let table = compute_significant_rank(&models, &config()).unwrap();
        // stable sort keeps input order on exact ties
        assert_eq!(table.models, vec!["first", "second"]);
        assert_eq!(table.significant_rank, vec![1, 1]);
        assert_eq!(table.p_values[1], Some(1.0));
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let models = vec![
            ModelScores::new("x", vec![0.61, 0.58, 0.66, 0.59]),
            ModelScores::new("y", vec![0.60, 0.57, 0.64, 0.62]),
            ModelScores::new("z", vec![0.40, 0.45, 0.43, 0.41]),
        ];
        let first = compute_significant_rank(&models, &config()).unwrap();
        let second = compute_significant_rank(&models, &config()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_significant_rank_is_monotonic() {
        let models: Vec<ModelScores> = (0..6)
            .map(|i| ModelScores::new(format!("m{i}"), noisy(i as f64 * 0.7, 0.5, 10)))
            .collect();
        let table = compute_significant_rank(&models, &config()).unwrap();
        assert_eq!(table.rank, (1..=6).collect::<Vec<_>>());
        for pair in table.significant_rank.windows(2) {
            assert!(pair[1] == pair[0] || pair[1] == pair[0] + 1);
        }
        for pair in table.means.windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }

    #[test]
    fn test_single_model() {
        let models = vec![ModelScores::new("solo", vec![0.9, 0.8])];
        let table = compute_significant_rank(&models, &config()).unwrap();
        assert_eq!(table.rank, vec![1]);
        assert_eq!(table.significant_rank, vec![1]);
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert!(compute_significant_rank(&[], &config()).is_err());
        let empty = vec![ModelScores::new("a", vec![])];
        assert!(compute_significant_rank(&empty, &config()).is_err());
        let dup = vec![
            ModelScores::new("a", vec![1.0]),
            ModelScores::new("a", vec![2.0]),
        ];
        assert!(compute_significant_rank(&dup, &config()).is_err());
        let nan = vec![ModelScores::new("a", vec![f64::NAN])];
        assert!(compute_significant_rank(&nan, &config()).is_err());
    }

    #[test]
    fn test_markdown_lists_models_in_rank_order() {
        let models = vec![
            ModelScores::new("low", vec![0.1; 5]),
            ModelScores::new("high", vec![0.9; 5]),
        ];
        let md = compute_significant_rank(&models, &config())
            .unwrap()
            .to_markdown();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| Model | Rank | Significant rank |");
        assert_eq!(lines[2], "| high | 1 | 1 |");
        assert_eq!(lines[3], "| low | 2 | 2 |");
    }
}
