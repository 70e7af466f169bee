//! Agreement between two versions of the same task across a set of models.

use serde::{Deserialize, Serialize};

use crate::error::{EvalResult, EvaluationError};
use crate::math::spearman;
use crate::output::ToMarkdown;

use super::rank::{ModelScores, SignificanceRanker};

/// Results of one task version for a fixed, ordered list of models.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionRun {
    pub task: String,
    /// Main score per model
    pub main_scores: Vec<f64>,
    /// Evaluation wall time per model, in seconds
    pub evaluation_times: Vec<f64>,
    /// Score distribution per model, used for significant ranks
    pub distributions: Vec<ModelScores>,
}

/// How closely a fast task version reproduces the original.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionComparison {
    pub task: String,
    pub fast_task: String,
    /// Rank correlation of the models' main scores (`None` when undefined)
    pub spearman: Option<f64>,
    /// Total base time over total fast time
    pub speedup: Option<f64>,
    /// Bootstrap p-value between the two significant-rank vectors
    pub rank_p_value: f64,
}

impl VersionComparison {
    /// One Markdown table row: task, Spearman, speedup, p-value.
    pub fn to_markdown_row(&self) -> String {
        let spearman = self
            .spearman
            .map_or_else(|| "n/a".to_string(), |s| format!("{s:.4}"));
        let speedup = self
            .speedup
            .map_or_else(|| "n/a".to_string(), |s| format!("{s:.2}x"));
        format!(
            "| {} | {} | {} | {:.4} |",
            self.task, spearman, speedup, self.rank_p_value
        )
    }
}

impl ToMarkdown for [VersionComparison] {
    fn to_markdown(&self) -> String {
        let mut out = String::from("| Task | Spearman | Speedup | Rank p-value |\n|---|---|---|---|\n");
        for row in self {
            out.push_str(&row.to_markdown_row());
            out.push('\n');
        }
        out
    }
}

/// `sum(base) / sum(fast)`; `None` when either side is empty or the fast total
/// is not positive.
pub fn speedup(base_times: &[f64], fast_times: &[f64]) -> Option<f64> {
    if base_times.is_empty() || fast_times.is_empty() {
        return None;
    }
    let fast: f64 = fast_times.iter().sum();
    if fast <= 0.0 {
        return None;
    }
    Some(base_times.iter().sum::<f64>() / fast)
}

/// Compare `fast` against `base`, both listing the same models in the same order.
pub fn compare_versions(
    base: &VersionRun,
    fast: &VersionRun,
    ranker: &SignificanceRanker,
) -> EvalResult<VersionComparison> {
    if base.main_scores.len() != fast.main_scores.len() {
        return Err(EvaluationError::Configuration(format!(
            "task '{}' has {} models but '{}' has {}",
            base.task,
            base.main_scores.len(),
            fast.task,
            fast.main_scores.len()
        )));
    }

    let base_ranks = ranker.rank(&base.distributions)?;
    let fast_ranks = ranker.rank(&fast.distributions)?;
    let as_f64 = |ranks: &[usize]| ranks.iter().map(|&r| r as f64).collect::<Vec<_>>();
    let rank_p_value = ranker.p_value(
        &as_f64(&base_ranks.significant_rank),
        &as_f64(&fast_ranks.significant_rank),
    )?;

    Ok(VersionComparison {
        task: base.task.clone(),
        fast_task: fast.task.clone(),
        spearman: spearman(&base.main_scores, &fast.main_scores),
        speedup: speedup(&base.evaluation_times, &fast.evaluation_times),
        rank_p_value,
    })
}
