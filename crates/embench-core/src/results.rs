//! JSON-on-disk store of task results, one file per model revision and task.
//!
//! Layout: `<root>/<model with "/" as "__">/<revision>/<task>.json`.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EvaluationError, Result};
use crate::evaluation::{SubsetScores, TaskScores};
use crate::ranking::{ModelScores, VersionRun};

/// Everything recorded for one (model, revision, task) evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_name: String,
    pub model_name: String,
    pub revision: String,

    /// Wall time of the evaluation, in seconds
    pub evaluation_time: f64,

    /// Version of embench that produced the file
    #[serde(default)]
    pub embench_version: String,

    /// Split name -> per-subset scores
    pub scores: BTreeMap<String, Vec<SubsetScores>>,
}

impl TaskResult {
    /// Wrap the evaluator output for one split.
    pub fn new(
        task_name: impl Into<String>,
        model_name: impl Into<String>,
        revision: impl Into<String>,
        evaluation_time: f64,
        split: impl Into<String>,
        scores: TaskScores,
    ) -> Self {
        let mut by_split = BTreeMap::new();
        by_split.insert(split.into(), scores.into_values().collect());
        Self {
            task_name: task_name.into(),
            model_name: model_name.into(),
            revision: revision.into(),
            evaluation_time,
            embench_version: crate::VERSION.to_string(),
            scores: by_split,
        }
    }

    /// Scores of one subset within one split.
    pub fn subset(&self, split: &str, subset: &str) -> Option<&SubsetScores> {
        self.scores
            .get(split)?
            .iter()
            .find(|s| s.hf_subset == subset)
    }

    /// Values of `metric` for one subset: the per-experiment values when
    /// every experiment recorded it, otherwise a stored distribution of
    /// that name.
    pub fn distribution(&self, split: &str, subset: &str, metric: &str) -> Option<Vec<f64>> {
        let scores = self.subset(split, subset)?;
        let per_experiment = scores.per_experiment(metric);
        if !per_experiment.is_empty() && per_experiment.len() == scores.scores_per_experiment.len()
        {
            return Some(per_experiment);
        }
        scores.distributions.get(metric).cloned()
    }
}

/// A model revision to look up in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub name: String,
    pub revision: String,
}

impl ModelRef {
    pub fn new(name: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            revision: revision.into(),
        }
    }

    /// Parse `name` or `name@revision`; the revision defaults to `main`.
    pub fn parse(s: &str) -> Self {
        match s.rsplit_once('@') {
            Some((name, revision)) if !name.is_empty() && !revision.is_empty() => {
                Self::new(name, revision)
            }
            _ => Self::new(s, "main"),
        }
    }
}

/// Reads and writes [`TaskResult`] files under a root directory.
#[derive(Debug, Clone)]
pub struct ResultsStore {
    root: PathBuf,
}

impl ResultsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the result file for `(model, revision, task)`.
    pub fn path_for(&self, model: &str, revision: &str, task: &str) -> PathBuf {
        self.root
            .join(model.replace('/', "__"))
            .join(revision)
            .join(format!("{task}.json"))
    }

    /// Write `result` as pretty JSON, creating directories as needed.
    pub fn save(&self, result: &TaskResult) -> Result<PathBuf> {
        let path = self.path_for(&result.model_name, &result.revision, &result.task_name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| with_path(e, parent))?;
        }
        let json = serde_json::to_string_pretty(result)?;
        std::fs::write(&path, json.as_bytes()).map_err(|e| with_path(e, &path))?;
        tracing::debug!("Saved {} results to {:?}", result.task_name, path);
        Ok(path)
    }

    pub fn load(&self, model: &str, revision: &str, task: &str) -> Result<TaskResult> {
        let path = self.path_for(model, revision, task);
        let content = std::fs::read_to_string(&path).map_err(|e| with_path(e, &path))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Score distribution of `metric` for one stored result.
    pub fn distribution(
        &self,
        model: &ModelRef,
        task: &str,
        split: &str,
        subset: &str,
        metric: &str,
    ) -> Result<Vec<f64>> {
        let result = self.load(&model.name, &model.revision, task)?;
        result.distribution(split, subset, metric).ok_or_else(|| {
            EvaluationError::Configuration(format!(
                "{}@{} has no '{metric}' values for {task}/{split}/{subset}",
                model.name, model.revision
            ))
            .into()
        })
    }

    /// Ranking input for `models` on one task.
    pub fn model_scores(
        &self,
        models: &[ModelRef],
        task: &str,
        split: &str,
        subset: &str,
        metric: &str,
    ) -> Result<Vec<ModelScores>> {
        models
            .iter()
            .map(|m| {
                let scores = self.distribution(m, task, split, subset, metric)?;
                Ok(ModelScores::new(m.name.clone(), scores))
            })
            .collect()
    }

    /// Main scores, times and distributions of `models` on one task version.
    pub fn version_run(
        &self,
        models: &[ModelRef],
        task: &str,
        split: &str,
        subset: &str,
        metric: &str,
    ) -> Result<VersionRun> {
        let mut run = VersionRun {
            task: task.to_string(),
            ..Default::default()
        };
        for model in models {
            let result = self.load(&model.name, &model.revision, task)?;
            let scores = result.subset(split, subset).ok_or_else(|| {
                EvaluationError::MissingSplit {
                    subset: subset.to_string(),
                    split: split.to_string(),
                }
            })?;
            let distribution = result.distribution(split, subset, metric).ok_or_else(|| {
                EvaluationError::Configuration(format!(
                    "{}@{} has no '{metric}' values for {task}",
                    model.name, model.revision
                ))
            })?;
            run.main_scores.push(scores.main_score);
            run.evaluation_times.push(result.evaluation_time);
            run.distributions
                .push(ModelScores::new(model.name.clone(), distribution));
        }
        Ok(run)
    }
}

fn with_path(e: io::Error, path: &Path) -> io::Error {
    io::Error::new(e.kind(), format!("{}: {e}", path.display()))
}
