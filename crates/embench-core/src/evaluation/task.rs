//! The slice of task metadata the evaluators need.

use serde::{Deserialize, Serialize};

/// How label sets are turned into classifier targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMode {
    /// Exactly one label per record; metrics `accuracy`, `f1`
    SingleLabel,
    /// Any number of labels per record; metrics `accuracy`, `f1`, `lrap`
    MultiLabel,
}

impl ClassificationMode {
    /// Metric keys every evaluation in this mode reports.
    pub fn metric_names(self) -> &'static [&'static str] {
        match self {
            Self::SingleLabel => &["accuracy", "f1"],
            Self::MultiLabel => &["accuracy", "f1", "lrap"],
        }
    }
}

/// Identity and scoring rules of a classification task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Task name, also the results file stem
    pub name: String,

    /// Metric copied into `main_score`
    pub main_score: String,

    /// Target encoding
    pub mode: ClassificationMode,

    /// Split the classifiers are trained on
    pub train_split: String,

    /// Split to score
    pub eval_split: String,
}

impl TaskMetadata {
    /// A task with the usual `train`/`test` splits and accuracy as main score.
    pub fn new(name: impl Into<String>, mode: ClassificationMode) -> Self {
        Self {
            name: name.into(),
            main_score: "accuracy".to_string(),
            mode,
            train_split: "train".to_string(),
            eval_split: "test".to_string(),
        }
    }

    pub fn with_main_score(mut self, metric: impl Into<String>) -> Self {
        self.main_score = metric.into();
        self
    }
}
