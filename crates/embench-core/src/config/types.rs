//! Sub-configuration structs with their documented defaults.

use serde::{Deserialize, Serialize};

/// Bootstrap evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Number of independent bootstrap experiments per subset
    pub n_experiments: usize,

    /// Soft cap on sampled training rows per label
    pub samples_per_label: usize,

    /// Batch size handed to the encoder
    pub batch_size: usize,

    /// Eval splits larger than this are stratified down to it
    pub max_test_samples: usize,

    /// Seed for the sampling RNG. `None` draws from OS entropy.
    pub seed: Option<u64>,

    /// Fit experiments in parallel (results keep experiment order)
    pub parallel_experiments: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            n_experiments: 10,
            samples_per_label: 8,
            batch_size: 32,
            max_test_samples: 2000,
            seed: Some(42),
            parallel_experiments: true,
        }
    }
}

/// Which classifier family backs the evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// k-nearest neighbours with majority vote
    Knn,
    /// One-vs-rest L2-regularised logistic regression
    Logistic,
}

/// Classifier template settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Classifier family
    pub kind: ClassifierKind,

    /// Neighbour count for `knn`
    pub n_neighbors: usize,

    /// Gradient descent iterations for `logistic`
    pub max_iter: usize,

    /// Inverse regularisation strength for `logistic`
    pub c: f64,

    /// Gradient descent step size for `logistic`
    pub learning_rate: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Knn,
            n_neighbors: 5,
            max_iter: 100,
            c: 1.0,
            learning_rate: 0.5,
        }
    }
}

/// Bootstrap significance test settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignificanceConfig {
    /// Resamples drawn per pairwise test
    pub n_resamples: usize,

    /// p-value below which adjacent models are considered distinct
    pub threshold: f64,

    /// Seed applied at the start of every pairwise test
    pub seed: u64,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            n_resamples: 10_000,
            threshold: 0.05,
            seed: 42,
        }
    }
}

/// Results store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultsConfig {
    /// Root directory of stored task results
    pub dir: String,
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            dir: "~/.embench/results".to_string(),
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format ("json", "jsonl" or "markdown")
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "json".to_string(),
            pretty: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// Log format ("pretty" or "json")
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
