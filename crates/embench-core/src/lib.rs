//! Embench Core - bootstrap evaluation and significance ranking for embedding
//! models.
//!
//! Embench scores an encoder by training lightweight classifiers on repeated
//! label-balanced samples of its embeddings, and compares model leaderboards
//! with a bootstrap significance test:
//!
//! ```text
//! Dataset + Encoder → Undersample → Embed (cached) → Fit/Predict × N → Scores
//! Stored scores (many models) → Bootstrap test → Significant ranks
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use embench_core::{ClassificationMode, Config, Embench, TaskMetadata};
//!
//! fn main() -> embench_core::Result<()> {
//!     let embench = Embench::new(Config::load()?);
//!     let task = TaskMetadata::new("Banking77", ClassificationMode::SingleLabel);
//!
//!     let result = embench.evaluate_and_save(&my_encoder, &dataset, &task, "org/model", "main")?;
//!     println!("{:?}", result.scores);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod cancel;
pub mod classifier;
pub mod config;
pub mod data;
pub mod embedding;
pub mod error;
pub mod evaluation;
pub mod math;
pub mod output;
pub mod ranking;
pub mod results;
pub mod sampling;

// Re-exports for convenient access
pub use cancel::CancellationToken;
pub use classifier::{Classifier, KnnClassifier, LogisticRegression, Targets};
pub use config::Config;
pub use data::{Dataset, LabelBinarizer, Split, DEFAULT_SUBSET};
pub use embedding::{EmbeddingCache, EncodeOptions, Encoder};
pub use error::{ConfigError, EmbenchError, EvalResult, EvaluationError, Result};
pub use evaluation::{
    BootstrapEvaluator, ClassificationMode, ScoreDict, SubsetScores, TaskMetadata, TaskScores,
};
pub use output::{OutputFormat, OutputWriter, ToMarkdown};
pub use ranking::{
    compare_versions, compute_significant_rank, ModelScores, RankTable, SignificanceRanker,
    VersionComparison,
};
pub use results::{ModelRef, ResultsStore, TaskResult};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Embench entry point - builds evaluators, rankers and the results store
/// from one configuration.
pub struct Embench {
    config: Config,
    cancel: CancellationToken,
}

impl Embench {
    /// Create a new Embench instance with the given configuration.
    pub fn new(config: Config) -> Self {
        tracing::debug!("Initializing Embench v{}", VERSION);
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Create a new Embench instance from the default config file.
    pub fn with_defaults() -> Result<Self> {
        let config = Config::load()?;
        Ok(Self::new(config))
    }

    /// Share a cancellation token with every evaluator and ranker built here.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn evaluator(&self) -> BootstrapEvaluator {
        BootstrapEvaluator::from_config(&self.config).with_cancellation(self.cancel.clone())
    }

    pub fn ranker(&self) -> SignificanceRanker {
        SignificanceRanker::new(self.config.significance.clone())
            .with_cancellation(self.cancel.clone())
    }

    /// Store rooted at the configured (tilde-expanded) results directory.
    pub fn store(&self) -> ResultsStore {
        ResultsStore::new(self.config.results_dir())
    }

    /// Evaluate `encoder` on `task` and persist the result.
    pub fn evaluate_and_save<E: Encoder + ?Sized>(
        &self,
        encoder: &E,
        dataset: &Dataset<E::Input>,
        task: &TaskMetadata,
        model_name: &str,
        revision: &str,
    ) -> Result<TaskResult> {
        let start = std::time::Instant::now();
        let scores = self.evaluator().evaluate(encoder, dataset, task)?;
        let result = TaskResult::new(
            &task.name,
            model_name,
            revision,
            start.elapsed().as_secs_f64(),
            &task.eval_split,
            scores,
        );
        let path = self.store().save(&result)?;
        tracing::info!("Saved {} results for {} to {:?}", task.name, model_name, path);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::testing::RecordingEncoder;
    use tempfile::tempdir;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_embench_new() {
        let embench = Embench::new(Config::default());
        assert_eq!(embench.config().evaluation.n_experiments, 10);
        assert_eq!(embench.evaluator().config().samples_per_label, 8);
        assert_eq!(embench.ranker().config().n_resamples, 10_000);
    }

    #[test]
    fn test_evaluate_and_save_then_rank() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.results.dir = dir.path().to_string_lossy().into_owned();
        config.evaluation.n_experiments = 4;
        config.significance.n_resamples = 500;
        let embench = Embench::new(config);

        let split = |n: usize, scale: f32| {
            let inputs = (0..n)
                .map(|i| vec![if i % 2 == 0 { -scale } else { scale }, i as f32 * 0.01])
                .collect();
            let labels = (0..n)
                .map(|i| if i % 2 == 0 { "neg" } else { "pos" }.to_string())
                .collect();
            Split::single_label(inputs, labels).unwrap()
        };
        let task = TaskMetadata::new("Toy", ClassificationMode::SingleLabel);
        for (model, scale) in [("org/sharp", 5.0), ("org/blurry", 0.001)] {
            let dataset = Dataset::new()
                .with_split(DEFAULT_SUBSET, "train", split(30, scale))
                .with_split(DEFAULT_SUBSET, "test", split(10, scale));
            let result = embench
                .evaluate_and_save(&RecordingEncoder::default(), &dataset, &task, model, "main")
                .unwrap();
            assert_eq!(result.scores["test"].len(), 1);
        }

        let models = [ModelRef::parse("org/sharp"), ModelRef::parse("org/blurry")];
        let scores = embench
            .store()
            .model_scores(&models, "Toy", "test", DEFAULT_SUBSET, "accuracy")
            .unwrap();
        assert_eq!(scores[0].scores.len(), 4);
        let table = embench.ranker().rank(&scores).unwrap();
        assert_eq!(table.models[0], "org/sharp");
        assert_eq!(table.rank, vec![1, 2]);
    }
}
