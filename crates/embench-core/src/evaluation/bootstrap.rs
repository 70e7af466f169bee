//! Bootstrap classification evaluation - wires together sampling, the
//! embedding cache, classifiers and metrics.

use std::time::Instant;

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::classifier::{self, Classifier, Targets};
use crate::config::{Config, EvaluationConfig};
use crate::data::{Dataset, LabelBinarizer, Split};
use crate::embedding::{encode_matrix, EmbeddingCache, EncodeOptions, Encoder};
use crate::error::{EvalResult, EvaluationError};
use crate::sampling::{stratified_subsample, undersample_indices};

use super::metrics;
use super::scores::{aggregate, ScoreDict, SubsetScores, TaskScores};
use super::task::{ClassificationMode, TaskMetadata};

/// Everything an experiment reads; shared read-only across experiments.
struct Prepared<'a> {
    cache: EmbeddingCache,
    binarizer: LabelBinarizer,
    train_labels: &'a [Vec<String>],
    x_test: Array2<f32>,
    y_test: Targets,
    mode: ClassificationMode,
}

/// Scores an encoder by training lightweight classifiers on repeated
/// label-balanced samples of its embeddings.
#[derive(Debug)]
pub struct BootstrapEvaluator {
    config: EvaluationConfig,
    classifier: Box<dyn Classifier>,
    cancel: CancellationToken,
}

impl BootstrapEvaluator {
    /// Create an evaluator around a classifier template.
    ///
    /// The template itself is never fitted; each experiment works on a
    /// [`Classifier::fresh`] copy.
    pub fn new(config: EvaluationConfig, classifier: Box<dyn Classifier>) -> Self {
        Self {
            config,
            classifier,
            cancel: CancellationToken::new(),
        }
    }

    /// Build from the `[evaluation]` and `[classifier]` config sections.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.evaluation.clone(),
            classifier::from_config(&config.classifier),
        )
    }

    /// Attach a cancellation token, checked before every experiment.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate every subset of `dataset` on the task's train/eval splits.
    pub fn evaluate<E: Encoder + ?Sized>(
        &self,
        encoder: &E,
        dataset: &Dataset<E::Input>,
        task: &TaskMetadata,
    ) -> EvalResult<TaskScores> {
        let mut scores = TaskScores::new();
        if dataset.is_multilingual() {
            tracing::info!(
                "Task {}: {} subsets to evaluate",
                task.name,
                dataset.subset_names().len()
            );
        }
        for subset in dataset.subset_names() {
            let train = dataset.split(subset, &task.train_split)?;
            let eval = dataset.split(subset, &task.eval_split)?;
            tracing::info!(
                "Task {}: evaluating subset '{}' ({} train / {} eval records)",
                task.name,
                subset,
                train.len(),
                eval.len()
            );
            let subset_scores = self.evaluate_subset(encoder, train, eval, subset, task)?;
            scores.insert(subset.to_string(), subset_scores);
        }
        Ok(scores)
    }

    /// Run the bootstrap experiments for one subset.
    ///
    /// The encoder is called twice: once for the union of all training
    /// samples, once for the (possibly subsampled) eval split.
    pub fn evaluate_subset<E: Encoder + ?Sized>(
        &self,
        encoder: &E,
        train: &Split<E::Input>,
        eval: &Split<E::Input>,
        hf_subset: &str,
        task: &TaskMetadata,
    ) -> EvalResult<SubsetScores> {
        let start = Instant::now();
        let n_experiments = self.config.n_experiments;
        if n_experiments == 0 {
            return Err(EvaluationError::Configuration(
                "at least one experiment must run".into(),
            ));
        }
        if self.config.samples_per_label == 0 {
            return Err(EvaluationError::Configuration(
                "samples_per_label must be greater than 0".into(),
            ));
        }
        if self.config.batch_size == 0 {
            return Err(EvaluationError::Configuration(
                "batch_size must be greater than 0".into(),
            ));
        }
        if !task.mode.metric_names().contains(&task.main_score.as_str()) {
            return Err(EvaluationError::Configuration(format!(
                "main score '{}' is not among the {:?} metrics {:?}",
                task.main_score,
                task.mode,
                task.mode.metric_names()
            )));
        }
        if eval.is_empty() {
            return Err(EvaluationError::Configuration(format!(
                "eval split '{}' of subset '{hf_subset}' is empty",
                task.eval_split
            )));
        }
        self.cancel.check("sampling")?;

        tracing::debug!(
            "Classifier {} with params {}",
            self.classifier.name(),
            self.classifier.params()
        );

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let samples: Vec<Vec<usize>> = (0..n_experiments)
            .map(|_| undersample_indices(train.labels(), self.config.samples_per_label, &mut rng))
            .collect();

        let options = EncodeOptions {
            batch_size: self.config.batch_size,
        };
        let cache = EmbeddingCache::build(encoder, train, &samples, &options)?;

        let binarizer = match task.mode {
            ClassificationMode::MultiLabel => {
                LabelBinarizer::fit(eval.labels().iter().map(Vec::as_slice))
            }
            ClassificationMode::SingleLabel => LabelBinarizer::fit(
                train
                    .labels()
                    .iter()
                    .chain(eval.labels())
                    .map(Vec::as_slice),
            ),
        };

        tracing::debug!("Label space: {} classes", binarizer.n_classes());

        let test_indices = self.test_indices(eval, &mut rng);
        self.cancel.check("encoding")?;
        let x_test = encode_matrix(encoder, &eval.inputs_at(&test_indices), &options)?;
        if !cache.is_empty() && x_test.ncols() != cache.dim() {
            return Err(EvaluationError::DimensionMismatch {
                expected: cache.dim(),
                actual: x_test.ncols(),
            });
        }
        let test_labels = eval.labels_at(&test_indices);
        let y_test = match task.mode {
            ClassificationMode::MultiLabel => binarizer.multilabel(&test_labels),
            ClassificationMode::SingleLabel => binarizer.single_label(&test_labels)?,
        };

        let prepared = Prepared {
            cache,
            binarizer,
            train_labels: train.labels(),
            x_test,
            y_test,
            mode: task.mode,
        };

        let per_experiment: Vec<ScoreDict> = if self.config.parallel_experiments {
            samples
                .par_iter()
                .enumerate()
                .map(|(i, sample)| self.run_experiment(i, sample, &prepared))
                .collect::<EvalResult<_>>()?
        } else {
            samples
                .iter()
                .enumerate()
                .map(|(i, sample)| self.run_experiment(i, sample, &prepared))
                .collect::<EvalResult<_>>()?
        };

        let metrics = aggregate(&per_experiment)?;
        let main_score = metrics.get(&task.main_score).copied().ok_or_else(|| {
            EvaluationError::Configuration(format!(
                "main score '{}' is not among the computed metrics {:?}",
                task.main_score,
                metrics.keys().collect::<Vec<_>>()
            ))
        })?;

        tracing::info!(
            "Subset '{}': {} = {:.4} over {} experiments in {:?}",
            hf_subset,
            task.main_score,
            main_score,
            n_experiments,
            start.elapsed()
        );

        Ok(SubsetScores {
            hf_subset: hf_subset.to_string(),
            main_score,
            metrics,
            scores_per_experiment: per_experiment,
            distributions: Default::default(),
        })
    }

    /// Eval positions to score: all of them, or a stratified subsample when the
    /// split exceeds `max_test_samples`.
    fn test_indices<I>(&self, eval: &Split<I>, rng: &mut StdRng) -> Vec<usize> {
        let all: Vec<usize> = (0..eval.len()).collect();
        let cap = self.config.max_test_samples;
        if eval.len() <= cap {
            return all;
        }

        let keys: Vec<Vec<&str>> = eval
            .labels()
            .iter()
            .map(|labels| {
                let mut key: Vec<&str> = labels.iter().map(String::as_str).collect();
                key.sort_unstable();
                key.dedup();
                key
            })
            .collect();
        match stratified_subsample(&keys, cap, rng) {
            Ok(indices) => {
                tracing::debug!("Stratified eval split from {} to {} records", eval.len(), cap);
                indices
            }
            Err(e) => {
                tracing::warn!("Couldn't subsample ({e}), continuing with the entire test set.");
                all
            }
        }
    }

    fn run_experiment(
        &self,
        i: usize,
        sample: &[usize],
        prepared: &Prepared<'_>,
    ) -> EvalResult<ScoreDict> {
        self.cancel.check("bootstrap experiment")?;
        tracing::debug!(
            "Experiment {}/{} ({} training rows)",
            i + 1,
            self.config.n_experiments,
            sample.len()
        );

        let x_train = prepared.cache.matrix(sample)?;
        let rows: Vec<&[String]> = sample
            .iter()
            .map(|&idx| prepared.train_labels[idx].as_slice())
            .collect();
        let y_train = match prepared.mode {
            ClassificationMode::MultiLabel => prepared.binarizer.multilabel(&rows),
            ClassificationMode::SingleLabel => prepared.binarizer.single_label(&rows)?,
        };

        let mut classifier = self.classifier.fresh();
        classifier.fit(x_train.view(), &y_train)?;
        let y_pred = classifier.predict(prepared.x_test.view())?;

        let mut scores = ScoreDict::new();
        scores.insert(
            "accuracy".to_string(),
            metrics::accuracy(&prepared.y_test, &y_pred)?,
        );
        scores.insert(
            "f1".to_string(),
            metrics::f1_macro(&prepared.y_test, &y_pred)?,
        );
        if let (Targets::MultiLabel(truth), Targets::MultiLabel(pred)) = (&prepared.y_test, &y_pred)
        {
            let ranked = pred.mapv(f64::from);
            scores.insert(
                "lrap".to_string(),
                metrics::label_ranking_average_precision(truth, ranked.view())?,
            );
        }
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::KnnClassifier;
    use crate::data::DEFAULT_SUBSET;
    use crate::embedding::testing::RecordingEncoder;
    use std::collections::HashSet;

    /// Two well-separated clusters labelled `neg` / `pos`.
    fn single_label_split(n: usize) -> Split<Vec<f32>> {
        let mut inputs = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let (sign, label) = if i % 2 == 0 { (-1.0, "neg") } else { (1.0, "pos") };
            inputs.push(vec![sign * (1.0 + i as f32 * 0.01), 0.5]);
            labels.push(label.to_string());
        }
        Split::single_label(inputs, labels).unwrap()
    }

    /// Rows cycle through {a}, {b}, {a, b}; features are the label indicators.
    fn multilabel_split(n: usize) -> Split<Vec<f32>> {
        let mut inputs = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n {
            let jitter = i as f32 * 0.001;
            let (x, set): (Vec<f32>, Vec<&str>) = match i % 3 {
                0 => (vec![1.0 + jitter, 0.0], vec!["a"]),
                1 => (vec![0.0, 1.0 + jitter], vec!["b"]),
                _ => (vec![1.0 + jitter, 1.0], vec!["a", "b"]),
            };
            inputs.push(x);
            labels.push(set.into_iter().map(String::from).collect());
        }
        Split::new(inputs, labels).unwrap()
    }

    fn dataset(train: Split<Vec<f32>>, test: Split<Vec<f32>>) -> Dataset<Vec<f32>> {
        Dataset::new()
            .with_split(DEFAULT_SUBSET, "train", train)
            .with_split(DEFAULT_SUBSET, "test", test)
    }

    fn evaluator(config: EvaluationConfig) -> BootstrapEvaluator {
        BootstrapEvaluator::new(config, Box::new(KnnClassifier::new(5)))
    }

    fn small_config() -> EvaluationConfig {
        EvaluationConfig {
            n_experiments: 3,
            ..Default::default()
        }
    }

    fn keys(scores: &ScoreDict) -> Vec<&str> {
        scores.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_single_label_metric_keys() {
        let encoder = RecordingEncoder::default();
        let ds = dataset(single_label_split(40), single_label_split(10));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let scores = evaluator(small_config()).evaluate(&encoder, &ds, &task).unwrap();

        let subset = &scores[DEFAULT_SUBSET];
        assert_eq!(subset.hf_subset, DEFAULT_SUBSET);
        assert_eq!(keys(&subset.metrics), vec!["accuracy", "f1"]);
        assert_eq!(subset.scores_per_experiment.len(), 3);
        for experiment in &subset.scores_per_experiment {
            assert_eq!(keys(experiment), vec!["accuracy", "f1"]);
        }
        assert!((subset.metrics["accuracy"] - 1.0).abs() < 1e-12);
        assert_eq!(subset.main_score, subset.metrics["accuracy"]);
    }

    #[test]
    fn test_multilabel_metric_keys() {
        let encoder = RecordingEncoder::default();
        let ds = dataset(multilabel_split(30), multilabel_split(12));
        let task = TaskMetadata::new("toy", ClassificationMode::MultiLabel);
        let scores = evaluator(small_config()).evaluate(&encoder, &ds, &task).unwrap();

        let subset = &scores[DEFAULT_SUBSET];
        assert_eq!(keys(&subset.metrics), vec!["accuracy", "f1", "lrap"]);
        for experiment in &subset.scores_per_experiment {
            assert_eq!(keys(experiment), vec!["accuracy", "f1", "lrap"]);
            for value in experiment.values() {
                assert!((0.0..=1.0).contains(value));
            }
        }
    }

    #[test]
    fn test_training_union_encoded_once() {
        let encoder = RecordingEncoder::default();
        let train = single_label_split(40);
        let config = small_config();

        let mut rng = StdRng::seed_from_u64(42);
        let expected: HashSet<usize> = (0..config.n_experiments)
            .flat_map(|_| undersample_indices(train.labels(), config.samples_per_label, &mut rng))
            .collect();

        let ds = dataset(train, single_label_split(10));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        evaluator(config).evaluate(&encoder, &ds, &task).unwrap();

        let calls = encoder.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].len(), expected.len());
        assert_eq!(calls[1].len(), 10);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let ds = dataset(multilabel_split(30), multilabel_split(12));
        let task = TaskMetadata::new("toy", ClassificationMode::MultiLabel);
        let eval = evaluator(small_config());

        let first = eval.evaluate(&RecordingEncoder::default(), &ds, &task).unwrap();
        let second = eval.evaluate(&RecordingEncoder::default(), &ds, &task).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let ds = dataset(multilabel_split(30), multilabel_split(12));
        let task = TaskMetadata::new("toy", ClassificationMode::MultiLabel);
        let parallel = evaluator(small_config())
            .evaluate(&RecordingEncoder::default(), &ds, &task)
            .unwrap();
        let sequential = evaluator(EvaluationConfig {
            parallel_experiments: false,
            ..small_config()
        })
        .evaluate(&RecordingEncoder::default(), &ds, &task)
        .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_eval_split_at_cap_is_not_subsampled() {
        let encoder = RecordingEncoder::default();
        let ds = dataset(single_label_split(40), single_label_split(2000));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let config = EvaluationConfig {
            n_experiments: 1,
            ..Default::default()
        };
        evaluator(config).evaluate(&encoder, &ds, &task).unwrap();
        assert_eq!(encoder.calls.borrow()[1].len(), 2000);
    }

    #[test]
    fn test_eval_split_over_cap_is_stratified() {
        let encoder = RecordingEncoder::default();
        let ds = dataset(single_label_split(40), single_label_split(2010));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let config = EvaluationConfig {
            n_experiments: 1,
            ..Default::default()
        };
        let scores = evaluator(config).evaluate(&encoder, &ds, &task).unwrap();

        let calls = encoder.calls.borrow();
        assert_eq!(calls[1].len(), 2000);
        // both classes keep their 50% share
        let negatives = calls[1].iter().filter(|v| v[0] < 0.0).count();
        assert_eq!(negatives, 1000);
        assert!((scores[DEFAULT_SUBSET].main_score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_one_record_over_cap_falls_back_to_full_split() {
        let encoder = RecordingEncoder::default();
        // two strata but only one held-out record
        let ds = dataset(single_label_split(40), single_label_split(2001));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let config = EvaluationConfig {
            n_experiments: 1,
            ..Default::default()
        };
        evaluator(config).evaluate(&encoder, &ds, &task).unwrap();
        assert_eq!(encoder.calls.borrow()[1].len(), 2001);
    }

    #[test]
    fn test_infeasible_stratification_uses_full_eval_split() {
        let encoder = RecordingEncoder::default();
        // every eval row is its own stratum
        let inputs: Vec<Vec<f32>> = (0..12).map(|i| vec![i as f32, 0.0]).collect();
        let labels: Vec<Vec<String>> = (0..12).map(|i| vec![format!("t{i}")]).collect();
        let eval = Split::new(inputs, labels).unwrap();
        let ds = dataset(multilabel_split(30), eval);
        let task = TaskMetadata::new("toy", ClassificationMode::MultiLabel);
        let config = EvaluationConfig {
            max_test_samples: 6,
            ..small_config()
        };
        evaluator(config).evaluate(&encoder, &ds, &task).unwrap();
        assert_eq!(encoder.calls.borrow()[1].len(), 12);
    }

    #[test]
    fn test_zero_experiments_is_rejected() {
        let ds = dataset(single_label_split(20), single_label_split(10));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let config = EvaluationConfig {
            n_experiments: 0,
            ..Default::default()
        };
        let err = evaluator(config)
            .evaluate(&RecordingEncoder::default(), &ds, &task)
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Configuration(_)));
    }

    #[test]
    fn test_zero_samples_per_label_is_rejected() {
        let encoder = RecordingEncoder::default();
        let ds = dataset(single_label_split(20), single_label_split(10));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let config = EvaluationConfig {
            samples_per_label: 0,
            n_experiments: 2,
            ..Default::default()
        };
        let err = evaluator(config).evaluate(&encoder, &ds, &task).unwrap_err();
        assert!(matches!(err, EvaluationError::Configuration(ref m) if m.contains("samples_per_label")));
        assert_eq!(encoder.call_count(), 0);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let ds = dataset(single_label_split(20), single_label_split(10));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let config = EvaluationConfig {
            batch_size: 0,
            ..small_config()
        };
        let err = evaluator(config)
            .evaluate(&RecordingEncoder::default(), &ds, &task)
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Configuration(_)));
    }

    #[test]
    fn test_cancelled_token_stops_evaluation() {
        let encoder = RecordingEncoder::default();
        let ds = dataset(single_label_split(20), single_label_split(10));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let token = CancellationToken::new();
        token.cancel();
        let err = evaluator(small_config())
            .with_cancellation(token)
            .evaluate(&encoder, &ds, &task)
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Cancelled { .. }));
        assert_eq!(encoder.call_count(), 0);
    }

    #[test]
    fn test_missing_eval_split() {
        let ds = Dataset::new().with_split(DEFAULT_SUBSET, "train", single_label_split(20));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let err = evaluator(small_config())
            .evaluate(&RecordingEncoder::default(), &ds, &task)
            .unwrap_err();
        assert!(matches!(err, EvaluationError::MissingSplit { .. }));
    }

    #[test]
    fn test_every_subset_is_scored() {
        let ds = Dataset::new()
            .with_split("deu", "train", single_label_split(20))
            .with_split("deu", "test", single_label_split(10))
            .with_split("fra", "train", single_label_split(20))
            .with_split("fra", "test", single_label_split(10));
        let task = TaskMetadata::new("toy", ClassificationMode::SingleLabel);
        let scores = evaluator(small_config())
            .evaluate(&RecordingEncoder::default(), &ds, &task)
            .unwrap();
        assert_eq!(scores.keys().collect::<Vec<_>>(), vec!["deu", "fra"]);
        assert_eq!(scores["fra"].hf_subset, "fra");
    }

    #[test]
    fn test_unknown_main_score_is_rejected() {
        let encoder = RecordingEncoder::default();
        let ds = dataset(single_label_split(20), single_label_split(10));
        let task =
            TaskMetadata::new("toy", ClassificationMode::SingleLabel).with_main_score("lrap");
        let err = evaluator(small_config())
            .evaluate(&encoder, &ds, &task)
            .unwrap_err();
        assert!(err.to_string().contains("lrap"));
        // rejected before anything is encoded
        assert_eq!(encoder.call_count(), 0);
    }
}
