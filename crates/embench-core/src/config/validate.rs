//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::output::OutputFormat;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.evaluation.n_experiments == 0 {
            return Err(ConfigError::ValidationError(
                "evaluation.n_experiments must be > 0".into(),
            ));
        }
        if self.evaluation.samples_per_label == 0 {
            return Err(ConfigError::ValidationError(
                "evaluation.samples_per_label must be > 0".into(),
            ));
        }
        if self.evaluation.batch_size == 0 {
            return Err(ConfigError::ValidationError(
                "evaluation.batch_size must be > 0".into(),
            ));
        }
        if self.evaluation.max_test_samples == 0 {
            return Err(ConfigError::ValidationError(
                "evaluation.max_test_samples must be > 0".into(),
            ));
        }
        if self.classifier.n_neighbors == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.n_neighbors must be > 0".into(),
            ));
        }
        if self.classifier.max_iter == 0 {
            return Err(ConfigError::ValidationError(
                "classifier.max_iter must be > 0".into(),
            ));
        }
        if !(self.classifier.c > 0.0) {
            return Err(ConfigError::ValidationError(
                "classifier.c must be > 0".into(),
            ));
        }
        if !(self.classifier.learning_rate > 0.0) {
            return Err(ConfigError::ValidationError(
                "classifier.learning_rate must be > 0".into(),
            ));
        }
        if self.significance.n_resamples == 0 {
            return Err(ConfigError::ValidationError(
                "significance.n_resamples must be > 0".into(),
            ));
        }
        if !(self.significance.threshold > 0.0 && self.significance.threshold < 1.0) {
            return Err(ConfigError::ValidationError(
                "significance.threshold must be between 0.0 and 1.0 (exclusive)".into(),
            ));
        }
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be json, jsonl or markdown, got '{}'",
                self.output.format
            )));
        }
        Ok(())
    }
}
