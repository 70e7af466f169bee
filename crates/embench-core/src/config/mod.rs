//! Configuration management for embench.
//!
//! Configuration is loaded from the platform config directory with defaults
//! for every field, and validated before use.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for embench.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bootstrap evaluation settings
    pub evaluation: EvaluationConfig,

    /// Classifier template settings
    pub classifier: ClassifierConfig,

    /// Significance ranking settings
    pub significance: SignificanceConfig,

    /// Results store settings
    pub results: ResultsConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.embench.embench/config.toml
    /// - Linux: ~/.config/embench/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\embench\config\config.toml
    ///
    /// Falls back to ~/.embench/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "embench", "embench")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".embench").join("config.toml")
            })
    }

    /// Get the resolved results directory (with ~ expansion).
    pub fn results_dir(&self) -> PathBuf {
        let expanded = shellexpand::tilde(&self.results.dir);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.evaluation.n_experiments, 10);
        assert_eq!(config.evaluation.samples_per_label, 8);
        assert_eq!(config.evaluation.max_test_samples, 2000);
        assert_eq!(config.significance.n_resamples, 10_000);
        assert_eq!(config.classifier.kind, ClassifierKind::Knn);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[evaluation]"));
        assert!(toml.contains("[significance]"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            "[evaluation]\nn_experiments = 3\n\n[classifier]\nkind = \"logistic\"\n",
        )
        .unwrap();
        assert_eq!(config.evaluation.n_experiments, 3);
        assert_eq!(config.evaluation.samples_per_label, 8);
        assert_eq!(config.classifier.kind, ClassifierKind::Logistic);
        assert!((config.significance.threshold - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_toml_is_rejected_on_load() {
        let err = Config::from_toml("[evaluation]\nsamples_per_label = 0\n").unwrap_err();
        assert!(err.to_string().contains("samples_per_label"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[significance]\nthreshold = 0.01\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!((config.significance.threshold - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_results_dir_expands_tilde() {
        let config = Config::default();
        assert!(!config.results_dir().to_string_lossy().starts_with('~'));
    }
}
