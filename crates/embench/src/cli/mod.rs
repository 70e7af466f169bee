//! Subcommand implementations.

pub mod compare;
pub mod config;
pub mod rank;
pub mod types;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use embench_core::config::SignificanceConfig;
use embench_core::{Config, OutputWriter, ResultsStore};

use types::OutputFormat;

/// Significance test overrides shared by `rank` and `compare`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SignificanceArgs {
    /// p-value below which adjacent models get distinct ranks
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Bootstrap resamples per pairwise test
    #[arg(long)]
    pub resamples: Option<usize>,

    /// Seed applied before every pairwise test
    #[arg(long)]
    pub seed: Option<u64>,
}

impl SignificanceArgs {
    /// Apply the overrides on top of `config` and re-validate.
    pub fn resolve(&self, config: &Config) -> anyhow::Result<SignificanceConfig> {
        let mut config = config.clone();
        if let Some(threshold) = self.threshold {
            config.significance.threshold = threshold;
        }
        if let Some(resamples) = self.resamples {
            config.significance.n_resamples = resamples;
        }
        if let Some(seed) = self.seed {
            config.significance.seed = seed;
        }
        config.validate()?;
        Ok(config.significance)
    }
}

/// Where and how a report is written.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to output.format from the config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

impl OutputArgs {
    pub fn writer(&self, config: &Config) -> anyhow::Result<OutputWriter<Box<dyn Write>>> {
        let format = types::resolve_format(self.format, config)?;
        let sink: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(io::stdout().lock()),
        };
        Ok(OutputWriter::new(sink, format, config.output.pretty))
    }
}

/// Results store at `dir`, or at the configured results directory.
pub fn store(dir: Option<&Path>, config: &Config) -> ResultsStore {
    match dir {
        Some(dir) => ResultsStore::new(dir),
        None => ResultsStore::new(config.results_dir()),
    }
}
