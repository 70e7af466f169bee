//! The `embench rank` command: significant ranks for a set of models.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use embench_core::{Config, ModelRef, ModelScores, RankTable, SignificanceRanker};
use serde::Deserialize;

use super::{store, OutputArgs, SignificanceArgs};

/// Arguments for the `rank` command.
#[derive(Args, Debug)]
pub struct RankArgs {
    /// JSON file of score distributions instead of stored results
    #[arg(short, long, conflicts_with_all = ["task", "models"])]
    pub input: Option<PathBuf>,

    /// Task whose stored results are ranked
    #[arg(short, long, required_unless_present = "input")]
    pub task: Option<String>,

    /// Model to rank, as `name` or `name@revision` (repeatable)
    #[arg(short, long = "model", required_unless_present = "input")]
    pub models: Vec<String>,

    /// Evaluated split
    #[arg(long, default_value = "test")]
    pub split: String,

    /// Dataset subset
    #[arg(long, default_value = "default")]
    pub subset: String,

    /// Metric whose per-experiment values (or stored distribution) are ranked
    #[arg(long, default_value = "accuracy")]
    pub metric: String,

    /// Results directory (defaults to results.dir from the config)
    #[arg(long, env = "EMBENCH_RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,

    #[command(flatten)]
    pub significance: SignificanceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Accepted layouts of a `--input` file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RankInput {
    /// `[{"model": "...", "scores": [...]}, ...]`, order kept
    List(Vec<ModelScores>),
    /// `{"model": [...], ...}`, sorted by model name
    Map(BTreeMap<String, Vec<f64>>),
}

/// Read distributions from a JSON file.
fn read_input(path: &Path) -> anyhow::Result<Vec<ModelScores>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let input: RankInput = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a list or map of score distributions", path.display()))?;
    Ok(match input {
        RankInput::List(models) => models,
        RankInput::Map(map) => map
            .into_iter()
            .map(|(model, scores)| ModelScores::new(model, scores))
            .collect(),
    })
}

/// Rank the models described by `args`.
pub fn rank(args: &RankArgs, config: &Config) -> anyhow::Result<RankTable> {
    let ranker = SignificanceRanker::new(args.significance.resolve(config)?);

    let models = match (&args.input, &args.task) {
        (Some(path), _) => read_input(path)?,
        (None, Some(task)) => {
            let refs: Vec<ModelRef> = args.models.iter().map(|m| ModelRef::parse(m)).collect();
            store(args.results_dir.as_deref(), config).model_scores(
                &refs,
                task,
                &args.split,
                &args.subset,
                &args.metric,
            )?
        }
        (None, None) => anyhow::bail!("Either --input or --task is required"),
    };

    tracing::info!(
        "Ranking {} models ({} resamples, threshold {})",
        models.len(),
        ranker.config().n_resamples,
        ranker.config().threshold
    );
    Ok(ranker.rank(&models)?)
}

/// Execute the rank command.
pub fn execute(args: RankArgs, config: &Config) -> anyhow::Result<()> {
    let table = rank(&args, config)?;
    let mut writer = args.output.writer(config)?;
    writer.write_report(&table)?;
    writer.flush()?;
    Ok(())
}
