//! The `embench compare` command: how well fast task versions reproduce the
//! original leaderboard.

use std::path::PathBuf;

use clap::Args;
use embench_core::{compare_versions, Config, ModelRef, SignificanceRanker, VersionComparison};

use super::{store, OutputArgs, SignificanceArgs};

/// Arguments for the `compare` command.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Original task name (repeatable); its fast version is `<task><suffix>`
    #[arg(short, long = "task", required = true)]
    pub tasks: Vec<String>,

    /// Suffix naming the fast version of each task
    #[arg(long, default_value = ".v2")]
    pub suffix: String,

    /// Model, as `name` or `name@revision` (repeatable, same order for both versions)
    #[arg(short, long = "model", required = true)]
    pub models: Vec<String>,

    /// Evaluated split
    #[arg(long, default_value = "test")]
    pub split: String,

    /// Dataset subset
    #[arg(long, default_value = "default")]
    pub subset: String,

    /// Metric whose distribution feeds the significant ranks
    #[arg(long, default_value = "accuracy")]
    pub metric: String,

    /// Metric for the fast version (defaults to --metric)
    #[arg(long)]
    pub fast_metric: Option<String>,

    /// Results directory (defaults to results.dir from the config)
    #[arg(long, env = "EMBENCH_RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,

    #[command(flatten)]
    pub significance: SignificanceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Compare every requested task with its fast version.
pub fn compare(args: &CompareArgs, config: &Config) -> anyhow::Result<Vec<VersionComparison>> {
    let ranker = SignificanceRanker::new(args.significance.resolve(config)?);
    let store = store(args.results_dir.as_deref(), config);
    let models: Vec<ModelRef> = args.models.iter().map(|m| ModelRef::parse(m)).collect();
    let fast_metric = args.fast_metric.as_deref().unwrap_or(&args.metric);

    let mut comparisons = Vec::with_capacity(args.tasks.len());
    for task in &args.tasks {
        let fast_task = format!("{task}{}", args.suffix);
        let base = store.version_run(&models, task, &args.split, &args.subset, &args.metric)?;
        let fast =
            store.version_run(&models, &fast_task, &args.split, &args.subset, fast_metric)?;
        let comparison = compare_versions(&base, &fast, &ranker)?;
        tracing::info!(
            "{} vs {}: spearman {:?}, speedup {:?}",
            task,
            fast_task,
            comparison.spearman,
            comparison.speedup
        );
        comparisons.push(comparison);
    }
    Ok(comparisons)
}

/// Execute the compare command.
pub fn execute(args: CompareArgs, config: &Config) -> anyhow::Result<()> {
    let comparisons = compare(&args, config)?;
    let mut writer = args.output.writer(config)?;
    writer.write_report(comparisons.as_slice())?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use embench_core::{ResultsStore, ScoreDict, SubsetScores, TaskResult, TaskScores};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn save(store: &ResultsStore, model: &str, task: &str, main: f64, time: f64) {
        let subset = SubsetScores {
            hf_subset: "default".into(),
            main_score: main,
            metrics: ScoreDict::new(),
            scores_per_experiment: Vec::new(),
            distributions: BTreeMap::from([(
                "v_measures".to_string(),
                vec![main - 0.01, main, main + 0.01],
            )]),
        };
        let scores = TaskScores::from([("default".to_string(), subset)]);
        store
            .save(&TaskResult::new(task, model, "main", time, "test", scores))
            .unwrap();
    }

    #[test]
    fn test_compare_reads_both_versions() {
        let dir = tempdir().unwrap();
        let store = ResultsStore::new(dir.path());
        for (model, main) in [("a", 0.3), ("b", 0.5), ("c", 0.4)] {
            save(&store, model, "Reddit", main, 60.0);
            save(&store, model, "Reddit.v2", main + 0.01, 6.0);
        }

        let args = CompareArgs {
            tasks: vec!["Reddit".into()],
            suffix: ".v2".into(),
            models: vec!["a".into(), "b".into(), "c".into()],
            split: "test".into(),
            subset: "default".into(),
            metric: "v_measures".into(),
            fast_metric: None,
            results_dir: Some(dir.path().to_path_buf()),
            significance: SignificanceArgs {
                resamples: Some(500),
                ..Default::default()
            },
            output: OutputArgs::default(),
        };
        let comparisons = compare(&args, &Config::default()).unwrap();
        assert_eq!(comparisons.len(), 1);
        assert_eq!(comparisons[0].fast_task, "Reddit.v2");
        assert!((comparisons[0].spearman.unwrap() - 1.0).abs() < 1e-12);
        assert!((comparisons[0].speedup.unwrap() - 10.0).abs() < 1e-12);
    }
}
