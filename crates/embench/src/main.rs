//! Embench CLI - leaderboard ranking and version comparison over stored
//! embedding benchmark results.
//!
//! Evaluation runs through the `embench-core` library with a caller-supplied
//! encoder; this binary works on the result files it leaves behind.
//!
//! # Usage
//!
//! ```bash
//! # Rank models by their per-experiment accuracies on one task
//! embench rank --task Banking77 --model org/a --model org/b@v2
//!
//! # Rank an ad-hoc set of distributions
//! embench rank --input scores.json --format markdown
//!
//! # Compare tasks against their fast versions
//! embench compare --task RedditClustering --model org/a --model org/b --metric v_measures
//!
//! # View configuration
//! embench config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Embench - significance ranking for embedding benchmark results.
#[derive(Parser, Debug)]
#[command(name = "embench")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank models with significance-based ties
    Rank(cli::rank::RankArgs),

    /// Compare task versions (rank agreement, speedup)
    Compare(cli::compare::CompareArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match embench_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `embench config path`."
            );
            embench_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Embench v{}", embench_core::VERSION);

    match cli.command {
        Commands::Rank(args) => cli::rank::execute(args, &config),
        Commands::Compare(args) => cli::compare::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args),
    }
}
