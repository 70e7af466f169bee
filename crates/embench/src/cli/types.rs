//! CLI enum types.

use clap::ValueEnum;
use embench_core::{Config, OutputFormat as CoreOutputFormat};

/// Supported output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object or array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
    /// Markdown table
    Markdown,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
            OutputFormat::Markdown => CoreOutputFormat::Markdown,
        }
    }
}

/// The `--format` flag if given, else `output.format` from the config.
pub fn resolve_format(
    flag: Option<OutputFormat>,
    config: &Config,
) -> anyhow::Result<CoreOutputFormat> {
    if let Some(format) = flag {
        return Ok(format.into());
    }
    CoreOutputFormat::parse(&config.output.format)
        .ok_or_else(|| anyhow::anyhow!("Unknown output format '{}'", config.output.format))
}
