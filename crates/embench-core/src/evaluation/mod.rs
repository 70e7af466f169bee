//! Bootstrap classification evaluation.
//!
//! - **bootstrap**: the evaluator driving sampling, encoding and experiments
//! - **metrics**: accuracy, macro F1, label-ranking average precision
//! - **scores**: per-experiment and aggregated score records
//! - **task**: task metadata and classification mode

pub mod bootstrap;
pub mod metrics;
pub mod scores;
pub mod task;

pub use bootstrap::BootstrapEvaluator;
pub use scores::{aggregate, ScoreDict, SubsetScores, TaskScores};
pub use task::{ClassificationMode, TaskMetadata};
