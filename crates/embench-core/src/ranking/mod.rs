//! Significance ranking of model leaderboards.
//!
//! - **significance**: bootstrap p-value between two score distributions
//! - **rank**: descending-mean order with significance-based rank ties
//! - **compare**: agreement between two versions of a task

pub mod compare;
pub mod rank;
pub mod significance;

pub use compare::{compare_versions, speedup, VersionComparison, VersionRun};
pub use rank::{compute_significant_rank, ModelScores, RankTable, SignificanceRanker};
pub use significance::bootstrap_p_value;
