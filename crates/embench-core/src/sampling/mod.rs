//! Index samplers used by the bootstrap evaluator.
//!
//! - **undersample**: greedy label-balanced training samples
//! - **stratify**: proportion-preserving test-set reduction

pub mod stratify;
pub mod undersample;

pub use stratify::{stratified_subsample, StratifyError};
pub use undersample::undersample_indices;
