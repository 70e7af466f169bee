//! Dataset model consumed by the evaluators.
//!
//! - **split**: labeled record sequences and named subsets
//! - **binarizer**: label sets to classifier targets

pub mod binarizer;
pub mod split;

pub use binarizer::LabelBinarizer;
pub use split::{Dataset, Split, DEFAULT_SUBSET};
