//! Encoder capability and the deduplicating embedding cache.
//!
//! Models live outside this crate. Anything that turns a batch of raw inputs
//! (text, image bytes, precomputed vectors) into fixed-length vectors can be
//! evaluated by implementing [`Encoder`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use embench_core::embedding::{EncodeOptions, Encoder};
//!
//! struct MyModel;
//!
//! impl Encoder for MyModel {
//!     type Input = String;
//!
//!     fn encode(&self, inputs: &[&String], options: &EncodeOptions) -> EvalResult<Vec<Vec<f32>>> {
//!         // run the model in chunks of options.batch_size
//!     }
//! }
//! ```

pub mod cache;

pub use cache::EmbeddingCache;

use ndarray::Array2;

use crate::error::{EvalResult, EvaluationError};

/// Per-call encoder settings.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Inputs per forward pass; batching is the encoder's job
    pub batch_size: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self { batch_size: 32 }
    }
}

/// Maps a batch of raw inputs to fixed-length vectors, in input order.
pub trait Encoder {
    /// Raw input type (text, image, ...).
    type Input;

    fn encode(
        &self,
        inputs: &[&Self::Input],
        options: &EncodeOptions,
    ) -> EvalResult<Vec<Vec<f32>>>;
}

/// Encode `inputs` in one call and stack the result into an `n × dim` matrix.
///
/// Fails if the encoder returns the wrong number of vectors or vectors of
/// differing width.
pub fn encode_matrix<E: Encoder + ?Sized>(
    encoder: &E,
    inputs: &[&E::Input],
    options: &EncodeOptions,
) -> EvalResult<Array2<f32>> {
    if inputs.is_empty() {
        return Ok(Array2::zeros((0, 0)));
    }
    let vectors = encoder.encode(inputs, options)?;
    if vectors.len() != inputs.len() {
        return Err(EvaluationError::Encoder(format!(
            "requested {} embeddings, received {}",
            inputs.len(),
            vectors.len()
        )));
    }
    let dim = vectors[0].len();
    let mut flat = Vec::with_capacity(vectors.len() * dim);
    for v in &vectors {
        if v.len() != dim {
            return Err(EvaluationError::DimensionMismatch {
                expected: dim,
                actual: v.len(),
            });
        }
        flat.extend_from_slice(v);
    }
    Array2::from_shape_vec((vectors.len(), dim), flat)
        .map_err(|e| EvaluationError::Encoder(e.to_string()))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Stub encoders shared by unit tests across the crate.

    use std::cell::RefCell;

    use super::*;

    /// Passes precomputed vectors through and records every call.
    #[derive(Default)]
    pub struct RecordingEncoder {
        pub calls: RefCell<Vec<Vec<Vec<f32>>>>,
    }

    impl RecordingEncoder {
        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        pub fn inputs_encoded(&self) -> usize {
            self.calls.borrow().iter().map(Vec::len).sum()
        }
    }

    impl Encoder for RecordingEncoder {
        type Input = Vec<f32>;

        fn encode(
            &self,
            inputs: &[&Vec<f32>],
            _options: &EncodeOptions,
        ) -> EvalResult<Vec<Vec<f32>>> {
            let batch: Vec<Vec<f32>> = inputs.iter().map(|v| (*v).clone()).collect();
            self.calls.borrow_mut().push(batch.clone());
            Ok(batch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingEncoder;
    use super::*;

    struct ShortEncoder;

    impl Encoder for ShortEncoder {
        type Input = u32;

        fn encode(&self, inputs: &[&u32], _: &EncodeOptions) -> EvalResult<Vec<Vec<f32>>> {
            Ok(inputs.iter().skip(1).map(|&&x| vec![x as f32]).collect())
        }
    }

    struct RaggedEncoder;

    impl Encoder for RaggedEncoder {
        type Input = u32;

        fn encode(&self, inputs: &[&u32], _: &EncodeOptions) -> EvalResult<Vec<Vec<f32>>> {
            Ok(inputs.iter().map(|&&x| vec![0.0; x as usize]).collect())
        }
    }

    #[test]
    fn test_encode_matrix_stacks_rows() {
        let encoder = RecordingEncoder::default();
        let a = vec![1.0, 2.0];
        let b = vec![3.0, 4.0];
        let m = encode_matrix(&encoder, &[&a, &b], &EncodeOptions::default()).unwrap();
        assert_eq!(m.shape(), &[2, 2]);
        assert_eq!(m[[1, 0]], 3.0);
        assert_eq!(encoder.call_count(), 1);
    }

    #[test]
    fn test_encode_matrix_rejects_wrong_count() {
        let err = encode_matrix(&ShortEncoder, &[&1, &2], &EncodeOptions::default()).unwrap_err();
        assert!(matches!(err, EvaluationError::Encoder(_)));
    }

    #[test]
    fn test_encode_matrix_rejects_ragged_vectors() {
        let err = encode_matrix(&RaggedEncoder, &[&2, &3], &EncodeOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_encode_matrix_skips_empty_batch() {
        let encoder = RecordingEncoder::default();
        let m = encode_matrix(&encoder, &[], &EncodeOptions::default()).unwrap();
        assert_eq!(m.nrows(), 0);
        assert_eq!(encoder.call_count(), 0);
    }
}
