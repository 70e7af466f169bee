//! Bootstrap hypothesis test between two score distributions.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::error::{EvalResult, EvaluationError};
use crate::math::mean;

/// Resamples drawn per parallel work unit.
const CHUNK_SIZE: usize = 1000;

/// Seed for chunk `chunk` of a test seeded with `seed`.
fn chunk_seed(seed: u64, chunk: u64) -> u64 {
    seed ^ chunk.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// One-sided bootstrap p-value that `b` scores higher than `a`.
///
/// Pools `b ++ a`, draws `n_resamples` resamples of the pooled size with
/// replacement, and returns the fraction whose difference of group means
/// (first `b.len()` values minus the rest) is at least `mean(b) - mean(a)`.
///
/// The result depends only on the inputs and `seed`, never on the number of
/// rayon threads.
pub fn bootstrap_p_value(
    a: &[f64],
    b: &[f64],
    n_resamples: usize,
    seed: u64,
    cancel: &CancellationToken,
) -> EvalResult<f64> {
    let (Some(mean_a), Some(mean_b)) = (mean(a), mean(b)) else {
        return Err(EvaluationError::Configuration(
            "significance test needs two non-empty distributions".into(),
        ));
    };
    if n_resamples == 0 {
        return Err(EvaluationError::Configuration(
            "significance test needs at least one resample".into(),
        ));
    }
    let observed = mean_b - mean_a;

    let pooled: Vec<f64> = b.iter().chain(a).copied().collect();
    let n_chunks = n_resamples.div_ceil(CHUNK_SIZE);

    let hits: usize = (0..n_chunks)
        .into_par_iter()
        .map(|chunk| {
            cancel.check("significance resampling")?;
            let start = chunk * CHUNK_SIZE;
            let count = CHUNK_SIZE.min(n_resamples - start);
            let mut rng = StdRng::seed_from_u64(chunk_seed(seed, chunk as u64));
            Ok((0..count)
                .filter(|_| resampled_difference(&pooled, b.len(), &mut rng) >= observed)
                .count())
        })
        .sum::<EvalResult<usize>>()?;

    Ok(hits as f64 / n_resamples as f64)
}

/// Mean of the first `split` draws minus the mean of the remaining draws.
fn resampled_difference(pooled: &[f64], split: usize, rng: &mut StdRng) -> f64 {
    let n = pooled.len();
    let mut head = 0.0;
    let mut tail = 0.0;
    for i in 0..n {
        let value = pooled[rng.gen_range(0..n)];
        if i < split {
            head += value;
        } else {
            tail += value;
        }
    }
    head / split as f64 - tail / (n - split) as f64
}
