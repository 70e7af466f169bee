//! Label-balanced undersampling of a training split.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use rand::Rng;

/// Draw a label-balanced sample of record positions.
///
/// Positions are visited in a random order. A record is accepted while any of
/// its labels has fewer than `samples_per_label` accepted rows; acceptance
/// counts towards every label the record carries, so co-occurring labels can
/// end up above the cap. Labels with too few rows are simply exhausted.
///
/// Returns positions in acceptance order.
pub fn undersample_indices<R: Rng + ?Sized>(
    labels: &[Vec<String>],
    samples_per_label: usize,
    rng: &mut R,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.shuffle(rng);

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut sample = Vec::new();
    for i in order {
        let under_cap = labels[i]
            .iter()
            .any(|label| counts.get(label.as_str()).copied().unwrap_or(0) < samples_per_label);
        if under_cap {
            sample.push(i);
            for label in &labels[i] {
                *counts.entry(label.as_str()).or_insert(0) += 1;
            }
        }
    }
    sample
}
