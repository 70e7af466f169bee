//! Stratified subsampling that preserves per-stratum proportions.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Why a stratified subsample could not be drawn.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum StratifyError {
    /// Requested size is not strictly between 0 and the population size
    #[error("sample size {size} must be in 1..{population}")]
    InvalidSize { size: usize, population: usize },

    /// Some stratum has a single member, so it cannot be split
    #[error("the least populated stratum has only {count} member(s); at least 2 are required")]
    StratumTooSmall { count: usize },

    /// More strata than rows on one side of the split
    #[error("{strata} strata cannot fit into a sample of {size} with {remainder} rows held out")]
    TooManyStrata {
        strata: usize,
        size: usize,
        remainder: usize,
    },
}

/// Pick `size` positions so that every stratum keeps its share of the population.
///
/// `keys[i]` is the stratum of row `i`. Per-stratum quotas are the floor of the
/// proportional share, with leftover slots going to the largest remainders
/// (ties broken randomly). Rows inside a stratum are chosen at random and the
/// result is returned in random order.
pub fn stratified_subsample<K: Ord, R: Rng + ?Sized>(
    keys: &[K],
    size: usize,
    rng: &mut R,
) -> Result<Vec<usize>, StratifyError> {
    let population = keys.len();
    if size == 0 || size >= population {
        return Err(StratifyError::InvalidSize { size, population });
    }

    let mut strata: BTreeMap<&K, Vec<usize>> = BTreeMap::new();
    for (i, key) in keys.iter().enumerate() {
        strata.entry(key).or_default().push(i);
    }
    let mut members: Vec<Vec<usize>> = strata.into_values().collect();

    let smallest = members.iter().map(Vec::len).min().unwrap_or(0);
    if smallest < 2 {
        return Err(StratifyError::StratumTooSmall { count: smallest });
    }
    let remainder = population - size;
    if members.len() > size || members.len() > remainder {
        return Err(StratifyError::TooManyStrata {
            strata: members.len(),
            size,
            remainder,
        });
    }

    let mut quotas: Vec<usize> = Vec::with_capacity(members.len());
    let mut fractions: Vec<(usize, f64)> = Vec::with_capacity(members.len());
    for (s, rows) in members.iter().enumerate() {
        let exact = rows.len() as f64 * size as f64 / population as f64;
        let floor = exact.floor() as usize;
        quotas.push(floor);
        fractions.push((s, exact - floor as f64));
    }
    let mut leftover = size - quotas.iter().sum::<usize>();
    fractions.shuffle(rng);
    fractions.sort_by(|a, b| b.1.total_cmp(&a.1));
    for (s, _) in fractions {
        if leftover == 0 {
            break;
        }
        if quotas[s] < members[s].len() {
            quotas[s] += 1;
            leftover -= 1;
        }
    }

    let mut sample = Vec::with_capacity(size);
    for (rows, quota) in members.iter_mut().zip(quotas) {
        rows.shuffle(rng);
        sample.extend_from_slice(&rows[..quota]);
    }
    sample.shuffle(rng);
    Ok(sample)
}
