//! # `matprep` - sparse matrix preprocessing for coloring and reordering
//!
//! Computes bounded-distance vertex degrees and the weights/orderings that
//! drive heuristic colorings, and relocates the nonzeros of
//! upper-triangular symmetric storage under a symmetric permutation.
//!
//! Also includes utilities for reading newline/space delimited plaintext
//! graph files.

use std::collections::HashMap;

use ordered_float::NotNan;
use rand_pcg::Lcg64Xsh32;

pub mod degree;
pub mod error;
pub mod graph;
pub mod graphio;
pub mod overlap;
pub mod permute;
pub mod reorder;
mod scanner;
pub mod simsvm;
pub mod weights;

pub use error::{Error, Result};
pub use scanner::{DelimIter, Scanner};

/// A deterministic random stream for tie-breaking perturbations.
pub fn seeded_rng(seed: u64) -> Lcg64Xsh32 {
    Lcg64Xsh32::new(0xcafef00dd15ea5e5, seed)
}

const NSTAT_PERCENTILES: usize = 11;
const STAT_PERCENTILES: [f64; NSTAT_PERCENTILES] = [
    0.0, 0.001, 0.01, 0.05, 0.10, 0.50, 0.90, 0.95, 0.99, 0.999, 1.0,
];

pub struct SummaryStats {
    mean: f64,
    percentiles: [f64; NSTAT_PERCENTILES],
}

impl SummaryStats {
    /// `None` for empty input or if any value is NaN.
    pub fn from(it: impl Iterator<Item = f64>) -> Option<Self> {
        let mut v: Vec<NotNan<f64>> = it.map(|f| NotNan::new(f).ok()).collect::<Option<_>>()?;
        if v.is_empty() {
            return None;
        }
        v.sort_unstable();
        let mut stats = SummaryStats {
            mean: v.iter().map(|f| f.into_inner()).sum::<f64>() / v.len() as f64,
            percentiles: Default::default(),
        };
        STAT_PERCENTILES
            .iter()
            .copied()
            .map(|f| v[((v.len() - 1) as f64 * f) as usize].into_inner())
            .zip(stats.percentiles.iter_mut())
            .for_each(|(val, p)| *p = val);
        Some(stats)
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn max(&self) -> f64 {
        self.percentiles[NSTAT_PERCENTILES - 1]
    }

    pub fn to_map(&self) -> HashMap<String, f64> {
        let mut map: HashMap<_, _> = STAT_PERCENTILES
            .iter()
            .map(|f| format!("p{:.3}", f))
            .zip(self.percentiles.iter().copied())
            .collect();
        map.insert("mean".to_string(), self.mean);
        map
    }
}
