//! Running aggregates of a chain and a few summaries computed from its trace.

use ndarray::prelude::*;
use ndarray_stats::QuantileExt;

use crate::errors::{SamplerError, SamplerResult};

/// Counters a chain accumulates from creation onwards.
///
/// `sum_of_states` adds the state *after* each iteration, whether or not the
/// proposal was accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStats {
    pub iterations: usize,
    pub accepted: usize,
    pub sum_of_states: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one iteration that left the chain at `x`.
    pub fn record(&mut self, x: f64, accepted: bool) {
        self.iterations += 1;
        if accepted {
            self.accepted += 1;
        }
        self.sum_of_states += x;
    }

    /// `sum_of_states / iteration_index`.
    pub fn running_mean(&self, iteration_index: usize) -> SamplerResult<f64> {
        if iteration_index == 0 {
            return Err(SamplerError::DivisionUndefined);
        }
        Ok(self.sum_of_states / iteration_index as f64)
    }

    /// Fraction of iterations that accepted their proposal; zero before the first one.
    pub fn acceptance_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.accepted as f64 / self.iterations as f64
        }
    }
}

/// Snapshot of a chain, e.g. for logging or a final report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSummary {
    pub iterations: usize,
    pub accepted: usize,
    /// `None` while no iteration has run.
    pub mean: Option<f64>,
    pub acceptance_rate: f64,
    pub final_state: f64,
}

impl ChainSummary {
    pub fn new(stats: &RunningStats, final_state: f64) -> Self {
        Self {
            iterations: stats.iterations,
            accepted: stats.accepted,
            mean: stats.running_mean(stats.iterations).ok(),
            acceptance_rate: stats.acceptance_rate(),
            final_state,
        }
    }
}

/// Histogram of `samples` over `[0, 1]` with `bins` equal-width bins, scaled so that
/// it integrates to one. Values outside the unit interval are ignored.
///
/// ```rust
/// use ndarray::arr1;
/// use reflect_mcmc::stats::empirical_density;
///
/// let density = empirical_density(arr1(&[0.1, 0.2, 0.7, 0.9]).view(), 2);
/// assert_eq!(density, arr1(&[1.0, 1.0]));
/// ```
pub fn empirical_density(samples: ArrayView1<f64>, bins: usize) -> Array1<f64> {
    let mut counts = Array1::<f64>::zeros(bins);
    if bins == 0 {
        return counts;
    }
    let mut n = 0usize;
    for &x in samples.iter().filter(|x| (0.0..=1.0).contains(*x)) {
        let idx = ((x * bins as f64) as usize).min(bins - 1);
        counts[idx] += 1.0;
        n += 1;
    }
    if n > 0 {
        counts *= bins as f64 / n as f64;
    }
    counts
}

/// Largest absolute gap between `empirical_density(samples, bins)` and `2p` evaluated
/// at the bin centres.
pub fn max_density_error(samples: ArrayView1<f64>, bins: usize) -> f64 {
    let density = empirical_density(samples, bins);
    let expected = Array1::from_shape_fn(bins, |i| 2.0 * (i as f64 + 0.5) / bins as f64);
    let gaps = (density - expected).mapv(f64::abs);
    gaps.max().copied().unwrap_or(0.0)
}
