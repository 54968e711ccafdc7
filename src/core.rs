/*!
# Core chain utilities.

- [`MarkovChain<T>`] abstracts a single chain over a scalar state.
- [`run_chain`] and [`run_chain_progress`] advance one chain and collect its states.
- [`HasChains<T>`] is implemented by types owning several chains.
- [`ChainRunner<T>`] runs those chains in parallel with Rayon, discarding burn-in and
  optionally drawing one progress bar per chain.

Any type implementing [`HasChains<T>`] gets [`ChainRunner<T>`] through a blanket
implementation.
*/

use std::time::{Duration, Instant};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use ndarray::{stack, Array1, Array2, ArrayView1, Axis, ShapeError};
use num_traits::Float;
use rayon::prelude::*;

/// A single Markov chain over a scalar state.
pub trait MarkovChain<T> {
    /// Performs one iteration and returns the new state.
    fn step(&mut self) -> T;

    /// Returns the current state without advancing the chain.
    fn current_state(&self) -> T;

    /// Number of accepted proposals so far. Chains that do not track acceptance
    /// report zero.
    fn accepted(&self) -> usize {
        0
    }
}

/// Runs `chain` for `n_discard + n_collect` steps and returns the last `n_collect` states.
pub fn run_chain<T, M>(chain: &mut M, n_collect: usize, n_discard: usize) -> Array1<T>
where
    M: MarkovChain<T>,
    T: Float,
{
    let mut out = Array1::<T>::zeros(n_collect);
    for i in 0..(n_collect + n_discard) {
        let state = chain.step();
        if i >= n_discard {
            out[i - n_discard] = state;
        }
    }
    out
}

/// Same as [`run_chain`], but keeps `pb` informed about the position and the
/// acceptance rate. The bar is refreshed at most every 250 ms and on the last step.
pub fn run_chain_progress<T, M>(
    chain: &mut M,
    n_collect: usize,
    n_discard: usize,
    pb: &ProgressBar,
) -> Array1<T>
where
    M: MarkovChain<T>,
    T: Float,
{
    const UPDATE_INTERVAL: Duration = Duration::from_millis(250);

    let total = n_collect + n_discard;
    let mut out = Array1::<T>::zeros(n_collect);
    let accepted_before = chain.accepted();
    let mut last_update = Instant::now();
    pb.set_length(total as u64);

    for i in 0..total {
        let state = chain.step();
        if i >= n_discard {
            out[i - n_discard] = state;
        }

        if last_update.elapsed() >= UPDATE_INTERVAL || i + 1 == total {
            let accept_rate = (chain.accepted() - accepted_before) as f64 / (i + 1) as f64;
            pb.set_position(i as u64 + 1);
            pb.set_message(format!("p(accept)≈{:.3}", accept_rate));
            last_update = Instant::now();
        }
    }
    out
}

/// A type that owns several Markov chains.
pub trait HasChains<T> {
    type Chain: MarkovChain<T> + Send;

    /// Returns a mutable reference to the chains.
    fn chains_mut(&mut self) -> &mut Vec<Self::Chain>;
}

/// Runs every chain of a [`HasChains`] in parallel.
pub trait ChainRunner<T>: HasChains<T>
where
    T: Float + Send,
{
    /// Runs all chains, discarding the first `n_discard` states of each.
    ///
    /// Returns an array of shape `[n_chains, n_collect]`.
    fn run(&mut self, n_collect: usize, n_discard: usize) -> Result<Array2<T>, ShapeError> {
        let traces: Vec<Array1<T>> = self
            .chains_mut()
            .par_iter_mut()
            .map(|chain| run_chain(chain, n_collect, n_discard))
            .collect();
        stack_traces(&traces, n_collect)
    }

    /// Like [`ChainRunner::run`], with one progress bar per chain.
    fn run_progress(
        &mut self,
        n_collect: usize,
        n_discard: usize,
    ) -> Result<Array2<T>, ShapeError> {
        let multi = MultiProgress::new();
        let pb_style = ProgressStyle::default_bar()
            .template("{prefix:8} {bar:40.cyan/blue} {pos}/{len} ({eta}) | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        let traces: Vec<Array1<T>> = self
            .chains_mut()
            .par_iter_mut()
            .enumerate()
            .map(|(i, chain)| {
                let pb = multi.add(ProgressBar::new((n_collect + n_discard) as u64));
                pb.set_prefix(format!("Chain {i}"));
                pb.set_style(pb_style.clone());
                let trace = run_chain_progress(chain, n_collect, n_discard, &pb);
                pb.finish_with_message("Done!");
                trace
            })
            .collect();
        stack_traces(&traces, n_collect)
    }
}

impl<T: Float + Send, R: HasChains<T>> ChainRunner<T> for R {}

fn stack_traces<T: Float>(traces: &[Array1<T>], n_collect: usize) -> Result<Array2<T>, ShapeError> {
    if traces.is_empty() {
        return Ok(Array2::zeros((0, n_collect)));
    }
    let views: Vec<ArrayView1<T>> = traces.iter().map(|t| t.view()).collect();
    stack(Axis(0), &views)
}
