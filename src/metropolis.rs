/*!
# Metropolis sampler for the coin-flip posterior

[`CoinSampler`] runs one Markov chain whose stationary density is `f(p) = 2p` on
`[0, 1]`. Each [`CoinSampler::transition`]:

1. draws a step uniformly from `[−width/2, width/2)` and adds it to the state,
2. reflects the candidate back into `[0, 1]`,
3. computes the Metropolis ratio `f(y)/f(x) = y/x`,
4. accepts outright if the ratio is at least one, otherwise accepts with
   probability equal to the ratio,
5. adds the resulting state to the running sum.

Because the reflected kernel is symmetric, the plain Metropolis rule is exact; no
Hastings correction enters the ratio.

[`CoinChains`] bundles several independent samplers. Chain `i` is seeded with
`seed + i`, and the chains run in parallel through [`crate::core::ChainRunner`].

## Example

```rust
use reflect_mcmc::metropolis::{CoinSampler, SamplerConfig};

let config = SamplerConfig::new(0.5, 0.4, 10_000)?;
let mut sampler = CoinSampler::new(config)?.set_seed(42);
let summary = sampler.run();

assert_eq!(summary.iterations, 9_999);
assert!((summary.mean.unwrap() - 2.0 / 3.0).abs() < 0.05);
# Ok::<(), reflect_mcmc::errors::SamplerError>(())
```
*/

use rand::rngs::SmallRng;
use rand::{thread_rng, Rng, SeedableRng};
use tracing::{debug, info};

use crate::core::{HasChains, MarkovChain};
use crate::distributions::{metropolis_ratio, reflect, CoinPosterior, ReflectingUniform};
use crate::errors::{SamplerError, SamplerResult};
use crate::rng::UniformSource;
use crate::stats::{ChainSummary, RunningStats};

/// Immutable settings of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerConfig {
    /// Starting value of the chain, in `[0, 1]`.
    pub initial_state: f64,
    /// Total span of the uniform step; steps lie in `[−width/2, width/2)`.
    pub width: f64,
    /// Length of the run, counting the initial state as iteration zero.
    pub iteration_count: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            initial_state: 0.5,
            width: 0.4,
            iteration_count: 100_000,
        }
    }
}

impl SamplerConfig {
    /// Builds and validates a configuration.
    ///
    /// # Errors
    ///
    /// [`SamplerError::InvalidParameter`] if `initial_state` is outside `[0, 1]`,
    /// `width` is not a positive finite number, or `iteration_count` is zero.
    pub fn new(initial_state: f64, width: f64, iteration_count: usize) -> SamplerResult<Self> {
        let config = Self {
            initial_state,
            width,
            iteration_count,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants [`SamplerConfig::new`] enforces.
    pub fn validate(&self) -> SamplerResult<()> {
        if !(0.0..=1.0).contains(&self.initial_state) {
            return Err(SamplerError::InvalidParameter {
                name: "initial_state",
                value: self.initial_state,
                reason: "must lie in [0, 1]",
            });
        }
        if !(self.width > 0.0 && self.width.is_finite()) {
            return Err(SamplerError::InvalidParameter {
                name: "width",
                value: self.width,
                reason: "must be positive and finite",
            });
        }
        if self.iteration_count < 1 {
            return Err(SamplerError::InvalidParameter {
                name: "iteration_count",
                value: self.iteration_count as f64,
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// What happened during one call to [`CoinSampler::transition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// One-based index of this iteration.
    pub iteration: usize,
    /// Uniform step added to the previous state.
    pub delta: f64,
    /// Candidate after reflection.
    pub proposal: f64,
    /// `f(proposal) / f(previous state)`.
    pub ratio: f64,
    pub accepted: bool,
    /// State after the iteration.
    pub state: f64,
}

/**
A single Metropolis chain for the coin-flip posterior.

`R` is the source of uniform deviates. It defaults to [`SmallRng`]; tests can pass a
[`crate::rng::ReplaySource`] to script every draw.
*/
#[derive(Debug, Clone)]
pub struct CoinSampler<R = SmallRng> {
    /// Settings the chain was created with.
    pub config: SamplerConfig,
    /// Seed of the generator, when it was built from one.
    pub seed: Option<u64>,
    kernel: ReflectingUniform<f64>,
    target: CoinPosterior,
    state: f64,
    stats: RunningStats,
    rng: R,
}

impl CoinSampler<SmallRng> {
    /// Creates a chain at `config.initial_state` with an entropy-seeded [`SmallRng`].
    ///
    /// # Errors
    ///
    /// [`SamplerError::InvalidParameter`] if `config` does not validate.
    pub fn new(config: SamplerConfig) -> SamplerResult<Self> {
        config.validate()?;
        let seed = thread_rng().gen::<u64>();
        Ok(Self::from_parts(config, SmallRng::seed_from_u64(seed), Some(seed)))
    }

    /// Validates the parameters and creates a chain.
    ///
    /// # Errors
    ///
    /// [`SamplerError::InvalidParameter`] for any parameter [`SamplerConfig::new`] rejects.
    pub fn initialize(
        initial_state: f64,
        width: f64,
        iteration_count: usize,
    ) -> SamplerResult<Self> {
        Self::new(SamplerConfig::new(initial_state, width, iteration_count)?)
    }

    /// Reseeds the generator, making the chain reproducible.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }
}

impl<R: UniformSource<f64>> CoinSampler<R> {
    /// Creates a chain that draws its deviates from `source`.
    ///
    /// # Errors
    ///
    /// [`SamplerError::InvalidParameter`] if `config` does not validate.
    pub fn with_source(config: SamplerConfig, source: R) -> SamplerResult<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, source, None))
    }

    fn from_parts(config: SamplerConfig, rng: R, seed: Option<u64>) -> Self {
        debug!(
            initial_state = config.initial_state,
            width = config.width,
            iteration_count = config.iteration_count,
            ?seed,
            "creating coin sampler"
        );
        Self {
            config,
            seed,
            kernel: ReflectingUniform::new(config.width),
            target: CoinPosterior,
            state: config.initial_state,
            stats: RunningStats::new(),
            rng,
        }
    }

    /// Performs one Metropolis transition and reports what happened.
    ///
    /// The acceptance deviate is only drawn when the ratio is below one. A candidate
    /// that a single reflection could not bring back into `[0, 1]` (possible only
    /// for `width > 2`) has zero density and is rejected without a second draw.
    pub fn transition(&mut self) -> Transition {
        let x = self.state;
        let delta = self.kernel.delta(self.rng.next_uniform());
        let proposal = reflect(x + delta);

        let (ratio, accepted) = if self.target.in_support(proposal) {
            let ratio = metropolis_ratio(x, proposal);
            let accepted = ratio >= 1.0 || self.rng.next_uniform() <= ratio;
            (ratio, accepted)
        } else {
            (0.0, false)
        };

        if accepted {
            self.state = proposal;
        }
        self.stats.record(self.state, accepted);

        Transition {
            iteration: self.stats.iterations,
            delta,
            proposal,
            ratio,
            accepted,
            state: self.state,
        }
    }

    /// Advances the chain through the iterations left in `1 .. iteration_count` and
    /// returns the resulting summary. A fresh chain takes `iteration_count − 1` steps;
    /// a chain that already got there takes none.
    pub fn run(&mut self) -> ChainSummary {
        while self.stats.iterations < self.last_iteration() {
            self.transition();
        }
        let summary = self.summary();
        info!(
            iterations = summary.iterations,
            accepted = summary.accepted,
            mean = ?summary.mean,
            "coin sampler finished"
        );
        summary
    }

    /// Index of the last iteration of a full run, `iteration_count − 1`.
    pub fn last_iteration(&self) -> usize {
        self.config.iteration_count.saturating_sub(1)
    }

    /// `sum_of_states / iteration_index`.
    ///
    /// # Errors
    ///
    /// [`SamplerError::DivisionUndefined`] if `iteration_index` is zero.
    pub fn running_mean(&self, iteration_index: usize) -> SamplerResult<f64> {
        self.stats.running_mean(iteration_index)
    }

    /// Running mean over every iteration taken so far.
    pub fn mean(&self) -> SamplerResult<f64> {
        self.stats.running_mean(self.stats.iterations)
    }

    /// Current state `x`.
    pub fn state(&self) -> f64 {
        self.state
    }

    /// Number of iterations taken.
    pub fn iteration(&self) -> usize {
        self.stats.iterations
    }

    /// Number of accepted proposals.
    pub fn accepted_count(&self) -> usize {
        self.stats.accepted
    }

    pub fn stats(&self) -> &RunningStats {
        &self.stats
    }

    pub fn summary(&self) -> ChainSummary {
        ChainSummary::new(&self.stats, self.state)
    }
}

impl<R: UniformSource<f64>> MarkovChain<f64> for CoinSampler<R> {
    fn step(&mut self) -> f64 {
        self.transition().state
    }

    fn current_state(&self) -> f64 {
        self.state
    }

    fn accepted(&self) -> usize {
        self.stats.accepted
    }
}

/**
Several independent coin samplers sharing one configuration.

```rust
use reflect_mcmc::core::ChainRunner;
use reflect_mcmc::metropolis::{CoinChains, SamplerConfig};

let mut chains = CoinChains::new(SamplerConfig::default(), 4)?.set_seed(42);
assert_eq!(chains.chains[1].seed, Some(43));

let trace = chains.run(1_000, 100)?;
assert_eq!(trace.shape(), &[4, 1_000]);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
#[derive(Debug, Clone)]
pub struct CoinChains {
    pub config: SamplerConfig,
    pub chains: Vec<CoinSampler<SmallRng>>,
    /// Global seed; chain `i` uses `seed + i`.
    pub seed: u64,
}

impl CoinChains {
    /// Creates `n_chains` entropy-seeded chains at `config.initial_state`.
    ///
    /// # Errors
    ///
    /// [`SamplerError::InvalidParameter`] if `config` does not validate.
    pub fn new(config: SamplerConfig, n_chains: usize) -> SamplerResult<Self> {
        let chains = (0..n_chains)
            .map(|_| CoinSampler::new(config))
            .collect::<SamplerResult<Vec<_>>>()?;
        let seed = thread_rng().gen::<u64>();
        Ok(Self {
            config,
            chains,
            seed,
        })
    }

    /// Sets the global seed; chain `i` is reseeded with `seed + i`.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        for (i, chain) in self.chains.iter_mut().enumerate() {
            let chain_seed = seed.wrapping_add(i as u64);
            chain.seed = Some(chain_seed);
            chain.rng = SmallRng::seed_from_u64(chain_seed);
        }
        debug!(seed, n_chains = self.chains.len(), "seeded coin chains");
        self
    }

    /// Summary of every chain, in chain order.
    pub fn summaries(&self) -> Vec<ChainSummary> {
        self.chains.iter().map(CoinSampler::summary).collect()
    }
}

impl HasChains<f64> for CoinChains {
    type Chain = CoinSampler<SmallRng>;

    fn chains_mut(&mut self) -> &mut Vec<Self::Chain> {
        &mut self.chains
    }
}
