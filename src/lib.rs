//! # reflect-mcmc
//!
//! A small Metropolis sampler for the posterior of a coin's heads probability after
//! one observed head, `f(p) = 2p` on `[0, 1]`. Proposals are uniform steps reflected
//! at the interval ends, so the plain Metropolis rule applies.
//!
//! ```rust
//! use reflect_mcmc::metropolis::{CoinSampler, SamplerConfig};
//!
//! let mut sampler = CoinSampler::new(SamplerConfig::default())?.set_seed(42);
//! let summary = sampler.run();
//! assert!((summary.mean.unwrap() - 2.0 / 3.0).abs() < 0.05);
//! # Ok::<(), reflect_mcmc::errors::SamplerError>(())
//! ```

pub mod core;
pub mod distributions;
pub mod errors;
pub mod io;
pub mod metropolis;
pub mod report;
pub mod rng;
pub mod stats;
