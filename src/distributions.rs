/*!
The target density and the proposal kernel of the coin-flip model.

One toss of a coin came up heads. With a uniform prior on the heads probability `p`,
the posterior is

```text
Pr[p | heads] = p / ∫₀¹ p dp = 2p,   0 ≤ p ≤ 1
```

with mean `2/3` and CDF `p²`. [`CoinPosterior`] describes that density.
[`ReflectingUniform`] perturbs the current state by a uniform step and mirrors the
result back into `[0, 1]`; the mirrored kernel is still symmetric, so the acceptance
test needs no Hastings correction.

# Examples

```rust
use reflect_mcmc::distributions::{metropolis_ratio, reflect, CoinPosterior};

let target = CoinPosterior;
assert_eq!(target.density(0.25), 0.5);
assert!((reflect(1.2f64) - 0.8).abs() < 1e-12);
assert!((metropolis_ratio(0.1f64, 0.2) - 2.0).abs() < 1e-12);
```
*/

use num_traits::Float;

use crate::rng::UniformSource;

/// Mirrors `y` back into `[0, 1]` across whichever boundary it crossed.
///
/// A single reflection is enough as long as the step that produced `y` is shorter than
/// one; wider steps may still land outside the unit interval.
pub fn reflect<T: Float>(y: T) -> T {
    let one = T::one();
    if y > one {
        one + one - y
    } else if y < T::zero() {
        -y
    } else {
        y
    }
}

/// Ratio `f(proposed) / f(current)` of the posterior density `f(p) = 2p`.
///
/// At `current == 0` the density vanishes: any positive proposal gets an infinite
/// ratio and a proposal of zero gets a ratio of one.
pub fn metropolis_ratio<T: Float>(current: T, proposed: T) -> T {
    if current == T::zero() {
        if proposed > T::zero() {
            T::infinity()
        } else {
            T::one()
        }
    } else {
        proposed / current
    }
}

/// The coin-flip posterior `f(p) = 2p` on `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoinPosterior;

impl CoinPosterior {
    /// Density at `p`; zero off the unit interval.
    pub fn density<T: Float>(&self, p: T) -> T {
        if self.in_support(p) {
            p + p
        } else {
            T::zero()
        }
    }

    /// `true` if `p` lies in `[0, 1]`.
    pub fn in_support<T: Float>(&self, p: T) -> bool {
        p >= T::zero() && p <= T::one()
    }

    /// Cumulative distribution `p²`, clamped to `[0, 1]`.
    pub fn cdf<T: Float>(&self, p: T) -> T {
        let p = p.max(T::zero()).min(T::one());
        p * p
    }

    /// Quantile function `√u`.
    pub fn inverse_cdf<T: Float>(&self, u: T) -> T {
        u.max(T::zero()).sqrt()
    }

    /// Posterior mean, `2/3`.
    pub fn mean<T: Float>(&self) -> T {
        let two = T::one() + T::one();
        two / (two + T::one())
    }

    /// Draws an exact sample by inverting the CDF.
    pub fn sample<T: Float, R: UniformSource<T> + ?Sized>(&self, source: &mut R) -> T {
        self.inverse_cdf(source.next_uniform())
    }
}

/**
A symmetric uniform perturbation of total span `width`, reflected into `[0, 1]`.

The step is `width · (u − 0.5)` for a deviate `u ∈ [0, 1)`, i.e. uniform on
`[−width/2, width/2)`.

```rust
use reflect_mcmc::distributions::ReflectingUniform;

let kernel = ReflectingUniform::new(0.4f64);
assert!((kernel.delta(1.0) - 0.2).abs() < 1e-12);
assert!((kernel.propose(0.9, 1.0) - 0.9).abs() < 1e-12);
```
*/
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectingUniform<T = f64> {
    pub width: T,
}

impl<T: Float> ReflectingUniform<T> {
    pub fn new(width: T) -> Self {
        Self { width }
    }

    /// Maps a deviate `u ∈ [0, 1)` to a step in `[−width/2, width/2)`.
    pub fn delta(&self, u: T) -> T {
        let half = T::one() / (T::one() + T::one());
        self.width * (u - half)
    }

    /// Proposal for state `x` given deviate `u`: perturb, then reflect.
    pub fn propose(&self, x: T, u: T) -> T {
        reflect(x + self.delta(u))
    }

    /// Draws a proposal for `x` from `source`.
    pub fn sample<R: UniformSource<T> + ?Sized>(&self, x: T, source: &mut R) -> T {
        self.propose(x, source.next_uniform())
    }
}
