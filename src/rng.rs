/*!
Sources of uniform deviates on `[0, 1)`.

The sampler never talks to a generator directly; it asks a [`UniformSource`] for the
next deviate. Every [`rand::RngCore`] is a source, so `SmallRng`, `StdRng` or
`thread_rng()` all plug in unchanged. [`ReplaySource`] feeds back a fixed list of
draws, which makes a chain fully reproducible from the draws alone.

```rust
use reflect_mcmc::rng::{ReplaySource, UniformSource};

let mut source = ReplaySource::new(vec![0.25, 0.75]);
assert_eq!(source.next_uniform(), 0.25);
assert_eq!(source.next_uniform(), 0.75);
assert_eq!(source.next_uniform(), 0.25);
```
*/

use num_traits::Float;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Standard};

/// Something that yields independent uniform deviates on `[0, 1)`.
pub trait UniformSource<T: Float = f64> {
    /// Returns the next deviate.
    fn next_uniform(&mut self) -> T;
}

impl<T, R> UniformSource<T> for R
where
    T: Float,
    R: RngCore,
    Standard: Distribution<T>,
{
    fn next_uniform(&mut self) -> T {
        self.sample(Standard)
    }
}

/// Replays a recorded sequence of deviates, wrapping around at the end.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySource<T = f64> {
    draws: Vec<T>,
    cursor: usize,
}

impl<T: Float> ReplaySource<T> {
    /// Creates a source from `draws`. An empty list replays zeros.
    pub fn new(draws: Vec<T>) -> Self {
        Self { draws, cursor: 0 }
    }

    /// Number of deviates handed out so far.
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl<T: Float> UniformSource<T> for ReplaySource<T> {
    fn next_uniform(&mut self) -> T {
        if self.draws.is_empty() {
            return T::zero();
        }
        let u = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        u
    }
}
