/*!
Progress reporting for a coin sampler.

The sampler itself never prints. [`run_with_observer`] drives it and hands a
[`ReportRow`] to an [`Observer`] every `every` iterations and once more for the final
iteration. Rows render as fixed-width text:

```text
     it          x       mean      nacpt
    100   0.712345   0.654321         87
```

```rust
use reflect_mcmc::metropolis::{CoinSampler, SamplerConfig};
use reflect_mcmc::report::{run_with_observer, ReportRow};

let config = SamplerConfig::new(0.5, 0.4, 1_001)?;
let mut sampler = CoinSampler::new(config)?.set_seed(1);
let mut rows: Vec<ReportRow> = Vec::new();
run_with_observer(&mut sampler, 100, &mut rows)?;

assert_eq!(rows.len(), 10);
assert_eq!(rows[9].iteration, 1_000);
# Ok::<(), reflect_mcmc::errors::SamplerError>(())
```
*/

use std::fmt;

use tracing::info;

use crate::errors::{SamplerError, SamplerResult};
use crate::metropolis::CoinSampler;
use crate::rng::UniformSource;
use crate::stats::ChainSummary;

/// Default reporting cadence.
pub const DEFAULT_REPORT_EVERY: usize = 100;

/// Closing line of a report.
pub const TRAILER: &str = "Mean should converge to 2/3, density to 2*p";

/// Column titles, aligned with [`ReportRow`]'s `Display` output.
pub fn header() -> String {
    format!("{:>7} {:>10} {:>10} {:>10}", "it", "x", "mean", "nacpt")
}

/// One line of a report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportRow {
    pub iteration: usize,
    pub state: f64,
    pub running_mean: f64,
    pub accepted: usize,
}

impl ReportRow {
    /// Reads the row for the sampler's latest iteration.
    ///
    /// # Errors
    ///
    /// [`SamplerError::DivisionUndefined`] if the sampler has not moved yet.
    pub fn from_sampler<R: UniformSource<f64>>(sampler: &CoinSampler<R>) -> SamplerResult<Self> {
        let iteration = sampler.iteration();
        Ok(Self {
            iteration,
            state: sampler.state(),
            running_mean: sampler.running_mean(iteration)?,
            accepted: sampler.accepted_count(),
        })
    }
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:7} {:10.6} {:10.6} {:10}",
            self.iteration, self.state, self.running_mean, self.accepted
        )
    }
}

/// Receives report rows as the chain advances.
pub trait Observer {
    fn observe(&mut self, row: &ReportRow);
}

impl<F: FnMut(&ReportRow)> Observer for F {
    fn observe(&mut self, row: &ReportRow) {
        self(row)
    }
}

impl Observer for Vec<ReportRow> {
    fn observe(&mut self, row: &ReportRow) {
        self.push(*row);
    }
}

/// Advances `sampler` through the iterations left in `1 .. iteration_count` like
/// [`CoinSampler::run`], reporting every `every`-th iteration and the final one.
/// The final row is always iteration `iteration_count − 1`, however many steps the
/// sampler had taken before the call.
///
/// # Errors
///
/// [`SamplerError::InvalidParameter`] if `every` is zero.
pub fn run_with_observer<R, O>(
    sampler: &mut CoinSampler<R>,
    every: usize,
    observer: &mut O,
) -> SamplerResult<ChainSummary>
where
    R: UniformSource<f64>,
    O: Observer + ?Sized,
{
    if every == 0 {
        return Err(SamplerError::InvalidParameter {
            name: "report_every",
            value: 0.0,
            reason: "must be at least 1",
        });
    }

    let last = sampler.last_iteration();
    while sampler.iteration() < last {
        let t = sampler.transition();
        if t.iteration % every == 0 || t.iteration == last {
            observer.observe(&ReportRow::from_sampler(sampler)?);
        }
    }

    let summary = sampler.summary();
    info!(
        iterations = summary.iterations,
        accepted = summary.accepted,
        acceptance_rate = summary.acceptance_rate,
        "report finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metropolis::SamplerConfig;
    use crate::rng::ReplaySource;

    #[test]
    fn header_matches_column_widths() {
        assert_eq!(header(), "     it          x       mean      nacpt");
        let row = ReportRow {
            iteration: 100,
            state: 0.712_345_4,
            running_mean: 0.654_321,
            accepted: 87,
        };
        let line = row.to_string();
        assert_eq!(line, "    100   0.712345   0.654321         87");
        assert_eq!(line.len(), header().len());
    }

    #[test]
    fn row_before_first_iteration_is_an_error() {
        let sampler = CoinSampler::new(SamplerConfig::default()).unwrap();
        assert_eq!(
            ReportRow::from_sampler(&sampler),
            Err(SamplerError::DivisionUndefined)
        );
    }

    #[test]
    fn reports_every_nth_iteration_and_the_last() {
        let config = SamplerConfig::new(0.5, 0.4, 251).unwrap();
        let mut sampler = CoinSampler::new(config).unwrap().set_seed(2);
        let mut rows: Vec<ReportRow> = Vec::new();
        let summary = run_with_observer(&mut sampler, 100, &mut rows).unwrap();

        let iterations: Vec<usize> = rows.iter().map(|r| r.iteration).collect();
        assert_eq!(iterations, vec![100, 200, 250]);
        assert_eq!(summary.iterations, 250);
        let last = rows.last().unwrap();
        assert_eq!(last.state, summary.final_state);
        assert_eq!(Some(last.running_mean), summary.mean);
    }

    #[test]
    fn final_multiple_is_not_reported_twice() {
        let config = SamplerConfig::new(0.5, 0.4, 301).unwrap();
        let mut sampler = CoinSampler::new(config).unwrap().set_seed(2);
        let mut rows: Vec<ReportRow> = Vec::new();
        run_with_observer(&mut sampler, 100, &mut rows).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn resumed_run_ends_on_the_last_iteration() {
        let config = SamplerConfig::new(0.5, 0.4, 251).unwrap();
        let mut sampler = CoinSampler::new(config).unwrap().set_seed(4);
        for _ in 0..130 {
            sampler.transition();
        }
        let mut rows: Vec<ReportRow> = Vec::new();
        let summary = run_with_observer(&mut sampler, 100, &mut rows).unwrap();

        let iterations: Vec<usize> = rows.iter().map(|r| r.iteration).collect();
        assert_eq!(iterations, vec![200, 250]);
        assert_eq!(summary.iterations, 250);

        rows.clear();
        run_with_observer(&mut sampler, 100, &mut rows).unwrap();
        assert!(rows.is_empty());
        assert_eq!(sampler.iteration(), 250);
    }

    #[test]
    fn closures_observe_rows() {
        let config = SamplerConfig::new(0.5, 0.4, 11).unwrap();
        let mut sampler =
            CoinSampler::with_source(config, ReplaySource::new(vec![0.6, 0.3, 0.9])).unwrap();
        let mut lines = Vec::new();
        let mut print = |row: &ReportRow| lines.push(row.to_string());
        run_with_observer(&mut sampler, 5, &mut print).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("     10 "));
    }

    #[test]
    fn zero_cadence_is_rejected() {
        let mut sampler = CoinSampler::new(SamplerConfig::default()).unwrap();
        let mut rows: Vec<ReportRow> = Vec::new();
        assert!(run_with_observer(&mut sampler, 0, &mut rows).is_err());
        assert_eq!(sampler.iteration(), 0);
    }

    #[test]
    fn single_iteration_run_reports_nothing() {
        let config = SamplerConfig::new(0.5, 0.4, 1).unwrap();
        let mut sampler = CoinSampler::new(config).unwrap();
        let mut rows: Vec<ReportRow> = Vec::new();
        let summary = run_with_observer(&mut sampler, 100, &mut rows).unwrap();
        assert!(rows.is_empty());
        assert_eq!(summary.mean, None);
    }
}
