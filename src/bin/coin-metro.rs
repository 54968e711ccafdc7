//! Runs the coin-flip Metropolis sampler and prints the classic progress table.
//!
//! ```text
//! coin-metro --iterations 100000 --width 0.4 --seed 42
//! coin-metro --chains 8 --progress
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use ndarray::Array2;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use reflect_mcmc::core::ChainRunner;
use reflect_mcmc::metropolis::{CoinChains, CoinSampler, SamplerConfig};
use reflect_mcmc::report::{self, run_with_observer, ReportRow, DEFAULT_REPORT_EVERY};

/// Metropolis sampling of Pr[p | heads] = 2p with a reflecting uniform proposal.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Starting value of the chain, in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    initial_state: f64,

    /// Total span of the uniform proposal step.
    #[arg(long, default_value_t = 0.4)]
    width: f64,

    /// Length of the run; the chain advances iterations 1 .. ITERATIONS.
    #[arg(long, default_value_t = 100_000)]
    iterations: usize,

    /// Seed for the generator. Drawn from entropy when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Print a row every this many iterations.
    #[arg(long, default_value_t = DEFAULT_REPORT_EVERY)]
    report_every: usize,

    /// Run this many independent chains in parallel and print one summary per chain.
    #[arg(long, default_value_t = 1)]
    chains: usize,

    /// Show progress bars when running several chains.
    #[arg(long)]
    progress: bool,

    /// Write the report rows (one chain) or the full trace (several chains) to this file.
    #[cfg(feature = "csv")]
    #[arg(long)]
    csv: Option<String>,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "coin_metro=info,reflect_mcmc=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_single(args: &Args, config: SamplerConfig) -> Result<()> {
    let mut sampler = CoinSampler::new(config)?;
    if let Some(seed) = args.seed {
        sampler = sampler.set_seed(seed);
    }
    info!(seed = ?sampler.seed, "running a single chain");

    println!("{}", report::header());
    let mut rows: Vec<ReportRow> = Vec::new();
    let mut print = |row: &ReportRow| {
        println!("{row}");
        rows.push(*row);
    };
    let summary = run_with_observer(&mut sampler, args.report_every, &mut print)?;
    println!("\n{}", report::TRAILER);

    info!(
        accepted = summary.accepted,
        acceptance_rate = summary.acceptance_rate,
        mean = ?summary.mean,
        "chain finished"
    );

    save_rows(args, &rows)
}

fn run_chains(args: &Args, config: SamplerConfig) -> Result<()> {
    let mut chains = CoinChains::new(config, args.chains)?;
    if let Some(seed) = args.seed {
        chains = chains.set_seed(seed);
    }
    info!(n_chains = args.chains, seed = chains.seed, "running chains in parallel");

    let n_collect = config.iteration_count - 1;
    let trace = if args.progress {
        chains.run_progress(n_collect, 0)
    } else {
        chains.run(n_collect, 0)
    }
    .context("stacking chain traces")?;

    println!("{:>7} {:>10} {:>10} {:>10}", "chain", "x", "mean", "nacpt");
    for (i, summary) in chains.summaries().iter().enumerate() {
        println!(
            "{:7} {:10.6} {:10.6} {:10}",
            i,
            summary.final_state,
            summary.mean.unwrap_or(f64::NAN),
            summary.accepted
        );
    }
    if let Some(pooled) = trace.mean() {
        println!("\npooled mean {pooled:.6}");
    }
    println!("\n{}", report::TRAILER);

    save_trace(args, &trace)
}

#[cfg(feature = "csv")]
fn save_rows(args: &Args, rows: &[ReportRow]) -> Result<()> {
    if let Some(path) = &args.csv {
        reflect_mcmc::io::csv::save_report_csv(rows, path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("writing report to {path}"))?;
        info!(path = %path, rows = rows.len(), "saved report");
    }
    Ok(())
}

#[cfg(not(feature = "csv"))]
fn save_rows(_args: &Args, _rows: &[ReportRow]) -> Result<()> {
    Ok(())
}

#[cfg(feature = "csv")]
fn save_trace(args: &Args, trace: &Array2<f64>) -> Result<()> {
    if let Some(path) = &args.csv {
        reflect_mcmc::io::csv::save_csv(trace, path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("writing trace to {path}"))?;
        info!(path = %path, "saved trace");
    }
    Ok(())
}

#[cfg(not(feature = "csv"))]
fn save_trace(_args: &Args, _trace: &Array2<f64>) -> Result<()> {
    Ok(())
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let config = SamplerConfig::new(args.initial_state, args.width, args.iterations)
        .context("invalid sampler configuration")?;
    if config.width > 2.0 {
        warn!(
            width = config.width,
            "proposals wider than 2 can escape a single reflection and will be rejected"
        );
    }

    match args.chains {
        0 => anyhow::bail!("--chains must be at least 1"),
        1 => run_single(&args, config),
        _ => run_chains(&args, config),
    }
}
