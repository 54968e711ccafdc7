use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use reflect_mcmc::core::ChainRunner;
use reflect_mcmc::metropolis::{CoinChains, CoinSampler, SamplerConfig};

fn bench_transition(c: &mut Criterion) {
    let mut sampler = CoinSampler::new(SamplerConfig::default())
        .unwrap()
        .set_seed(42);
    c.bench_function("transition", |b| b.iter(|| black_box(sampler.transition())));
}

fn bench_reference_run(c: &mut Criterion) {
    c.bench_function("run 100k", |b| {
        b.iter_batched(
            || {
                CoinSampler::new(SamplerConfig::default())
                    .unwrap()
                    .set_seed(42)
            },
            |mut sampler| black_box(sampler.run()),
            BatchSize::SmallInput,
        )
    });
}

fn bench_parallel_chains(c: &mut Criterion) {
    let config = SamplerConfig::new(0.5, 0.4, 10_001).unwrap();
    c.bench_function("8 chains x 10k", |b| {
        b.iter_batched(
            || CoinChains::new(config, 8).unwrap().set_seed(42),
            |mut chains| black_box(chains.run(10_000, 0).unwrap()),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_transition, bench_reference_run, bench_parallel_chains);
criterion_main!(benches);
