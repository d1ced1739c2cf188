//! Benchmarks for the indicator engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use candlewise::prelude::*;

fn generate_bars(n: usize) -> Vec<PriceBar> {
  (0..n)
    .map(|i| {
      let c = 100.0 + (i as f64 * 0.05).sin() * 10.0 + ((i * 7) % 13) as f64 * 0.1;
      PriceBar::new(c - 0.3, c + 1.0, c - 1.0, c, 1000.0 + (i % 50) as f64 * 20.0)
    })
    .collect()
}

fn bench_moving_averages(c: &mut Criterion) {
  let bars = generate_bars(1000);

  let mut group = c.benchmark_group("moving_averages_1000_bars");
  group.bench_function("sma_20", |b| b.iter(|| black_box(indicators::sma(black_box(&bars), 20))));
  group.bench_function("ema_20", |b| b.iter(|| black_box(indicators::ema(black_box(&bars), 20))));
  group.bench_function("tema_20", |b| b.iter(|| black_box(indicators::tema(black_box(&bars), 20))));
  group.bench_function("hma_20", |b| b.iter(|| black_box(indicators::hma(black_box(&bars), 20))));
  group.finish();
}

fn bench_composites(c: &mut Criterion) {
  let bars = generate_bars(1000);

  let mut group = c.benchmark_group("composites_1000_bars");
  group.bench_function("bollinger", |b| {
    b.iter(|| black_box(indicators::bollinger(black_box(&bars), 20, 2.0)))
  });
  group.bench_function("macd", |b| b.iter(|| black_box(indicators::macd(black_box(&bars), 12, 26, 9))));
  group.bench_function("adx", |b| b.iter(|| black_box(indicators::adx(black_box(&bars), 14))));
  group.bench_function("supertrend", |b| {
    b.iter(|| black_box(indicators::supertrend(black_box(&bars), 10, 3.0)))
  });
  group.bench_function("ichimoku", |b| {
    b.iter(|| black_box(indicators::ichimoku(black_box(&bars), 9, 26, 52, 26)))
  });
  group.finish();
}

fn bench_scaling(c: &mut Criterion) {
  let mut group = c.benchmark_group("indicator_scaling");

  for size in [100, 1000, 10000].iter() {
    let bars = generate_bars(*size);

    group.bench_with_input(BenchmarkId::new("rsi_14", size), size, |b, _| {
      b.iter(|| black_box(indicators::rsi(black_box(&bars), 14)))
    });
  }

  group.finish();
}

fn bench_batch(c: &mut Criterion) {
  let bars = generate_bars(1000);
  let configs: Vec<IndicatorConfig> = IndicatorKind::ALL.iter().map(|k| k.default_config()).collect();

  c.bench_function("compute_batch_all_defaults", |b| {
    b.iter(|| black_box(compute_batch(black_box(&bars), black_box(&configs))))
  });

  c.bench_function("compute_sequential_all_defaults", |b| {
    b.iter(|| {
      black_box(configs.iter().map(|config| config.compute(black_box(&bars))).collect::<Vec<_>>())
    })
  });
}

criterion_group!(benches, bench_moving_averages, bench_composites, bench_scaling, bench_batch);

criterion_main!(benches);
