// File: crates/evolution-core/benches/pipeline_bench.rs
// Purpose: Cost of a full data replacement: normalize, stack, rescale, reconcile, settle, frame.

use evolution_core::{Chart, Dataset, PartialOptions, Sample};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, black_box};

fn gen_dataset(series: usize, n: usize) -> Dataset {
    let raw = (0..series)
        .map(|k| {
            (0..n)
                .map(|i| {
                    let x = 1_700_000_000.0 + 60.0 * i as f64;
                    // gaps every 97 samples, offset per series
                    if (i + k * 13) % 97 == 0 {
                        Sample::gap(x)
                    } else {
                        Sample::value(x, ((i as f64 * 0.01 + k as f64).sin() + 1.5) * 100.0)
                    }
                })
                .collect()
        })
        .collect::<Vec<Vec<Sample>>>();
    Dataset::from(raw)
}

fn bench_set_data(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_data");
    for opts in [r#"{"type":"line"}"#, r#"{"type":"area","convert":"percentage"}"#, r#"{"type":"area","yScale":"log"}"#] {
        let partial = PartialOptions::from_json(opts).unwrap();
        for &n in &[1_000usize, 10_000usize] {
            let data = gen_dataset(5, n);
            let label = format!("{}_n{n}", opts.trim_matches(|c| c == '{' || c == '}').replace('"', ""));
            group.bench_with_input(BenchmarkId::from_parameter(label), &n, |b, _| {
                b.iter_batched(
                    || (Chart::new("bench", &partial).unwrap(), data.clone()),
                    |(mut chart, d)| {
                        chart.set_data(d).settle();
                        black_box(chart.frame());
                    },
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn bench_frame(c: &mut Criterion) {
    let mut chart = Chart::new("bench", &PartialOptions::from_json(r#"{"type":"area"}"#).unwrap()).unwrap();
    chart.set_data(gen_dataset(5, 5_000));
    chart.advance(300.0);
    c.bench_function("frame_mid_transition", |b| b.iter(|| black_box(chart.frame())));
}

criterion_group!(benches, bench_set_data, bench_frame);
criterion_main!(benches);
