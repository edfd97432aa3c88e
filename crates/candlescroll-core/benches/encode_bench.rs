use candlescroll_core::encode::encode;
use candlescroll_core::series::Bar;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, black_box};

fn gen_bars(n: usize) -> Vec<Bar> {
    let mut v = Vec::with_capacity(n);
    let mut price = 100.0f64;
    for i in 0..n {
        let o = price;
        let c = if i % 3 == 0 { o - 0.4 } else { o + 0.3 };
        let bar = Bar::try_new(60.0 * i as f64, o, o.max(c) + 1.0, o.min(c) - 1.0, c);
        if let Ok(bar) = bar {
            v.push(bar);
        }
        price = c;
    }
    v
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for &n in &[100usize, 1_000, 10_000] {
        let data = gen_bars(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, d| {
            b.iter(|| black_box(encode(d, 26.0)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
