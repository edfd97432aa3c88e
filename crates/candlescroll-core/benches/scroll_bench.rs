use candlescroll_core::updater::{CandleLayers, Direction, WindowShift};
use candlescroll_core::window::{plan_step, RowWindow, WindowDelta};
use candlescroll_core::{Bar, BarTable};
use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, black_box};

fn gen_table(n: usize) -> BarTable {
    let bars = (0..n)
        .filter_map(|i| {
            let o = 100.0 + (i % 13) as f64;
            let c = 100.0 + (i % 17) as f64;
            Bar::try_new(60.0 * i as f64, o, o.max(c) + 1.0, o.min(c) - 1.0, c).ok()
        })
        .collect();
    BarTable::new(bars).expect("ascending bars")
}

fn bench_slide(c: &mut Criterion) {
    let table = gen_table(20_000);
    let max = table.len() - 1;
    let mut group = c.benchmark_group("slide_vs_reencode");
    for &span in &[100usize, 1_000] {
        let start = RowWindow::new(5_000, 5_000 + span);
        let layers = CandleLayers::from_bars(table.rows(start), 26.0).expect("layers");
        group.bench_with_input(BenchmarkId::new("slide", span), &span, |b, &span| {
            b.iter_batched(
                || layers.clone(),
                |mut l| {
                    let step = span / 10;
                    if let Some(next) = plan_step(start, Direction::Forward, step, span, max) {
                        let d = WindowDelta::between(start, next, Direction::Forward);
                        let shift = WindowShift {
                            direction: Direction::Forward,
                            entering: table.rows(d.entering),
                            exiting: table.times_in(d.exiting),
                        };
                        let _ = black_box(l.apply(&shift));
                    }
                },
                BatchSize::SmallInput,
            );
        });
        group.bench_with_input(BenchmarkId::new("reencode", span), &span, |b, &span| {
            let next = RowWindow::new(start.start + span / 10, start.end + span / 10);
            b.iter(|| black_box(CandleLayers::from_bars(table.rows(next), 26.0)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_slide);
criterion_main!(benches);
