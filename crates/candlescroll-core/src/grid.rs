// File: crates/candlescroll-core/src/grid.rs
// Summary: Grid/tick layout helpers for value and time axes.

pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    if steps < 2 { return vec![start, end]; }
    let step = (end - start) / (steps as f64 - 1.0);
    (0..steps).map(|i| start + step * i as f64).collect()
}

/// Time ticks on whole multiples of a "nice" interval, at most `max_ticks` of them.
pub fn time_ticks(t0: f64, t1: f64, max_ticks: usize) -> Vec<f64> {
    const NICE: [f64; 12] = [
        60.0, 300.0, 900.0, 1800.0, 3600.0, 7200.0, 14400.0, 21600.0, 43200.0, 86400.0, 172800.0, 604800.0,
    ];
    if !(t0.is_finite() && t1.is_finite()) || t1 <= t0 || max_ticks == 0 {
        return Vec::new();
    }
    let span = t1 - t0;
    let interval = NICE
        .iter()
        .copied()
        .find(|i| span / i <= max_ticks as f64)
        .unwrap_or_else(|| (span / max_ticks as f64).ceil());
    let mut t = (t0 / interval).ceil() * interval;
    let mut out = Vec::new();
    while t <= t1 {
        out.push(t);
        t += interval;
    }
    out
}
