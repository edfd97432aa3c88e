// File: crates/candlescroll-core/src/indicator.rs
// Summary: Indicator trait with renderer-agnostic line outputs; SMA, MACD and stochastic.

use crate::series::{Bar, LineSeries};

/// Turns a run of bars into one or more time-keyed lines.
///
/// Outputs hold only the finite points; warm-up rows yield nothing.
pub trait Indicator {
    fn id(&self) -> &'static str;
    fn compute(&self, bars: &[Bar]) -> Vec<LineSeries>;
}

/// Simple moving average of closes.
#[derive(Clone, Copy, Debug)]
pub struct Sma {
    pub period: usize,
}

impl Default for Sma {
    fn default() -> Self { Self { period: 14 } }
}

impl Indicator for Sma {
    fn id(&self) -> &'static str { "sma" }

    fn compute(&self, bars: &[Bar]) -> Vec<LineSeries> {
        let closes: Vec<f64> = bars.iter().map(|b| b.c).collect();
        vec![keyed("sma", bars, &rolling_mean(&closes, self.period))]
    }
}

/// MACD: difference of two close EMAs, plus its EMA as the signal line.
#[derive(Clone, Copy, Debug)]
pub struct Macd {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for Macd {
    fn default() -> Self { Self { fast: 12, slow: 26, signal: 9 } }
}

impl Indicator for Macd {
    fn id(&self) -> &'static str { "macd" }

    /// Returns `[signal, macd]`.
    fn compute(&self, bars: &[Bar]) -> Vec<LineSeries> {
        let closes: Vec<f64> = bars.iter().map(|b| b.c).collect();
        let fast = ema(&closes, self.fast);
        let slow = ema(&closes, self.slow);
        let md: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema(&md, self.signal);
        vec![keyed("signal", bars, &signal), keyed("macd", bars, &md)]
    }
}

/// Stochastic oscillator. Highs and lows use separate lookbacks; %K is smoothed over
/// `period` rows and %D is the mean of %K over `d_period` rows.
#[derive(Clone, Copy, Debug)]
pub struct Stochastic {
    pub period: usize,
    pub high_window: usize,
    pub low_window: usize,
    pub d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self { Self { period: 14, high_window: 9, low_window: 36, d_period: 12 } }
}

impl Indicator for Stochastic {
    fn id(&self) -> &'static str { "stoch" }

    /// Returns `[%K, %D]`.
    fn compute(&self, bars: &[Bar]) -> Vec<LineSeries> {
        let highs: Vec<f64> = bars.iter().map(|b| b.h).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.l).collect();
        let hh = rolling_fold(&highs, self.high_window, f64::max);
        let ll = rolling_fold(&lows, self.low_window, f64::min);
        let raw: Vec<f64> = bars
            .iter()
            .zip(hh.iter().zip(&ll))
            .map(|(b, (h, l))| {
                let denom = h - l;
                if denom == 0.0 { f64::NAN } else { (b.c - l) / denom * 100.0 }
            })
            .collect();
        let k = rolling_mean(&raw, self.period);
        let d = rolling_mean(&k, self.d_period);
        vec![keyed("k", bars, &k), keyed("d", bars, &d)]
    }
}

fn keyed(name: &'static str, bars: &[Bar], values: &[f64]) -> LineSeries {
    let points = bars
        .iter()
        .zip(values)
        .filter(|(_, v)| v.is_finite())
        .map(|(b, v)| (b.t, *v))
        .collect();
    LineSeries::new(name, points)
}

/// Trailing mean over `window` values; NaN until the window is full or while it holds a NaN.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for i in window.saturating_sub(1)..values.len() {
        let w = &values[i + 1 - window..=i];
        if w.iter().all(|v| v.is_finite()) {
            out[i] = w.iter().sum::<f64>() / window as f64;
        }
    }
    out
}

fn rolling_fold(values: &[f64], window: usize, f: fn(f64, f64) -> f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for i in window.saturating_sub(1)..values.len() {
        let w = &values[i + 1 - window..=i];
        if let Some((first, rest)) = w.split_first() {
            out[i] = rest.iter().copied().fold(*first, f);
        }
    }
    out
}

/// Recursive exponential average with `alpha = 2 / (span + 1)`, seeded with the first value.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            Some(p) => alpha * v + (1.0 - alpha) * p,
            None => v,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}
