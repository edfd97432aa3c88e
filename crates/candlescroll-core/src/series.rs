// File: crates/candlescroll-core/src/series.rs
// Summary: Bar (one OHLC row), its bullish/bearish class, and time-keyed line series.

use crate::error::ChartError;

/// Color class of a bar. Bullish when the close is at or above the open.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BarClass {
    Bullish,
    Bearish,
}

impl BarClass {
    pub const ALL: [BarClass; 2] = [BarClass::Bullish, BarClass::Bearish];

    pub fn name(self) -> &'static str {
        match self {
            BarClass::Bullish => "bullish",
            BarClass::Bearish => "bearish",
        }
    }
}

/// One OHLC row. `t` is the time coordinate in epoch seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub t: f64,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
}

impl Bar {
    /// Construct a bar enforcing OHLC invariants:
    /// all fields finite, l <= min(o,c), h >= max(o,c).
    pub fn try_new(t: f64, o: f64, h: f64, l: f64, c: f64) -> Result<Self, ChartError> {
        if ![t, o, h, l, c].iter().all(|v| v.is_finite()) {
            return Err(ChartError::InvalidBar { t, reason: "non-finite field" });
        }
        if l > o.min(c) {
            return Err(ChartError::InvalidBar { t, reason: "low above min(open,close)" });
        }
        if h < o.max(c) {
            return Err(ChartError::InvalidBar { t, reason: "high below max(open,close)" });
        }
        Ok(Self { t, o, h, l, c })
    }

    #[inline]
    pub fn class(&self) -> BarClass {
        if self.c >= self.o { BarClass::Bullish } else { BarClass::Bearish }
    }

    #[inline]
    pub fn body_top(&self) -> f64 { self.o.max(self.c) }

    #[inline]
    pub fn body_bottom(&self) -> f64 { self.o.min(self.c) }

    /// Smallest of open/high/low/close.
    #[inline]
    pub fn min_price(&self) -> f64 { self.o.min(self.h).min(self.l).min(self.c) }

    /// Largest of open/high/low/close.
    #[inline]
    pub fn max_price(&self) -> f64 { self.o.max(self.h).max(self.l).max(self.c) }
}

/// Check that bar times are finite and strictly ascending.
pub fn check_ascending(bars: &[Bar]) -> Result<(), ChartError> {
    for (index, bar) in bars.iter().enumerate() {
        if !bar.t.is_finite() {
            return Err(ChartError::NonFiniteTime { index });
        }
        if index > 0 && bars[index - 1].t >= bar.t {
            return Err(ChartError::Unordered { index, prev: bars[index - 1].t, next: bar.t });
        }
    }
    Ok(())
}

/// A numeric series keyed by bar time, e.g. one indicator output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineSeries {
    pub name: &'static str,
    pub points: Vec<(f64, f64)>,
}

impl LineSeries {
    pub fn new(name: &'static str, points: Vec<(f64, f64)>) -> Self {
        Self { name, points }
    }

    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    /// Keep only the points whose time falls inside `[t0, t1]`.
    pub fn clip_to(mut self, t0: f64, t1: f64) -> Self {
        self.points.retain(|&(t, _)| t >= t0 && t <= t1);
        self
    }

    /// (min, max) over the finite values, `None` when there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &(_, v) in &self.points {
            if v.is_finite() {
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if lo.is_finite() { Some((lo, hi)) } else { None }
    }
}
