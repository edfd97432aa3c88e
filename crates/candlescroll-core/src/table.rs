// File: crates/candlescroll-core/src/table.rs
// Summary: Row table with its derived time index; every read the data window manager offers.

use crate::error::ChartError;
use crate::series::{check_ascending, Bar};
use crate::window::RowWindow;

/// Bars ascending by time plus the time index derived from them.
#[derive(Clone, Debug, Default)]
pub struct BarTable {
    bars: Vec<Bar>,
    times: Vec<f64>,
}

impl BarTable {
    pub fn new(bars: Vec<Bar>) -> Result<Self, ChartError> {
        check_ascending(&bars)?;
        let times = bars.iter().map(|b| b.t).collect();
        Ok(Self { bars, times })
    }

    pub fn len(&self) -> usize { self.bars.len() }
    pub fn is_empty(&self) -> bool { self.bars.is_empty() }
    pub fn bars(&self) -> &[Bar] { &self.bars }
    pub fn times(&self) -> &[f64] { &self.times }

    /// Index of the last row, `None` for an empty table.
    pub fn max_index(&self) -> Option<usize> { self.bars.len().checked_sub(1) }

    pub fn rows(&self, range: RowWindow) -> &[Bar] {
        let r = range.clamp_to(self.bars.len());
        &self.bars[r.start..r.end]
    }

    pub fn times_in(&self, range: RowWindow) -> &[f64] {
        let r = range.clamp_to(self.times.len());
        &self.times[r.start..r.end]
    }

    /// Rows whose time lies in `[t0, t1]`, by binary search over the time index.
    pub fn locate(&self, t0: f64, t1: f64) -> Option<RowWindow> {
        let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        let start = self.times.partition_point(|&t| t < t0);
        let end = self.times.partition_point(|&t| t <= t1);
        if start < end { Some(RowWindow::new(start, end)) } else { None }
    }

    /// Row whose time is closest to `t`; ties go to the earlier row.
    pub fn nearest_row(&self, t: f64) -> Option<usize> {
        if self.times.is_empty() || !t.is_finite() {
            return None;
        }
        let i = self.times.partition_point(|&x| x < t);
        if i == 0 {
            return Some(0);
        }
        if i == self.times.len() {
            return Some(i - 1);
        }
        if (t - self.times[i - 1]) <= (self.times[i] - t) { Some(i - 1) } else { Some(i) }
    }

    /// (min, max) over open/high/low/close in `range`; `None` when empty or flat.
    pub fn y_limits(&self, range: RowWindow) -> Option<(f64, f64)> {
        let rows = self.rows(range);
        let lo = rows.iter().map(Bar::min_price).fold(f64::INFINITY, f64::min);
        let hi = rows.iter().map(Bar::max_price).fold(f64::NEG_INFINITY, f64::max);
        if rows.is_empty() || lo == hi { None } else { Some((lo, hi)) }
    }

    /// Append a batch that continues the table in ascending order.
    /// The table is left untouched when the batch is rejected.
    pub fn append(&mut self, batch: &[Bar]) -> Result<(), ChartError> {
        check_ascending(batch)?;
        if let (Some(last), Some(first)) = (self.times.last(), batch.first()) {
            if first.t <= *last {
                return Err(ChartError::Unordered { index: self.bars.len(), prev: *last, next: first.t });
            }
        }
        self.bars.extend_from_slice(batch);
        self.times.extend(batch.iter().map(|b| b.t));
        Ok(())
    }
}
