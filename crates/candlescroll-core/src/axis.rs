// File: crates/candlescroll-core/src/axis.rs
// Summary: Axis model with labels and ranges; time labels for the x axis.

use chrono::DateTime;

/// Label format for time ticks, day/hour:minute.
pub const TIME_FORMAT: &str = "%d/%H:%M";

#[derive(Clone, Debug, PartialEq)]
pub struct Axis {
    pub label: String,
    pub min: f64,
    pub max: f64,
}

impl Axis {
    pub fn new(label: impl Into<String>, min: f64, max: f64) -> Self {
        Self { label: label.into(), min, max }
    }

    pub fn default_x() -> Self { Self::new("Time", 0.0, 10.0) }

    pub fn default_y() -> Self { Self::new("Price", 0.0, 100.0) }

    pub fn range(&self) -> (f64, f64) { (self.min, self.max) }

    /// Span guarded against zero for pixel math.
    pub fn span(&self) -> f64 { (self.max - self.min).max(1e-9) }
}

/// Format an epoch-seconds time coordinate with `TIME_FORMAT` (UTC).
pub fn format_time(t: f64) -> String {
    if !t.is_finite() {
        return String::from("-");
    }
    let secs = t.floor() as i64;
    let nanos = ((t - t.floor()) * 1e9) as u32;
    match DateTime::from_timestamp(secs, nanos) {
        Some(dt) => dt.format(TIME_FORMAT).to_string(),
        None => format!("{t:.0}"),
    }
}
