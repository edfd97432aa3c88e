// File: crates/candlescroll-core/src/encode.rs
// Summary: Candle-to-geometry encoding; a bar batch becomes one fragment per color class.
//
// Group layout, one per bar (x grows right, y grows up):
//
//        d1
//        |         upper wick: body top -> high
//   d0 +---+ d2
//      |   |       body: closed rectangle, 5 vertices
//      +---+
//        |         lower wick: body bottom -> low
//
// d0 = t, d1 = t + width / 2, d2 = t + width.

use crate::error::ChartError;
use crate::geometry::{PathCode, Point};
use crate::series::{Bar, BarClass};

/// Vertices per encoded bar.
pub const GROUP_LEN: usize = 9;

/// Stroke commands for one group; repeated for every group of a buffer.
pub const GROUP_CODES: [PathCode; GROUP_LEN] = [
    PathCode::MoveTo,
    PathCode::LineTo,
    PathCode::LineTo,
    PathCode::LineTo,
    PathCode::LineTo,
    PathCode::MoveTo,
    PathCode::LineTo,
    PathCode::MoveTo,
    PathCode::LineTo,
];

/// The 9 vertices encoding one bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandleGroup {
    pub points: [Point; GROUP_LEN],
}

impl CandleGroup {
    pub fn encode(bar: &Bar, body_width: f64) -> Self {
        let d0 = bar.t;
        let d1 = bar.t + body_width * 0.5;
        let d2 = bar.t + body_width;
        let top = bar.body_top();
        let bottom = bar.body_bottom();
        Self {
            points: [
                Point::new(d0, bottom),
                Point::new(d0, top),
                Point::new(d2, top),
                Point::new(d2, bottom),
                Point::new(d0, bottom),
                Point::new(d1, top),
                Point::new(d1, bar.h),
                Point::new(d1, bottom),
                Point::new(d1, bar.l),
            ],
        }
    }

    /// Group-start key: x of the first vertex, which is the bar time.
    #[inline]
    pub fn key(&self) -> f64 { self.points[0].x }
}

/// Encoded bars of a single class, ascending by time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CandleFragment {
    pub groups: Vec<CandleGroup>,
}

impl CandleFragment {
    pub fn len(&self) -> usize { self.groups.len() }
    pub fn is_empty(&self) -> bool { self.groups.is_empty() }
    pub fn first_key(&self) -> Option<f64> { self.groups.first().map(CandleGroup::key) }
    pub fn last_key(&self) -> Option<f64> { self.groups.last().map(CandleGroup::key) }
}

/// Result of encoding a batch: one optional fragment per class.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedBatch {
    pub bullish: Option<CandleFragment>,
    pub bearish: Option<CandleFragment>,
}

impl EncodedBatch {
    pub fn get(&self, class: BarClass) -> Option<&CandleFragment> {
        match class {
            BarClass::Bullish => self.bullish.as_ref(),
            BarClass::Bearish => self.bearish.as_ref(),
        }
    }

    pub fn take(&mut self, class: BarClass) -> Option<CandleFragment> {
        match class {
            BarClass::Bullish => self.bullish.take(),
            BarClass::Bearish => self.bearish.take(),
        }
    }
}

/// Encode an ordered batch. Classes with no bars come back as `None`.
pub fn encode(bars: &[Bar], body_width: f64) -> Result<EncodedBatch, ChartError> {
    crate::series::check_ascending(bars)?;
    let mut bullish = Vec::new();
    let mut bearish = Vec::new();
    for bar in bars {
        let group = CandleGroup::encode(bar, body_width);
        match bar.class() {
            BarClass::Bullish => bullish.push(group),
            BarClass::Bearish => bearish.push(group),
        }
    }
    let wrap = |groups: Vec<CandleGroup>| {
        if groups.is_empty() { None } else { Some(CandleFragment { groups }) }
    };
    Ok(EncodedBatch { bullish: wrap(bullish), bearish: wrap(bearish) })
}
