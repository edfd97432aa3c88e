// File: crates/candlescroll-core/src/updater.rs
// Summary: Incremental window updater; slides the bullish and bearish buffers by whole groups.

use crate::buffer::{Edge, GeometryBuffer};
use crate::encode::{encode, CandleFragment, EncodedBatch};
use crate::error::ChartError;
use crate::geometry::StrokePath;
use crate::series::{Bar, BarClass};

/// Direction of travel of the visible window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Toward newer time.
    Forward,
    /// Toward older time.
    Backward,
}

impl Direction {
    fn leading_edge(self) -> Edge {
        match self {
            Direction::Forward => Edge::Back,
            Direction::Backward => Edge::Front,
        }
    }
}

/// One window shift as seen by the geometry layer.
#[derive(Clone, Debug)]
pub struct WindowShift<'a> {
    pub direction: Direction,
    /// Bars becoming visible, ascending.
    pub entering: &'a [Bar],
    /// Times of the rows leaving the window, ascending; classes mixed.
    pub exiting: &'a [f64],
}

/// What happened to one class's buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerChange {
    /// No group entered or left.
    Untouched,
    /// The buffer changed and already had a visual element.
    Replaced(StrokePath),
    /// The buffer was empty before; a new element is needed.
    Created(StrokePath),
    /// The buffer is now empty.
    Cleared,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayerUpdate {
    pub bullish: LayerChange,
    pub bearish: LayerChange,
}

impl LayerUpdate {
    pub fn get(&self, class: BarClass) -> &LayerChange {
        match class {
            BarClass::Bullish => &self.bullish,
            BarClass::Bearish => &self.bearish,
        }
    }
}

/// Owns the two live buffers.
#[derive(Clone, Debug, PartialEq)]
pub struct CandleLayers {
    body_width: f64,
    bullish: GeometryBuffer,
    bearish: GeometryBuffer,
}

impl CandleLayers {
    /// Full encode of an initial window.
    pub fn from_bars(bars: &[Bar], body_width: f64) -> Result<Self, ChartError> {
        let EncodedBatch { bullish, bearish } = encode(bars, body_width)?;
        let build = |f: Option<CandleFragment>| f.map(GeometryBuffer::from_fragment).transpose().map(Option::unwrap_or_default);
        Ok(Self { body_width, bullish: build(bullish)?, bearish: build(bearish)? })
    }

    pub fn body_width(&self) -> f64 { self.body_width }

    pub fn buffer(&self, class: BarClass) -> &GeometryBuffer {
        match class {
            BarClass::Bullish => &self.bullish,
            BarClass::Bearish => &self.bearish,
        }
    }

    fn buffer_mut(&mut self, class: BarClass) -> &mut GeometryBuffer {
        match class {
            BarClass::Bullish => &mut self.bullish,
            BarClass::Bearish => &mut self.bearish,
        }
    }

    /// Apply a shift: encode only the entering bars, trim whole exiting groups per class.
    /// Either both buffers are updated or, on error, neither is.
    pub fn apply(&mut self, shift: &WindowShift<'_>) -> Result<LayerUpdate, ChartError> {
        let mut batch = encode(shift.entering, self.body_width)?;
        let (lo, hi) = match (shift.exiting.first(), shift.exiting.last()) {
            (Some(&lo), Some(&hi)) => (lo, hi),
            _ => (f64::INFINITY, f64::NEG_INFINITY),
        };
        let edge = shift.direction.leading_edge();

        let mut plans = Vec::with_capacity(2);
        for class in BarClass::ALL {
            let drop = self.buffer(class).count_in_range(lo, hi);
            let fragment = batch.take(class);
            if drop == 0 && fragment.is_none() {
                continue;
            }
            self.buffer(class).check_slide(edge, drop, fragment.as_ref())?;
            plans.push((class, drop, fragment));
        }

        let mut update = LayerUpdate { bullish: LayerChange::Untouched, bearish: LayerChange::Untouched };
        for (class, drop, fragment) in plans {
            let buffer = self.buffer_mut(class);
            let was_empty = buffer.is_empty();
            buffer.slide(edge, drop, fragment)?;
            log::trace!("{} layer: -{} groups, {} after slide", class.name(), drop, buffer.len());
            let change = match (was_empty, buffer.to_path()) {
                (_, None) => LayerChange::Cleared,
                (true, Some(path)) => LayerChange::Created(path),
                (false, Some(path)) => LayerChange::Replaced(path),
            };
            match class {
                BarClass::Bullish => update.bullish = change,
                BarClass::Bearish => update.bearish = change,
            }
        }
        Ok(update)
    }
}
