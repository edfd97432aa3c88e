// File: crates/candlescroll-core/src/view.rs
// Summary: Data-to-pixel mapping for one panel (x = time, y = value, y grows up).

use crate::axis::Axis;
use crate::geometry::{DataBounds, Point, RectI32};

#[derive(Clone, Copy, Debug)]
pub struct PlotMapping {
    pub rect: RectI32,
    pub x_min: f64,
    pub x_span: f64,
    pub y_min: f64,
    pub y_span: f64,
}

impl PlotMapping {
    pub fn new(rect: RectI32, x: &Axis, y: &Axis) -> Self {
        Self { rect, x_min: x.min, x_span: x.span(), y_min: y.min, y_span: y.span() }
    }

    #[inline]
    pub fn x_px(&self, x: f64) -> f32 {
        self.rect.left as f32 + ((x - self.x_min) / self.x_span) as f32 * self.rect.width() as f32
    }

    #[inline]
    pub fn y_px(&self, y: f64) -> f32 {
        self.rect.bottom as f32 - ((y - self.y_min) / self.y_span) as f32 * self.rect.height() as f32
    }

    #[inline]
    pub fn to_px(&self, p: Point) -> (f32, f32) { (self.x_px(p.x), self.y_px(p.y)) }

    /// Inverse of `x_px`, used to turn pointer positions into time coordinates.
    #[inline]
    pub fn x_data(&self, px: f32) -> f64 {
        self.x_min + ((px - self.rect.left as f32) / self.rect.width().max(1) as f32) as f64 * self.x_span
    }

    #[inline]
    pub fn y_data(&self, py: f32) -> f64 {
        self.y_min + ((self.rect.bottom as f32 - py) / self.rect.height().max(1) as f32) as f64 * self.y_span
    }

    pub fn contains_px(&self, px: f32, py: f32) -> bool {
        px >= self.rect.left as f32
            && px <= self.rect.right as f32
            && py >= self.rect.top as f32
            && py <= self.rect.bottom as f32
    }

    /// Pixel rectangle covering `bounds`, rounded outward, unclipped.
    pub fn px_rect(&self, bounds: &DataBounds) -> RectI32 {
        let (x0, x1) = (self.x_px(bounds.x_min), self.x_px(bounds.x_max));
        let (y0, y1) = (self.y_px(bounds.y_max), self.y_px(bounds.y_min));
        RectI32::from_ltrb(
            x0.min(x1).floor() as i32,
            y0.min(y1).floor() as i32,
            x0.max(x1).ceil() as i32,
            y0.max(y1).ceil() as i32,
        )
    }
}
