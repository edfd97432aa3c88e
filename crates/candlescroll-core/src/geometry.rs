// File: crates/candlescroll-core/src/geometry.rs
// Summary: Pixel rectangles, data-space points and the stroke command alphabet.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RectI32 {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl RectI32 {
    pub const fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }
    pub const fn from_ltwh(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self { left, top, right: left + width, bottom: top + height }
    }
    pub const fn width(&self) -> i32 { self.right - self.left }
    pub const fn height(&self) -> i32 { self.bottom - self.top }
    pub const fn is_empty(&self) -> bool { self.width() <= 0 || self.height() <= 0 }

    /// True when `other` lies fully inside `self`.
    pub const fn contains(&self, other: &RectI32) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    pub fn union(&self, other: &RectI32) -> RectI32 {
        RectI32::from_ltrb(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }
}

/// A vertex in data space: x is a time coordinate, y a price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

/// Stroke command attached to each vertex of a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathCode {
    /// Lift the pen and start a new stroke at this vertex.
    MoveTo,
    /// Draw a segment from the previous vertex to this one.
    LineTo,
}

/// Data-space bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DataBounds {
    pub fn of_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut b = DataBounds { x_min: first.x, x_max: first.x, y_min: first.y, y_max: first.y };
        for p in it {
            b.x_min = b.x_min.min(p.x);
            b.x_max = b.x_max.max(p.x);
            b.y_min = b.y_min.min(p.y);
            b.y_max = b.y_max.max(p.y);
        }
        Some(b)
    }
}

/// Vertices plus one stroke command per vertex; the renderer-facing form of a buffer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrokePath {
    pub vertices: Vec<Point>,
    pub codes: Vec<PathCode>,
}

impl StrokePath {
    pub fn len(&self) -> usize { self.vertices.len() }
    pub fn is_empty(&self) -> bool { self.vertices.is_empty() }
    pub fn bounds(&self) -> Option<DataBounds> { DataBounds::of_points(&self.vertices) }

    /// Split into strokes; each stroke starts at a `MoveTo`.
    pub fn strokes(&self) -> impl Iterator<Item = &[Point]> + '_ {
        let mut starts: Vec<usize> = self
            .codes
            .iter()
            .enumerate()
            .filter(|(i, c)| **c == PathCode::MoveTo && *i < self.vertices.len())
            .map(|(i, _)| i)
            .collect();
        if starts.first() != Some(&0) && !self.vertices.is_empty() {
            starts.insert(0, 0);
        }
        let n = self.vertices.len();
        (0..starts.len()).map(move |k| {
            let end = starts.get(k + 1).copied().unwrap_or(n);
            &self.vertices[starts[k]..end]
        })
    }
}

#[inline]
pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo { lo } else if v > hi { hi } else { v }
}
