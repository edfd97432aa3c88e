// File: crates/candlescroll-core/src/scene.rs
// Summary: Managed visual elements grouped into stacked panels, each with its own axes.

use crate::axis::Axis;
use crate::config::RenderOptions;
use crate::error::ChartError;
use crate::geometry::{DataBounds, Point, RectI32, StrokePath};
use crate::series::LineSeries;
use crate::theme::Rgba;
use crate::view::PlotMapping;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PanelId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    /// Disconnected strokes, e.g. a candle layer.
    Path(StrokePath),
    /// One polyline through time-keyed points.
    Line(LineSeries),
}

impl Shape {
    pub fn bounds(&self) -> Option<DataBounds> {
        match self {
            Shape::Path(path) => path.bounds(),
            Shape::Line(line) => {
                let pts: Vec<Point> = line
                    .points
                    .iter()
                    .filter(|(_, v)| v.is_finite())
                    .map(|&(t, v)| Point::new(t, v))
                    .collect();
                DataBounds::of_points(&pts)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub panel: PanelId,
    pub color: Rgba,
    pub stroke_width: f32,
    pub shape: Shape,
}

#[derive(Clone, Debug)]
pub struct Panel {
    pub rect: RectI32,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Bumped by every change to the panel's static background.
    revision: u64,
}

impl Panel {
    pub fn revision(&self) -> u64 { self.revision }
    pub fn mapping(&self) -> PlotMapping { PlotMapping::new(self.rect, &self.x_axis, &self.y_axis) }
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub width: i32,
    pub height: i32,
    pub draw_labels: bool,
    panels: Vec<Panel>,
    elements: Vec<Option<Element>>,
    idle_redraw: bool,
}

impl Scene {
    /// Stack one panel per `opts.panel_ratios` entry inside the insets.
    pub fn new(opts: &RenderOptions) -> Self {
        let left = opts.insets.left as i32;
        let right = opts.width - opts.insets.right as i32;
        let top = opts.insets.top as i32;
        let bottom = opts.height - opts.insets.bottom as i32;
        let gaps = opts.panel_gap as i32 * (opts.panel_ratios.len() as i32 - 1).max(0);
        let usable = (bottom - top - gaps).max(opts.panel_ratios.len() as i32);
        let total: u32 = opts.panel_ratios.iter().sum::<u32>().max(1);

        let mut panels = Vec::with_capacity(opts.panel_ratios.len());
        let mut y = top;
        for (i, ratio) in opts.panel_ratios.iter().enumerate() {
            let last = i + 1 == opts.panel_ratios.len();
            let h = if last { bottom - y } else { (usable as i64 * *ratio as i64 / total as i64) as i32 };
            panels.push(Panel {
                rect: RectI32::from_ltrb(left, y, right, y + h.max(1)),
                x_axis: Axis::default_x(),
                y_axis: if i == 0 { Axis::default_y() } else { Axis::new("", 0.0, 1.0) },
                revision: 0,
            });
            y += h + opts.panel_gap as i32;
        }
        Self {
            width: opts.width,
            height: opts.height,
            draw_labels: opts.draw_labels,
            panels,
            elements: Vec::new(),
            idle_redraw: false,
        }
    }

    pub fn bounds(&self) -> RectI32 { RectI32::from_ltwh(0, 0, self.width, self.height) }

    pub fn panel_ids(&self) -> impl Iterator<Item = PanelId> { (0..self.panels.len()).map(PanelId) }

    pub fn panel(&self, id: PanelId) -> &Panel { &self.panels[id.0] }

    pub fn panel_count(&self) -> usize { self.panels.len() }

    /// Set axis limits; `y = None` keeps the current y range. Returns whether anything changed.
    pub fn set_limits(&mut self, id: PanelId, x: (f64, f64), y: Option<(f64, f64)>) -> bool {
        let panel = &mut self.panels[id.0];
        let mut changed = false;
        if panel.x_axis.range() != x {
            panel.x_axis.min = x.0;
            panel.x_axis.max = x.1;
            changed = true;
        }
        if let Some(y) = y {
            if panel.y_axis.range() != y {
                panel.y_axis.min = y.0;
                panel.y_axis.max = y.1;
                changed = true;
            }
        }
        if changed {
            panel.revision += 1;
        }
        changed
    }

    pub fn set_axis_labels(&mut self, id: PanelId, x: &str, y: &str) {
        let panel = &mut self.panels[id.0];
        panel.x_axis.label = x.to_string();
        panel.y_axis.label = y.to_string();
        panel.revision += 1;
    }

    pub fn add_element(&mut self, element: Element) -> ElementId {
        self.panels[element.panel.0].revision += 1;
        self.elements.push(Some(element));
        ElementId(self.elements.len() - 1)
    }

    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let removed = self.elements.get_mut(id.0)?.take()?;
        self.panels[removed.panel.0].revision += 1;
        Some(removed)
    }

    pub fn element(&self, id: ElementId) -> Result<&Element, ChartError> {
        self.elements.get(id.0).and_then(Option::as_ref).ok_or(ChartError::UnknownElement(id))
    }

    /// Replace an element's geometry. Does not touch the panel revision.
    pub fn set_shape(&mut self, id: ElementId, shape: Shape) -> Result<(), ChartError> {
        let element = self
            .elements
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(ChartError::UnknownElement(id))?;
        element.shape = shape;
        Ok(())
    }

    /// Elements of a panel in insertion (paint) order.
    pub fn elements_in(&self, panel: PanelId) -> impl Iterator<Item = (ElementId, &Element)> + '_ {
        self.elements
            .iter()
            .enumerate()
            .filter_map(move |(i, e)| e.as_ref().filter(|e| e.panel == panel).map(|e| (ElementId(i), e)))
    }

    pub fn request_idle_redraw(&mut self) { self.idle_redraw = true; }

    /// Consume the pending idle redraw request.
    pub fn take_idle_redraw(&mut self) -> bool { std::mem::take(&mut self.idle_redraw) }
}
