// File: crates/candlescroll-core/src/blit.rs
// Summary: Partial-redraw manager; mark_changed / mutate / commit over a render surface.

use std::collections::HashMap;
use std::error::Error as StdError;

use crate::error::ChartError;
use crate::geometry::RectI32;
use crate::scene::{ElementId, PanelId, Scene};

/// Drawing capability required by the chart. Implemented by rendering backends.
pub trait RenderSurface {
    /// Captured pixels of one panel rectangle.
    type Snapshot;
    type Error: Into<Box<dyn StdError + Send + Sync>>;

    /// Redraw the whole scene, axes and labels included, and present it.
    fn render_full(&mut self, scene: &Scene) -> Result<(), Self::Error>;

    /// Render `panel` with every element except `hidden` and capture its rectangle.
    fn snapshot(&mut self, scene: &Scene, panel: PanelId, hidden: ElementId) -> Result<Self::Snapshot, Self::Error>;

    /// Put captured pixels back into `region`.
    fn restore(&mut self, snapshot: &Self::Snapshot, region: RectI32) -> Result<(), Self::Error>;

    /// Draw one element over whatever is on the surface, clipped to its panel.
    fn draw_on_top(&mut self, scene: &Scene, element: ElementId) -> Result<(), Self::Error>;

    /// Make `region` visible.
    fn present(&mut self, region: RectI32) -> Result<(), Self::Error>;
}

fn surface_err<E: Into<Box<dyn StdError + Send + Sync>>>(e: E) -> ChartError {
    ChartError::Surface(e.into())
}

struct Baseline<T> {
    snapshot: T,
    panel: PanelId,
    region: RectI32,
    revision: u64,
    limits: ((f64, f64), (f64, f64)),
}

/// Owns the render surface and one baseline per element being updated.
pub struct BlitManager<S: RenderSurface> {
    surface: S,
    baselines: HashMap<ElementId, Baseline<S::Snapshot>>,
}

impl<S: RenderSurface> BlitManager<S> {
    pub fn new(surface: S) -> Self {
        Self { surface, baselines: HashMap::new() }
    }

    pub fn surface(&self) -> &S { &self.surface }
    pub fn surface_mut(&mut self) -> &mut S { &mut self.surface }
    pub fn into_surface(self) -> S { self.surface }

    pub fn has_baseline(&self, element: ElementId) -> bool { self.baselines.contains_key(&element) }

    /// Capture the background of `element`'s panel without the element, then draw the element
    /// back on top so the visible frame keeps it until the commit.
    pub fn mark_changed(&mut self, scene: &Scene, element: ElementId) -> Result<(), ChartError> {
        let panel_id = scene.element(element)?.panel;
        let panel = scene.panel(panel_id);
        let snapshot = self.surface.snapshot(scene, panel_id, element).map_err(surface_err)?;
        self.surface.draw_on_top(scene, element).map_err(surface_err)?;
        self.surface.present(panel.rect).map_err(surface_err)?;
        self.baselines.insert(
            element,
            Baseline {
                snapshot,
                panel: panel_id,
                region: panel.rect,
                revision: panel.revision(),
                limits: (panel.x_axis.range(), panel.y_axis.range()),
            },
        );
        Ok(())
    }

    /// Restore the baseline, draw only `element` and present only its panel. Returns the
    /// presented region. The baseline is kept, so repeated commits yield the same frame.
    pub fn commit(&mut self, scene: &Scene, element: ElementId) -> Result<RectI32, ChartError> {
        let baseline = self.baselines.get(&element).ok_or(ChartError::MissingBaseline(element))?;
        let current = scene.element(element)?;
        if current.panel != baseline.panel {
            return Err(ChartError::StaleBaseline(element));
        }
        let panel = scene.panel(baseline.panel);
        if panel.revision() != baseline.revision
            || panel.rect != baseline.region
            || (panel.x_axis.range(), panel.y_axis.range()) != baseline.limits
        {
            return Err(ChartError::StaleBaseline(element));
        }
        let region = baseline.region;
        self.surface.restore(&baseline.snapshot, region).map_err(surface_err)?;
        self.surface.draw_on_top(scene, element).map_err(surface_err)?;
        self.surface.present(region).map_err(surface_err)?;
        Ok(region)
    }

    /// Drop the baseline of an element that left the scene.
    pub fn forget(&mut self, element: ElementId) {
        self.baselines.remove(&element);
    }

    /// Full redraw. Baselines survive; they are checked against panel revisions on commit.
    pub fn render_full(&mut self, scene: &Scene) -> Result<(), ChartError> {
        log::trace!("full redraw of {} panels", scene.panel_count());
        self.surface.render_full(scene).map_err(surface_err)
    }
}
