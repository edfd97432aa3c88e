// File: crates/candlescroll-core/tests/common/mod.rs
// Purpose: Shared fixtures: deterministic bars and a recording render surface.
#![allow(dead_code)]

use std::collections::HashMap;

use candlescroll_core::geometry::RectI32;
use candlescroll_core::scene::{ElementId, PanelId, Scene};
use candlescroll_core::{Bar, ChartError, RenderSurface};

pub const T0: f64 = 1_700_000_000.0;
pub const STEP: f64 = 60.0;

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn bar(t: f64, o: f64, c: f64) -> Bar {
    Bar::try_new(t, o, o.max(c) + 1.0, o.min(c) - 1.0, c).expect("valid bar")
}

/// `n` one-minute bars with a mix of bullish and bearish rows.
pub fn bars(n: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let o = 100.0 + ((i * 7) % 13) as f64;
            let c = 100.0 + ((i * 11) % 17) as f64;
            bar(T0 + STEP * i as f64, o, c)
        })
        .collect()
}

/// `n` bars where rows below `split` are bullish and the rest bearish.
pub fn split_bars(n: usize, split: usize) -> Vec<Bar> {
    (0..n)
        .map(|i| {
            let base = 100.0 + (i % 5) as f64;
            if i < split { bar(T0 + STEP * i as f64, base, base + 2.0) } else { bar(T0 + STEP * i as f64, base + 2.0, base) }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snap {
    pub panel: PanelId,
    pub content: Vec<String>,
}

/// Models pixels as the ordered list of things painted into each panel.
#[derive(Default, Debug)]
pub struct RecordingSurface {
    pub frames: HashMap<PanelId, Vec<String>>,
    pub presented: Vec<RectI32>,
    pub full_renders: usize,
    pub snapshots: usize,
}

impl RecordingSurface {
    pub fn frame(&self, panel: PanelId) -> Vec<String> {
        self.frames.get(&panel).cloned().unwrap_or_default()
    }
}

fn background(scene: &Scene, panel: PanelId) -> String {
    let p = scene.panel(panel);
    format!("bg {:?} {:?}", p.x_axis.range(), p.y_axis.range())
}

fn paint(scene: &Scene, id: ElementId) -> Result<String, ChartError> {
    let e = scene.element(id)?;
    Ok(format!("{:?} {:?}", id, e.shape))
}

impl RenderSurface for RecordingSurface {
    type Snapshot = Snap;
    type Error = ChartError;

    fn render_full(&mut self, scene: &Scene) -> Result<(), ChartError> {
        self.full_renders += 1;
        for panel in scene.panel_ids() {
            let mut content = vec![background(scene, panel)];
            for (id, _) in scene.elements_in(panel) {
                content.push(paint(scene, id)?);
            }
            self.frames.insert(panel, content);
        }
        self.presented.push(scene.bounds());
        Ok(())
    }

    fn snapshot(&mut self, scene: &Scene, panel: PanelId, hidden: ElementId) -> Result<Snap, ChartError> {
        self.snapshots += 1;
        let mut content = vec![background(scene, panel)];
        for (id, _) in scene.elements_in(panel).filter(|(id, _)| *id != hidden) {
            content.push(paint(scene, id)?);
        }
        self.frames.insert(panel, content.clone());
        Ok(Snap { panel, content })
    }

    fn restore(&mut self, snapshot: &Snap, _region: RectI32) -> Result<(), ChartError> {
        self.frames.insert(snapshot.panel, snapshot.content.clone());
        Ok(())
    }

    fn draw_on_top(&mut self, scene: &Scene, element: ElementId) -> Result<(), ChartError> {
        let panel = scene.element(element)?.panel;
        let painted = paint(scene, element)?;
        self.frames.entry(panel).or_default().push(painted);
        Ok(())
    }

    fn present(&mut self, region: RectI32) -> Result<(), ChartError> {
        self.presented.push(region);
        Ok(())
    }
}
