// File: crates/candlescroll-core/src/chart.rs
// Summary: Chart assembly; owns data source, scene, candle layers, redraw manager and overlays.

use crate::blit::{BlitManager, RenderSurface};
use crate::config::ChartConfig;
use crate::error::ChartError;
use crate::geometry::{PathCode, Point, RectI32, StrokePath};
use crate::indicator::Indicator;
use crate::scene::{Element, ElementId, PanelId, Scene, Shape};
use crate::scroll::{PointerEvent, PointerKind, ScrollAction, ScrollController};
use crate::series::{Bar, BarClass, LineSeries};
use crate::source::BarSource;
use crate::table::BarTable;
use crate::theme::Theme;
use crate::updater::{CandleLayers, Direction, LayerChange, WindowShift};
use crate::window::{plan_step, RowWindow, WindowDelta};

/// Panel holding the candles. Its y axis follows prices.
pub const PRICE_PANEL: PanelId = PanelId(0);

const CANDLE_STROKE: f32 = 1.0;
const LINE_STROKE: f32 = 1.2;
const CROSSHAIR_STROKE: f32 = 1.0;

/// Result of feeding one pointer event to the chart.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// Nothing to do for this event.
    Idle,
    /// A step was requested but failed validation; nothing changed.
    Rejected,
    /// The window moved; `regions` lists every presented rectangle.
    Committed { window: RowWindow, regions: Vec<RectI32> },
    /// Double-click: the row nearest to the pointer.
    Inspected { row: usize, bar: Bar },
}

struct Overlay {
    indicator: Box<dyn Indicator>,
    panel: PanelId,
    /// Theme line color index of the first line.
    color_base: usize,
    elements: Vec<ElementId>,
}

/// Pointer position the crosshair is drawn at: time, hovered panel and its value.
#[derive(Clone, Copy, Debug, PartialEq)]
struct CrosshairAt {
    t: f64,
    panel: PanelId,
    y: f64,
}

/// Rows and limits gathered for one step while holding a single read of the table.
struct StepPlan {
    next: RowWindow,
    entering: Vec<Bar>,
    exiting: Vec<f64>,
    x_limits: (f64, f64),
    y_limits: Option<(f64, f64)>,
    warm: Vec<Bar>,
}

pub struct Chart<D: BarSource, S: RenderSurface> {
    source: D,
    config: ChartConfig,
    theme: Theme,
    scene: Scene,
    layers: CandleLayers,
    candles: [Option<ElementId>; 2],
    blit: BlitManager<S>,
    controller: ScrollController,
    overlays: Vec<Overlay>,
    window: RowWindow,
    /// One crosshair element per panel, created on first hover.
    crosshair: Vec<ElementId>,
    crosshair_at: Option<CrosshairAt>,
}

fn class_slot(class: BarClass) -> usize {
    match class {
        BarClass::Bullish => 0,
        BarClass::Bearish => 1,
    }
}

impl<D: BarSource, S: RenderSurface> Chart<D, S> {
    /// Build the chart over the first `window_span` rows and draw it once.
    pub fn new(source: D, surface: S, config: ChartConfig, theme: Theme) -> Result<Self, ChartError> {
        config.validate()?;
        let width = config.body_width;
        let (window, bars, x_limits, y_limits) = source.read(|table| {
            let window = RowWindow::new(0, config.window_span).clamp_to(table.len());
            let limits = x_limits_of(table, window, width);
            (window, table.rows(window).to_vec(), limits, table.y_limits(window))
        });
        let x_limits = x_limits.ok_or(ChartError::EmptyTable)?;
        let layers = CandleLayers::from_bars(&bars, width)?;

        let mut scene = Scene::new(&config.render);
        let mut candles = [None, None];
        for class in BarClass::ALL {
            if let Some(path) = layers.buffer(class).to_path() {
                candles[class_slot(class)] = Some(scene.add_element(candle_element(&theme, class, path)));
            }
        }
        for panel in scene.panel_ids().collect::<Vec<_>>() {
            let y = if panel == PRICE_PANEL { y_limits } else { None };
            scene.set_limits(panel, x_limits, y);
        }

        let mut blit = BlitManager::new(surface);
        blit.render_full(&scene)?;
        log::debug!("chart ready: window {}..{} of {} rows", window.start, window.end, source.len());

        Ok(Self {
            controller: ScrollController::new(config.motion_threshold),
            source,
            config,
            theme,
            scene,
            layers,
            candles,
            blit,
            overlays: Vec::new(),
            window,
            crosshair: Vec::new(),
            crosshair_at: None,
        })
    }

    pub fn source(&self) -> &D { &self.source }
    pub fn scene(&self) -> &Scene { &self.scene }
    pub fn layers(&self) -> &CandleLayers { &self.layers }
    pub fn window(&self) -> RowWindow { self.window }
    pub fn config(&self) -> &ChartConfig { &self.config }
    pub fn controller(&self) -> &ScrollController { &self.controller }
    pub fn surface(&self) -> &S { self.blit.surface() }
    pub fn surface_mut(&mut self) -> &mut S { self.blit.surface_mut() }

    /// Element currently drawing `class`, if that class has visible bars.
    pub fn candle_element(&self, class: BarClass) -> Option<ElementId> { self.candles[class_slot(class)] }

    /// Attach an indicator whose lines are drawn in `panel` and recomputed after every step.
    /// The new lines show up on the next full redraw.
    pub fn add_indicator(&mut self, indicator: Box<dyn Indicator>, panel: PanelId) -> Result<(), ChartError> {
        if panel.0 >= self.scene.panel_count() {
            return Err(ChartError::UnknownPanel(panel));
        }
        let (warm, x_limits) = self.source.read(|table| {
            (table.rows(self.warm_window(self.window)).to_vec(), x_limits_of(table, self.window, self.config.body_width))
        });
        let x_limits = x_limits.ok_or(ChartError::EmptyTable)?;
        let lines = clipped_lines(indicator.as_ref(), &warm, x_limits);
        if panel != PRICE_PANEL {
            self.scene.set_limits(panel, x_limits, line_limits(&lines));
        }
        let first = self.overlays.iter().map(|o| o.elements.len()).sum::<usize>();
        let elements = lines
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                self.scene.add_element(Element {
                    panel,
                    color: self.theme.line_color(first + i),
                    stroke_width: LINE_STROKE,
                    shape: Shape::Line(line),
                })
            })
            .collect();
        log::debug!("indicator `{}` attached to panel {}", indicator.id(), panel.0);
        self.overlays.push(Overlay { indicator, panel, color_base: first, elements });
        self.scene.request_idle_redraw();
        Ok(())
    }

    /// Map a pixel position to a pointer event in data space.
    pub fn pointer_at(&self, kind: PointerKind, px: f32, py: f32, double_click: bool) -> PointerEvent {
        let hit = self
            .scene
            .panel_ids()
            .map(|id| self.scene.panel(id).mapping())
            .find(|m| m.contains_px(px, py));
        match hit {
            Some(m) => PointerEvent { kind, x: m.x_data(px), inside: true, double_click },
            None => PointerEvent { kind, x: f64::NAN, inside: false, double_click },
        }
    }

    pub fn handle_pointer(&mut self, event: &PointerEvent) -> Result<StepOutcome, ChartError> {
        match self.controller.handle(event) {
            ScrollAction::None => Ok(StepOutcome::Idle),
            ScrollAction::Step(direction) => self.step(direction),
            ScrollAction::Inspect(t) => Ok(match self.inspect(t) {
                Some((row, bar)) => StepOutcome::Inspected { row, bar },
                None => StepOutcome::Idle,
            }),
        }
    }

    /// Nearest row to time `t`.
    pub fn inspect(&self, t: f64) -> Option<(usize, Bar)> {
        let found = self.source.read(|table| {
            let row = table.nearest_row(t)?;
            table.bars().get(row).map(|bar| (row, *bar))
        });
        if let Some((row, bar)) = found {
            log::info!("row {row}: t={} o={} h={} l={} c={}", bar.t, bar.o, bar.h, bar.l, bar.c);
        }
        found
    }

    /// Move the window one step. Rejected steps leave every piece of state untouched.
    pub fn step(&mut self, direction: Direction) -> Result<StepOutcome, ChartError> {
        let current = self.window;
        let width = self.config.body_width;
        let (step, span) = (self.config.step_size, self.config.window_span);
        let plan = self.source.read(|table| {
            let next = plan_step(current, direction, step, span, table.max_index()?)?;
            let delta = WindowDelta::between(current, next, direction);
            Some(StepPlan {
                next,
                entering: table.rows(delta.entering).to_vec(),
                exiting: table.times_in(delta.exiting).to_vec(),
                x_limits: x_limits_of(table, next, width)?,
                y_limits: table.y_limits(next),
                warm: table.rows(self.warm_window(next)).to_vec(),
            })
        });
        let Some(plan) = plan else {
            log::debug!("{direction:?} step from {}..{} rejected", self.window.start, self.window.end);
            return Ok(StepOutcome::Rejected);
        };

        let update = self.layers.apply(&WindowShift {
            direction,
            entering: &plan.entering,
            exiting: &plan.exiting,
        })?;
        log::debug!(
            "{direction:?} step {}..{} -> {}..{} (+{} -{})",
            self.window.start,
            self.window.end,
            plan.next.start,
            plan.next.end,
            plan.entering.len(),
            plan.exiting.len()
        );
        self.window = plan.next;

        // Structural and limit changes first, so every baseline below sees the final panels.
        for panel in self.scene.panel_ids().collect::<Vec<_>>() {
            let y = if panel == PRICE_PANEL { plan.y_limits } else { None };
            self.scene.set_limits(panel, plan.x_limits, y);
        }
        let mut pending: Vec<(ElementId, Shape)> = Vec::new();
        for class in BarClass::ALL {
            self.stage_candles(class, update.get(class), &mut pending);
        }
        for index in 0..self.overlays.len() {
            let overlay = &self.overlays[index];
            let lines = clipped_lines(overlay.indicator.as_ref(), &plan.warm, plan.x_limits);
            if overlay.panel != PRICE_PANEL {
                self.scene.set_limits(overlay.panel, plan.x_limits, line_limits(&lines));
            }
            self.stage_overlay(index, lines, &mut pending);
        }
        if let Some(at) = self.crosshair_at {
            pending.extend(self.crosshair.iter().copied().zip(self.crosshair_shapes(Some(at))));
        }

        let mut regions = Vec::with_capacity(pending.len());
        for (id, shape) in pending {
            self.blit.mark_changed(&self.scene, id)?;
            self.scene.set_shape(id, shape)?;
            regions.push(self.blit.commit(&self.scene, id)?);
        }
        self.scene.request_idle_redraw();
        Ok(StepOutcome::Committed { window: self.window, regions })
    }

    fn stage_candles(&mut self, class: BarClass, change: &LayerChange, pending: &mut Vec<(ElementId, Shape)>) {
        let slot = class_slot(class);
        match (change, self.candles[slot]) {
            (LayerChange::Untouched, _) => {}
            (LayerChange::Replaced(path), Some(id)) => pending.push((id, Shape::Path(path.clone()))),
            (LayerChange::Replaced(path), None) | (LayerChange::Created(path), _) => {
                if let Some(old) = self.candles[slot].take() {
                    self.scene.remove_element(old);
                    self.blit.forget(old);
                }
                let id = self.scene.add_element(candle_element(&self.theme, class, path.clone()));
                self.candles[slot] = Some(id);
                pending.push((id, Shape::Path(path.clone())));
            }
            (LayerChange::Cleared, _) => {
                if let Some(id) = self.candles[slot].take() {
                    self.scene.remove_element(id);
                    self.blit.forget(id);
                }
            }
        }
    }

    /// Match an overlay's elements to this step's lines. Extra lines get new elements; elements
    /// left without a line are blitted empty so their old pixels go away.
    fn stage_overlay(&mut self, index: usize, lines: Vec<LineSeries>, pending: &mut Vec<(ElementId, Shape)>) {
        let overlay = &mut self.overlays[index];
        let name = overlay.indicator.id();
        if lines.len() != overlay.elements.len() {
            log::debug!("indicator `{name}` now has {} lines (was {})", lines.len(), overlay.elements.len());
        }
        for (i, line) in lines.iter().enumerate().skip(overlay.elements.len()) {
            let id = self.scene.add_element(Element {
                panel: overlay.panel,
                color: self.theme.line_color(overlay.color_base + i),
                stroke_width: LINE_STROKE,
                shape: Shape::Line(line.clone()),
            });
            overlay.elements.push(id);
        }
        let mut lines = lines.into_iter();
        for &id in &overlay.elements {
            let line = lines.next().unwrap_or_else(|| LineSeries::new(name, Vec::new()));
            pending.push((id, Shape::Line(line)));
        }
    }

    /// Move the crosshair to pixel `(px, py)`: a vertical line through every panel and a
    /// horizontal one in the hovered panel. Outside all panels it is hidden.
    /// Returns the presented regions.
    pub fn hover(&mut self, px: f32, py: f32) -> Result<Vec<RectI32>, ChartError> {
        let hit = self.scene.panel_ids().find_map(|id| {
            let m = self.scene.panel(id).mapping();
            m.contains_px(px, py).then(|| CrosshairAt { t: m.x_data(px), panel: id, y: m.y_data(py) })
        });
        if hit.is_none() && self.crosshair_at.is_none() {
            return Ok(Vec::new());
        }
        if hit.is_some() && self.crosshair.is_empty() {
            for panel in self.scene.panel_ids().collect::<Vec<_>>() {
                let element = Element {
                    panel,
                    color: self.theme.crosshair,
                    stroke_width: CROSSHAIR_STROKE,
                    shape: Shape::Path(StrokePath::default()),
                };
                self.crosshair.push(self.scene.add_element(element));
            }
        }
        self.crosshair_at = hit;
        let shapes = self.crosshair_shapes(hit);
        let mut regions = Vec::with_capacity(shapes.len());
        for (id, shape) in self.crosshair.clone().into_iter().zip(shapes) {
            self.blit.mark_changed(&self.scene, id)?;
            self.scene.set_shape(id, shape)?;
            regions.push(self.blit.commit(&self.scene, id)?);
        }
        Ok(regions)
    }

    /// Crosshair position in data space, if shown.
    pub fn crosshair(&self) -> Option<(f64, PanelId, f64)> { self.crosshair_at.map(|at| (at.t, at.panel, at.y)) }

    fn crosshair_shapes(&self, at: Option<CrosshairAt>) -> Vec<Shape> {
        self.scene
            .panel_ids()
            .map(|panel| {
                let Some(at) = at else { return Shape::Path(StrokePath::default()) };
                let p = self.scene.panel(panel);
                let (x0, x1) = p.x_axis.range();
                let (y0, y1) = p.y_axis.range();
                let mut path = StrokePath::default();
                let mut segment = |a: Point, b: Point| {
                    path.vertices.extend([a, b]);
                    path.codes.extend([PathCode::MoveTo, PathCode::LineTo]);
                };
                segment(Point::new(at.t, y0), Point::new(at.t, y1));
                if panel == at.panel {
                    segment(Point::new(x0, at.y), Point::new(x1, at.y));
                }
                Shape::Path(path)
            })
            .collect()
    }

    fn warm_window(&self, window: RowWindow) -> RowWindow {
        RowWindow::new(window.start.saturating_sub(self.config.indicator_lookback), window.end)
    }

    /// Full redraw of the scene.
    pub fn render_full(&mut self) -> Result<(), ChartError> {
        self.scene.take_idle_redraw();
        self.blit.render_full(&self.scene)
    }

    /// Serve a pending idle redraw request. Returns whether a redraw happened.
    pub fn render_idle(&mut self) -> Result<bool, ChartError> {
        if !self.scene.take_idle_redraw() {
            return Ok(false);
        }
        self.blit.render_full(&self.scene)?;
        Ok(true)
    }
}

fn candle_element(theme: &Theme, class: BarClass, path: StrokePath) -> Element {
    let color = match class {
        BarClass::Bullish => theme.candle_up,
        BarClass::Bearish => theme.candle_down,
    };
    Element { panel: PRICE_PANEL, color, stroke_width: CANDLE_STROKE, shape: Shape::Path(path) }
}

/// x limits covering the bodies of `window`: first bar time to last bar time plus one body.
fn x_limits_of(table: &BarTable, window: RowWindow, body_width: f64) -> Option<(f64, f64)> {
    let times = table.times_in(window);
    Some((*times.first()?, *times.last()? + body_width))
}

fn clipped_lines(indicator: &dyn Indicator, warm: &[Bar], x_limits: (f64, f64)) -> Vec<LineSeries> {
    indicator
        .compute(warm)
        .into_iter()
        .map(|line| line.clip_to(x_limits.0, x_limits.1))
        .collect()
}

/// Joint value range of `lines`; `None` when empty or flat.
fn line_limits(lines: &[LineSeries]) -> Option<(f64, f64)> {
    let (lo, hi) = lines
        .iter()
        .filter_map(LineSeries::value_range)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (a, b)| (lo.min(a), hi.max(b)));
    if lo.is_finite() && hi.is_finite() && lo < hi { Some((lo, hi)) } else { None }
}
