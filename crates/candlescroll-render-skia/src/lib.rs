// File: crates/candlescroll-render-skia/src/lib.rs
// Summary: Skia CPU raster render surface; full redraws, panel snapshots and blits.

use anyhow::{anyhow, Result};
use skia_safe as skia;

use candlescroll_core::axis::format_time;
use candlescroll_core::geometry::RectI32;
use candlescroll_core::grid::{linspace, time_ticks};
use candlescroll_core::scene::{Element, ElementId, PanelId, Scene, Shape};
use candlescroll_core::theme::{Rgba, Theme};
use candlescroll_core::view::PlotMapping;
use candlescroll_core::RenderSurface;

fn color(c: Rgba) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}

fn irect(r: RectI32) -> skia::IRect {
    skia::IRect::from_ltrb(r.left, r.top, r.right, r.bottom)
}

fn rect(r: RectI32) -> skia::Rect {
    skia::Rect::from_ltrb(r.left as f32, r.top as f32, r.right as f32, r.bottom as f32)
}

/// Offscreen raster surface. `present` records the region instead of flipping a window.
pub struct SkiaSurface {
    surface: skia::Surface,
    theme: Theme,
    presented: Vec<RectI32>,
}

impl SkiaSurface {
    pub fn new(width: i32, height: i32, theme: Theme) -> Result<Self> {
        let surface = skia::surfaces::raster_n32_premul((width, height))
            .ok_or_else(|| anyhow!("failed to create raster surface"))?;
        Ok(Self { surface, theme, presented: Vec::new() })
    }

    pub fn width(&self) -> i32 { self.surface.width() }
    pub fn height(&self) -> i32 { self.surface.height() }

    /// Regions presented so far, oldest first.
    pub fn presented(&self) -> &[RectI32] { &self.presented }

    pub fn take_presented(&mut self) -> Vec<RectI32> { std::mem::take(&mut self.presented) }

    /// Encode the current frame as PNG bytes.
    pub fn encode_png(&mut self) -> Result<Vec<u8>> {
        let image = self.surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or_else(|| anyhow!("encode PNG failed"))?;
        Ok(data.as_bytes().to_vec())
    }

    /// Write the current frame to a PNG file, creating parent directories.
    pub fn save_png(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let bytes = self.encode_png()?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Draw one panel's background and every element except `hidden`, clipped to the panel.
    fn draw_panel(&mut self, scene: &Scene, panel: PanelId, hidden: Option<ElementId>) {
        let p = scene.panel(panel);
        let mapping = p.mapping();
        let theme = self.theme;
        let canvas = self.surface.canvas();
        canvas.save();
        canvas.clip_rect(rect(p.rect), skia::ClipOp::Intersect, false);
        canvas.clear(color(theme.background));
        draw_grid(canvas, &theme, p.rect);
        draw_panel_frame(canvas, &theme, p.rect);
        for (id, element) in scene.elements_in(panel) {
            if Some(id) != hidden {
                draw_element(canvas, &mapping, element);
            }
        }
        canvas.restore();
    }

    fn draw_labels(&mut self, scene: &Scene) {
        let theme = self.theme;
        let canvas = self.surface.canvas();
        let mut paint_text = skia::Paint::default();
        paint_text.set_color(color(theme.axis_label));
        paint_text.set_anti_alias(true);
        let mut font = skia::Font::default();
        font.set_size(11.0);

        let mut last_rect = None;
        for panel in scene.panel_ids() {
            let p = scene.panel(panel);
            let m = p.mapping();
            for v in linspace(p.y_axis.min, p.y_axis.max, 3) {
                let text = format!("{v:.2}");
                canvas.draw_str(&text, (p.rect.left as f32 - 64.0, m.y_px(v) + 4.0), &font, &paint_text);
            }
            if !p.y_axis.label.is_empty() {
                canvas.draw_str(&p.y_axis.label, (p.rect.left as f32 - 64.0, p.rect.top as f32 - 4.0), &font, &paint_text);
            }
            last_rect = Some((p.rect, m, p.x_axis.min, p.x_axis.max));
        }
        if let Some((r, m, t0, t1)) = last_rect {
            for t in time_ticks(t0, t1, 6) {
                canvas.draw_str(format_time(t), (m.x_px(t) - 24.0, r.bottom as f32 + 16.0), &font, &paint_text);
            }
        }
    }
}

impl RenderSurface for SkiaSurface {
    type Snapshot = skia::Image;
    type Error = anyhow::Error;

    fn render_full(&mut self, scene: &Scene) -> Result<()> {
        self.surface.canvas().clear(color(self.theme.background));
        for panel in scene.panel_ids() {
            self.draw_panel(scene, panel, None);
        }
        if scene.draw_labels {
            self.draw_labels(scene);
        }
        self.present(scene.bounds())
    }

    fn snapshot(&mut self, scene: &Scene, panel: PanelId, hidden: ElementId) -> Result<skia::Image> {
        self.draw_panel(scene, panel, Some(hidden));
        let region = scene.panel(panel).rect;
        self.surface
            .image_snapshot_with_bounds(irect(region))
            .ok_or_else(|| anyhow!("snapshot of {region:?} is outside the surface"))
    }

    fn restore(&mut self, snapshot: &skia::Image, region: RectI32) -> Result<()> {
        let mut paint = skia::Paint::default();
        paint.set_blend_mode(skia::BlendMode::Src);
        self.surface
            .canvas()
            .draw_image(snapshot, (region.left as f32, region.top as f32), Some(&paint));
        Ok(())
    }

    fn draw_on_top(&mut self, scene: &Scene, element: ElementId) -> Result<()> {
        let e = scene.element(element)?;
        let p = scene.panel(e.panel);
        let mapping = p.mapping();
        let canvas = self.surface.canvas();
        canvas.save();
        canvas.clip_rect(rect(p.rect), skia::ClipOp::Intersect, false);
        draw_element(canvas, &mapping, e);
        canvas.restore();
        Ok(())
    }

    fn present(&mut self, region: RectI32) -> Result<()> {
        log::trace!("present {region:?}");
        self.presented.push(region);
        Ok(())
    }
}

// ---- helpers ----------------------------------------------------------------

fn draw_grid(canvas: &skia::Canvas, theme: &Theme, r: RectI32) {
    let mut paint = skia::Paint::default();
    paint.set_color(color(theme.grid));
    paint.set_anti_alias(true);
    paint.set_stroke_width(1.0);

    for x in linspace(r.left as f64, r.right as f64, 10) {
        canvas.draw_line((x as f32, r.top as f32), (x as f32, r.bottom as f32), &paint);
    }
    for y in linspace(r.top as f64, r.bottom as f64, 4) {
        canvas.draw_line((r.left as f32, y as f32), (r.right as f32, y as f32), &paint);
    }
}

// Axis lines sit on the panel edge, inside the blit region, below the elements.
fn draw_panel_frame(canvas: &skia::Canvas, theme: &Theme, r: RectI32) {
    let mut axis_paint = skia::Paint::default();
    axis_paint.set_color(color(theme.axis_line));
    axis_paint.set_stroke_width(1.0);

    let (l, t, rr, b) = (r.left as f32 + 0.5, r.top as f32, r.right as f32, r.bottom as f32 - 0.5);
    canvas.draw_line((l, b), (rr, b), &axis_paint);
    canvas.draw_line((l, t), (l, b), &axis_paint);
}

fn draw_element(canvas: &skia::Canvas, m: &PlotMapping, element: &Element) {
    let mut stroke = skia::Paint::default();
    stroke.set_anti_alias(true);
    stroke.set_style(skia::paint::Style::Stroke);
    stroke.set_stroke_width(element.stroke_width);
    stroke.set_color(color(element.color));

    let mut path = skia::Path::new();
    match &element.shape {
        Shape::Path(strokes) => {
            for run in strokes.strokes() {
                let Some((first, rest)) = run.split_first() else { continue };
                path.move_to(m.to_px(*first));
                for p in rest {
                    path.line_to(m.to_px(*p));
                }
            }
        }
        Shape::Line(line) => {
            if line.points.len() < 2 {
                return;
            }
            let (x0, y0) = line.points[0];
            path.move_to((m.x_px(x0), m.y_px(y0)));
            for &(x, y) in line.points.iter().skip(1) {
                path.line_to((m.x_px(x), m.y_px(y)));
            }
        }
    }
    canvas.draw_path(&path, &stroke);
}
