// File: crates/candlescroll-core/src/theme.rs
// Summary: Light/Dark theming; backend-neutral RGBA colors.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub background: Rgba,
    pub grid: Rgba,
    pub axis_line: Rgba,
    pub axis_label: Rgba,
    pub candle_up: Rgba,
    pub candle_down: Rgba,
    pub crosshair: Rgba,
    /// Colors handed out to indicator lines, in order.
    pub lines: [Rgba; 2],
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Rgba::from_argb(255, 0, 0, 0),
            grid: Rgba::from_argb(255, 40, 40, 45),
            axis_line: Rgba::from_argb(255, 180, 180, 190),
            axis_label: Rgba::from_argb(255, 235, 235, 245),
            candle_up: Rgba::from_argb(255, 0, 128, 0),
            candle_down: Rgba::from_argb(255, 0xff, 0x2d, 0x21),
            crosshair: Rgba::from_argb(255, 255, 230, 70),
            lines: [Rgba::from_argb(255, 64, 160, 255), Rgba::from_argb(255, 255, 170, 40)],
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: Rgba::from_argb(255, 250, 250, 252),
            grid: Rgba::from_argb(255, 230, 230, 235),
            axis_line: Rgba::from_argb(255, 60, 60, 70),
            axis_label: Rgba::from_argb(255, 20, 20, 30),
            candle_up: Rgba::from_argb(255, 20, 160, 90),
            candle_down: Rgba::from_argb(255, 200, 60, 60),
            crosshair: Rgba::from_argb(255, 30, 120, 240),
            lines: [Rgba::from_argb(255, 32, 120, 200), Rgba::from_argb(255, 220, 120, 20)],
        }
    }

    pub fn high_contrast_dark() -> Self {
        Self {
            name: "high-contrast-dark",
            background: Rgba::from_argb(255, 0x00, 0x00, 0x00),
            grid: Rgba::from_argb(255, 0x22, 0x22, 0x22),
            axis_line: Rgba::from_argb(255, 0xff, 0xff, 0xff),
            axis_label: Rgba::from_argb(255, 0xff, 0xff, 0xff),
            candle_up: Rgba::from_argb(255, 0x00, 0xff, 0x00),
            candle_down: Rgba::from_argb(255, 0xff, 0x00, 0x00),
            crosshair: Rgba::from_argb(255, 0xff, 0xff, 0x00),
            lines: [Rgba::from_argb(255, 0x00, 0xff, 0xff), Rgba::from_argb(255, 0xff, 0xff, 0x00)],
        }
    }

    pub fn line_color(&self, index: usize) -> Rgba {
        self.lines[index % self.lines.len()]
    }
}

impl Default for Theme {
    fn default() -> Self { Self::dark() }
}

/// Return a list of built-in theme presets.
pub fn presets() -> Vec<Theme> {
    vec![Theme::dark(), Theme::light(), Theme::high_contrast_dark()]
}

/// Find a theme by its `name`, falling back to dark.
pub fn find(name: &str) -> Theme {
    presets()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(Theme::dark)
}
