// File: crates/candlescroll-core/src/config.rs
// Summary: Construction-time configuration, loadable from TOML; validated before use.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(&'static str),
}

/// Everything fixed when a chart is built. No dynamic reconfiguration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Rows visible at once.
    pub window_span: usize,
    /// Rows moved per accepted scroll step.
    pub step_size: usize,
    /// Drag distance, in time units (seconds), that must be exceeded before a step commits.
    pub motion_threshold: f64,
    /// Candle body width in time units. Bodies span `[t, t + body_width]`.
    pub body_width: f64,
    /// Extra rows before the window fed to indicators so their warm-up lies off screen.
    pub indicator_lookback: usize,
    pub render: RenderOptions,
    pub live: LiveConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            window_span: 100,
            step_size: 100,
            motion_threshold: 300.0,
            body_width: 26.0,
            indicator_lookback: 100,
            render: RenderOptions::default(),
            live: LiveConfig::default(),
        }
    }
}

impl ChartConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ChartConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_span == 0 {
            return Err(ConfigError::Invalid("window_span must be positive"));
        }
        if self.step_size == 0 {
            return Err(ConfigError::Invalid("step_size must be positive"));
        }
        if !(self.body_width.is_finite() && self.body_width > 0.0) {
            return Err(ConfigError::Invalid("body_width must be a positive number"));
        }
        if !(self.motion_threshold.is_finite() && self.motion_threshold >= 0.0) {
            return Err(ConfigError::Invalid("motion_threshold must be non-negative"));
        }
        if self.render.width <= self.render.insets.horizontal() as i32
            || self.render.height <= self.render.insets.vertical() as i32
        {
            return Err(ConfigError::Invalid("render size leaves no room inside the insets"));
        }
        if self.render.panel_ratios.is_empty() || self.render.panel_ratios.iter().any(|r| *r == 0) {
            return Err(ConfigError::Invalid("panel_ratios must be non-empty and positive"));
        }
        if self.live.tick_ms == 0 {
            return Err(ConfigError::Invalid("live.tick_ms must be positive"));
        }
        Ok(())
    }
}

/// Pixel margins between the surface edge and the panel stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Insets {
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self { left, right, top, bottom }
    }
    pub const fn horizontal(&self) -> u32 { self.left + self.right }
    pub const fn vertical(&self) -> u32 { self.top + self.bottom }
}

// Left margin leaves room for price labels, bottom for time labels.
impl Default for Insets {
    fn default() -> Self { Self::new(72, 24, 24, 40) }
}

/// Surface size and layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    pub insets: Insets,
    /// Gap between stacked panels, in pixels.
    pub panel_gap: u32,
    /// Relative heights of the stacked panels; the first one holds the candles.
    pub panel_ratios: Vec<u32>,
    pub draw_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 640,
            insets: Insets::default(),
            panel_gap: 8,
            panel_ratios: vec![4, 2, 2],
            draw_labels: true,
        }
    }
}

/// Streaming ingestion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveConfig {
    /// Added after each step boundary before polling, in seconds.
    pub delay_secs: u64,
    /// Sleep granularity of the feed worker, in milliseconds.
    pub tick_ms: u64,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self { delay_secs: 2, tick_ms: 500 }
    }
}

impl LiveConfig {
    pub fn delay(&self) -> Duration { Duration::from_secs(self.delay_secs) }
    pub fn tick(&self) -> Duration { Duration::from_millis(self.tick_ms) }
}
