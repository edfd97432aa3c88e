// File: crates/candlescroll-core/src/lib.rs
// Summary: Core library entry point; exports the scrolling candlestick chart API.

pub mod axis;
pub mod blit;
pub mod buffer;
pub mod chart;
pub mod config;
pub mod encode;
pub mod error;
pub mod feed;
pub mod geometry;
pub mod grid;
pub mod indicator;
pub mod ingest;
pub mod loader;
pub mod scene;
pub mod scroll;
pub mod series;
pub mod source;
pub mod table;
pub mod theme;
pub mod updater;
pub mod view;
pub mod window;

pub use axis::Axis;
pub use blit::{BlitManager, RenderSurface};
pub use buffer::GeometryBuffer;
pub use chart::{Chart, StepOutcome, PRICE_PANEL};
pub use config::{ChartConfig, ConfigError, Insets, LiveConfig, RenderOptions};
pub use encode::{encode, CandleFragment, EncodedBatch};
pub use error::ChartError;
pub use feed::{Feed, FeedError, PollSchedule, ReplayFeed};
pub use indicator::{Indicator, Macd, Sma, Stochastic};
pub use ingest::LiveFeed;
pub use loader::load_bars_csv;
pub use scene::{Element, ElementId, PanelId, Scene, Shape};
pub use scroll::{PointerEvent, PointerKind, ScrollController};
pub use series::{Bar, BarClass, LineSeries};
pub use source::{BarSource, GrowingTable, StaticTable};
pub use table::BarTable;
pub use theme::{Rgba, Theme};
pub use updater::{CandleLayers, Direction, LayerChange};
pub use window::{plan_step, RowWindow};
