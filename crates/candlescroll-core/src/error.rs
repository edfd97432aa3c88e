// File: crates/candlescroll-core/src/error.rs
// Summary: Error types for table construction, geometry splicing and partial redraw.

use thiserror::Error;

use crate::config::ConfigError;
use crate::scene::{ElementId, PanelId};

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid bar at t={t}: {reason}")]
    InvalidBar { t: f64, reason: &'static str },

    #[error("bar {index} has a non-finite time coordinate")]
    NonFiniteTime { index: usize },

    #[error("bar {index} is out of order: t={next} does not follow t={prev}")]
    Unordered { index: usize, prev: f64, next: f64 },

    #[error("geometry splice would break time order: {edge} key {key} against {neighbour}")]
    SpliceOrder { edge: &'static str, key: f64, neighbour: f64 },

    #[error("cannot trim {requested} groups from a buffer holding {available}")]
    TrimOverflow { requested: usize, available: usize },

    #[error("table is empty")]
    EmptyTable,

    #[error("unknown panel {0:?}")]
    UnknownPanel(PanelId),

    #[error("unknown element {0:?}")]
    UnknownElement(ElementId),

    #[error("commit on {0:?} without a prior mark_changed")]
    MissingBaseline(ElementId),

    #[error("baseline for {0:?} was captured before the panel changed; mark_changed again")]
    StaleBaseline(ElementId),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("missing column `{0}` in csv header")]
    MissingColumn(&'static str),

    #[error("cannot parse `{value}` in column `{column}`")]
    BadField { column: &'static str, value: String },

    #[error("render surface: {0}")]
    Surface(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = ChartError> = std::result::Result<T, E>;
