// File: crates/candlescroll-core/src/loader.rs
// Summary: OHLC CSV loading (Binance-like and plain date/open/high/low/close exports).

use std::io;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};

use crate::error::ChartError;
use crate::series::Bar;

/// Load bars from a CSV file with a header row.
pub fn load_bars_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>, ChartError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let bars = read_bars_csv(file)?;
    log::info!("loaded {} bars from {}", bars.len(), path.display());
    Ok(bars)
}

/// Read bars from any CSV stream. Headers are matched case-insensitively.
pub fn read_bars_csv<R: io::Read>(reader: R) -> Result<Vec<Bar>, ChartError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers()?.iter().map(|h| h.to_lowercase()).collect::<Vec<_>>();
    log::debug!("csv headers: {headers:?}");
    let idx = |names: &[&str], column: &'static str| -> Result<usize, ChartError> {
        headers
            .iter()
            .position(|h| names.contains(&h.as_str()))
            .ok_or(ChartError::MissingColumn(column))
    };

    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"], "time")?;
    let i_open = idx(&["open", "o"], "open")?;
    let i_high = idx(&["high", "h"], "high")?;
    let i_low = idx(&["low", "l"], "low")?;
    let i_close = idx(&["close", "c", "adj_close", "close_price"], "close")?;

    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let field = |i: usize| rec.get(i).unwrap_or("");
        let price = |i: usize, column: &'static str| -> Result<f64, ChartError> {
            field(i)
                .parse::<f64>()
                .map_err(|_| ChartError::BadField { column, value: field(i).to_string() })
        };
        let t = parse_time(field(i_time))
            .ok_or_else(|| ChartError::BadField { column: "time", value: field(i_time).to_string() })?;
        out.push(Bar::try_new(
            t,
            price(i_open, "open")?,
            price(i_high, "high")?,
            price(i_low, "low")?,
            price(i_close, "close")?,
        )?);
    }
    Ok(out)
}

/// Parse a time cell into epoch seconds.
///
/// Integers above 10^12 are taken as epoch milliseconds. Text timestamps may be RFC 3339
/// or `%Y-%m-%d %H:%M:%S` (UTC).
pub fn parse_time(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        if n > 10_i64.pow(12) {
            return Some(n as f64 / 1000.0);
        }
        return Some(n as f64);
    }
    if let Ok(v) = s.parse::<f64>() {
        return v.is_finite().then_some(v);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp() as f64);
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc().timestamp() as f64)
}
