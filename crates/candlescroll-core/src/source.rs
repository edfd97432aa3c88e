// File: crates/candlescroll-core/src/source.rs
// Summary: Data window manager realizations: a static table and a growing, lock-guarded table.

use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::ChartError;
use crate::series::Bar;
use crate::table::BarTable;
use crate::window::RowWindow;

/// Read access to a bar table. All reads made inside one `read` call see the same table state.
pub trait BarSource {
    fn read<R>(&self, f: impl FnOnce(&BarTable) -> R) -> R;

    fn len(&self) -> usize { self.read(BarTable::len) }
    fn is_empty(&self) -> bool { self.len() == 0 }
    fn max_index(&self) -> Option<usize> { self.read(BarTable::max_index) }
    fn rows(&self, range: RowWindow) -> Vec<Bar> { self.read(|t| t.rows(range).to_vec()) }
    fn times(&self, range: RowWindow) -> Vec<f64> { self.read(|t| t.times_in(range).to_vec()) }
    fn locate(&self, t0: f64, t1: f64) -> Option<RowWindow> { self.read(|t| t.locate(t0, t1)) }
    fn nearest_row(&self, t: f64) -> Option<usize> { self.read(|tb| tb.nearest_row(t)) }
    fn y_limits(&self, range: RowWindow) -> Option<(f64, f64)> { self.read(|t| t.y_limits(range)) }
}

/// Finite table fixed at construction.
#[derive(Clone, Debug)]
pub struct StaticTable {
    table: BarTable,
}

impl StaticTable {
    pub fn new(bars: Vec<Bar>) -> Result<Self, ChartError> {
        Ok(Self { table: BarTable::new(bars)? })
    }
}

impl BarSource for StaticTable {
    fn read<R>(&self, f: impl FnOnce(&BarTable) -> R) -> R { f(&self.table) }
}

/// Append-only table shared between an ingestion thread and the UI thread.
///
/// Rows and time index sit behind one mutex, so a reader sees a batch either fully or not at all.
#[derive(Debug, Default)]
pub struct GrowingTable {
    table: Mutex<BarTable>,
    grown: Condvar,
}

impl GrowingTable {
    pub fn new() -> Self { Self::default() }

    fn lock(&self) -> MutexGuard<'_, BarTable> {
        // A panic while appending leaves the table valid: `BarTable::append` validates first.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a batch atomically. Returns the new row count.
    pub fn append(&self, batch: &[Bar]) -> Result<usize, ChartError> {
        let len = {
            let mut table = self.lock();
            table.append(batch)?;
            table.len()
        };
        self.grown.notify_all();
        log::info!("appended {} bars, table now {} rows", batch.len(), len);
        Ok(len)
    }

    /// Time of the last row, if any.
    pub fn last_time(&self) -> Option<f64> { self.lock().times().last().copied() }

    /// Block until the table holds at least `rows` rows or `timeout` elapses.
    pub fn wait_for_rows(&self, rows: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut table = self.lock();
        while table.len() < rows {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            table = match self.grown.wait_timeout(table, deadline - now) {
                Ok((guard, _)) => guard,
                Err(poisoned) => poisoned.into_inner().0,
            };
        }
        true
    }
}

impl BarSource for GrowingTable {
    fn read<R>(&self, f: impl FnOnce(&BarTable) -> R) -> R { f(&self.lock()) }
}

impl<S: BarSource> BarSource for std::sync::Arc<S> {
    fn read<R>(&self, f: impl FnOnce(&BarTable) -> R) -> R { (**self).read(f) }
}
