// File: crates/candlescroll-core/src/window.rs
// Summary: Half-open row windows and the step validation used by the scroll controller.

use crate::updater::Direction;

/// Contiguous half-open row range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowWindow {
    pub start: usize,
    pub end: usize,
}

impl RowWindow {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize { self.end.saturating_sub(self.start) }
    pub const fn is_empty(&self) -> bool { self.end <= self.start }

    /// Clamp to a table of `len` rows.
    pub fn clamp_to(&self, len: usize) -> Self {
        let end = self.end.min(len);
        Self { start: self.start.min(end), end }
    }
}

/// Rows that enter and leave when moving from `old` to `new`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowDelta {
    pub entering: RowWindow,
    pub exiting: RowWindow,
}

impl WindowDelta {
    pub fn between(old: RowWindow, new: RowWindow, direction: Direction) -> Self {
        match direction {
            Direction::Forward => WindowDelta {
                entering: RowWindow::new(new.start.max(old.end), new.end),
                exiting: RowWindow::new(old.start, new.start.min(old.end)),
            },
            Direction::Backward => WindowDelta {
                entering: RowWindow::new(new.start, new.end.min(old.start)),
                exiting: RowWindow::new(new.end.max(old.start), old.end),
            },
        }
    }
}

/// Candidate window after shifting `current` by `step` rows, or `None` when the step is rejected.
///
/// The candidate is `span` rows long from the shifted start, so a window that was cut short by a
/// small table grows back once rows exist. A start below row 0 rejects the step. An upper bound
/// past `max_index` is pulled back onto `max_index` when the current upper bound was still below
/// it; otherwise the step is rejected.
pub fn plan_step(
    current: RowWindow,
    direction: Direction,
    step: usize,
    span: usize,
    max_index: usize,
) -> Option<RowWindow> {
    if step == 0 || span == 0 {
        return None;
    }
    let start = match direction {
        Direction::Backward => current.start.checked_sub(step)?,
        Direction::Forward => current.start + step,
    };
    let end = start + span;
    if end <= max_index {
        return Some(RowWindow::new(start, end));
    }
    if current.end >= max_index {
        return None;
    }
    Some(RowWindow::new(max_index.saturating_sub(span), max_index))
}
