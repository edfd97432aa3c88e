// File: crates/candlescroll-core/src/scroll.rs
// Summary: Drag state machine turning pointer events into scroll step requests.

use crate::updater::Direction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerKind {
    Press,
    Move,
    Release,
    /// The pointer left the chart area.
    Leave,
}

/// Pointer input already mapped to data space: `x` is a time coordinate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
    /// Whether the pointer is over a plotting panel.
    pub inside: bool,
    pub double_click: bool,
}

impl PointerEvent {
    pub fn press(x: f64) -> Self { Self { kind: PointerKind::Press, x, inside: true, double_click: false } }
    pub fn double_click(x: f64) -> Self { Self { double_click: true, ..Self::press(x) } }
    pub fn moved(x: f64) -> Self { Self { kind: PointerKind::Move, x, inside: true, double_click: false } }
    pub fn release(x: f64) -> Self { Self { kind: PointerKind::Release, x, inside: true, double_click: false } }
    pub fn leave() -> Self { Self { kind: PointerKind::Leave, x: f64::NAN, inside: false, double_click: false } }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct ScrollState {
    pub anchor: Option<f64>,
    pub direction: Option<Direction>,
}

/// What the chart should do in response to an event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollAction {
    None,
    Step(Direction),
    Inspect(f64),
}

#[derive(Clone, Debug)]
pub struct ScrollController {
    motion_threshold: f64,
    state: ScrollState,
}

impl ScrollController {
    pub fn new(motion_threshold: f64) -> Self {
        Self { motion_threshold, state: ScrollState::default() }
    }

    pub fn state(&self) -> ScrollState { self.state }

    pub fn is_dragging(&self) -> bool { self.state.anchor.is_some() }

    pub fn handle(&mut self, event: &PointerEvent) -> ScrollAction {
        if !event.inside || event.kind == PointerKind::Leave {
            self.reset();
            return ScrollAction::None;
        }
        match event.kind {
            PointerKind::Press => {
                if !event.x.is_finite() {
                    return ScrollAction::None;
                }
                self.state.anchor = Some(event.x);
                if event.double_click { ScrollAction::Inspect(event.x) } else { ScrollAction::None }
            }
            PointerKind::Release | PointerKind::Leave => {
                self.reset();
                ScrollAction::None
            }
            PointerKind::Move => {
                let Some(anchor) = self.state.anchor else { return ScrollAction::None };
                let elapsed = event.x - anchor;
                if !elapsed.is_finite() || elapsed.abs() <= self.motion_threshold {
                    return ScrollAction::None;
                }
                // Dragging left reveals newer bars.
                let direction = if elapsed < 0.0 { Direction::Forward } else { Direction::Backward };
                self.state.direction = Some(direction);
                self.state.anchor = Some(event.x);
                ScrollAction::Step(direction)
            }
        }
    }

    fn reset(&mut self) {
        self.state = ScrollState::default();
    }
}
