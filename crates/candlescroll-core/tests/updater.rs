// File: crates/candlescroll-core/tests/updater.rs
// Purpose: Incremental buffer slides agree with re-encoding; invalid splices leave buffers untouched.

mod common;

use candlescroll_core::buffer::{Edge, GeometryBuffer};
use candlescroll_core::encode::encode;
use candlescroll_core::updater::{CandleLayers, Direction, LayerChange, WindowShift};
use candlescroll_core::window::{plan_step, RowWindow, WindowDelta};
use candlescroll_core::{BarClass, BarTable, ChartError};
use proptest::prelude::*;

const W: f64 = 26.0;

/// Move `layers` from `current` one step; returns the new window or `None` if rejected.
fn shift(table: &BarTable, layers: &mut CandleLayers, current: RowWindow, direction: Direction, step: usize) -> Option<RowWindow> {
    let next = plan_step(current, direction, step, current.len(), table.max_index()?)?;
    let delta = WindowDelta::between(current, next, direction);
    layers
        .apply(&WindowShift { direction, entering: table.rows(delta.entering), exiting: table.times_in(delta.exiting) })
        .expect("apply");
    Some(next)
}

#[test]
fn forward_then_back_matches_direct_encode() {
    common::init_logs();
    let table = BarTable::new(common::bars(300)).expect("table");
    let start = RowWindow::new(0, 100);
    let mut layers = CandleLayers::from_bars(table.rows(start), W).expect("layers");

    let w1 = shift(&table, &mut layers, start, Direction::Forward, 100).expect("first step");
    assert_eq!(w1, RowWindow::new(100, 200));
    assert_eq!(layers, CandleLayers::from_bars(table.rows(w1), W).expect("direct"));

    let w2 = shift(&table, &mut layers, w1, Direction::Forward, 100).expect("second step");
    assert_eq!(w2, RowWindow::new(199, 299));
    assert_eq!(layers, CandleLayers::from_bars(table.rows(w2), W).expect("direct"));

    let back = shift(&table, &mut layers, w2, Direction::Backward, 100).expect("back");
    assert_eq!(back, RowWindow::new(99, 199));
    assert_eq!(layers, CandleLayers::from_bars(table.rows(back), W).expect("direct"));
}

#[test]
fn partial_overlap_keeps_shared_groups() {
    let table = BarTable::new(common::bars(60)).expect("table");
    let start = RowWindow::new(10, 30);
    let mut layers = CandleLayers::from_bars(table.rows(start), W).expect("layers");
    let next = shift(&table, &mut layers, start, Direction::Forward, 7).expect("step");
    assert_eq!(next, RowWindow::new(17, 37));
    assert_eq!(layers, CandleLayers::from_bars(table.rows(next), W).expect("direct"));
    let back = shift(&table, &mut layers, next, Direction::Backward, 13).expect("step");
    assert_eq!(back, RowWindow::new(4, 24));
    assert_eq!(layers, CandleLayers::from_bars(table.rows(back), W).expect("direct"));
}

#[test]
fn class_that_empties_is_cleared_then_created() {
    let table = BarTable::new(common::split_bars(250, 100)).expect("table");
    let start = RowWindow::new(0, 100);
    let mut layers = CandleLayers::from_bars(table.rows(start), W).expect("layers");
    assert!(layers.buffer(BarClass::Bearish).is_empty());

    let next = RowWindow::new(100, 200);
    let delta = WindowDelta::between(start, next, Direction::Forward);
    let update = layers
        .apply(&WindowShift {
            direction: Direction::Forward,
            entering: table.rows(delta.entering),
            exiting: table.times_in(delta.exiting),
        })
        .expect("apply");
    assert_eq!(update.bullish, LayerChange::Cleared);
    assert!(matches!(update.bearish, LayerChange::Created(_)));

    let delta = WindowDelta::between(next, start, Direction::Backward);
    let update = layers
        .apply(&WindowShift {
            direction: Direction::Backward,
            entering: table.rows(delta.entering),
            exiting: table.times_in(delta.exiting),
        })
        .expect("apply");
    assert!(matches!(update.bullish, LayerChange::Created(_)));
    assert_eq!(update.bearish, LayerChange::Cleared);
}

#[test]
fn untouched_class_reports_untouched() {
    // Rows 0..20 bullish, the rest bearish; both windows lie in the bearish run.
    let table = BarTable::new(common::split_bars(80, 20)).expect("table");
    let start = RowWindow::new(30, 50);
    let mut layers = CandleLayers::from_bars(table.rows(start), W).expect("layers");
    let next = RowWindow::new(35, 55);
    let delta = WindowDelta::between(start, next, Direction::Forward);
    let update = layers
        .apply(&WindowShift {
            direction: Direction::Forward,
            entering: table.rows(delta.entering),
            exiting: table.times_in(delta.exiting),
        })
        .expect("apply");
    assert_eq!(update.bullish, LayerChange::Untouched);
    assert!(matches!(update.bearish, LayerChange::Replaced(_)));
}

#[test]
fn out_of_order_splice_is_rejected_without_mutation() {
    let table = BarTable::new(common::bars(40)).expect("table");
    let start = RowWindow::new(10, 20);
    let mut layers = CandleLayers::from_bars(table.rows(start), W).expect("layers");
    let before = layers.clone();

    // Claims to move forward but brings in older rows.
    let err = layers
        .apply(&WindowShift { direction: Direction::Forward, entering: table.rows(RowWindow::new(0, 5)), exiting: &[] })
        .expect_err("must reject");
    assert!(matches!(err, ChartError::SpliceOrder { .. }));
    assert_eq!(layers, before);
}

#[test]
fn buffer_trim_overflow_is_an_error() {
    let frag = encode(&common::split_bars(3, 3), W).expect("encode").bullish.expect("bullish");
    let mut buf = GeometryBuffer::from_fragment(frag).expect("buffer");
    let err = buf.slide(Edge::Back, 4, None).expect_err("overflow");
    assert!(matches!(err, ChartError::TrimOverflow { requested: 4, available: 3 }));
    assert_eq!(buf.len(), 3);
    buf.slide(Edge::Back, 3, None).expect("trim all");
    assert!(buf.is_empty());
    assert!(buf.to_path().is_none());
}

#[derive(Clone, Copy, Debug)]
enum Move {
    Fwd(usize),
    Back(usize),
}

fn moves() -> impl Strategy<Value = Vec<Move>> {
    prop::collection::vec(
        prop_oneof![(1usize..60).prop_map(Move::Fwd), (1usize..60).prop_map(Move::Back)],
        1..25,
    )
}

proptest! {
    #[test]
    fn random_walk_keeps_buffers_aligned_and_exact(
        n in 30usize..200,
        span in 5usize..40,
        walk in moves()
    ) {
        let table = BarTable::new(common::bars(n)).expect("table");
        let mut window = RowWindow::new(0, span).clamp_to(n);
        let mut layers = CandleLayers::from_bars(table.rows(window), W).expect("layers");
        for m in walk {
            let (direction, step) = match m {
                Move::Fwd(s) => (Direction::Forward, s),
                Move::Back(s) => (Direction::Backward, s),
            };
            if let Some(next) = shift(&table, &mut layers, window, direction, step) {
                prop_assert!(next.start <= next.end);
                window = next;
            }
            for class in BarClass::ALL {
                let buf = layers.buffer(class);
                prop_assert_eq!(buf.vertex_count() % 9, 0);
                prop_assert!(buf.is_ordered());
            }
            prop_assert_eq!(&layers, &CandleLayers::from_bars(table.rows(window), W).expect("direct"));
        }
    }
}
