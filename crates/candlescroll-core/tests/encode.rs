// File: crates/candlescroll-core/tests/encode.rs
// Purpose: Candle encoding layout, class partition and rejection of unordered batches.

mod common;

use candlescroll_core::encode::{encode, CandleGroup, GROUP_CODES, GROUP_LEN};
use candlescroll_core::geometry::PathCode;
use candlescroll_core::{Bar, BarClass, ChartError};

#[test]
fn single_bullish_bar_layout() {
    let bar = Bar::try_new(5.0, 10.0, 13.0, 9.0, 12.0).expect("valid bar");
    let w = 0.8;
    let batch = encode(&[bar], w).expect("encode");
    assert!(batch.bearish.is_none());
    let frag = batch.bullish.expect("bullish fragment");
    assert_eq!(frag.len(), 1);

    let pts = frag.groups[0].points;
    assert_eq!(pts.len(), GROUP_LEN);

    // Body: closed rectangle spanning [t, t + w] x [open, close].
    let body = &pts[..5];
    assert_eq!(body[0], body[4]);
    for p in body {
        assert!(p.x == 5.0 || p.x == 5.0 + w);
        assert!(p.y == 10.0 || p.y == 12.0);
    }
    // Wicks at the body center, reaching high and low.
    assert_eq!((pts[5].x, pts[5].y), (5.0 + w / 2.0, 12.0));
    assert_eq!((pts[6].x, pts[6].y), (5.0 + w / 2.0, 13.0));
    assert_eq!((pts[7].x, pts[7].y), (5.0 + w / 2.0, 10.0));
    assert_eq!((pts[8].x, pts[8].y), (5.0 + w / 2.0, 9.0));
    assert_eq!(frag.groups[0].key(), 5.0);
}

#[test]
fn stroke_codes_start_each_part_with_move_to() {
    let moves: Vec<usize> = GROUP_CODES
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == PathCode::MoveTo)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(moves, vec![0, 5, 7]);
}

#[test]
fn partitions_by_class_in_time_order() {
    let bars = common::bars(40);
    let batch = encode(&bars, 26.0).expect("encode");
    let up = batch.get(BarClass::Bullish).expect("bullish");
    let down = batch.get(BarClass::Bearish).expect("bearish");
    assert_eq!(up.len() + down.len(), bars.len());

    let want_up: Vec<f64> = bars.iter().filter(|b| b.class() == BarClass::Bullish).map(|b| b.t).collect();
    let got_up: Vec<f64> = up.groups.iter().map(CandleGroup::key).collect();
    assert_eq!(got_up, want_up);
    assert!(down.groups.windows(2).all(|w| w[0].key() < w[1].key()));
}

#[test]
fn equal_open_close_is_bullish() {
    let doji = Bar::try_new(1.0, 5.0, 6.0, 4.0, 5.0).expect("valid bar");
    assert_eq!(doji.class(), BarClass::Bullish);
    let batch = encode(&[doji], 1.0).expect("encode");
    assert!(batch.bullish.is_some() && batch.bearish.is_none());
}

#[test]
fn empty_batch_yields_no_fragments() {
    let batch = encode(&[], 26.0).expect("encode");
    assert!(batch.bullish.is_none());
    assert!(batch.bearish.is_none());
}

#[test]
fn unordered_batch_is_rejected() {
    let mut bars = common::bars(5);
    bars.swap(1, 3);
    match encode(&bars, 26.0) {
        Err(ChartError::Unordered { index, .. }) => assert_eq!(index, 2),
        other => panic!("expected Unordered, got {other:?}"),
    }
}

#[test]
fn invalid_bars_are_refused() {
    assert!(matches!(Bar::try_new(0.0, 10.0, 9.0, 8.0, 10.5), Err(ChartError::InvalidBar { .. })));
    assert!(matches!(Bar::try_new(0.0, 10.0, 12.0, 10.5, 11.0), Err(ChartError::InvalidBar { .. })));
    assert!(matches!(Bar::try_new(f64::NAN, 10.0, 12.0, 9.0, 11.0), Err(ChartError::InvalidBar { .. })));
}
