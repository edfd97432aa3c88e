// File: crates/candlescroll-core/tests/ingest.rs
// Purpose: Lockstep handshake protocol, feed worker lifecycle and the table consumer.

mod common;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use candlescroll_core::feed::{Feed, FeedError, PollSchedule, ReplayFeed};
use candlescroll_core::ingest::{handshake, run_consumer, Ack, FeedMessage, FeedWorker, LiveFeed};
use candlescroll_core::source::{BarSource, GrowingTable};
use candlescroll_core::{Bar, LiveConfig};

fn fast_live() -> LiveConfig {
    LiveConfig { delay_secs: 0, tick_ms: 10 }
}

/// Fails on the first poll.
struct BrokenFeed;

impl Feed for BrokenFeed {
    fn step(&self) -> Duration { Duration::from_secs(1) }
    fn pull(&mut self) -> Result<Vec<Bar>, FeedError> {
        Err(FeedError::Connection("refused".into()))
    }
}

/// Answers every poll with nothing.
struct EmptyFeed;

impl Feed for EmptyFeed {
    fn step(&self) -> Duration { Duration::from_secs(1) }
    fn pull(&mut self) -> Result<Vec<Bar>, FeedError> { Ok(Vec::new()) }
}

fn wait_until(timeout: Duration, mut f: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if f() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    f()
}

#[test]
fn worker_protocol_misuse_is_reported() {
    let (mut worker, _consumer) = handshake();
    assert!(matches!(worker.await_ack(), Err(FeedError::Protocol(_))));
    worker.send_batch(common::bars(2)).expect("first batch");
    assert!(matches!(worker.send_batch(common::bars(2)), Err(FeedError::Protocol(_))));
}

#[test]
fn consumer_protocol_misuse_is_reported() {
    let (mut worker, mut consumer) = handshake();
    assert!(matches!(consumer.ack(), Err(FeedError::Protocol(_))));

    worker.send_batch(common::bars(2)).expect("send");
    assert!(matches!(consumer.recv(), Ok(FeedMessage::Batch(b)) if b.len() == 2));
    // Second receive before answering the first batch.
    assert!(matches!(consumer.recv(), Err(FeedError::Protocol(_))));
    consumer.ack().expect("ack");
    assert_eq!(worker.await_ack().expect("ack"), Ack::Ok);
    assert!(!worker.poll_kill().expect("poll"));
}

#[test]
fn stray_ok_between_polls_is_a_protocol_error() {
    let (mut worker, mut consumer) = handshake();
    worker.send_batch(common::bars(1)).expect("send");
    consumer.recv().expect("recv");
    consumer.ack().expect("ack");
    // The answer arrives while the worker is between polls instead of awaiting it.
    assert!(matches!(worker.poll_kill(), Err(FeedError::Protocol(_))));
    assert!(!worker.poll_kill().expect("channel drained"));
}

#[test]
fn consumer_kill_is_seen_mid_sleep_within_a_few_ticks() {
    common::init_logs();
    let tick = Duration::from_millis(10);
    let hour = Duration::from_secs(3600);
    let feed = ReplayFeed::new(common::bars(50), 10, 10, hour);
    let schedule = PollSchedule { step: hour, delay: Duration::ZERO, tick };
    let (worker_end, mut consumer) = handshake();
    let worker = FeedWorker::new(feed, worker_end, schedule, Arc::new(AtomicBool::new(false)));
    let handle = thread::spawn(move || worker.run());

    assert!(matches!(consumer.recv(), Ok(FeedMessage::Batch(b)) if b.len() == 10));
    consumer.ack().expect("ack");
    // Let the worker take the ack and fall asleep until the next hour.
    thread::sleep(tick * 5);
    assert!(!handle.is_finished());

    let killed = Instant::now();
    consumer.kill().expect("kill");
    assert!(wait_until(Duration::from_secs(5), || handle.is_finished()));
    let took = killed.elapsed();
    assert!(took < tick * 20, "worker needed {took:?} to notice the kill");
    assert!(handle.join().expect("worker thread").is_ok());
    // Nothing else was sent before the worker hung up.
    assert!(matches!(consumer.recv(), Err(FeedError::Disconnected)));
}

#[test]
fn consumer_kill_answers_pending_batch() {
    let (mut worker, mut consumer) = handshake();
    worker.send_batch(common::bars(1)).expect("send");
    consumer.recv().expect("recv");
    consumer.kill().expect("kill");
    assert_eq!(worker.await_ack().expect("ack"), Ack::Kill);
}

#[test]
fn dropped_peer_is_disconnected() {
    let (mut worker, consumer) = handshake();
    drop(consumer);
    assert!(matches!(worker.send_batch(common::bars(1)), Err(FeedError::Disconnected)));
}

#[test]
fn consumer_strips_overlap_and_appends() {
    common::init_logs();
    let table = GrowingTable::new();
    let stop = AtomicBool::new(false);
    let all = common::bars(8);
    let (mut worker, consumer) = handshake();
    thread::scope(|s| {
        s.spawn(|| run_consumer(&table, consumer, &stop));
        worker.send_batch(all[..5].to_vec()).expect("send");
        assert_eq!(worker.await_ack().expect("ack"), Ack::Ok);
        worker.send_batch(all[3..].to_vec()).expect("send");
        assert_eq!(worker.await_ack().expect("ack"), Ack::Ok);
        drop(worker);
    });
    assert_eq!(table.len(), 8);
    assert_eq!(table.times(candlescroll_core::RowWindow::new(0, 8)), all.iter().map(|b| b.t).collect::<Vec<_>>());
}

#[test]
fn consumer_stops_on_kill_message() {
    let table = GrowingTable::new();
    let stop = AtomicBool::new(false);
    let (worker, consumer) = handshake();
    thread::scope(|s| {
        let handle = s.spawn(|| run_consumer(&table, consumer, &stop));
        worker.send_kill();
        handle.join().expect("consumer");
    });
    assert!(table.is_empty());
}

#[test]
fn poll_schedule_aligns_to_next_step() {
    let schedule = PollSchedule { step: Duration::from_secs(60), delay: Duration::from_secs(2), tick: Duration::from_millis(500) };
    assert_eq!(schedule.sleep_from(120), Duration::from_secs(62));
    assert_eq!(schedule.sleep_from(125), Duration::from_secs(57));
    assert_eq!(schedule.sleep_from(179), Duration::from_secs(3));
}

#[test]
fn replay_feed_runs_dry() {
    let mut feed = ReplayFeed::new(common::bars(7), 4, 2, Duration::from_secs(60));
    assert_eq!(feed.pull().expect("initial").len(), 4);
    assert_eq!(feed.pull().expect("poll").len(), 2);
    assert_eq!(feed.pull().expect("poll").len(), 1);
    assert_eq!(feed.delivered(), 7);
    assert!(matches!(feed.pull(), Err(FeedError::Exhausted)));
}

#[test]
fn live_feed_ingests_replay_until_exhausted() {
    common::init_logs();
    let feed = ReplayFeed::new(common::bars(6), 3, 3, Duration::from_secs(1));
    let live = LiveFeed::start(feed, &fast_live()).expect("start");
    let table = live.table();
    assert!(table.wait_for_rows(6, Duration::from_secs(10)));
    assert!(wait_until(Duration::from_secs(10), || !live.is_alive()));
    assert_eq!(table.len(), 6);
    assert!(matches!(live.shutdown(), Err(FeedError::Exhausted)));
}

#[test]
fn stop_request_is_observed_within_a_tick() {
    common::init_logs();
    // A one-hour step keeps the worker asleep after the first batch.
    let feed = ReplayFeed::new(common::bars(50), 10, 10, Duration::from_secs(3600));
    let live = LiveFeed::start(feed, &fast_live()).expect("start");
    let table = live.table();
    assert!(table.wait_for_rows(10, Duration::from_secs(5)));

    let started = Instant::now();
    live.shutdown().expect("clean stop");
    assert!(started.elapsed() < Duration::from_millis(500), "stop took {:?}", started.elapsed());
    assert_eq!(table.len(), 10);
}

#[test]
fn failing_feed_kills_consumer() {
    common::init_logs();
    let live = LiveFeed::start(BrokenFeed, &fast_live()).expect("start");
    assert!(wait_until(Duration::from_secs(5), || !live.is_alive()));
    assert!(live.table().is_empty());
    assert!(matches!(live.shutdown(), Err(FeedError::Connection(_))));
}

#[test]
fn empty_response_is_fatal() {
    let live = LiveFeed::start(EmptyFeed, &fast_live()).expect("start");
    assert!(wait_until(Duration::from_secs(5), || !live.is_alive()));
    assert!(matches!(live.shutdown(), Err(FeedError::EmptyResponse)));
}
