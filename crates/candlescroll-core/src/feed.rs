// File: crates/candlescroll-core/src/feed.rs
// Summary: Feed collaborator interface, its error type, poll scheduling and a replay feed.

use std::time::Duration;

use thiserror::Error;

use crate::series::Bar;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed returned an empty response")]
    EmptyResponse,
    #[error("malformed feed payload: {0}")]
    Malformed(String),
    #[error("cannot reach feed: {0}")]
    Connection(String),
    #[error("feed has no more data")]
    Exhausted,
    #[error("handshake peer disconnected")]
    Disconnected,
    #[error("handshake protocol violation: {0}")]
    Protocol(&'static str),
    #[error("feed worker panicked")]
    Panicked,
}

/// External source of time-ordered OHLC batches polled by the ingestion worker.
pub trait Feed: Send + 'static {
    /// Declared bar interval; polls are aligned to multiples of it.
    fn step(&self) -> Duration;

    /// Fetch the next batch. An `Err` is fatal for the worker.
    fn pull(&mut self) -> Result<Vec<Bar>, FeedError>;
}

/// When to poll next: the next multiple of the feed step, plus a delay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollSchedule {
    pub step: Duration,
    pub delay: Duration,
    /// Sleep granularity; a stop request is noticed within one tick.
    pub tick: Duration,
}

impl PollSchedule {
    /// Time to sleep from epoch second `now` until the next poll.
    pub fn sleep_from(&self, now: i64) -> Duration {
        let step = self.step.as_secs().max(1) as i64;
        let remain = now.rem_euclid(step);
        Duration::from_secs((step - remain) as u64) + self.delay
    }

    /// Sleep until the next poll, measured against the wall clock.
    pub fn next_sleep(&self) -> Duration {
        self.sleep_from(chrono::Utc::now().timestamp())
    }
}

/// Replays recorded bars as if they were arriving live: one initial batch, then a fixed
/// number of bars per poll. Runs dry with `FeedError::Exhausted`.
#[derive(Clone, Debug)]
pub struct ReplayFeed {
    bars: Vec<Bar>,
    cursor: usize,
    initial: usize,
    per_poll: usize,
    step: Duration,
}

impl ReplayFeed {
    pub fn new(bars: Vec<Bar>, initial: usize, per_poll: usize, step: Duration) -> Self {
        Self { bars, cursor: 0, initial: initial.max(1), per_poll: per_poll.max(1), step }
    }

    /// Bars handed out so far.
    pub fn delivered(&self) -> usize { self.cursor }
}

impl Feed for ReplayFeed {
    fn step(&self) -> Duration { self.step }

    fn pull(&mut self) -> Result<Vec<Bar>, FeedError> {
        if self.cursor >= self.bars.len() {
            return Err(FeedError::Exhausted);
        }
        let take = if self.cursor == 0 { self.initial } else { self.per_poll };
        let end = (self.cursor + take).min(self.bars.len());
        let batch = self.bars[self.cursor..end].to_vec();
        self.cursor = end;
        Ok(batch)
    }
}
