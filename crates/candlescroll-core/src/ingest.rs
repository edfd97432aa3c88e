// File: crates/candlescroll-core/src/ingest.rs
// Summary: Streaming ingestion: lockstep handshake channel, feed worker, table consumer.
//
// Protocol, one round:
//   worker  --Batch-->  consumer      (worker then blocks)
//   worker  <--Ack---   consumer      (Ok: keep polling, Kill: stop)
// The worker sends Kill instead of a batch when the feed fails, then exits.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::config::LiveConfig;
use crate::feed::{Feed, FeedError, PollSchedule};
use crate::series::Bar;
use crate::source::GrowingTable;

#[derive(Clone, Debug, PartialEq)]
pub enum FeedMessage {
    Batch(Vec<Bar>),
    Kill,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ack {
    Ok,
    Kill,
}

/// Worker side of the handshake.
#[derive(Debug)]
pub struct WorkerEnd {
    batches: Sender<FeedMessage>,
    acks: Receiver<Ack>,
    in_flight: bool,
}

/// Consumer side of the handshake.
#[derive(Debug)]
pub struct ConsumerEnd {
    batches: Receiver<FeedMessage>,
    acks: Sender<Ack>,
    pending: bool,
}

/// Duplex channel with room for exactly one message each way.
pub fn handshake() -> (WorkerEnd, ConsumerEnd) {
    let (batch_tx, batch_rx) = bounded(1);
    let (ack_tx, ack_rx) = bounded(1);
    (
        WorkerEnd { batches: batch_tx, acks: ack_rx, in_flight: false },
        ConsumerEnd { batches: batch_rx, acks: ack_tx, pending: false },
    )
}

impl WorkerEnd {
    pub fn send_batch(&mut self, batch: Vec<Bar>) -> Result<(), FeedError> {
        if self.in_flight {
            return Err(FeedError::Protocol("batch sent while the previous one is unacknowledged"));
        }
        self.batches.send(FeedMessage::Batch(batch)).map_err(|_| FeedError::Disconnected)?;
        self.in_flight = true;
        Ok(())
    }

    /// Block until the consumer answers the batch in flight.
    pub fn await_ack(&mut self) -> Result<Ack, FeedError> {
        if !self.in_flight {
            return Err(FeedError::Protocol("waiting for an acknowledgment with no batch in flight"));
        }
        let ack = self.acks.recv().map_err(|_| FeedError::Disconnected)?;
        self.in_flight = false;
        Ok(ack)
    }

    /// Non-blocking check between polls. A stray `Ack::Ok` is a protocol violation.
    pub fn poll_kill(&mut self) -> Result<bool, FeedError> {
        match self.acks.try_recv() {
            Ok(Ack::Kill) => Ok(true),
            Ok(Ack::Ok) => Err(FeedError::Protocol("duplicate acknowledgment")),
            Err(TryRecvError::Empty) => Ok(false),
            Err(TryRecvError::Disconnected) => Err(FeedError::Disconnected),
        }
    }

    /// Tell the consumer the feed is gone. Never blocks.
    pub fn send_kill(&self) {
        match self.batches.try_send(FeedMessage::Kill) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(_)) => log::warn!("kill not delivered: a batch is still queued"),
        }
    }
}

impl ConsumerEnd {
    pub fn recv(&mut self) -> Result<FeedMessage, FeedError> {
        if self.pending {
            return Err(FeedError::Protocol("receive before acknowledging the previous batch"));
        }
        let msg = self.batches.recv().map_err(|_| FeedError::Disconnected)?;
        self.pending = matches!(msg, FeedMessage::Batch(_));
        Ok(msg)
    }

    pub fn ack(&mut self) -> Result<(), FeedError> {
        self.answer(Ack::Ok)
    }

    /// Ask the worker to stop. Answers the pending batch if there is one.
    pub fn kill(&mut self) -> Result<(), FeedError> {
        if self.pending {
            return self.answer(Ack::Kill);
        }
        match self.acks.try_send(Ack::Kill) {
            Ok(()) | Err(TrySendError::Full(_)) => Ok(()),
            Err(TrySendError::Disconnected(_)) => Err(FeedError::Disconnected),
        }
    }

    fn answer(&mut self, ack: Ack) -> Result<(), FeedError> {
        if !self.pending {
            return Err(FeedError::Protocol("acknowledgment without a pending batch"));
        }
        self.acks.send(ack).map_err(|_| FeedError::Disconnected)?;
        self.pending = false;
        Ok(())
    }
}

/// Polls a feed and pushes batches through the handshake.
pub struct FeedWorker<F: Feed> {
    feed: F,
    link: WorkerEnd,
    schedule: PollSchedule,
    stop: Arc<AtomicBool>,
}

impl<F: Feed> FeedWorker<F> {
    pub fn new(feed: F, link: WorkerEnd, schedule: PollSchedule, stop: Arc<AtomicBool>) -> Self {
        Self { feed, link, schedule, stop }
    }

    /// Run until stopped or the feed fails. On failure the consumer receives `Kill`.
    pub fn run(mut self) -> Result<(), FeedError> {
        let result = self.poll_loop();
        match &result {
            Ok(()) => log::info!("feed worker stopped"),
            Err(FeedError::Disconnected) => log::warn!("feed consumer went away"),
            Err(e) => {
                log::error!("feed worker failed: {e}");
                self.link.send_kill();
            }
        }
        result
    }

    fn poll_loop(&mut self) -> Result<(), FeedError> {
        loop {
            if self.stop.load(Ordering::Acquire) {
                return Ok(());
            }
            let batch = match self.feed.pull()? {
                batch if batch.is_empty() => return Err(FeedError::EmptyResponse),
                batch => batch,
            };
            log::debug!("feed pulled {} bars", batch.len());
            self.link.send_batch(batch)?;
            if self.link.await_ack()? == Ack::Kill {
                return Ok(());
            }
            if !self.sleep_aware(self.schedule.next_sleep())? {
                return Ok(());
            }
        }
    }

    /// Sleep in ticks; returns `false` as soon as a stop is requested.
    fn sleep_aware(&mut self, total: Duration) -> Result<bool, FeedError> {
        let deadline = Instant::now() + total;
        loop {
            if self.stop.load(Ordering::Acquire) || self.link.poll_kill()? {
                return Ok(false);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(true);
            }
            thread::sleep(self.schedule.tick.min(deadline - now));
        }
    }
}

/// Drains the handshake into a growing table until Kill, disconnect or stop.
pub fn run_consumer(table: &GrowingTable, mut link: ConsumerEnd, stop: &AtomicBool) {
    loop {
        let batch = match link.recv() {
            Ok(FeedMessage::Batch(batch)) => batch,
            Ok(FeedMessage::Kill) => {
                log::warn!("feed sent kill; no further appends");
                return;
            }
            Err(e) => {
                log::debug!("consumer exiting: {e}");
                return;
            }
        };
        if stop.load(Ordering::Acquire) {
            let _ = link.kill();
            return;
        }
        // Polls may overlap rows already held; keep only the new tail.
        let fresh = match table.last_time() {
            Some(last) => &batch[batch.partition_point(|b| b.t <= last)..],
            None => &batch[..],
        };
        if let Err(e) = table.append(fresh) {
            log::error!("rejecting feed batch: {e}");
            let _ = link.kill();
            return;
        }
        if link.ack().is_err() {
            return;
        }
    }
}

/// A running feed worker plus the consumer thread feeding a shared growing table.
pub struct LiveFeed {
    table: Arc<GrowingTable>,
    stop: Arc<AtomicBool>,
    alive: Arc<AtomicBool>,
    worker: Option<JoinHandle<Result<(), FeedError>>>,
    consumer: Option<JoinHandle<()>>,
}

impl LiveFeed {
    pub fn start<F: Feed>(feed: F, config: &LiveConfig) -> std::io::Result<Self> {
        let schedule = PollSchedule { step: feed.step(), delay: config.delay(), tick: config.tick() };
        let table = Arc::new(GrowingTable::new());
        let stop = Arc::new(AtomicBool::new(false));
        let alive = Arc::new(AtomicBool::new(true));
        let (worker_end, consumer_end) = handshake();

        let worker = FeedWorker::new(feed, worker_end, schedule, Arc::clone(&stop));
        let worker = thread::Builder::new().name("feed-worker".into()).spawn(move || worker.run())?;

        let consumer = {
            let table = Arc::clone(&table);
            let stop = Arc::clone(&stop);
            let alive = Arc::clone(&alive);
            thread::Builder::new().name("feed-consumer".into()).spawn(move || {
                run_consumer(&table, consumer_end, &stop);
                alive.store(false, Ordering::Release);
            })?
        };

        Ok(Self { table, stop, alive, worker: Some(worker), consumer: Some(consumer) })
    }

    pub fn table(&self) -> Arc<GrowingTable> { Arc::clone(&self.table) }

    /// False once the consumer has stopped appending (kill, failure or shutdown).
    pub fn is_alive(&self) -> bool { self.alive.load(Ordering::Acquire) }

    /// Request a stop; the worker notices within one tick.
    pub fn request_stop(&self) { self.stop.store(true, Ordering::Release); }

    /// Stop both threads and return the worker's outcome.
    pub fn shutdown(mut self) -> Result<(), FeedError> {
        self.request_stop();
        let outcome = match self.worker.take().map(JoinHandle::join) {
            Some(Ok(result)) => result,
            Some(Err(_)) => Err(FeedError::Panicked),
            None => Ok(()),
        };
        if let Some(consumer) = self.consumer.take() {
            let _ = consumer.join();
        }
        outcome
    }
}

impl Drop for LiveFeed {
    fn drop(&mut self) {
        self.request_stop();
    }
}
