//! # DeliveryPool: bounded fan-out workers for event delivery.
//!
//! [`DeliveryPool`] executes delivery jobs (one job per event occurrence) on
//! a fixed set of worker tasks, each fed by its own bounded queue.
//! Submission round-robins across the lanes and never blocks the caller.
//!
//! ## What it guarantees
//! - `submit` returns immediately.
//! - Within one job, listeners are invoked in sequence; a panic in one is
//!   caught, logged at ERROR, and does not stop the rest.
//! - Shutdown is cooperative: workers stop between jobs, and an in-flight
//!   listener invocation is never force-cancelled.
//!
//! ## What it does **not** guarantee
//! - No ordering across jobs, even on the same lane relative to other lanes.
//! - No durability: a full or closed lane drops the job and logs a warning.
//!
//! ## Diagram
//! ```text
//!    submit(Delivery)
//!        │  (round-robin)
//!        ├────────────► [lane 1] ─► worker 1 ─► on_event() per listener
//!        ├────────────► [lane 2] ─► worker 2 ─► on_event() per listener
//!        └────────────► [lane N] ─► worker N ─► on_event() per listener
//! ```

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::Event;
use crate::listeners::ListenerRef;

/// One delivery job: an event occurrence plus the listener snapshot resolved
/// for it at submission time.
pub(crate) struct Delivery {
    pub event: Event,
    pub listeners: Vec<ListenerRef>,
}

/// Submission side of the pool, shared with grace timers.
pub(crate) struct Lanes {
    queues: Vec<mpsc::Sender<Delivery>>,
    next: AtomicUsize,
}

impl Lanes {
    /// Enqueues one job on the next lane (non-blocking).
    ///
    /// A full or closed lane drops the job for this event occurrence and
    /// logs a warning; other lanes are unaffected.
    pub(crate) fn submit(&self, job: Delivery) {
        let lane = self.next.fetch_add(1, AtomicOrdering::Relaxed) % self.queues.len();
        match self.queues[lane].try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(job)) => {
                tracing::warn!(event = %job.event.id, lane, "delivery dropped: lane full");
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                tracing::warn!(event = %job.event.id, lane, "delivery dropped: pool shut down");
            }
        }
    }
}

/// Fixed-size worker pool with per-lane bounded queues.
///
/// The pool is the bounded replacement for spawning one task per event:
/// event volume can spike without unbounded resource growth, at the cost of
/// dropping occurrences when every lane is saturated.
pub(crate) struct DeliveryPool {
    lanes: Arc<Lanes>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl DeliveryPool {
    /// Creates the pool and spawns `workers` worker tasks.
    ///
    /// Both `workers` and `capacity` are clamped to a minimum of 1. Must be
    /// called inside a Tokio runtime.
    pub(crate) fn new(workers: usize, capacity: usize, cancel: CancellationToken) -> Self {
        let workers = workers.max(1);
        let capacity = capacity.max(1);

        let mut queues = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for _ in 0..workers {
            let (tx, rx) = mpsc::channel::<Delivery>(capacity);
            queues.push(tx);
            handles.push(tokio::spawn(worker_loop(rx, cancel.clone())));
        }

        Self {
            lanes: Arc::new(Lanes {
                queues,
                next: AtomicUsize::new(0),
            }),
            workers: Mutex::new(handles),
            cancel,
        }
    }

    /// Enqueues one job (non-blocking).
    pub(crate) fn submit(&self, job: Delivery) {
        self.lanes.submit(job);
    }

    /// Returns the shared submission handle, for deferred submission from
    /// grace-timer tasks.
    pub(crate) fn lanes(&self) -> Arc<Lanes> {
        Arc::clone(&self.lanes)
    }

    /// Cooperative shutdown: signals workers and awaits their completion.
    ///
    /// Jobs already queued but not yet started may be dropped; an in-flight
    /// delivery always finishes.
    pub(crate) async fn shutdown(&self) {
        self.cancel.cancel();
        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
            workers.drain(..).collect()
        };
        for handle in handles {
            let _ = handle.await;
        }
    }
}

/// Worker loop: pull jobs until cancelled or the lane closes.
async fn worker_loop(mut rx: mpsc::Receiver<Delivery>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => deliver(job).await,
                None => break,
            }
        }
    }
}

/// Runs one delivery job: every listener in the snapshot, in sequence, with
/// failure isolation.
async fn deliver(job: Delivery) {
    for listener in &job.listeners {
        let fut = listener.on_event(&job.event);
        if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
            tracing::error!(
                listener = listener.name(),
                event = %job.event.id,
                "listener failed during delivery: {}",
                panic_message(panic.as_ref()),
            );
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
