//! # Dispatcher: snapshot-then-submit event dispatch.
//!
//! [`Dispatcher`] is the single delivery mechanism behind both direct
//! [`fire`](Dispatcher::fire) and the scope engine's committed flushes. It
//! resolves the listener snapshot for the event id and, only when the
//! snapshot is non-empty, hands one delivery job to the delivery pool.
//!
//! ## Rules
//! - **Non-blocking**: `fire` returns immediately; the caller never waits on
//!   delivery.
//! - **No listeners, no work**: an event id with an empty snapshot produces
//!   zero delivery jobs and zero log entries.
//! - **Snapshot at submission**: listeners registered after a fire do not
//!   receive that occurrence, even if delivery has not run yet.
//! - Deferred flushes wait out the commit grace interval on their own timer
//!   task, so the wait never occupies a delivery worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering as AtomicOrdering};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::config::{Config, validate_priority};
use crate::core::registry::ListenerRegistry;
use crate::core::{Delivery, DeliveryPool};
use crate::error::ConfigError;
use crate::events::Event;

/// Dispatches event occurrences to registered listeners through the pool.
pub struct Dispatcher {
    registry: Arc<ListenerRegistry>,
    pool: DeliveryPool,
    priority: AtomicI32,
    grace: Duration,
}

impl Dispatcher {
    /// Wires the dispatcher to a registry and spawns the delivery pool.
    ///
    /// Must be called inside a Tokio runtime. `cfg` is assumed validated.
    pub(crate) fn new(
        registry: Arc<ListenerRegistry>,
        cfg: &Config,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            registry,
            pool: DeliveryPool::new(cfg.delivery_workers, cfg.queue_capacity, cancel),
            priority: AtomicI32::new(cfg.dispatch_priority),
            grace: cfg.commit_grace,
        }
    }

    /// Fires one event occurrence immediately.
    ///
    /// Takes a registry snapshot for `event.id`; if empty, returns with no
    /// side effect. Otherwise submits exactly one delivery job and returns
    /// without waiting for it.
    pub fn fire(&self, event: Event) {
        let listeners = self.registry.snapshot(&event.id);
        if listeners.is_empty() {
            return;
        }
        self.pool.submit(Delivery { event, listeners });
    }

    /// Fires one event occurrence after the commit grace interval.
    ///
    /// Flush path for committed outermost scopes. The snapshot is resolved
    /// now; events with no listeners are dropped silently. The grace wait
    /// tolerates an external transaction boundary that may not yet be
    /// durable at this instant.
    pub(crate) fn fire_deferred(&self, event: Event) {
        let listeners = self.registry.snapshot(&event.id);
        if listeners.is_empty() {
            return;
        }

        let grace = self.grace;
        if grace.is_zero() {
            self.pool.submit(Delivery { event, listeners });
            return;
        }

        let lanes = self.pool.lanes();
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            lanes.submit(Delivery { event, listeners });
        });
    }

    /// Sets the process-wide dispatch priority.
    ///
    /// Fails with [`ConfigError::PriorityOutOfRange`] when outside
    /// [`DISPATCH_PRIORITY_RANGE`](crate::DISPATCH_PRIORITY_RANGE); the
    /// previous value stays in effect.
    pub fn set_priority(&self, priority: i32) -> Result<(), ConfigError> {
        validate_priority(priority)?;
        self.priority.store(priority, AtomicOrdering::Relaxed);
        Ok(())
    }

    /// Current dispatch priority.
    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority.load(AtomicOrdering::Relaxed)
    }

    /// Shuts the delivery pool down cooperatively.
    pub(crate) async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}
