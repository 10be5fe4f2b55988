//! # Event occurrences carried to listeners.
//!
//! An [`Event`] names a category of notification (an opaque string id) and
//! optionally carries a parameter map. A firing with **no** parameter map is
//! distinct from a firing with an **empty** one; `params` is an `Option` to
//! preserve that difference all the way to the listener.
//!
//! ## Ordering
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. Delivery itself is unordered; `seq` is a diagnostic aid for
//! correlating log lines, not a delivery guarantee.
//!
//! ## Example
//! ```rust
//! use scopecast::Event;
//!
//! let ev = Event::new("order.placed")
//!     .with_param("order_id", 42)
//!     .with_param("currency", "EUR");
//!
//! assert_eq!(&*ev.id, "order.placed");
//! assert_eq!(ev.param("order_id"), Some(&42.into()));
//! assert!(ev.has_params());
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use serde_json::Value;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Parameter map attached to an event: string key to arbitrary value.
///
/// Insertion order is irrelevant; keys are compared exactly.
pub type Params = HashMap<String, Value>;

/// One event occurrence.
///
/// - `seq`: monotonic global sequence for log correlation
/// - `at`: wall-clock timestamp (for logs)
/// - `id`: opaque event identifier; equality is exact string match
/// - `params`: `None` when the firing carries no data (distinct from an
///   empty map)
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event identifier.
    pub id: Arc<str>,
    /// Parameter map, or `None` for a data-free firing.
    pub params: Option<Params>,
}

impl Event {
    /// Creates a new event with the given identifier, no parameters, the
    /// current timestamp, and the next sequence number.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            id: id.into(),
            params: None,
        }
    }

    /// Replaces the parameter map wholesale.
    ///
    /// An explicitly empty map is preserved as `Some(empty)`, not collapsed
    /// to `None`.
    #[inline]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    /// Attaches one parameter, creating the map on first use.
    #[inline]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(key.into(), value.into());
        self
    }

    /// Looks up a parameter by key.
    #[inline]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.as_ref().and_then(|p| p.get(key))
    }

    /// True if the firing carries a parameter map (possibly empty).
    #[inline]
    pub fn has_params(&self) -> bool {
        self.params.is_some()
    }
}
