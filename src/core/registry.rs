//! # Listener registry: event-id → listener-set table.
//!
//! [`ListenerRegistry`] holds, per event identifier, the set of subscribed
//! listeners. It is the one resource shared across all threads, guarded by a
//! single read-write lock for both writes (registration) and snapshot reads,
//! so dispatch never observes a half-updated set.
//!
//! ## Rules
//! - Registration is **append-only** for the life of the process; there is
//!   no deregistration. A listener whose lifetime is shorter than the
//!   process leaks its registration.
//! - Listener identity is the `Arc` allocation address; inserting the same
//!   reference twice for one id is a no-op.
//! - The lock is never held while listeners run: `snapshot` clones the set
//!   and releases the lock before delivery begins.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::ConfigError;
use crate::listeners::ListenerRef;

/// Process-wide table from event identifier to registered listeners.
///
/// Explicitly constructed and injected (see [`Notifier`](crate::Notifier));
/// tests build isolated instances.
pub struct ListenerRegistry {
    entries: RwLock<HashMap<Arc<str>, Vec<ListenerRef>>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `listener` for every id in `event_ids`.
    ///
    /// Fails with [`ConfigError::NoEventIds`] when `event_ids` is empty; no
    /// registration happens in that case. For each id the listener set is
    /// created lazily; inserting a reference already present for that id is
    /// a no-op. Safe under concurrent callers.
    pub fn add(&self, listener: ListenerRef, event_ids: &[&str]) -> Result<(), ConfigError> {
        if event_ids.is_empty() {
            return Err(ConfigError::NoEventIds);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for id in event_ids {
            match entries.get_mut(*id) {
                Some(set) => {
                    if !set.iter().any(|known| Arc::ptr_eq(known, &listener)) {
                        set.push(Arc::clone(&listener));
                    }
                }
                None => {
                    entries.insert(Arc::from(*id), vec![Arc::clone(&listener)]);
                }
            }
        }
        Ok(())
    }

    /// Returns an immutable copy of the listener set for `event_id`.
    ///
    /// Empty if nothing is registered. The copy is taken under the same lock
    /// used for writes; the lock is released before the copy is used.
    #[must_use]
    pub fn snapshot(&self, event_id: &str) -> Vec<ListenerRef> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(event_id).cloned().unwrap_or_default()
    }

    /// Number of listeners currently registered for `event_id`.
    #[must_use]
    pub fn listener_count(&self, event_id: &str) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(event_id).map_or(0, Vec::len)
    }

    /// Number of event ids with at least one listener.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if no listener has ever been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.event_count() == 0
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
