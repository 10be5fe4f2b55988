//! # Event listener trait.
//!
//! Provides [`Listen`], the extension point for plugging event handlers into
//! the notifier.
//!
//! ## Rules
//! - Listeners are invoked from delivery workers, never from the firing
//!   caller's context.
//! - A listener must not let errors escape `on_event`; a panic that does is
//!   caught by the worker, logged at ERROR with the listener's
//!   [`name`](Listen::name) and the event id, and does not stop delivery to
//!   the remaining listeners.
//! - Identity is reference identity: registering the same [`ListenerRef`]
//!   twice for one event id results in one delivery per firing.
//! - A slow or hung listener stalls only the delivery lane it runs on; it is
//!   never cancelled.

use async_trait::async_trait;

use crate::events::Event;

/// Shared handle to a registered listener.
///
/// The allocation address of the `Arc` is the listener's identity in the
/// registry.
pub type ListenerRef = std::sync::Arc<dyn Listen>;

/// Capability for receiving event notifications.
///
/// ### Implementation requirements
/// - Use async I/O; avoid blocking the executor.
/// - Handle errors internally; do not panic.
#[async_trait]
pub trait Listen: Send + Sync + 'static {
    /// Processes one event occurrence.
    ///
    /// Called from a delivery worker. `event.params` is `None` when the
    /// firing carried no data.
    async fn on_event(&self, event: &Event);

    /// Returns the listener name used in error logs.
    ///
    /// Prefer short, descriptive names (e.g., "metrics", "audit", "mailer").
    /// The default uses `type_name::<Self>()`, which can be verbose -
    /// override it when possible.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
