//! # Simple logging listener for debugging and demos.
//!
//! [`LogListener`] emits one `tracing` INFO line per delivered event. This is
//! primarily useful for development, debugging, and the demo binaries.

use async_trait::async_trait;

use crate::events::Event;
use crate::listeners::Listen;

/// Listener that logs every delivery at INFO.
///
/// Not intended for production use - implement a custom [`Listen`] for
/// structured handling or metrics collection.
pub struct LogListener;

#[async_trait]
impl Listen for LogListener {
    async fn on_event(&self, event: &Event) {
        match &event.params {
            Some(params) => {
                tracing::info!(event = %event.id, seq = event.seq, params = ?params, "delivered");
            }
            None => {
                tracing::info!(event = %event.id, seq = event.seq, "delivered");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
