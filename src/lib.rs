//! # scopecast
//!
//! **Scopecast** is an in-process publish/subscribe notification library with
//! a transactional twist: callers either fire an event immediately, or
//! register it to fire only if a surrounding unit of work (a *scope*)
//! completes successfully. Scopes nest per logical thread of work; a commit
//! propagates deferred events outward, a rollback discards them.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   Application code
//!        │
//!        ├── fire(Event) ───────────────► Notifier ──► ListenerRegistry
//!        │                                   │            (snapshot)
//!        │                                   ▼
//!        │                             DeliveryPool
//!        │                         ┌───────┼───────┐
//!        │                         ▼       ▼       ▼
//!        │                      [lane1] [lane2] [laneN]   (bounded queues)
//!        │                         │       │       │
//!        │                      worker1 worker2 workerN
//!        │                         │       │       │
//!        │                 listener.on_event(&Event)  (panics contained)
//!        │
//!        └── scopes():  begin ─► fire_on_commit ─► end(committed)
//!                                     │                 │
//!                            [pending list stack]       ├─ commit, nested    → propagate to parent
//!                              one per ScopeToken       ├─ commit, outermost → grace wait, then
//!                                                       │                      same delivery path
//!                                                       └─ rollback          → discard
//! ```
//!
//! ### Guarantees
//! - `fire` and a committed flush never block on delivery; each event
//!   occurrence becomes one fire-and-forget delivery job.
//! - A listener that panics is contained: the panic is caught, logged at
//!   ERROR, and the remaining listeners for that event still run.
//! - Registering the same listener reference twice for one event id yields
//!   one delivery, not two.
//! - Pending events belong to the scope that created them until propagated,
//!   flushed, or discarded; an ancestor rollback discards events a child
//!   scope had already committed upward.
//!
//! ### Non-guarantees
//! - No durability: events are lost on process death, and a saturated
//!   delivery lane drops (and warn-logs) the occurrence.
//! - No ordering across listeners or across separate deliveries.
//! - No listener deregistration: the registry is append-only for the life of
//!   the process.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//!
//! use async_trait::async_trait;
//! use scopecast::{Config, Event, Listen, Notifier, ScopeToken};
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl Listen for Printer {
//!     async fn on_event(&self, event: &Event) {
//!         println!("got {}", event.id);
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "printer"
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let notifier = Notifier::new(Config::default())?;
//!     notifier.add_listener(Arc::new(Printer), &["user.created"])?;
//!
//!     // Immediate dispatch.
//!     notifier.fire(Event::new("user.created").with_param("id", 7));
//!
//!     // Deferred dispatch tied to a unit of work.
//!     let token = ScopeToken::new();
//!     let scope = notifier.scopes().enter(token);
//!     scope.fire_on_commit(Event::new("user.created").with_param("id", 8))?;
//!     scope.commit()?;
//!
//!     notifier.shutdown().await;
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod listeners;
mod scope;

// ---- Public re-exports ----

pub use crate::config::{Config, DISPATCH_PRIORITY_RANGE};
pub use crate::core::{Dispatcher, ListenerRegistry, Notifier};
pub use crate::error::{ConfigError, ScopeError};
pub use crate::events::{Event, Params};
pub use crate::listeners::{Listen, ListenerRef, LogListener};
pub use crate::scope::{Scope, ScopeEngine, ScopeToken};
