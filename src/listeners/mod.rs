//! # Event listeners.
//!
//! This module provides the [`Listen`] trait (the capability consumed by the
//! delivery pool) and a built-in logging implementation.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   fire / committed flush ──► registry snapshot ──► delivery job
//!                                                        │
//!                                                   per listener, in sequence:
//!                                                   listener.on_event(&Event)
//!                                                        │
//!                                                   panic? → caught, logged,
//!                                                   remaining listeners still run
//! ```
//!
//! ## Implementing custom listeners
//! ```no_run
//! use async_trait::async_trait;
//! use scopecast::{Event, Listen};
//!
//! struct Metrics;
//!
//! #[async_trait]
//! impl Listen for Metrics {
//!     async fn on_event(&self, event: &Event) {
//!         if &*event.id == "order.placed" {
//!             // increment a counter, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "metrics"
//!     }
//! }
//! ```

mod listener;
mod log;

pub use listener::{Listen, ListenerRef};
pub use log::LogListener;
