//! Event data model.
//!
//! This module groups the notification **data model**: the opaque event
//! identifier, the optional parameter map, and the [`Event`] struct that
//! carries both through direct dispatch and deferred (scope) dispatch.
//!
//! ## Contents
//! - [`Event`] — one event occurrence: id, optional params, sequence, timestamp
//! - [`Params`] — string-keyed map of arbitrary values
//!
//! ## Quick reference
//! - **Producers**: application code (`Notifier::fire`,
//!   `ScopeEngine::fire_on_commit`).
//! - **Consumers**: [`Listen`](crate::Listen) implementations, invoked by the
//!   delivery pool.

mod event;

pub use event::{Event, Params};
