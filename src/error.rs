//! Error types used by the scopecast runtime.
//!
//! This module defines two main error enums:
//!
//! - [`ConfigError`] — invalid registration or configuration, surfaced to the
//!   caller synchronously.
//! - [`ScopeError`] — scope operations attempted without an open scope; a
//!   caller bug in scope pairing.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for
//! logs/metrics.
//!
//! Listener invocation failures are deliberately absent here: they are caught
//! inside the delivery worker, logged at ERROR, and never surfaced to any
//! caller.

use thiserror::Error;

/// # Errors produced by registration and configuration.
///
/// These are synchronous and caller-visible; the offending operation is
/// aborted with no partial effect.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Listener registration was given an empty event-id list.
    #[error("listener registration requires at least one event id")]
    NoEventIds,

    /// Dispatch priority outside the legal scheduling range.
    #[error("dispatch priority {priority} outside legal range {min}..={max}")]
    PriorityOutOfRange {
        /// The rejected value.
        priority: i32,
        /// Lower bound of the legal range.
        min: i32,
        /// Upper bound of the legal range.
        max: i32,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use scopecast::ConfigError;
    ///
    /// assert_eq!(ConfigError::NoEventIds.as_label(), "config_no_event_ids");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::NoEventIds => "config_no_event_ids",
            ConfigError::PriorityOutOfRange { .. } => "config_priority_out_of_range",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ConfigError::NoEventIds => "registration without event ids".to_string(),
            ConfigError::PriorityOutOfRange { priority, min, max } => {
                format!("priority {priority} not in {min}..={max}")
            }
        }
    }
}

/// # Errors produced by scope operations.
///
/// These indicate a caller bug in scope pairing — `fire_on_commit` or `end`
/// on a token with no open scope. They must abort the operation, never
/// silently continue; the process itself keeps running.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ScopeError {
    /// A scope operation was called while the token had no open scope.
    #[error("{op} called with no open scope on this token")]
    NoOpenScope {
        /// The operation that was attempted.
        op: &'static str,
    },
}

impl ScopeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use scopecast::ScopeError;
    ///
    /// let err = ScopeError::NoOpenScope { op: "end" };
    /// assert_eq!(err.as_label(), "scope_no_open_scope");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScopeError::NoOpenScope { .. } => "scope_no_open_scope",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            ScopeError::NoOpenScope { op } => format!("{op} without an open scope"),
        }
    }
}
