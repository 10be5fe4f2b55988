//! # Global runtime configuration.
//!
//! [`Config`] defines the notifier's behavior: dispatch priority, delivery
//! pool sizing, and the commit grace interval applied to deferred flushes.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use scopecast::Config;
//!
//! let mut cfg = Config::default();
//! cfg.delivery_workers = 2;
//! cfg.commit_grace = Duration::from_millis(50);
//!
//! assert!(cfg.validate().is_ok());
//! ```

use std::ops::RangeInclusive;
use std::time::Duration;

use crate::error::ConfigError;

/// Legal range for the process-wide dispatch priority.
///
/// `0` means "scheduler default"; larger values request more urgency. Values
/// outside this range are rejected with [`ConfigError::PriorityOutOfRange`]
/// both at construction and when set at runtime.
pub const DISPATCH_PRIORITY_RANGE: RangeInclusive<i32> = 0..=99;

/// Global configuration for the notifier and its delivery pool.
#[derive(Clone, Debug)]
pub struct Config {
    /// Process-wide scheduling priority for delivery work.
    ///
    /// Validated against [`DISPATCH_PRIORITY_RANGE`]. Tokio exposes no task
    /// priorities, so the value is an advisory hint recorded for the pool;
    /// it remains settable at runtime via
    /// [`Notifier::set_dispatch_priority`](crate::Notifier::set_dispatch_priority).
    pub dispatch_priority: i32,
    /// Number of delivery workers (clamped to a minimum of 1).
    pub delivery_workers: usize,
    /// Capacity of each worker's delivery queue (clamped to a minimum of 1).
    ///
    /// A full queue drops the occurrence for that event and logs a warning;
    /// no durability is promised.
    pub queue_capacity: usize,
    /// Wait applied between an outermost scope commit and delivery of its
    /// pending events.
    ///
    /// The interval tolerates an external transaction boundary that may not
    /// yet be durable at the instant the scope closes. A coordinator that
    /// signals durability explicitly can set this to zero and flush itself.
    pub commit_grace: Duration,
}

impl Config {
    /// Checks every field against its legal range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_priority(self.dispatch_priority)
    }
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `dispatch_priority = 0` (scheduler default)
    /// - `delivery_workers = 4`
    /// - `queue_capacity = 1024`
    /// - `commit_grace = 500ms`
    fn default() -> Self {
        Self {
            dispatch_priority: 0,
            delivery_workers: 4,
            queue_capacity: 1024,
            commit_grace: Duration::from_millis(500),
        }
    }
}

/// Validates a dispatch priority value against [`DISPATCH_PRIORITY_RANGE`].
pub(crate) fn validate_priority(priority: i32) -> Result<(), ConfigError> {
    if DISPATCH_PRIORITY_RANGE.contains(&priority) {
        Ok(())
    } else {
        Err(ConfigError::PriorityOutOfRange {
            priority,
            min: *DISPATCH_PRIORITY_RANGE.start(),
            max: *DISPATCH_PRIORITY_RANGE.end(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_priority_below_range_rejected() {
        let cfg = Config {
            dispatch_priority: -1,
            ..Config::default()
        };
        match cfg.validate() {
            Err(ConfigError::PriorityOutOfRange { priority, min, max }) => {
                assert_eq!(priority, -1);
                assert_eq!(min, 0);
                assert_eq!(max, 99);
            }
            other => panic!("expected PriorityOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_priority_above_range_rejected() {
        let cfg = Config {
            dispatch_priority: 100,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_priority_bounds_are_legal() {
        assert!(validate_priority(0).is_ok());
        assert!(validate_priority(99).is_ok());
    }
}
