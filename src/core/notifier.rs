//! # Notifier: the wired-up notification service.
//!
//! [`Notifier`] is the explicitly constructed service object behind the
//! public API: it validates the [`Config`], owns the
//! [`ListenerRegistry`], the [`Dispatcher`] with its delivery pool, the
//! [`ScopeEngine`], and the advisory shutdown token.
//!
//! ## Lifecycle
//! ```text
//! Notifier::new(cfg)          process start (inside a Tokio runtime)
//!     │  validate cfg
//!     │  registry ──► dispatcher (spawns pool workers) ──► scope engine
//!     ▼
//! add_listener / fire / scopes()...
//!     ▼
//! notifier.shutdown().await   process shutdown
//!     │  cancel advisory token
//!     └  join pool workers (in-flight deliveries finish)
//! ```
//!
//! Construct one per process in production; tests build isolated instances
//! freely.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::core::dispatcher::Dispatcher;
use crate::core::registry::ListenerRegistry;
use crate::error::ConfigError;
use crate::events::Event;
use crate::listeners::ListenerRef;
use crate::scope::ScopeEngine;

/// Coordinates registration, dispatch, and scoped deferral.
pub struct Notifier {
    cfg: Config,
    registry: Arc<ListenerRegistry>,
    dispatcher: Arc<Dispatcher>,
    scopes: ScopeEngine,
    cancel: CancellationToken,
}

impl Notifier {
    /// Validates `cfg`, wires the components, and spawns the delivery pool.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        cfg.validate()?;

        let cancel = CancellationToken::new();
        let registry = Arc::new(ListenerRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            &cfg,
            cancel.clone(),
        ));
        let scopes = ScopeEngine::new(Arc::clone(&dispatcher));

        Ok(Self {
            cfg,
            registry,
            dispatcher,
            scopes,
            cancel,
        })
    }

    /// Registers `listener` for every id in `event_ids`.
    ///
    /// See [`ListenerRegistry::add`].
    pub fn add_listener(
        &self,
        listener: ListenerRef,
        event_ids: &[&str],
    ) -> Result<(), ConfigError> {
        self.registry.add(listener, event_ids)
    }

    /// Fires one event occurrence immediately (fire-and-forget).
    ///
    /// See [`Dispatcher::fire`].
    pub fn fire(&self, event: Event) {
        self.dispatcher.fire(event);
    }

    /// The scope engine, for deferred (fire-on-commit) dispatch.
    #[must_use]
    pub fn scopes(&self) -> &ScopeEngine {
        &self.scopes
    }

    /// The listener registry.
    #[must_use]
    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    /// The dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The configuration this notifier was built with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Sets the process-wide dispatch priority at runtime.
    ///
    /// See [`Dispatcher::set_priority`].
    pub fn set_dispatch_priority(&self, priority: i32) -> Result<(), ConfigError> {
        self.dispatcher.set_priority(priority)
    }

    /// Current dispatch priority.
    #[must_use]
    pub fn dispatch_priority(&self) -> i32 {
        self.dispatcher.priority()
    }

    /// Advisory shutdown token.
    ///
    /// Long-lived collaborators may observe it cooperatively; nothing is
    /// force-cancelled through it.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Shuts the notifier down cooperatively.
    ///
    /// Cancels the advisory token and joins the delivery workers. In-flight
    /// deliveries finish; queued jobs not yet started may be dropped.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.dispatcher.shutdown().await;
    }
}
