//! # Scope engine: nestable fire-on-commit state machine.
//!
//! [`ScopeEngine`] maintains one stack of pending-event lists per
//! [`ScopeToken`]. Each token is in one of two states: **no scope** (no
//! table entry) or **open** at depth n ≥ 1.
//!
//! ## State machine
//! ```text
//! begin(t):            no scope → open(1)   |  open(n) → open(n+1)
//!                      pushes an empty pending list
//!
//! fire_on_commit(t,e): requires open; appends e to the top list
//!
//! end(t, committed):   requires open; pops the top list, then:
//!   committed, depth now 0   → flush: snapshot + grace wait + delivery
//!                              per event (no listeners → dropped silently)
//!   committed, depth still>0 → append popped events to the new top list
//!   rollback, any depth      → discard the popped list
//!   depth now 0              → table entry removed
//! ```
//!
//! ## Rules
//! - A token represents **one logical thread of work**; its stack contents
//!   are only ever touched through that token. Unrelated tokens never
//!   contend on a shared lock (the table is sharded).
//! - Pending events belong exclusively to the scope that created them until
//!   propagated or flushed. An ancestor rollback discards events a child
//!   scope had already committed upward.
//! - `fire_on_commit` and `end` without an open scope are caller bugs in
//!   scope pairing and fail with [`ScopeError::NoOpenScope`]; they must not
//!   be ignored.
//!
//! ## Example
//! ```no_run
//! # use scopecast::{Config, Event, Notifier, ScopeToken};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let notifier = Notifier::new(Config::default())?;
//! let scopes = notifier.scopes();
//! let token = ScopeToken::new();
//!
//! scopes.begin(token);
//! scopes.fire_on_commit(token, Event::new("order.placed"))?;
//! scopes.end(token, true)?; // outermost commit: flush after the grace wait
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use dashmap::DashMap;

use crate::core::Dispatcher;
use crate::error::ScopeError;
use crate::events::Event;
use crate::scope::Scope;

/// Mint for scope token identities.
static SCOPE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Identity of one logical thread of work.
///
/// Tokens are explicit rather than derived from OS thread identity: under a
/// work-stealing runtime a logical unit of work migrates between threads, so
/// the token travels through call context instead. Mint one token per
/// request/transaction and pass it to every scope operation of that unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeToken(u64);

impl ScopeToken {
    /// Mints a fresh token, distinct from every other token in the process.
    #[must_use]
    pub fn new() -> Self {
        Self(SCOPE_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl Default for ScopeToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Nestable deferred-dispatch engine.
///
/// One table entry per token with at least one open scope; the entry is
/// created on the first `begin` and removed when the last scope ends.
pub struct ScopeEngine {
    stacks: DashMap<ScopeToken, Vec<Vec<Event>>>,
    dispatcher: Arc<Dispatcher>,
}

impl ScopeEngine {
    /// Wires the engine to the dispatcher used for committed flushes.
    pub(crate) fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            stacks: DashMap::new(),
            dispatcher,
        }
    }

    /// Opens a scope for `token`, nesting if one is already open.
    pub fn begin(&self, token: ScopeToken) {
        self.stacks
            .entry(token)
            .or_insert_with(Vec::new)
            .push(Vec::new());
    }

    /// Opens a scope and returns an RAII guard for it.
    ///
    /// The guard commits explicitly and rolls back when dropped unconsumed;
    /// see [`Scope`].
    pub fn enter(&self, token: ScopeToken) -> Scope<'_> {
        self.begin(token);
        Scope::new(self, token)
    }

    /// Registers `event` to fire when the unit of work commits.
    ///
    /// Appends to the innermost open scope; does not dispatch. Fails with
    /// [`ScopeError::NoOpenScope`] when `token` has no open scope.
    pub fn fire_on_commit(&self, token: ScopeToken, event: Event) -> Result<(), ScopeError> {
        let Some(mut stack) = self.stacks.get_mut(&token) else {
            return Err(ScopeError::NoOpenScope {
                op: "fire_on_commit",
            });
        };
        match stack.last_mut() {
            Some(top) => {
                top.push(event);
                Ok(())
            }
            None => Err(ScopeError::NoOpenScope {
                op: "fire_on_commit",
            }),
        }
    }

    /// Closes the innermost open scope for `token`.
    ///
    /// On commit, pending events propagate to the parent scope, or, when
    /// this was the outermost scope, flush through the dispatcher after the
    /// commit grace interval. On rollback the pending events are discarded
    /// regardless of remaining depth. Fails with
    /// [`ScopeError::NoOpenScope`] when `token` has no open scope.
    pub fn end(&self, token: ScopeToken, committed: bool) -> Result<(), ScopeError> {
        let popped = {
            let Some(mut stack) = self.stacks.get_mut(&token) else {
                return Err(ScopeError::NoOpenScope { op: "end" });
            };
            let Some(popped) = stack.pop() else {
                return Err(ScopeError::NoOpenScope { op: "end" });
            };

            if committed && !stack.is_empty() {
                // Nested commit: the parent scope takes ownership.
                if let Some(parent) = stack.last_mut() {
                    parent.extend(popped);
                }
                return Ok(());
            }

            if !stack.is_empty() {
                // Nested rollback: only the popped list is discarded.
                return Ok(());
            }
            popped
        };

        // Outermost scope closed: the token leaves the table either way.
        self.stacks.remove(&token);

        if committed {
            for event in popped {
                self.dispatcher.fire_deferred(event);
            }
        }
        Ok(())
    }

    /// Current nesting depth for `token` (0 = no open scope).
    #[must_use]
    pub fn depth(&self, token: ScopeToken) -> usize {
        self.stacks.get(&token).map_or(0, |stack| stack.len())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
    use tokio::time::timeout;
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::config::Config;
    use crate::core::ListenerRegistry;
    use crate::listeners::{Listen, ListenerRef};

    struct Probe {
        tx: UnboundedSender<Event>,
    }

    impl Probe {
        fn pair() -> (Arc<Self>, UnboundedReceiver<Event>) {
            let (tx, rx) = unbounded_channel();
            (Arc::new(Self { tx }), rx)
        }
    }

    #[async_trait]
    impl Listen for Probe {
        async fn on_event(&self, event: &Event) {
            let _ = self.tx.send(event.clone());
        }

        fn name(&self) -> &'static str {
            "probe"
        }
    }

    /// Engine + registry wired with a short grace for tests.
    fn engine() -> (ScopeEngine, Arc<ListenerRegistry>) {
        let registry = Arc::new(ListenerRegistry::new());
        let cfg = Config {
            delivery_workers: 1,
            commit_grace: Duration::from_millis(10),
            ..Config::default()
        };
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&registry),
            &cfg,
            CancellationToken::new(),
        ));
        (ScopeEngine::new(dispatcher), registry)
    }

    async fn recv_one(rx: &mut UnboundedReceiver<Event>) -> Event {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("delivery within 1s")
            .expect("channel open")
    }

    /// Long enough that a wrongly-scheduled delivery (grace = 10ms) would
    /// have arrived.
    async fn settle(rx: &mut UnboundedReceiver<Event>) -> bool {
        tokio::time::sleep(Duration::from_millis(100)).await;
        rx.try_recv().is_err()
    }

    #[tokio::test]
    async fn test_commit_at_depth_one_delivers_once() {
        let (engine, registry) = engine();
        let (probe, mut rx) = Probe::pair();
        registry.add(probe as ListenerRef, &["e"]).expect("add");
        let token = ScopeToken::new();

        engine.begin(token);
        engine
            .fire_on_commit(token, Event::new("e").with_param("k", "v"))
            .expect("fire_on_commit");
        engine.end(token, true).expect("end");

        let got = recv_one(&mut rx).await;
        assert_eq!(&*got.id, "e");
        assert_eq!(got.param("k"), Some(&"v".into()));
        assert!(settle(&mut rx).await, "delivered more than once");
    }

    #[tokio::test]
    async fn test_rollback_never_delivers() {
        let (engine, registry) = engine();
        let (probe, mut rx) = Probe::pair();
        registry.add(probe as ListenerRef, &["e"]).expect("add");
        let token = ScopeToken::new();

        engine.begin(token);
        engine
            .fire_on_commit(token, Event::new("e"))
            .expect("fire_on_commit");
        engine.end(token, false).expect("end");

        assert!(settle(&mut rx).await, "rolled-back event delivered");
    }

    #[tokio::test]
    async fn test_nested_commit_then_outer_rollback_never_delivers() {
        let (engine, registry) = engine();
        let (probe, mut rx) = Probe::pair();
        registry.add(probe as ListenerRef, &["e"]).expect("add");
        let token = ScopeToken::new();

        engine.begin(token);
        engine.begin(token);
        engine
            .fire_on_commit(token, Event::new("e"))
            .expect("fire_on_commit");
        engine.end(token, true).expect("inner end");
        engine.end(token, false).expect("outer end");

        assert!(settle(&mut rx).await, "ancestor rollback leaked an event");
    }

    #[tokio::test]
    async fn test_nested_commit_then_outer_commit_delivers_once() {
        let (engine, registry) = engine();
        let (probe, mut rx) = Probe::pair();
        registry.add(probe as ListenerRef, &["e"]).expect("add");
        let token = ScopeToken::new();

        engine.begin(token);
        engine.begin(token);
        engine
            .fire_on_commit(token, Event::new("e").with_param("k", "v"))
            .expect("fire_on_commit");
        engine.end(token, true).expect("inner end");
        engine.end(token, true).expect("outer end");

        let got = recv_one(&mut rx).await;
        assert_eq!(got.param("k"), Some(&"v".into()));
        assert!(settle(&mut rx).await, "delivered more than once");
    }

    #[tokio::test]
    async fn test_nested_rollback_spares_parent_events() {
        let (engine, registry) = engine();
        let (probe, mut rx) = Probe::pair();
        registry.add(probe as ListenerRef, &["e"]).expect("add");
        let token = ScopeToken::new();

        engine.begin(token);
        engine
            .fire_on_commit(token, Event::new("e").with_param("owner", "parent"))
            .expect("fire_on_commit");
        engine.begin(token);
        engine
            .fire_on_commit(token, Event::new("e").with_param("owner", "child"))
            .expect("fire_on_commit");
        engine.end(token, false).expect("inner end");
        engine.end(token, true).expect("outer end");

        let got = recv_one(&mut rx).await;
        assert_eq!(got.param("owner"), Some(&"parent".into()));
        assert!(settle(&mut rx).await, "rolled-back child event delivered");
    }

    #[tokio::test]
    async fn test_commit_without_listeners_drops_silently() {
        let (engine, _registry) = engine();
        let token = ScopeToken::new();

        engine.begin(token);
        engine
            .fire_on_commit(token, Event::new("nobody-listens"))
            .expect("fire_on_commit");
        engine.end(token, true).expect("end");
        assert_eq!(engine.depth(token), 0);
    }

    #[tokio::test]
    async fn test_end_without_scope_fails() {
        let (engine, _registry) = engine();
        let token = ScopeToken::new();

        assert!(matches!(
            engine.end(token, true),
            Err(ScopeError::NoOpenScope { op: "end" })
        ));
    }

    #[tokio::test]
    async fn test_fire_on_commit_without_scope_fails() {
        let (engine, _registry) = engine();
        let token = ScopeToken::new();

        assert!(matches!(
            engine.fire_on_commit(token, Event::new("e")),
            Err(ScopeError::NoOpenScope {
                op: "fire_on_commit"
            })
        ));
    }

    #[tokio::test]
    async fn test_depth_tracks_nesting_and_entry_lifecycle() {
        let (engine, _registry) = engine();
        let token = ScopeToken::new();

        assert_eq!(engine.depth(token), 0);
        engine.begin(token);
        engine.begin(token);
        assert_eq!(engine.depth(token), 2);
        engine.end(token, true).expect("end");
        assert_eq!(engine.depth(token), 1);
        engine.end(token, false).expect("end");
        assert_eq!(engine.depth(token), 0);

        // The table entry is gone, not just empty.
        assert!(engine.stacks.get(&token).is_none());
        assert!(matches!(engine.end(token, true), Err(_)));
    }

    #[tokio::test]
    async fn test_tokens_are_independent() {
        let (engine, registry) = engine();
        let (probe, mut rx) = Probe::pair();
        registry.add(probe as ListenerRef, &["e"]).expect("add");
        let a = ScopeToken::new();
        let b = ScopeToken::new();

        engine.begin(a);
        engine.begin(b);
        engine
            .fire_on_commit(a, Event::new("e").with_param("token", "a"))
            .expect("fire_on_commit");
        engine
            .fire_on_commit(b, Event::new("e").with_param("token", "b"))
            .expect("fire_on_commit");

        engine.end(b, false).expect("end b");
        engine.end(a, true).expect("end a");

        let got = recv_one(&mut rx).await;
        assert_eq!(got.param("token"), Some(&"a".into()));
        assert!(settle(&mut rx).await, "rolled-back token b delivered");
    }

    #[tokio::test]
    async fn test_outermost_commit_flushes_every_pending_event() {
        let (engine, registry) = engine();
        let (probe, mut rx) = Probe::pair();
        registry.add(probe as ListenerRef, &["e"]).expect("add");
        let token = ScopeToken::new();

        engine.begin(token);
        for i in 0..3 {
            engine
                .fire_on_commit(token, Event::new("e").with_param("i", i))
                .expect("fire_on_commit");
        }
        engine.end(token, true).expect("end");

        let mut seen = Vec::new();
        for _ in 0..3 {
            let got = recv_one(&mut rx).await;
            if let Some(i) = got.param("i").and_then(serde_json::Value::as_i64) {
                seen.push(i);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }
}
