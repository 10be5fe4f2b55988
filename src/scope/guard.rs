//! # Scope guard: commit explicitly, roll back on drop.
//!
//! [`Scope`] pairs every `begin` with exactly one `end`. Consuming the guard
//! via [`commit`](Scope::commit) or [`rollback`](Scope::rollback) closes the
//! scope with the matching outcome; dropping it unconsumed (including on an
//! early return or a panic unwinding past it) rolls the scope back.
//!
//! Guards nest by calling [`ScopeEngine::enter`] again with the same token.

use crate::error::ScopeError;
use crate::events::Event;
use crate::scope::engine::{ScopeEngine, ScopeToken};

/// RAII handle for one open scope.
#[must_use = "dropping a scope rolls it back; call commit() to flush pending events"]
pub struct Scope<'e> {
    engine: &'e ScopeEngine,
    token: ScopeToken,
    finished: bool,
}

impl<'e> Scope<'e> {
    pub(crate) fn new(engine: &'e ScopeEngine, token: ScopeToken) -> Self {
        Self {
            engine,
            token,
            finished: false,
        }
    }

    /// The token this scope belongs to.
    #[must_use]
    pub fn token(&self) -> ScopeToken {
        self.token
    }

    /// Registers `event` to fire when the unit of work commits.
    ///
    /// Appends to the innermost open scope of the token, which is not
    /// necessarily this guard's scope when guards are nested.
    pub fn fire_on_commit(&self, event: Event) -> Result<(), ScopeError> {
        self.engine.fire_on_commit(self.token, event)
    }

    /// Closes the scope as committed.
    pub fn commit(mut self) -> Result<(), ScopeError> {
        self.finished = true;
        self.engine.end(self.token, true)
    }

    /// Closes the scope as rolled back.
    pub fn rollback(mut self) -> Result<(), ScopeError> {
        self.finished = true;
        self.engine.end(self.token, false)
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.engine.end(self.token, false);
        }
    }
}
