//! Scoped (fire-on-commit) dispatch.
//!
//! A *scope* mirrors an external unit of work, typically a transaction
//! boundary. Events registered inside a scope via `fire_on_commit` are held
//! back; when the scope ends, a commit propagates them to the parent scope
//! (or, at the outermost level, flushes them through the normal delivery
//! path), while a rollback discards them.
//!
//! ## Contents
//! - [`ScopeEngine`], [`ScopeToken`] — the state machine: one LIFO stack of
//!   pending-event lists per logical thread of work;
//! - [`Scope`] — RAII guard over `begin`/`end`: commit explicitly, roll back
//!   on drop.

mod engine;
mod guard;

pub use engine::{ScopeEngine, ScopeToken};
pub use guard::Scope;
