use std::sync::Arc;
use std::time::Duration;

use scopecast::{Config, Event, LogListener, Notifier, ScopeToken};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut cfg = Config::default();
    cfg.commit_grace = Duration::from_millis(100);
    let notifier = Notifier::new(cfg)?;
    notifier.add_listener(Arc::new(LogListener), &["order.placed"])?;

    // One token per logical unit of work.
    let token = ScopeToken::new();
    let scopes = notifier.scopes();

    // Committed unit of work: the event fires after the grace interval.
    let scope = scopes.enter(token);
    scope.fire_on_commit(Event::new("order.placed").with_param("order", 1))?;
    scope.commit()?;

    // Rolled-back unit of work: nothing fires.
    let scope = scopes.enter(token);
    scope.fire_on_commit(Event::new("order.placed").with_param("order", 2))?;
    scope.rollback()?;

    // Nested: the inner commit only matters if the outer scope commits too.
    let outer = scopes.enter(token);
    {
        let inner = scopes.enter(token);
        inner.fire_on_commit(Event::new("order.placed").with_param("order", 3))?;
        inner.commit()?;
    }
    outer.commit()?;

    tokio::time::sleep(Duration::from_millis(400)).await;
    notifier.shutdown().await;
    Ok(())
}
