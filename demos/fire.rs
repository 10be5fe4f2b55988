use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scopecast::{Config, Event, Listen, LogListener, Notifier};

struct Mailer;

#[async_trait]
impl Listen for Mailer {
    async fn on_event(&self, event: &Event) {
        let user = event
            .param("user")
            .and_then(|v| v.as_str())
            .unwrap_or("<unknown>");
        println!("mailer: welcome mail queued for {user}");
    }

    fn name(&self) -> &'static str {
        "mailer"
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let notifier = Notifier::new(Config::default())?;
    notifier.add_listener(Arc::new(LogListener), &["user.created", "user.deleted"])?;
    notifier.add_listener(Arc::new(Mailer), &["user.created"])?;

    notifier.fire(Event::new("user.created").with_param("user", "ada"));
    notifier.fire(Event::new("user.deleted").with_param("user", "bob"));
    // Nobody listens to this one; it produces no delivery at all.
    notifier.fire(Event::new("user.renamed"));

    tokio::time::sleep(Duration::from_millis(200)).await;
    notifier.shutdown().await;
    Ok(())
}
