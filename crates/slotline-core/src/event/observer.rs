use std::sync::Arc;

use async_trait::async_trait;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::{trace, warn};

use super::RefreshEvent;

/// Consumer of the scheduler notification stream.
///
/// Attached via [`crate::RefreshScheduler::attach`]; each observer runs on its own task
/// and receives events in dispatch order.
#[async_trait]
pub trait Observe: Send + Sync + 'static {
    /// Handle one event.
    async fn on_event(&self, event: &RefreshEvent);

    /// Observer name used in logs.
    fn name(&self) -> &'static str;

    /// Called when the observer fell behind and `skipped` events were dropped.
    async fn on_lagged(&self, skipped: u64) {
        warn!(observer = self.name(), skipped, "observer lagged; events dropped");
    }
}

/// Drive `observer` from `rx` until the scheduler is gone.
pub fn spawn_observer(
    mut rx: broadcast::Receiver<RefreshEvent>,
    observer: Arc<dyn Observe>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => observer.on_event(&event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    observer.on_lagged(skipped).await
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        trace!(observer = observer.name(), "event stream closed");
    })
}
