//! Logging observer for the refresh scheduler notification stream.
//!
//! Maps every dispatch notification to one structured tracing record.
use async_trait::async_trait;
use slotline_core::{Observe, RefreshEvent, RefreshKind};
use tracing::{debug, info, warn};

/// Observer that logs scheduler notifications through `tracing`.
///
/// Initial loads are logged at `info`, periodic refreshes at `debug`.
///
/// ```no_run
/// # use std::sync::Arc;
/// # fn demo(scheduler: &slotline_core::RefreshScheduler) {
/// use slotline_observe::EventLogger;
///
/// let _task = scheduler.attach(Arc::new(EventLogger));
/// # }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct EventLogger;

#[async_trait]
impl Observe for EventLogger {
    async fn on_event(&self, event: &RefreshEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "event-logger"
    }

    async fn on_lagged(&self, skipped: u64) {
        warn!(skipped, "event logger fell behind; notifications dropped");
    }
}

fn log_event(e: &RefreshEvent) {
    let slot = e.key();
    match e.kind {
        RefreshKind::Init => info!(%slot, kind = %e.kind, "{}", message_for(e.kind)),
        RefreshKind::Refresh => debug!(%slot, kind = %e.kind, "{}", message_for(e.kind)),
    }
}

#[inline]
fn message_for(kind: RefreshKind) -> &'static str {
    match kind {
        RefreshKind::Init => "slot load enqueued",
        RefreshKind::Refresh => "slot refresh enqueued",
    }
}
