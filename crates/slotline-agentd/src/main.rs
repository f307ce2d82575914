mod config;
mod sink;

use std::sync::Arc;

use tracing::{debug, info, warn};

use slotline_core::{ElementIds, LayoutVisibility, RefreshRequest, RefreshScheduler};
use slotline_model::{DEFAULT_ELEMENT_TAG, DefinedSlot};
use slotline_observe::{EventLogger, init_local_offset, init_logger};
use slotline_prometheus::PrometheusMetrics;

use crate::{config::AgentConfig, sink::TracingSink};

/// Root container every demo slot lives under.
const PAGE_ROOT: &str = "page";

fn main() -> anyhow::Result<()> {
    // Offset detection must happen before the runtime spawns threads.
    init_local_offset();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run())
}

async fn run() -> anyhow::Result<()> {
    // 1) config + logger
    let cfg = AgentConfig::load()?;
    init_logger(&cfg.logger)?;
    info!(slots = cfg.slots.len(), "config loaded");

    // 2) layout + metrics
    let layout = Arc::new(LayoutVisibility::new());
    let metrics = PrometheusMetrics::new()?;

    // 3) scheduler
    let scheduler = RefreshScheduler::builder(Arc::new(TracingSink))
        .with_config(cfg.scheduler.clone())
        .with_visibility(layout.clone())
        .with_metrics(Arc::new(metrics.clone()))
        .build();
    let _events = scheduler.attach(Arc::new(EventLogger));

    // 4) slots
    let ids = ElementIds::new();
    for decl in &cfg.slots {
        let element_id = ids.resolve(decl.id.as_deref(), DEFAULT_ELEMENT_TAG);
        layout.attach(element_id.clone(), PAGE_ROOT);
        layout.set_hidden(element_id.clone(), decl.hidden);

        let slot = DefinedSlot::new(decl.ad_unit.clone(), element_id)?.into_handle();
        let req = RefreshRequest::initial(slot).with_interval(decl.refresh.clone());
        match scheduler.schedule(req) {
            // Load progress is reported through the event logger.
            Ok(completion) => drop(completion),
            Err(e) => warn!(ad_unit = %decl.ad_unit, error = %e, "slot skipped"),
        }
    }

    // 5) run until interrupted
    tokio::signal::ctrl_c().await?;
    info!("interrupt received");

    scheduler.shutdown();
    debug!(exposition = %metrics.encode_text()?, "final metrics");
    Ok(())
}
