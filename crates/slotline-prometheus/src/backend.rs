use std::sync::Arc;

use prometheus::{
    Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
    proto::MetricFamily,
};

use slotline_core::{DispatchKind, IntervalChange, MetricsBackend};

const NAMESPACE: &str = "slotline";

/// Prometheus metrics backend for the refresh scheduler.
///
/// ## Metrics
/// - `slotline_dispatches_total{kind}` - refresh commands handed to the sink
/// - `slotline_dispatched_slots_total{kind}` - slots carried by those commands
/// - `slotline_ticks_suppressed_total` - periodic ticks skipped for hidden slots
/// - `slotline_interval_changes_total{change}` - timer table changes
/// - `slotline_batch_size` - slots per single-request flush
///
/// ## Label cardinality
/// - `kind`: "immediate", "batch", "tick"
/// - `change`: "armed", "replaced", "cancelled"
#[derive(Clone)]
pub struct PrometheusMetrics {
    dispatches: CounterVec,
    dispatched_slots: CounterVec,
    ticks_suppressed: Counter,
    interval_changes: CounterVec,
    batch_size: Histogram,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Register the scheduler metrics in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let dispatches = CounterVec::new(
            Opts::new("dispatches_total", "Refresh commands handed to the ad runtime")
                .namespace(NAMESPACE),
            &["kind"],
        )?;
        registry.register(Box::new(dispatches.clone()))?;

        let dispatched_slots = CounterVec::new(
            Opts::new("dispatched_slots_total", "Slots carried by refresh commands")
                .namespace(NAMESPACE),
            &["kind"],
        )?;
        registry.register(Box::new(dispatched_slots.clone()))?;

        let ticks_suppressed = Counter::with_opts(
            Opts::new("ticks_suppressed_total", "Periodic ticks skipped for hidden slots")
                .namespace(NAMESPACE),
        )?;
        registry.register(Box::new(ticks_suppressed.clone()))?;

        let interval_changes = CounterVec::new(
            Opts::new("interval_changes_total", "Changes to the periodic timer table")
                .namespace(NAMESPACE),
            &["change"],
        )?;
        registry.register(Box::new(interval_changes.clone()))?;

        let batch_size = Histogram::with_opts(
            HistogramOpts::new("batch_size", "Slots per single-request flush")
                .namespace(NAMESPACE)
                .buckets(vec![1.0, 2.0, 4.0, 8.0, 16.0, 32.0, 64.0]),
        )?;
        registry.register(Box::new(batch_size.clone()))?;

        Ok(Self {
            dispatches,
            dispatched_slots,
            ticks_suppressed,
            interval_changes,
            batch_size,
            registry,
        })
    }

    /// Backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render every metric in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    /// Underlying registry, for registering application metrics next to these.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_dispatch(&self, kind: DispatchKind, slots: usize) {
        self.dispatches.with_label_values(&[kind.as_label()]).inc();
        self.dispatched_slots
            .with_label_values(&[kind.as_label()])
            .inc_by(slots as f64);
        if kind == DispatchKind::Batch {
            self.batch_size.observe(slots as f64);
        }
    }

    fn record_tick_suppressed(&self) {
        self.ticks_suppressed.inc();
    }

    fn record_interval(&self, change: IntervalChange) {
        self.interval_changes
            .with_label_values(&[change.as_label()])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family<'a>(families: &'a [MetricFamily], name: &str) -> &'a MetricFamily {
        families
            .iter()
            .find(|f| f.name() == name)
            .unwrap_or_else(|| panic!("metric {name} not found"))
    }

    #[test]
    fn dispatches_are_split_by_kind() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_dispatch(DispatchKind::Immediate, 1);
        metrics.record_dispatch(DispatchKind::Tick, 1);
        metrics.record_dispatch(DispatchKind::Batch, 3);

        let families = metrics.gather();
        assert_eq!(family(&families, "slotline_dispatches_total").get_metric().len(), 3);

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("slotline_dispatched_slots_total{kind=\"batch\"} 3"));
        assert!(text.contains("slotline_dispatched_slots_total{kind=\"immediate\"} 1"));
    }

    #[test]
    fn batch_size_only_observes_flushes() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_dispatch(DispatchKind::Immediate, 1);
        metrics.record_dispatch(DispatchKind::Batch, 4);

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("slotline_batch_size_count 1"));
        assert!(text.contains("slotline_batch_size_sum 4"));
    }

    #[test]
    fn suppressed_ticks_and_interval_changes_are_counted() {
        let metrics = PrometheusMetrics::new().unwrap();

        metrics.record_tick_suppressed();
        metrics.record_tick_suppressed();
        metrics.record_interval(IntervalChange::Armed);
        metrics.record_interval(IntervalChange::Replaced);
        metrics.record_interval(IntervalChange::Replaced);

        let families = metrics.gather();
        assert_eq!(
            family(&families, "slotline_interval_changes_total").get_metric().len(),
            2
        );

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("slotline_ticks_suppressed_total 2"));
        assert!(text.contains("slotline_interval_changes_total{change=\"replaced\"} 2"));
    }

    #[test]
    fn text_exposition_contains_metric_names() {
        let metrics = PrometheusMetrics::new().unwrap();
        metrics.record_dispatch(DispatchKind::Tick, 1);

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("slotline_dispatches_total{kind=\"tick\"} 1"));
    }

    #[test]
    fn registering_twice_in_one_registry_fails() {
        let registry = Arc::new(Registry::new());
        PrometheusMetrics::new_with_registry(registry.clone()).unwrap();
        assert!(PrometheusMetrics::new_with_registry(registry).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn scheduler_reports_through_backend() {
        use slotline_core::{Command, CommandSink, RefreshRequest, RefreshScheduler};
        use slotline_model::{DefinedSlot, SlotHandle};

        struct Runtime;
        impl CommandSink for Runtime {
            fn enqueue(&self, task: Command) {
                task();
            }
            fn refresh_slots(&self, _: &[SlotHandle]) {}
            fn refresh_all(&self) {}
            fn display_slot(&self, _: &str) {}
            fn enable_single_request_mode(&self) {}
            fn enable_services(&self) {}
        }

        let metrics = PrometheusMetrics::new().unwrap();
        let sched = RefreshScheduler::builder(Arc::new(Runtime))
            .with_metrics(Arc::new(metrics.clone()))
            .build();

        let slot = DefinedSlot::new("/1/top", "top").unwrap().into_handle();
        let _ = sched
            .schedule(RefreshRequest::initial(slot).every("1s"))
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2_500)).await;

        let text = metrics.encode_text().unwrap();
        assert!(text.contains("slotline_dispatches_total{kind=\"immediate\"} 1"));
        assert!(text.contains("slotline_dispatches_total{kind=\"tick\"} 2"));
        assert!(text.contains("slotline_interval_changes_total{change=\"armed\"} 1"));
    }
}
