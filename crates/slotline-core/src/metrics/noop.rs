use crate::metrics::backend::{DispatchKind, IntervalChange, MetricsBackend};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_dispatch(&self, _: DispatchKind, _: usize) {}

    #[inline(always)]
    fn record_tick_suppressed(&self) {}

    #[inline(always)]
    fn record_interval(&self, _: IntervalChange) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_metrics_is_zero_size() {
        assert_eq!(std::mem::size_of::<NoOpMetrics>(), 0);
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(DispatchKind::Immediate.as_label(), "immediate");
        assert_eq!(DispatchKind::Batch.as_label(), "batch");
        assert_eq!(DispatchKind::Tick.as_label(), "tick");
        assert_eq!(IntervalChange::Replaced.as_label(), "replaced");
    }
}
