use std::sync::Arc;

/// Path a refresh command took to reach the command sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    /// Direct dispatch from a scheduling call.
    Immediate,
    /// Flush of a single-request batch.
    Batch,
    /// Periodic interval tick.
    Tick,
}

impl DispatchKind {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchKind::Immediate => "immediate",
            DispatchKind::Batch => "batch",
            DispatchKind::Tick => "tick",
        }
    }
}

/// Change applied to the interval table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalChange {
    /// New timer for a slot without one.
    Armed,
    /// Timer installed over an existing one.
    Replaced,
    /// Timer stopped on request or teardown.
    Cancelled,
}

impl IntervalChange {
    /// Return label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            IntervalChange::Armed => "armed",
            IntervalChange::Replaced => "replaced",
            IntervalChange::Cancelled => "cancelled",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are injected through [`crate::SchedulerBuilder::with_metrics`].
/// Calls happen under the scheduler lock and must not block.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a refresh command handed to the sink.
    ///
    /// # Arguments
    /// - `kind`: dispatch path
    /// - `slots`: number of slots in the command
    fn record_dispatch(&self, kind: DispatchKind, slots: usize);
    /// Record a periodic tick skipped because the slot was hidden.
    fn record_tick_suppressed(&self);
    /// Record a change to the interval table.
    fn record_interval(&self, change: IntervalChange);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
