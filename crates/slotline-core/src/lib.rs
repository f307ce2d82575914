pub mod batcher;
pub mod error;
pub mod event;
pub mod ident;
pub mod metrics;
pub mod registry;
pub mod scheduler;
pub mod sink;
pub mod visibility;

pub use error::SchedulerError;
pub use event::{Observe, RefreshEvent, RefreshKind};
pub use ident::ElementIds;
pub use metrics::{DispatchKind, IntervalChange, MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use scheduler::{Completion, RefreshRequest, RefreshScheduler, SchedulerBuilder, SchedulerConfig};
pub use sink::{Command, CommandSink};
pub use visibility::{AlwaysVisible, LayoutVisibility, VisibilityOracle};

pub mod prelude {
    pub use crate::error::SchedulerError;
    pub use crate::event::{RefreshEvent, RefreshKind};
    pub use crate::scheduler::{RefreshRequest, RefreshScheduler, SchedulerConfig};
    pub use crate::sink::CommandSink;
    pub use crate::visibility::VisibilityOracle;
    pub use slotline_model::{AdSlot, RefreshInterval, SlotHandle, SlotKey};
}
