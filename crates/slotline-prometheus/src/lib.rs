//! Prometheus metrics backend for the slotline refresh scheduler.
//!
//! [`PrometheusMetrics`] implements [`slotline_core::MetricsBackend`] and is injected
//! with [`slotline_core::SchedulerBuilder::with_metrics`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use slotline_core::{Command, CommandSink, RefreshScheduler};
//! use slotline_model::SlotHandle;
//! use slotline_prometheus::PrometheusMetrics;
//!
//! struct Runtime;
//! impl CommandSink for Runtime {
//!     fn enqueue(&self, task: Command) { task() }
//!     fn refresh_slots(&self, _: &[SlotHandle]) {}
//!     fn refresh_all(&self) {}
//!     fn display_slot(&self, _: &str) {}
//!     fn enable_single_request_mode(&self) {}
//!     fn enable_services(&self) {}
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let scheduler = RefreshScheduler::builder(Arc::new(Runtime))
//!     .with_metrics(Arc::new(metrics.clone()))
//!     .build();
//!
//! // Serve this from your own `/metrics` endpoint.
//! let exposition = metrics.encode_text()?;
//! # let _ = (scheduler, exposition);
//! # Ok(())
//! # }
//! ```
//!
//! ## HTTP Server
//! No HTTP server is provided; expose [`PrometheusMetrics::encode_text`] (or
//! [`PrometheusMetrics::gather`] with your own encoder) from the application's framework.

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
