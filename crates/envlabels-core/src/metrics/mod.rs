//! Metrics collection abstraction for the label contributor.
//!
//! Backends (prometheus, statsd, etc) implement [`MetricsBackend`] and are injected via
//! [`crate::LabelContributor::with_metrics`].
mod backend;
pub use backend::{CacheWrite, MetricsBackend, MetricsHandle, ResolveOutcome};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
