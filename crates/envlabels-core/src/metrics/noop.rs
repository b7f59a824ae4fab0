use crate::metrics::backend::{CacheWrite, MetricsBackend, ResolveOutcome};

/// No-op metrics backend that compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_cache_write(&self, _: CacheWrite) {}

    #[inline(always)]
    fn record_resolution(&self, _: ResolveOutcome) {}

    #[inline(always)]
    fn record_sweep(&self, _: usize) {}

    #[inline(always)]
    fn record_snapshot_failure(&self, _: &str) {}

    #[inline(always)]
    fn record_rejected_tokens(&self, _: usize) {}
}
