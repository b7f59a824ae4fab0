use std::sync::Arc;

use prometheus::{
    Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder, proto::MetricFamily,
};

use envlabels_core::{CacheWrite, MetricsBackend, ResolveOutcome};

/// Prometheus metrics backend.
///
/// ## Label cardinality
/// All labels are bounded:
/// - `kind`: "labels", "empty"
/// - `outcome`: "contributed", "offline", "not_opted_in", "cache_miss"
/// - `error_kind`: "io", "interrupted", "disconnected"
#[derive(Clone)]
pub struct PrometheusMetrics {
    cache_writes: IntCounterVec,
    resolutions: IntCounterVec,
    sweeps: IntCounter,
    swept_entries: IntCounter,
    snapshot_failures: IntCounterVec,
    rejected_tokens: IntCounter,
    registry: Arc<Registry>,
}

impl PrometheusMetrics {
    /// Create a backend registering its collectors in `registry`.
    pub fn new_with_registry(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        let cache_writes = IntCounterVec::new(
            Opts::new("cache_writes_total", "Label cache writes on node online").namespace("envlabels"),
            &["kind"],
        )?;
        registry.register(Box::new(cache_writes.clone()))?;

        let resolutions = IntCounterVec::new(
            Opts::new("resolutions_total", "Label resolution calls by outcome").namespace("envlabels"),
            &["outcome"],
        )?;
        registry.register(Box::new(resolutions.clone()))?;

        let sweeps = IntCounter::with_opts(
            Opts::new("sweeps_total", "Topology sweeps performed").namespace("envlabels"),
        )?;
        registry.register(Box::new(sweeps.clone()))?;

        let swept_entries = IntCounter::with_opts(
            Opts::new("swept_entries_total", "Cache entries removed by sweeps").namespace("envlabels"),
        )?;
        registry.register(Box::new(swept_entries.clone()))?;

        let snapshot_failures = IntCounterVec::new(
            Opts::new("snapshot_failures_total", "Unreadable node environments").namespace("envlabels"),
            &["error_kind"],
        )?;
        registry.register(Box::new(snapshot_failures.clone()))?;

        let rejected_tokens = IntCounter::with_opts(
            Opts::new("rejected_tokens_total", "Malformed label tokens dropped").namespace("envlabels"),
        )?;
        registry.register(Box::new(rejected_tokens.clone()))?;

        Ok(Self {
            cache_writes,
            resolutions,
            sweeps,
            swept_entries,
            snapshot_failures,
            rejected_tokens,
            registry,
        })
    }

    /// Create a backend with its own registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::new_with_registry(Arc::new(Registry::new()))
    }

    /// Gather all metrics for exposition.
    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_cache_write(&self, kind: CacheWrite) {
        self.cache_writes.with_label_values(&[kind.as_label()]).inc();
    }

    fn record_resolution(&self, outcome: ResolveOutcome) {
        self.resolutions
            .with_label_values(&[outcome.as_label()])
            .inc();
    }

    fn record_sweep(&self, removed: usize) {
        self.sweeps.inc();
        self.swept_entries.inc_by(removed as u64);
    }

    fn record_snapshot_failure(&self, error_kind: &str) {
        self.snapshot_failures
            .with_label_values(&[error_kind])
            .inc();
    }

    fn record_rejected_tokens(&self, count: usize) {
        self.rejected_tokens.inc_by(count as u64);
    }
}
