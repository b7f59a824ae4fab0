use std::sync::Arc;

/// What an online event wrote into the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    /// Non-blank variable value was cached.
    Labels,
    /// Variable was absent, blank or unreadable; an empty entry was cached.
    Empty,
}

impl CacheWrite {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            CacheWrite::Labels => "labels",
            CacheWrite::Empty => "empty",
        }
    }
}

/// Outcome of a single label-resolution call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// Labels were read from the cache and parsed.
    Contributed,
    /// Node has no live connection.
    Offline,
    /// Node did not opt in.
    NotOptedIn,
    /// Node is opted in and online but nothing is cached for it.
    CacheMiss,
}

impl ResolveOutcome {
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            ResolveOutcome::Contributed => "contributed",
            ResolveOutcome::Offline => "offline",
            ResolveOutcome::NotOptedIn => "not_opted_in",
            ResolveOutcome::CacheMiss => "cache_miss",
        }
    }
}

/// Backend metrics collection interface.
///
/// Implementations are injected into [`crate::LabelContributor`]. `record_resolution` sits on the
/// scheduler path and must stay cheap.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record a cache write performed for a node-online event.
    fn record_cache_write(&self, kind: CacheWrite);
    /// Record the outcome of a resolution call.
    fn record_resolution(&self, outcome: ResolveOutcome);
    /// Record a topology sweep and the number of entries it removed.
    fn record_sweep(&self, removed: usize);
    /// Record a failed environment read.
    ///
    /// # Arguments
    /// - `error_kind`: see [`crate::SnapshotError::kind`]
    fn record_snapshot_failure(&self, error_kind: &str);
    /// Record label tokens dropped by the grammar.
    fn record_rejected_tokens(&self, count: usize);
}

/// Shared handle to metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
