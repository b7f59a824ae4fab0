//! Bridges fleet lifecycle events and scheduler label queries to the [`LabelCache`].
use std::{collections::HashSet, fmt, sync::Arc};

use tracing::{debug, instrument, trace, warn};

use envlabels_model::{Env, LABELS_ENV_VAR, LabelSet, NodeId};

use crate::{
    cache::LabelCache,
    error::SnapshotError,
    finder::LabelFinder,
    fleet::FleetView,
    grammar::{DefaultGrammar, LabelGrammar},
    metrics::{CacheWrite, MetricsHandle, ResolveOutcome, noop_metrics},
};

/// Contributes labels read from [`LABELS_ENV_VAR`] for nodes that opted in.
///
/// Writers (`on_node_online`, `on_topology_change`) are driven by fleet events; the reader
/// (`resolve_labels`) is driven by the scheduler and may run concurrently from many threads.
pub struct LabelContributor {
    cache: Arc<LabelCache>,
    fleet: Arc<dyn FleetView>,
    grammar: Arc<dyn LabelGrammar>,
    metrics: MetricsHandle,
}

impl LabelContributor {
    /// Create a contributor over a shared cache and fleet view, with the default grammar and no-op metrics.
    pub fn new(cache: Arc<LabelCache>, fleet: Arc<dyn FleetView>) -> Self {
        Self {
            cache,
            fleet,
            grammar: Arc::new(DefaultGrammar),
            metrics: noop_metrics(),
        }
    }

    /// Replace the label grammar and return updated contributor.
    pub fn with_grammar(mut self, grammar: Arc<dyn LabelGrammar>) -> Self {
        self.grammar = grammar;
        self
    }

    /// Replace the metrics backend and return updated contributor.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn cache(&self) -> &Arc<LabelCache> {
        &self.cache
    }

    /// Handle a (re)connected node.
    ///
    /// Always overwrites the node's entry: a non-blank variable value is cached trimmed, anything
    /// else (absent, blank, unreadable snapshot) caches an empty string. A reconnect therefore
    /// never keeps labels from the previous connection.
    ///
    /// The roster is not consulted: an online event that arrives after its node was swept puts
    /// the entry back, and it stays until the next [`on_topology_change`](Self::on_topology_change).
    #[instrument(level = "debug", skip_all, fields(node = %node))]
    pub fn on_node_online(&self, node: &NodeId, snapshot: Result<&Env, &SnapshotError>) {
        let value = match snapshot {
            Ok(env) => env.get_non_blank(LABELS_ENV_VAR),
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "node environment unavailable, contributing no labels");
                self.metrics.record_snapshot_failure(e.kind());
                None
            }
        };

        let (prev, write) = match value {
            Some(raw) => {
                debug!(labels = raw, "caching labels from {LABELS_ENV_VAR}");
                (self.cache.put(node.clone(), raw), CacheWrite::Labels)
            }
            None => {
                trace!("{LABELS_ENV_VAR} not set");
                (self.cache.put(node.clone(), ""), CacheWrite::Empty)
            }
        };
        if let Some(prev) = prev.filter(|p| !p.is_empty()) {
            trace!(previous = %prev, "superseded labels from previous connection");
        }
        self.metrics.record_cache_write(write);
    }

    /// Handle a disconnect. The cache entry is kept; it is superseded on reconnect or swept on removal.
    pub fn on_node_offline(&self, node: &NodeId) {
        trace!(node = %node, cached = self.cache.contains(node), "node went offline");
    }

    /// Drop cached entries of nodes absent from `live`. Returns the number removed.
    ///
    /// A renamed node shows up as its old id leaving, so its labels are dropped until it reconnects.
    #[instrument(level = "debug", skip_all, fields(live = live.len()))]
    pub fn on_topology_change(&self, live: &HashSet<NodeId>) -> usize {
        let removed = self.cache.sweep(live);
        if removed > 0 {
            debug!(removed, remaining = self.cache.len(), "swept labels of departed nodes");
        }
        self.metrics.record_sweep(removed);
        removed
    }

    /// Labels this node contributes right now.
    ///
    /// Empty unless the node is online, opted in and has a cached value. Malformed tokens are
    /// dropped; the remaining atoms are returned. Does not modify any state.
    pub fn resolve_labels(&self, node: &NodeId) -> LabelSet {
        let (labels, outcome) = self.resolve_inner(node);
        self.metrics.record_resolution(outcome);
        labels
    }

    fn resolve_inner(&self, node: &NodeId) -> (LabelSet, ResolveOutcome) {
        if !self.fleet.is_online(node) {
            return (LabelSet::new(), ResolveOutcome::Offline);
        }
        if !self.fleet.has_opt_in(node) {
            return (LabelSet::new(), ResolveOutcome::NotOptedIn);
        }
        let Some(raw) = self.cache.get(node) else {
            return (LabelSet::new(), ResolveOutcome::CacheMiss);
        };

        let parsed = self.grammar.parse(&raw);
        if !parsed.rejected.is_empty() {
            debug!(node = %node, rejected = ?parsed.rejected, "dropping malformed label tokens");
            self.metrics.record_rejected_tokens(parsed.rejected.len());
        }
        (parsed.labels, ResolveOutcome::Contributed)
    }
}

impl LabelFinder for LabelContributor {
    fn name(&self) -> &'static str {
        "environment"
    }

    fn find_labels(&self, node: &NodeId) -> LabelSet {
        self.resolve_labels(node)
    }
}

impl fmt::Debug for LabelContributor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelContributor")
            .field("cached", &self.cache.len())
            .field("grammar", &"<dyn>")
            .field("metrics", &"<handle>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use envlabels_model::OptIn;

    use super::*;
    use crate::{fleet::StaticFleet, metrics::MetricsBackend};

    #[derive(Default)]
    struct Recorded {
        writes: Mutex<Vec<CacheWrite>>,
        outcomes: Mutex<Vec<ResolveOutcome>>,
        snapshot_failures: Mutex<Vec<String>>,
        rejected: Mutex<usize>,
    }

    impl MetricsBackend for Recorded {
        fn record_cache_write(&self, kind: CacheWrite) {
            self.writes.lock().unwrap().push(kind);
        }
        fn record_resolution(&self, outcome: ResolveOutcome) {
            self.outcomes.lock().unwrap().push(outcome);
        }
        fn record_sweep(&self, _removed: usize) {}
        fn record_snapshot_failure(&self, error_kind: &str) {
            self.snapshot_failures
                .lock()
                .unwrap()
                .push(error_kind.to_string());
        }
        fn record_rejected_tokens(&self, count: usize) {
            *self.rejected.lock().unwrap() += count;
        }
    }

    struct Harness {
        fleet: Arc<StaticFleet>,
        contributor: LabelContributor,
        metrics: Arc<Recorded>,
    }

    impl Harness {
        fn new() -> Self {
            let fleet = Arc::new(StaticFleet::new());
            let metrics = Arc::new(Recorded::default());
            let contributor = LabelContributor::new(Arc::new(LabelCache::new()), fleet.clone())
                .with_metrics(metrics.clone());
            Self {
                fleet,
                contributor,
                metrics,
            }
        }

        /// Register (if needed), mark online and deliver the online event.
        fn connect(&self, name: &str, opt_in: bool, labels: Option<&str>) -> NodeId {
            let id = node(name);
            self.fleet.register(id.clone(), OptIn::from(opt_in));
            self.fleet.set_online(&id, true);
            let env = match labels {
                Some(v) => Env::single(LABELS_ENV_VAR, v),
                None => Env::single("PATH", "/usr/bin"),
            };
            self.contributor.on_node_online(&id, Ok(&env));
            id
        }

        fn labels(&self, id: &NodeId) -> String {
            self.contributor.resolve_labels(id).to_string()
        }
    }

    fn node(name: &str) -> NodeId {
        NodeId::new(name).unwrap()
    }

    #[test]
    fn opted_in_node_contributes_variable_labels() {
        let h = Harness::new();
        let w0 = h.connect("w0", true, Some("gpu fast"));

        assert_eq!(h.labels(&w0), "fast gpu");
        assert_eq!(
            *h.metrics.outcomes.lock().unwrap(),
            vec![ResolveOutcome::Contributed]
        );
    }

    #[test]
    fn node_without_opt_in_contributes_nothing() {
        let h = Harness::new();
        let w1 = h.connect("w1", false, Some("gpu fast"));

        assert!(h.contributor.cache().contains(&w1));
        assert_eq!(h.labels(&w1), "");
        assert_eq!(
            *h.metrics.outcomes.lock().unwrap(),
            vec![ResolveOutcome::NotOptedIn]
        );
    }

    #[test]
    fn opt_in_is_read_on_every_call() {
        let h = Harness::new();
        let w0 = h.connect("w0", false, Some("a b"));
        assert_eq!(h.labels(&w0), "");

        h.fleet.set_opt_in(&w0, OptIn::present());
        assert_eq!(h.labels(&w0), "a b");

        h.fleet.set_opt_in(&w0, OptIn::absent());
        assert_eq!(h.labels(&w0), "");
    }

    #[test]
    fn output_is_exactly_the_contributed_atoms() {
        let h = Harness::new();
        let n = h.connect("n", true, Some("a b"));

        let labels = h.contributor.resolve_labels(&n);
        assert_eq!(labels, "a b".parse::<LabelSet>().unwrap());
        assert!(!labels.contains("c"));
    }

    #[test]
    fn removal_sweeps_cache_entry() {
        let h = Harness::new();
        let w0 = h.connect("w0", true, Some("gpu fast"));
        let w1 = h.connect("w1", true, None);

        h.fleet.remove(&w0);
        let removed = h.contributor.on_topology_change(&h.fleet.nodes());

        assert_eq!(removed, 1);
        assert!(h.contributor.cache().get(&w0).is_none());
        assert!(h.contributor.cache().contains(&w1));
    }

    #[test]
    fn reconnect_without_variable_clears_labels() {
        let h = Harness::new();
        let n = h.connect("n", true, Some("x"));
        assert_eq!(h.labels(&n), "x");

        h.connect("n", true, None);
        assert_eq!(h.labels(&n), "");
        assert_eq!(
            *h.metrics.writes.lock().unwrap(),
            vec![CacheWrite::Labels, CacheWrite::Empty]
        );
    }

    #[test]
    fn reconnect_with_new_value_replaces_old() {
        let h = Harness::new();
        let n = h.connect("n", true, Some("p v"));
        h.connect("n", true, Some("p r"));

        assert_eq!(h.labels(&n), "p r");
    }

    #[test]
    fn never_connected_node_resolves_empty() {
        let h = Harness::new();
        assert_eq!(h.labels(&node("ghost")), "");

        h.fleet.register(node("idle"), OptIn::present());
        h.fleet.set_online(&node("idle"), true);
        assert_eq!(h.labels(&node("idle")), "");
        assert_eq!(
            *h.metrics.outcomes.lock().unwrap(),
            vec![ResolveOutcome::Offline, ResolveOutcome::CacheMiss]
        );
    }

    #[test]
    fn snapshot_failure_on_reconnect_clears_labels() {
        let h = Harness::new();
        let n = h.connect("n", true, Some("x y"));

        let err = SnapshotError::Interrupted;
        h.contributor.on_node_online(&n, Err(&err));

        assert_eq!(h.labels(&n), "");
        assert_eq!(
            *h.metrics.snapshot_failures.lock().unwrap(),
            vec!["interrupted".to_string()]
        );
    }

    #[test]
    fn blank_variable_contributes_nothing() {
        let h = Harness::new();
        let n = h.connect("n", true, Some(" \t "));

        assert_eq!(h.contributor.cache().get(&n).as_deref(), Some(""));
        assert_eq!(h.labels(&n), "");
    }

    #[test]
    fn variable_value_is_trimmed_before_caching() {
        let h = Harness::new();
        let n = h.connect("n", true, Some("  gpu  fast \n"));

        assert_eq!(h.contributor.cache().get(&n).as_deref(), Some("gpu  fast"));
        assert_eq!(h.labels(&n), "fast gpu");
    }

    #[test]
    fn malformed_tokens_are_dropped() {
        let h = Harness::new();
        let n = h.connect("n", true, Some("gpu a|b fast"));

        assert_eq!(h.labels(&n), "fast gpu");
        assert_eq!(*h.metrics.rejected.lock().unwrap(), 1);
    }

    #[test]
    fn offline_node_keeps_entry_but_contributes_nothing() {
        let h = Harness::new();
        let n = h.connect("n", true, Some("gpu"));

        h.fleet.set_online(&n, false);
        h.contributor.on_node_offline(&n);

        assert_eq!(h.labels(&n), "");
        assert!(h.contributor.cache().contains(&n));
    }

    #[test]
    fn rename_drops_labels_until_reconnect() {
        let h = Harness::new();
        let old = h.connect("old", true, Some("gpu"));

        let new = node("new");
        h.fleet.rename(&old, new.clone());
        h.contributor.on_topology_change(&h.fleet.nodes());

        assert!(h.contributor.cache().get(&old).is_none());
        h.fleet.set_online(&new, true);
        assert_eq!(h.labels(&new), "");

        h.connect("new", true, Some("gpu"));
        assert_eq!(h.labels(&new), "gpu");
    }

    #[test]
    fn late_online_event_is_cleared_by_next_sweep() {
        let h = Harness::new();
        let gone = h.connect("gone", true, Some("gpu"));
        h.fleet.remove(&gone);
        assert_eq!(h.contributor.on_topology_change(&h.fleet.nodes()), 1);

        let env = Env::single(LABELS_ENV_VAR, "gpu");
        h.contributor.on_node_online(&gone, Ok(&env));
        assert!(h.contributor.cache().contains(&gone));
        assert_eq!(h.labels(&gone), "");

        assert_eq!(h.contributor.on_topology_change(&h.fleet.nodes()), 1);
        assert!(h.contributor.cache().is_empty());
    }

    #[test]
    fn custom_grammar_is_used() {
        struct Upper;
        impl LabelGrammar for Upper {
            fn parse(&self, raw: &str) -> envlabels_model::ParsedLabels {
                envlabels_model::parse_labels(&raw.to_uppercase())
            }
        }

        let fleet = Arc::new(StaticFleet::new());
        let contributor = LabelContributor::new(Arc::new(LabelCache::new()), fleet.clone())
            .with_grammar(Arc::new(Upper));
        let n = node("n");
        fleet.register(n.clone(), OptIn::present());
        fleet.set_online(&n, true);
        contributor.on_node_online(&n, Ok(&Env::single(LABELS_ENV_VAR, "gpu")));

        assert_eq!(contributor.resolve_labels(&n).to_string(), "GPU");
        assert_eq!(contributor.name(), "environment");
    }

    #[test]
    fn concurrent_resolution_during_writes() {
        let h = Harness::new();
        let ids: Vec<NodeId> = (0..8)
            .map(|i| h.connect(&format!("w{i}"), true, Some("a b")))
            .collect();

        std::thread::scope(|s| {
            for id in &ids {
                let c = &h.contributor;
                s.spawn(move || {
                    for _ in 0..500 {
                        let labels = c.resolve_labels(id);
                        let rendered = labels.to_string();
                        assert!(
                            rendered == "a b" || rendered == "c d",
                            "unexpected labels {rendered:?}"
                        );
                    }
                });
            }
            s.spawn(|| {
                for round in 0..200 {
                    let value = if round % 2 == 0 { "c d" } else { "a b" };
                    for id in &ids {
                        let env = Env::single(LABELS_ENV_VAR, value);
                        h.contributor.on_node_online(id, Ok(&env));
                    }
                    h.contributor.on_topology_change(&h.fleet.nodes());
                }
            });
        });
    }
}
