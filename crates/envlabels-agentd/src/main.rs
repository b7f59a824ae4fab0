mod config;

use std::sync::Arc;

use tracing::info;

use envlabels_core::{
    ContributorSubscriber, FleetBus, FleetEvent, FleetSubscriber, FleetView, LabelCache,
    LabelContributor, LabelResolver, StaticFleet,
};
use envlabels_observe::{FleetLogSubscriber, init_logger};
use envlabels_prometheus::PrometheusMetrics;

use crate::config::AgentConfig;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    // 1) config + logger
    let cfg = AgentConfig::load()?;
    init_logger(&cfg.logger)?;
    info!(nodes = cfg.nodes.len(), "agent configuration loaded");

    // 2) shared state
    let fleet = Arc::new(StaticFleet::new());
    let cache = Arc::new(LabelCache::with_capacity(cfg.cache_capacity));
    let metrics = PrometheusMetrics::new()?;

    // 3) contributor + resolver
    let contributor = Arc::new(
        LabelContributor::new(cache.clone(), fleet.clone()).with_metrics(Arc::new(metrics.clone())),
    );
    let mut resolver = LabelResolver::new();
    resolver.register(contributor.clone());

    // 4) fleet event bus
    let subscribers: Vec<Arc<dyn FleetSubscriber>> = vec![
        Arc::new(FleetLogSubscriber),
        Arc::new(ContributorSubscriber::new(contributor.clone())),
    ];
    let bus = FleetBus::new(subscribers);

    // 5) nodes join and connect
    for node in &cfg.nodes {
        fleet.register(node.name.clone(), node.opt_in);
    }
    bus.publish(FleetEvent::topology(fleet.nodes())).await?;

    for node in &cfg.nodes {
        fleet.set_online(&node.name, true);
        bus.publish(FleetEvent::online(node.name.clone(), node.env.clone()))
            .await?;
    }

    // 6) last node leaves the fleet
    if let Some(last) = cfg.nodes.last() {
        fleet.set_online(&last.name, false);
        bus.publish(FleetEvent::offline(last.name.clone())).await?;
        fleet.remove(&last.name);
        bus.publish(FleetEvent::topology(fleet.nodes())).await?;
    }

    // 7) drain the bus, then report what the scheduler would see
    bus.shutdown().await?;
    report(&cfg, &resolver, &cache);

    info!(metrics = %metrics.render()?, "final metrics");
    Ok(())
}

fn report(cfg: &AgentConfig, resolver: &LabelResolver, cache: &LabelCache) {
    for node in &cfg.nodes {
        let labels = resolver.assigned_labels(&node.name, &node.static_labels);
        info!(
            node = %node.name,
            cached = cache.contains(&node.name),
            labels = %labels,
            "assigned labels"
        );
    }
}
