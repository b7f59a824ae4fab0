use std::sync::Arc;

use async_trait::async_trait;
use tracing::trace;

use super::{FleetEvent, FleetSubscriber};
use crate::contributor::LabelContributor;

/// Subscriber that keeps the label cache in sync with fleet events.
pub struct ContributorSubscriber {
    contributor: Arc<LabelContributor>,
}

impl ContributorSubscriber {
    pub fn new(contributor: Arc<LabelContributor>) -> Self {
        Self { contributor }
    }
}

#[async_trait]
impl FleetSubscriber for ContributorSubscriber {
    async fn on_event(&self, event: &FleetEvent) {
        match event {
            FleetEvent::NodeOnline { node, env } => {
                trace!(node = %node, readable = env.is_ok(), "node online");
                self.contributor.on_node_online(node, env.as_ref());
            }
            FleetEvent::NodeOffline { node } => {
                self.contributor.on_node_offline(node);
            }
            FleetEvent::TopologyChanged { live } => {
                trace!(live = live.len(), "topology changed");
                self.contributor.on_topology_change(live);
            }
        }
    }

    fn name(&self) -> &'static str {
        "label-contributor"
    }

    fn queue_capacity(&self) -> usize {
        2048
    }
}
