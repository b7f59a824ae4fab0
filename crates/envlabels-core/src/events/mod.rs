//! Fleet lifecycle notifications and their delivery to subscribers.
mod bus;
pub use bus::FleetBus;

mod subscriber;
pub use subscriber::ContributorSubscriber;

use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;

use envlabels_model::{Env, NodeId};

use crate::error::SnapshotError;

/// Notification emitted by the fleet registry / connection layer.
#[derive(Debug, Clone)]
pub enum FleetEvent {
    /// Node finished connecting. `env` is its environment snapshot, or why it could not be read.
    NodeOnline {
        node: NodeId,
        env: Result<Env, SnapshotError>,
    },
    /// Node lost its connection.
    NodeOffline { node: NodeId },
    /// Roster changed (add, remove, rename); carries the complete set of registered nodes.
    TopologyChanged { live: Arc<HashSet<NodeId>> },
}

impl FleetEvent {
    pub fn online(node: NodeId, env: Env) -> Self {
        Self::NodeOnline { node, env: Ok(env) }
    }

    pub fn online_unreadable(node: NodeId, err: SnapshotError) -> Self {
        Self::NodeOnline {
            node,
            env: Err(err),
        }
    }

    pub fn offline(node: NodeId) -> Self {
        Self::NodeOffline { node }
    }

    pub fn topology(live: impl IntoIterator<Item = NodeId>) -> Self {
        Self::TopologyChanged {
            live: Arc::new(live.into_iter().collect()),
        }
    }

    /// Node the event is about, if it concerns a single node.
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            FleetEvent::NodeOnline { node, .. } | FleetEvent::NodeOffline { node } => Some(node),
            FleetEvent::TopologyChanged { .. } => None,
        }
    }

    /// Short event name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FleetEvent::NodeOnline { .. } => "node_online",
            FleetEvent::NodeOffline { .. } => "node_offline",
            FleetEvent::TopologyChanged { .. } => "topology_changed",
        }
    }
}

/// Callback registered with the [`FleetBus`] at composition time.
///
/// Each subscriber gets its own bounded queue and worker, so events are handled in publish order.
/// A slow subscriber never withholds an event from the others, but once its queue is full it
/// holds back [`FleetBus::publish`].
#[async_trait]
pub trait FleetSubscriber: Send + Sync + 'static {
    async fn on_event(&self, event: &FleetEvent);

    /// Subscriber name used in logs.
    fn name(&self) -> &'static str;

    /// Capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
