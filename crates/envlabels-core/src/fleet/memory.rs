use std::collections::HashSet;

use dashmap::DashMap;
use tracing::debug;

use envlabels_model::{NodeId, OptIn};

use super::FleetView;

#[derive(Debug, Clone, Copy, Default)]
struct NodeRecord {
    online: bool,
    opt_in: OptIn,
}

/// In-process fleet registry.
///
/// Used as the composition root's registry by `envlabels-agentd` and as the fleet double in tests.
/// Mutators return whether the roster changed, so callers know when to publish a topology event.
#[derive(Debug, Default)]
pub struct StaticFleet {
    nodes: DashMap<NodeId, NodeRecord>,
}

impl StaticFleet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an offline node. Returns `false` if it already existed.
    pub fn register(&self, node: NodeId, opt_in: OptIn) -> bool {
        if self.nodes.contains_key(&node) {
            return false;
        }
        debug!(node = %node, opt_in = %opt_in, "node registered");
        self.nodes.insert(
            node,
            NodeRecord {
                online: false,
                opt_in,
            },
        );
        true
    }

    /// Mark a registered node online or offline. Returns `false` for unknown nodes.
    pub fn set_online(&self, node: &NodeId, online: bool) -> bool {
        match self.nodes.get_mut(node) {
            Some(mut rec) => {
                rec.online = online;
                true
            }
            None => false,
        }
    }

    /// Change a node's opt-in setting. Returns `false` for unknown nodes.
    pub fn set_opt_in(&self, node: &NodeId, opt_in: OptIn) -> bool {
        match self.nodes.get_mut(node) {
            Some(mut rec) => {
                rec.opt_in = opt_in;
                debug!(node = %node, opt_in = %opt_in, "opt-in changed");
                true
            }
            None => false,
        }
    }

    /// Drop a node from the roster.
    pub fn remove(&self, node: &NodeId) -> bool {
        self.nodes.remove(node).is_some()
    }

    /// Re-register `from` under the name `to`, keeping its configuration.
    ///
    /// The renamed node is offline until it reconnects. Fails if `from` is unknown or `to` taken.
    pub fn rename(&self, from: &NodeId, to: NodeId) -> bool {
        if self.nodes.contains_key(&to) {
            return false;
        }
        let Some((_, rec)) = self.nodes.remove(from) else {
            return false;
        };
        debug!(from = %from, to = %to, "node renamed");
        self.nodes.insert(
            to,
            NodeRecord {
                online: false,
                ..rec
            },
        );
        true
    }
}

impl FleetView for StaticFleet {
    fn is_online(&self, node: &NodeId) -> bool {
        self.nodes.get(node).is_some_and(|r| r.online)
    }

    fn has_opt_in(&self, node: &NodeId) -> bool {
        self.nodes.get(node).is_some_and(|r| r.opt_in.is_present())
    }

    fn nodes(&self) -> HashSet<NodeId> {
        self.nodes.iter().map(|r| r.key().clone()).collect()
    }
}
