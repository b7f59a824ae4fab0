//! Read-only view of the fleet registry the contributor depends on.
mod memory;
pub use memory::StaticFleet;

use std::collections::HashSet;

use envlabels_model::NodeId;

/// Registry queries consumed on the resolution path.
///
/// Both lookups are evaluated on every call; implementations must not cache opt-in state,
/// since it is owned by configuration storage with its own change notifications.
pub trait FleetView: Send + Sync {
    /// Returns `true` while the node has a live connection.
    fn is_online(&self, node: &NodeId) -> bool;

    /// Returns `true` if the node is configured to contribute environment labels.
    fn has_opt_in(&self, node: &NodeId) -> bool;

    /// Current roster of registered nodes, online or not.
    fn nodes(&self) -> HashSet<NodeId>;
}
