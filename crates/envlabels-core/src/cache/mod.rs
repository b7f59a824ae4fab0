//! Concurrent store of raw label strings keyed by node.
//!
//! Entries are written on node-online events, read on every label-resolution pass and pruned
//! when the fleet roster changes. Values are `Arc<str>`: a reader always gets a complete string,
//! even when it races a replacement or a sweep.
use std::{collections::HashSet, sync::Arc};

use dashmap::DashMap;
use tracing::trace;

use envlabels_model::NodeId;

/// Sharded map `NodeId -> raw label string`.
///
/// All operations are thread-safe. `DashMap` locks a single shard per operation, so readers of
/// one node are never blocked by writers of a node in another shard. No `Ref` guard escapes this
/// type, which rules out deadlocks between `get` and `sweep`.
#[derive(Debug, Default)]
pub struct LabelCache {
    entries: DashMap<NodeId, Arc<str>>,
}

impl LabelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-sized for roughly `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
        }
    }

    /// Associate `value` with `node`, replacing any previous value.
    ///
    /// Returns the value it replaced.
    pub fn put(&self, node: NodeId, value: impl Into<Arc<str>>) -> Option<Arc<str>> {
        self.entries.insert(node, value.into())
    }

    /// Current raw value for `node`, if any.
    pub fn get(&self, node: &NodeId) -> Option<Arc<str>> {
        self.entries.get(node).map(|r| Arc::clone(r.value()))
    }

    /// Drop the entry for `node`; no-op when absent.
    pub fn remove(&self, node: &NodeId) -> Option<Arc<str>> {
        self.entries.remove(node).map(|(_, v)| v)
    }

    /// Remove every entry whose node is not in `live`, returning how many were removed.
    ///
    /// Shards are visited one at a time; concurrent `get`/`put` on other shards proceed.
    pub fn sweep(&self, live: &HashSet<NodeId>) -> usize {
        let mut removed = 0usize;
        self.entries.retain(|node, _| {
            let keep = live.contains(node);
            if !keep {
                trace!(node = %node, "sweeping cached labels of departed node");
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.entries.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the nodes that currently have an entry.
    pub fn nodes(&self) -> Vec<NodeId> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }
}
