//! Label finders and the resolver that merges their output with a node's static labels.
//!
//! The resolver queries registered finders in order and returns the union of the node's
//! statically configured labels and every finder's contribution.
use std::sync::Arc;

use envlabels_model::{LabelSet, NodeId};
use tracing::{debug, trace};

use crate::grammar::{DefaultGrammar, LabelGrammar};

/// Source of dynamically computed labels for a node.
///
/// Called on every label-resolution pass: implementations must be cheap, side-effect free and
/// must not fail. An empty set means "nothing to add".
pub trait LabelFinder: Send + Sync {
    /// Finder name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Labels contributed for `node`.
    fn find_labels(&self, node: &NodeId) -> LabelSet;
}

/// Computes the full label set the scheduler assigns to a node.
///
/// Finders are registered explicitly at startup by the composition root.
pub struct LabelResolver {
    finders: Vec<Arc<dyn LabelFinder>>,
    grammar: Arc<dyn LabelGrammar>,
}

impl Default for LabelResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelResolver {
    /// Create an empty resolver using [`DefaultGrammar`] for static labels.
    #[inline]
    pub fn new() -> Self {
        Self {
            finders: Vec::new(),
            grammar: Arc::new(DefaultGrammar),
        }
    }

    /// Set the grammar used to parse static label strings.
    #[inline]
    pub fn with_grammar(mut self, grammar: Arc<dyn LabelGrammar>) -> Self {
        self.grammar = grammar;
        self
    }

    /// Register a finder. Finders are queried in registration order.
    #[inline]
    pub fn register(&mut self, finder: Arc<dyn LabelFinder>) {
        debug!(finder = finder.name(), "label finder registered");
        self.finders.push(finder);
    }

    pub fn len(&self) -> usize {
        self.finders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.finders.is_empty()
    }

    /// Returns `true` if a finder with the given name is registered.
    pub fn contains_finder(&self, name: &str) -> bool {
        self.finders.iter().any(|f| f.name() == name)
    }

    /// Labels assigned to `node`: its static labels united with every finder's output.
    ///
    /// Malformed static tokens are dropped the same way contributed ones are.
    pub fn assigned_labels(&self, node: &NodeId, static_labels: &str) -> LabelSet {
        let parsed = self.grammar.parse(static_labels);
        if !parsed.rejected.is_empty() {
            debug!(node = %node, rejected = ?parsed.rejected, "dropping malformed static labels");
        }

        let mut labels = parsed.labels;
        for finder in &self.finders {
            let found = finder.find_labels(node);
            trace!(node = %node, finder = finder.name(), found = %found, "finder contributed labels");
            labels.extend_from(&found);
        }
        labels
    }
}
