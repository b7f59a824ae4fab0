use std::fmt;

use serde::{Deserialize, Serialize};

use super::OPT_IN_DISPLAY_NAME;

/// Per-node marker permitting labels to be contributed from the node environment.
///
/// Absent by default: a node never contributes until an operator explicitly opts it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptIn(bool);

impl OptIn {
    /// Node has opted in.
    pub const fn present() -> Self {
        Self(true)
    }

    /// Node has not opted in.
    pub const fn absent() -> Self {
        Self(false)
    }

    /// Check if the node opted in.
    pub const fn is_present(&self) -> bool {
        self.0
    }

    pub const fn is_absent(&self) -> bool {
        !self.0
    }
}

impl Default for OptIn {
    fn default() -> Self {
        Self::absent()
    }
}

/// Renders as the setting name followed by its state, e.g. for operator-facing logs.
impl fmt::Display for OptIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.0 { "enabled" } else { "disabled" };
        write!(f, "{OPT_IN_DISPLAY_NAME}: {state}")
    }
}

impl From<bool> for OptIn {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl From<OptIn> for bool {
    fn from(o: OptIn) -> Self {
        o.0
    }
}
