//! Well-known names shared by the model and core layers.

/// Environment variable a node exposes at connect time to advertise extra labels.
///
/// The value is a whitespace-separated list of label atoms, e.g. `FLEET_NODE_LABELS="gpu fast"`.
/// The name is fixed at build time and is not read from runtime configuration.
pub const LABELS_ENV_VAR: &str = "FLEET_NODE_LABELS";

/// Human-readable name of the per-node opt-in setting, as shown by configuration frontends.
pub const OPT_IN_DISPLAY_NAME: &str = "Contribute labels from environment variable";
