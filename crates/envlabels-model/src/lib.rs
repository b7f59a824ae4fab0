mod domain;
pub use domain::{Env, KeyValue, NodeId, OptIn};
pub use domain::{LABELS_ENV_VAR, OPT_IN_DISPLAY_NAME};

mod error;
pub use error::{ModelError, ModelResult};

mod label;
pub use label::{LabelAtom, LabelSet, ParsedLabels, RESERVED_LABEL_CHARS, parse_labels};
