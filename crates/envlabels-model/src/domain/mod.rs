mod kv;
pub use kv::KeyValue;

mod env;
pub use env::Env;

mod flag;
pub use flag::OptIn;

mod node;
pub use node::NodeId;

mod constants;
pub use constants::{LABELS_ENV_VAR, OPT_IN_DISPLAY_NAME};
