//! Label atoms and the grammar used to read them from raw label strings.
mod atom;
pub use atom::{LabelAtom, RESERVED_LABEL_CHARS};

mod set;
pub use set::LabelSet;

mod parse;
pub use parse::{ParsedLabels, parse_labels};
