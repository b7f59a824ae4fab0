use crate::{LabelAtom, LabelSet};

/// Outcome of a lenient parse: the valid atoms plus the tokens that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLabels {
    pub labels: LabelSet,
    pub rejected: Vec<String>,
}

/// Parse a raw label string, keeping every valid atom and collecting the rest.
///
/// Tokens are split on ASCII whitespace. A single malformed token never invalidates the others,
/// so callers on the scheduling path always get a best-effort set.
pub fn parse_labels(raw: &str) -> ParsedLabels {
    let mut out = ParsedLabels::default();
    for token in raw.split_ascii_whitespace() {
        match LabelAtom::new(token) {
            Ok(atom) => {
                out.labels.insert(atom);
            }
            Err(_) => out.rejected.push(token.to_string()),
        }
    }
    out
}
