use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{LabelAtom, ModelError};

/// Deduplicated, ordered set of label atoms.
///
/// Ordering is lexical so that two equal sets always render the same way.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeSet<LabelAtom>);

impl LabelSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the atom was not present yet.
    pub fn insert(&mut self, atom: LabelAtom) -> bool {
        self.0.insert(atom)
    }

    pub fn contains(&self, atom: &str) -> bool {
        self.0.contains(atom)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabelAtom> {
        self.0.iter()
    }

    /// Add every atom of `other` to this set.
    pub fn extend_from(&mut self, other: &LabelSet) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Union of both sets.
    pub fn union(&self, other: &LabelSet) -> LabelSet {
        Self(self.0.union(&other.0).cloned().collect())
    }
}

impl FromIterator<LabelAtom> for LabelSet {
    fn from_iter<I: IntoIterator<Item = LabelAtom>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for LabelSet {
    type Item = LabelAtom;
    type IntoIter = std::collections::btree_set::IntoIter<LabelAtom>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Renders as a single space-separated label string, the same shape it is parsed from.
impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for atom in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(atom.as_str())?;
            first = false;
        }
        Ok(())
    }
}

/// Strict parse: fails on the first token that is not a valid atom.
///
/// See [`crate::parse_labels`] for the lenient variant used on the scheduling path.
impl FromStr for LabelSet {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_ascii_whitespace().map(LabelAtom::new).collect()
    }
}
