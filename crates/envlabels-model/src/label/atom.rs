use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ModelError, ModelResult};

/// Characters reserved by the scheduler's label-expression language.
///
/// An atom containing any of them would be read as an expression, not a plain label.
pub const RESERVED_LABEL_CHARS: &[char] = &['!', '&', '|', '(', ')', '<', '>', '=', '"', ','];

/// Indivisible scheduling tag attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LabelAtom(String);

impl LabelAtom {
    /// Validate and wrap a single label token.
    pub fn new(s: impl Into<String>) -> ModelResult<Self> {
        let s = s.into();
        if s.is_empty() {
            return Err(ModelError::EmptyLabel);
        }
        if s.chars()
            .any(|c| c.is_whitespace() || RESERVED_LABEL_CHARS.contains(&c))
        {
            return Err(ModelError::InvalidLabel(s));
        }
        Ok(Self(s))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LabelAtom {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LabelAtom {
    type Error = ModelError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<LabelAtom> for String {
    fn from(a: LabelAtom) -> Self {
        a.0
    }
}

impl Borrow<str> for LabelAtom {
    fn borrow(&self) -> &str {
        &self.0
    }
}
