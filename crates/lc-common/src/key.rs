//! Group identity for aggregated documents.
//!
//! A group is identified by one or more key values taken from the grouping
//! columns of an event table. Keys are totally ordered so that aggregated
//! output has a deterministic row order regardless of input row order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One component of a group key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyPart {
    Int(i64),
    Text(String),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Int(v) => write!(f, "{}", v),
            KeyPart::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for KeyPart {
    fn from(v: i64) -> Self {
        KeyPart::Int(v)
    }
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        KeyPart::Text(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        KeyPart::Text(s)
    }
}

/// Compound key identifying one document (row) of a wide matrix.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(pub Vec<KeyPart>);

impl GroupKey {
    /// Key made of a single part.
    pub fn single(part: impl Into<KeyPart>) -> Self {
        GroupKey(vec![part.into()])
    }

    /// Key derived from a row position, used when wide input has no names.
    pub fn row(index: usize) -> Self {
        GroupKey(vec![KeyPart::Int(index as i64)])
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

impl From<KeyPart> for GroupKey {
    fn from(part: KeyPart) -> Self {
        GroupKey(vec![part])
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::single(s)
    }
}

impl From<i64> for GroupKey {
    fn from(v: i64) -> Self {
        GroupKey::single(v)
    }
}
