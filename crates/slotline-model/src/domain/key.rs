use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Stable identity of an ad slot.
///
/// Derived from the id of the element the slot renders into.
/// The scheduler never compares slots by value: interval lookup and batch deduplication go through this key only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    /// Create a key from an element id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying element id.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SlotKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SlotKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SlotKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}
