//! Typed identifiers.
//!
//! `RefId` names a flow object that other content refers to. `PageIndex` and
//! `OwnerHandle` are plain arena indices, so nothing in the area tree or the
//! element lists needs to hold a reference back into its owner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The `id` of a flow object, target of citations and links.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefId(Arc<str>);

impl RefId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RefId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for RefId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for RefId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based position of a page in the document's page arena.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct PageIndex(pub usize);

impl PageIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for PageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index of a layout node in its arena. Elements carry this instead of a
/// pointer to the component that produced them.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct OwnerHandle(pub u32);

impl OwnerHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for OwnerHandle {
    fn from(index: usize) -> Self {
        OwnerHandle(index as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_id_creation() {
        let a = RefId::new("section-1");
        let b = RefId::from("section-1");
        let c = RefId::from(String::from("section-1"));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.to_string(), "section-1");
    }

    #[test]
    fn ref_id_is_transparent_in_json() {
        let id: RefId = serde_json::from_str("\"fig-2\"").unwrap();
        assert_eq!(id.as_str(), "fig-2");
    }

    #[test]
    fn owner_handle_indexes() {
        assert_eq!(OwnerHandle::from(7usize).index(), 7);
        assert_eq!(PageIndex(3).to_string(), "#3");
    }
}
