//! Identifiers for records, fields and storage slots.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// A cheaply clonable identifier.
///
/// Field names, record names and slot names are compared by content. Names
/// starting with `_` are reserved for the implementation and are hidden from
/// attribute snapshots.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name(Arc<str>);

impl Name {
    /// Marker prefix for implementation-reserved names.
    pub const RESERVED_PREFIX: char = '_';

    /// Create a name from any string-like value.
    pub fn new(name: impl AsRef<str>) -> Self {
        Name(Arc::from(name.as_ref()))
    }

    /// Borrow the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the name starts with the reserved marker.
    #[inline]
    pub fn is_reserved(&self) -> bool {
        self.0.starts_with(Self::RESERVED_PREFIX)
    }
}

impl From<&str> for Name {
    fn from(name: &str) -> Self {
        Name::new(name)
    }
}

impl From<String> for Name {
    fn from(name: String) -> Self {
        Name(Arc::from(name))
    }
}

impl From<&Name> for Name {
    fn from(name: &Name) -> Self {
        name.clone()
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", &*self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rustc_hash::FxHashMap;

    #[test]
    fn reserved_prefix() {
        assert!(Name::new("_hidden").is_reserved());
        assert!(Name::new("__weakref__").is_reserved());
        assert!(!Name::new("visible").is_reserved());
    }

    #[test]
    fn lookup_by_str() {
        let mut map = FxHashMap::default();
        map.insert(Name::new("age"), 15);
        assert_eq!(map.get("age"), Some(&15));
        assert_eq!(Name::new("age"), "age");
    }
}
