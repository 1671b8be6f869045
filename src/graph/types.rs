//! Core type definitions for the graph model

use serde::Serialize;
use std::fmt;

/// The store's own element identity (numeric id or opaque element id).
///
/// Only meaningful within a single query execution. Numeric and string
/// identities share one key space: `NativeId::from(7)` equals `NativeId::from("7")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NativeId(String);

impl NativeId {
    pub fn new(id: impl Into<String>) -> Self {
        NativeId(id.into())
    }

    /// Key used by the identity map
    pub fn as_key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeId({})", self.0)
    }
}

impl From<i64> for NativeId {
    fn from(id: i64) -> Self {
        NativeId(id.to_string())
    }
}

impl From<i32> for NativeId {
    fn from(id: i32) -> Self {
        NativeId(id.to_string())
    }
}

impl From<u64> for NativeId {
    fn from(id: u64) -> Self {
        NativeId(id.to_string())
    }
}

impl From<&str> for NativeId {
    fn from(id: &str) -> Self {
        NativeId(id.to_string())
    }
}

impl From<String> for NativeId {
    fn from(id: String) -> Self {
        NativeId(id)
    }
}

/// Node label or relationship type (e.g., "Person", "KNOWS")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Label as it must be written after a `:` in Cypher text.
    pub fn to_cypher(&self) -> String {
        quote_identifier(&self.0)
    }
}

/// Write a label, type or property key so it reads as one Cypher identifier.
///
/// Plain identifiers pass through; anything else is backtick-quoted with
/// embedded backticks doubled.
pub fn quote_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let plain = match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    };
    if plain {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_id_key_space() {
        assert_eq!(NativeId::from(42), NativeId::from("42"));
        assert_eq!(NativeId::from(42).as_key(), "42");
        assert_eq!(format!("{}", NativeId::from("4:abc:1")), "NativeId(4:abc:1)");
    }

    #[test]
    fn test_label() {
        let label = Label::new("Person");
        assert_eq!(label.as_str(), "Person");
        assert_eq!(format!("{}", label), "Person");

        let label2: Label = "Employee".into();
        assert_eq!(label2.as_str(), "Employee");
    }

    #[test]
    fn test_label_quoting() {
        assert_eq!(Label::new("KNOWS").to_cypher(), "KNOWS");
        assert_eq!(Label::new("_private1").to_cypher(), "_private1");
        assert_eq!(Label::new("Has Part").to_cypher(), "`Has Part`");
        assert_eq!(Label::new("1st").to_cypher(), "`1st`");
        assert_eq!(Label::new("a`b) DETACH DELETE (x").to_cypher(), "`a``b) DETACH DELETE (x`");
    }
}
