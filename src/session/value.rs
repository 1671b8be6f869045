//! Graph-shaped values a session hands back
//!
//! These mirror what a Cypher driver decodes off the wire: nodes and
//! relationships carry the store's native identity, paths are ordered hops.

use crate::graph::{Label, NativeId, PropertyMap, PropertyValue};

/// A node as reported by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NativeNode {
    pub identity: NativeId,
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl NativeNode {
    pub fn new(identity: impl Into<NativeId>, labels: Vec<String>, properties: PropertyMap) -> Self {
        Self {
            identity: identity.into(),
            labels,
            properties,
        }
    }

    /// The stable id the node carries in its `id` property, if any.
    ///
    /// Numeric ids are rendered as strings; empty strings count as absent.
    pub fn carried_id(&self) -> Option<String> {
        carried_id(&self.properties)
    }
}

/// A relationship as reported by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NativeRelationship {
    pub identity: NativeId,
    pub start: NativeId,
    pub end: NativeId,
    pub rel_type: Option<String>,
    pub properties: PropertyMap,
}

impl NativeRelationship {
    pub fn new(
        identity: impl Into<NativeId>,
        start: impl Into<NativeId>,
        end: impl Into<NativeId>,
        rel_type: Option<&str>,
        properties: PropertyMap,
    ) -> Self {
        Self {
            identity: identity.into(),
            start: start.into(),
            end: end.into(),
            rel_type: rel_type.map(str::to_string),
            properties,
        }
    }

    pub fn carried_id(&self) -> Option<String> {
        carried_id(&self.properties)
    }

    /// Relationship type as a label; blank types count as untyped.
    pub fn type_label(&self) -> Option<Label> {
        self.rel_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(Label::from)
    }
}

/// One hop of a path: `(start)-[relationship]->(end)` in path order.
///
/// The relationship's own direction may disagree with the hop direction when
/// the path was matched undirected; endpoints are always taken from the
/// relationship.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub start: NativeNode,
    pub relationship: NativeRelationship,
    pub end: NativeNode,
}

/// A matched path
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NativePath {
    pub segments: Vec<PathSegment>,
}

/// A field value inside a record
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Scalar(PropertyValue),
    Node(NativeNode),
    Relationship(NativeRelationship),
    Path(NativePath),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Scalar(PropertyValue::Null))
    }

    pub fn as_node(&self) -> Option<&NativeNode> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&NativeRelationship> {
        match self {
            Value::Relationship(rel) => Some(rel),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&PropertyValue> {
        match self {
            Value::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Type name as string, used in shape errors
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Scalar(_) => "Scalar",
            Value::Node(_) => "Node",
            Value::Relationship(_) => "Relationship",
            Value::Path(_) => "Path",
            Value::List(_) => "List",
        }
    }
}

impl From<NativeNode> for Value {
    fn from(node: NativeNode) -> Self {
        Value::Node(node)
    }
}

impl From<NativeRelationship> for Value {
    fn from(rel: NativeRelationship) -> Self {
        Value::Relationship(rel)
    }
}

impl From<NativePath> for Value {
    fn from(path: NativePath) -> Self {
        Value::Path(path)
    }
}

impl From<PropertyValue> for Value {
    fn from(value: PropertyValue) -> Self {
        Value::Scalar(value)
    }
}

fn carried_id(properties: &PropertyMap) -> Option<String> {
    match properties.get("id")? {
        PropertyValue::String(s) if !s.is_empty() => Some(s.clone()),
        PropertyValue::Integer(i) => Some(i.to_string()),
        _ => None,
    }
}
