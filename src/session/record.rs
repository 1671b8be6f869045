//! Result records returned by a session
//!
//! A record is an ordered set of named fields, the way a Cypher `RETURN`
//! clause lays them out.

use super::value::{NativeNode, NativeRelationship, Value};
use crate::error::{AdapterError, AdapterResult};
use crate::graph::PropertyValue;
use indexmap::IndexMap;

/// A single result row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Field bindings in RETURN order (field name -> value)
    fields: IndexMap<String, Value>,
}

impl Record {
    /// Create a new empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style bind
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(field, value);
        self
    }

    /// Bind a field to a value
    pub fn bind(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Get a field by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get a field by position
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.fields.get_index(index).map(|(_, v)| v)
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in RETURN order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Node in `field`; `None` when the field is missing or null.
    pub fn node(&self, field: &str) -> AdapterResult<Option<&NativeNode>> {
        match self.get(field) {
            None => Ok(None),
            Some(v) if v.is_null() => Ok(None),
            Some(Value::Node(node)) => Ok(Some(node)),
            Some(other) => Err(shape_error(field, "Node", other)),
        }
    }

    /// Relationship in `field`; `None` when the field is missing or null.
    pub fn relationship(&self, field: &str) -> AdapterResult<Option<&NativeRelationship>> {
        match self.get(field) {
            None => Ok(None),
            Some(v) if v.is_null() => Ok(None),
            Some(Value::Relationship(rel)) => Ok(Some(rel)),
            Some(other) => Err(shape_error(field, "Relationship", other)),
        }
    }

    /// Scalar in `field`; `None` when the field is missing or null.
    pub fn scalar(&self, field: &str) -> AdapterResult<Option<&PropertyValue>> {
        match self.get(field) {
            None => Ok(None),
            Some(v) if v.is_null() => Ok(None),
            Some(Value::Scalar(value)) => Ok(Some(value)),
            Some(other) => Err(shape_error(field, "Scalar", other)),
        }
    }

    /// List in `field`; a missing or null field reads as the empty list.
    pub fn list(&self, field: &str) -> AdapterResult<&[Value]> {
        match self.get(field) {
            None => Ok(&[]),
            Some(v) if v.is_null() => Ok(&[]),
            Some(Value::List(items)) => Ok(items),
            Some(other) => Err(shape_error(field, "List", other)),
        }
    }
}

fn shape_error(field: &str, expected: &str, found: &Value) -> AdapterError {
    AdapterError::UnexpectedShape(format!(
        "field '{}' should hold a {} but holds a {}",
        field,
        expected,
        found.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PropertyMap;

    #[test]
    fn test_fields_keep_return_order() {
        let record = Record::new()
            .with("parent", Value::Null)
            .with("c", NativeNode::new(1, vec!["Person".into()], PropertyMap::new()))
            .with("n", PropertyValue::Integer(3));

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["parent", "c", "n"]);
        assert_eq!(record.get_index(2), Some(&Value::Scalar(PropertyValue::Integer(3))));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_typed_accessors() {
        let record = Record::new()
            .with("parent", Value::Null)
            .with("c", NativeNode::new(1, vec![], PropertyMap::new()));

        assert!(record.node("parent").unwrap().is_none());
        assert!(record.node("missing").unwrap().is_none());
        assert!(record.node("c").unwrap().is_some());
        assert!(record.list("missing").unwrap().is_empty());
    }

    #[test]
    fn test_wrong_kind_is_shape_error() {
        let record = Record::new().with("c", PropertyValue::Integer(1));
        let err = record.node("c").unwrap_err();
        assert!(matches!(err, AdapterError::UnexpectedShape(_)));
        assert!(err.to_string().contains("field 'c'"));
    }
}
