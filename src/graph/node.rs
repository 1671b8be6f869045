//! Node of the result graph

use super::property::{PropertyMap, PropertyValue};
use super::types::Label;
use indexmap::IndexSet;
use serde::Serialize;

/// A node in the result graph
///
/// Nodes carry:
/// - A stable external id, independent of the store's native identity
/// - An ordered set of labels
/// - Properties (key-value pairs), never containing `id` or `labels`
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    /// Stable identifier for this node
    pub id: String,

    /// Labels in the order the store reported them
    pub labels: IndexSet<Label>,

    /// Properties associated with this node
    pub properties: PropertyMap,
}

impl GraphNode {
    /// Create a node without labels or properties
    pub fn new(id: impl Into<String>) -> Self {
        GraphNode {
            id: id.into(),
            labels: IndexSet::new(),
            properties: PropertyMap::new(),
        }
    }

    /// Create a node with labels and properties
    pub fn new_with_properties<L>(
        id: impl Into<String>,
        labels: impl IntoIterator<Item = L>,
        properties: PropertyMap,
    ) -> Self
    where
        L: Into<Label>,
    {
        GraphNode {
            id: id.into(),
            labels: labels.into_iter().map(Into::into).collect(),
            properties,
        }
    }

    /// Add a label to this node
    pub fn add_label(&mut self, label: impl Into<Label>) {
        self.labels.insert(label.into());
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.as_str() == label)
    }

    /// Set a property value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// JSON object in the shape graph API callers expect:
    /// properties flattened next to `id` and `labels`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj: serde_json::Map<String, serde_json::Value> = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        obj.insert("id".to_string(), serde_json::Value::String(self.id.clone()));
        obj.insert(
            "labels".to_string(),
            serde_json::Value::Array(
                self.labels
                    .iter()
                    .map(|l| serde_json::Value::String(l.as_str().to_string()))
                    .collect(),
            ),
        );
        serde_json::Value::Object(obj)
    }
}

impl PartialEq for GraphNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GraphNode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_keep_order() {
        let node = GraphNode::new_with_properties("n1", ["Person", "Employee", "Person"], PropertyMap::new());
        let labels: Vec<&str> = node.labels.iter().map(|l| l.as_str()).collect();
        assert_eq!(labels, vec!["Person", "Employee"]);
        assert!(node.has_label("Employee"));
        assert!(!node.has_label("Robot"));
    }

    #[test]
    fn test_node_json_shape() {
        let mut node = GraphNode::new("n1");
        node.add_label("Person");
        node.set_property("name", "Alice");

        let json = node.to_json();
        assert_eq!(json["id"], "n1");
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["labels"], serde_json::json!(["Person"]));
    }

    #[test]
    fn test_node_equality_by_id() {
        let mut a = GraphNode::new("n1");
        a.set_property("name", "Alice");
        let b = GraphNode::new("n1");
        let c = GraphNode::new("n2");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
