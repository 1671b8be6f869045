//! Edge of the result graph
//!
//! Relationships in a Cypher store carry exactly one type, so an edge holds
//! at most one label.

use super::property::{PropertyMap, PropertyValue};
use super::types::Label;
use indexmap::IndexSet;
use serde::Serialize;

/// A directed edge in the result graph
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    /// Stable identifier for this edge
    pub id: String,

    /// Relationship type, empty when the store reported none
    pub labels: IndexSet<Label>,

    /// Properties associated with this edge
    pub properties: PropertyMap,

    /// Source node id (edge goes FROM this node)
    pub source_id: String,

    /// Target node id (edge goes TO this node)
    pub target_id: String,
}

impl GraphEdge {
    /// Create a new directed edge
    pub fn new(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        edge_type: Option<Label>,
    ) -> Self {
        GraphEdge {
            id: id.into(),
            labels: edge_type.into_iter().collect(),
            properties: PropertyMap::new(),
            source_id: source_id.into(),
            target_id: target_id.into(),
        }
    }

    /// Create a new edge with properties
    pub fn new_with_properties(
        id: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        edge_type: Option<Label>,
        properties: PropertyMap,
    ) -> Self {
        let mut edge = Self::new(id, source_id, target_id, edge_type);
        edge.properties = properties;
        edge
    }

    /// The relationship type, if any
    pub fn edge_type(&self) -> Option<&Label> {
        self.labels.first()
    }

    /// Set a property value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Check if this edge goes FROM a specific node
    pub fn starts_from(&self, node_id: &str) -> bool {
        self.source_id == node_id
    }

    /// Check if this edge goes TO a specific node
    pub fn ends_at(&self, node_id: &str) -> bool {
        self.target_id == node_id
    }

    /// JSON object with properties flattened next to `id`, `labels`,
    /// `sourceId` and `targetId`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj: serde_json::Map<String, serde_json::Value> = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        obj.insert("id".to_string(), self.id.clone().into());
        obj.insert(
            "labels".to_string(),
            self.labels.iter().map(|l| l.as_str().to_string()).collect::<Vec<_>>().into(),
        );
        obj.insert("sourceId".to_string(), self.source_id.clone().into());
        obj.insert("targetId".to_string(), self.target_id.clone().into());
        serde_json::Value::Object(obj)
    }
}

impl PartialEq for GraphEdge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GraphEdge {}
