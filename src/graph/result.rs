//! Result graph handed back to callers
//!
//! Nodes and edges are kept in insertion order and deduplicated by stable id:
//! the first record seen for an id wins, later ones are ignored.

use super::edge::GraphEdge;
use super::node::GraphNode;
use crate::error::{AdapterError, AdapterResult};
use indexmap::IndexMap;
use serde::Serialize;

/// Owned node/edge collection produced by one engine operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultGraph {
    nodes: IndexMap<String, GraphNode>,
    edges: IndexMap<String, GraphEdge>,
}

impl ResultGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless one with the same id is already present.
    ///
    /// Returns `true` when the node was inserted.
    pub fn add_node(&mut self, node: GraphNode) -> bool {
        if self.nodes.contains_key(&node.id) {
            return false;
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Insert an edge unless one with the same id is already present.
    ///
    /// Both endpoints must already be in the graph.
    pub fn add_edge(&mut self, edge: GraphEdge) -> AdapterResult<bool> {
        for endpoint in [&edge.source_id, &edge.target_id] {
            if !self.nodes.contains_key(endpoint) {
                return Err(AdapterError::DanglingEndpoint {
                    relationship: edge.id.clone(),
                    endpoint: endpoint.clone(),
                });
            }
        }
        if self.edges.contains_key(&edge.id) {
            return Ok(false);
        }
        self.edges.insert(edge.id.clone(), edge);
        Ok(true)
    }

    pub fn node_exists(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn edge_exists(&self, id: &str) -> bool {
        self.edges.contains_key(id)
    }

    pub fn get_node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn get_edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.get(id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Outgoing edges of a node
    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.values().filter(move |e| e.starts_from(node_id))
    }

    /// Incoming edges of a node
    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.values().filter(move |e| e.ends_at(node_id))
    }

    /// Split into owned node and edge lists
    pub fn into_parts(self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        (self.nodes.into_values().collect(), self.edges.into_values().collect())
    }

    /// `{"nodes": [...], "edges": [...]}` with the flattened node/edge shape
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "nodes": self.nodes.values().map(GraphNode::to_json).collect::<Vec<_>>(),
            "edges": self.edges.values().map(GraphEdge::to_json).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Label;

    #[test]
    fn test_first_node_wins() {
        let mut graph = ResultGraph::new();
        let mut first = GraphNode::new("n1");
        first.set_property("name", "first");
        let mut second = GraphNode::new("n1");
        second.set_property("name", "second");

        assert!(graph.add_node(first));
        assert!(!graph.add_node(second));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(
            graph.get_node("n1").unwrap().get_property("name").unwrap().as_string(),
            Some("first")
        );
    }

    #[test]
    fn test_edge_requires_endpoints() {
        let mut graph = ResultGraph::new();
        graph.add_node(GraphNode::new("a"));

        let err = graph
            .add_edge(GraphEdge::new("e1", "a", "b", None))
            .unwrap_err();
        assert_eq!(
            err,
            AdapterError::DanglingEndpoint {
                relationship: "e1".to_string(),
                endpoint: "b".to_string()
            }
        );
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edge_dedup_and_adjacency() {
        let mut graph = ResultGraph::new();
        graph.add_node(GraphNode::new("a"));
        graph.add_node(GraphNode::new("b"));

        let knows = Some(Label::new("KNOWS"));
        assert!(graph.add_edge(GraphEdge::new("e1", "a", "b", knows.clone())).unwrap());
        assert!(!graph.add_edge(GraphEdge::new("e1", "b", "a", knows)).unwrap());

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.outgoing("a").count(), 1);
        assert_eq!(graph.incoming("a").count(), 0);
        assert_eq!(graph.get_edge("e1").unwrap().target_id, "b");
    }

    #[test]
    fn test_json_and_parts() {
        let mut graph = ResultGraph::new();
        assert!(graph.is_empty());
        graph.add_node(GraphNode::new("a"));
        graph.add_node(GraphNode::new("b"));
        graph.add_edge(GraphEdge::new("e", "a", "b", None)).unwrap();

        let json = graph.to_json();
        assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["edges"][0]["sourceId"], "a");

        let (nodes, edges) = graph.into_parts();
        assert_eq!(nodes[0].id, "a");
        assert_eq!(nodes[1].id, "b");
        assert_eq!(edges.len(), 1);
    }
}
