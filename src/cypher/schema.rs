//! Schema-visualization result to graph
//!
//! Schema nodes stand for labels and schema relationships for relationship
//! types. Their native identities live in a different space from data ids, so
//! every element gets a freshly minted id. All nodes are bound before the
//! first edge is looked at.

use super::assembler::{decode_edge, decode_node};
use super::identity::{IdentityMapper, IdentityMode};
use crate::error::{AdapterError, AdapterResult};
use crate::graph::ResultGraph;
use crate::session::{IdGenerator, NativeNode, NativeRelationship, Record, Value};

pub const NODES_COLUMN: &str = "nodes";
pub const RELATIONSHIPS_COLUMN: &str = "relationships";

/// Schema nodes and relationships as delivered by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaSnapshot {
    pub nodes: Vec<NativeNode>,
    pub relationships: Vec<NativeRelationship>,
}

impl SchemaSnapshot {
    /// Read the snapshot off the first record; no record means an empty schema.
    pub fn from_records(records: &[Record]) -> AdapterResult<Self> {
        let record = match records.first() {
            Some(record) => record,
            None => return Ok(Self::default()),
        };

        let nodes = record
            .list(NODES_COLUMN)?
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::Node(node) => Ok(node.clone()),
                other => Err(element_error(NODES_COLUMN, other)),
            })
            .collect::<AdapterResult<Vec<_>>>()?;

        let relationships = record
            .list(RELATIONSHIPS_COLUMN)?
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::Relationship(rel) => Ok(rel.clone()),
                other => Err(element_error(RELATIONSHIPS_COLUMN, other)),
            })
            .collect::<AdapterResult<Vec<_>>>()?;

        Ok(Self { nodes, relationships })
    }
}

fn element_error(field: &str, found: &Value) -> AdapterError {
    AdapterError::UnexpectedShape(format!("'{}' contains a {}", field, found.kind()))
}

/// Assemble a schema graph in two passes.
///
/// An edge whose endpoint is not among `nodes` is a
/// [`AdapterError::DanglingEndpoint`].
pub fn assemble_schema(
    nodes: &[NativeNode],
    relationships: &[NativeRelationship],
    ids: &dyn IdGenerator,
) -> AdapterResult<ResultGraph> {
    let mut mapper = IdentityMapper::new(IdentityMode::AlwaysMint);
    let mut graph = ResultGraph::new();

    for native in nodes {
        let node = decode_node(native, &mut mapper, ids)?;
        graph.add_node(node);
    }

    for native in relationships {
        let id = ids.new_id();
        let source = mapper.resolve_endpoint(&id, &native.start)?;
        let target = mapper.resolve_endpoint(&id, &native.end)?;
        graph.add_edge(decode_edge(native, id, source, target))?;
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{PropertyMap, PropertyValue};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl IdGenerator for Counter {
        fn new_id(&self) -> String {
            format!("schema-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn label_node(identity: i64, label: &str) -> NativeNode {
        let mut props = PropertyMap::new();
        props.insert("name".to_string(), label.into());
        props.insert("indexes".to_string(), PropertyValue::Array(vec![]));
        NativeNode::new(identity, vec![label.to_string()], props)
    }

    #[test]
    fn test_two_nodes_one_edge() {
        let ids = Counter::default();
        let nodes = vec![label_node(-1, "Person"), label_node(-2, "City")];
        let rels = vec![NativeRelationship::new(-3, -1, -2, Some("LIVES_IN"), PropertyMap::new())];

        let graph = assemble_schema(&nodes, &rels, &ids).unwrap();
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let node_ids: Vec<&str> = graph.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(node_ids, vec!["schema-0", "schema-1"]);
        assert!(node_ids.iter().all(|id| *id != "-1" && *id != "-2"));

        let edge = graph.edges().next().unwrap();
        assert_eq!(edge.id, "schema-2");
        assert_eq!(edge.source_id, "schema-0");
        assert_eq!(edge.target_id, "schema-1");
        assert_eq!(edge.edge_type().unwrap().as_str(), "LIVES_IN");
    }

    #[test]
    fn test_edge_before_nodes_in_input_still_resolves() {
        // Two passes: relationship order relative to nodes does not matter.
        let ids = Counter::default();
        let nodes = vec![label_node(1, "A"), label_node(2, "B")];
        let rels = vec![
            NativeRelationship::new(3, 2, 1, Some("R"), PropertyMap::new()),
            NativeRelationship::new(4, 1, 2, Some("S"), PropertyMap::new()),
        ];
        let graph = assemble_schema(&nodes, &rels, &ids).unwrap();
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_carried_ids_are_ignored() {
        let ids = Counter::default();
        let mut props = PropertyMap::new();
        props.insert("id".to_string(), "data-id".into());
        let nodes = vec![NativeNode::new(1, vec!["A".to_string()], props)];
        let graph = assemble_schema(&nodes, &[], &ids).unwrap();
        assert!(graph.node_exists("schema-0"));
        assert!(!graph.node_exists("data-id"));
    }

    #[test]
    fn test_dangling_schema_edge() {
        let ids = Counter::default();
        let nodes = vec![label_node(1, "A")];
        let rels = vec![NativeRelationship::new(3, 1, 99, Some("R"), PropertyMap::new())];
        let err = assemble_schema(&nodes, &rels, &ids).unwrap_err();
        assert!(matches!(err, AdapterError::DanglingEndpoint { ref endpoint, .. } if endpoint == "99"));
    }

    #[test]
    fn test_empty_schema() {
        let ids = Counter::default();
        let graph = assemble_schema(&[], &[], &ids).unwrap();
        assert!(graph.is_empty());
        assert_eq!(SchemaSnapshot::from_records(&[]).unwrap(), SchemaSnapshot::default());
    }

    #[test]
    fn test_snapshot_from_record() {
        let record = Record::new()
            .with(
                NODES_COLUMN,
                Value::List(vec![label_node(1, "A").into(), label_node(2, "B").into()]),
            )
            .with(
                RELATIONSHIPS_COLUMN,
                Value::List(vec![NativeRelationship::new(3, 1, 2, Some("R"), PropertyMap::new()).into()]),
            );
        let snapshot = SchemaSnapshot::from_records(&[record]).unwrap();
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.relationships.len(), 1);

        let bad = Record::new().with(NODES_COLUMN, Value::List(vec![Value::Scalar(1.into())]));
        assert!(SchemaSnapshot::from_records(&[bad]).is_err());
    }
}
