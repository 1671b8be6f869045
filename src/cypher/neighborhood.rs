//! One-hop ego graph around a center node
//!
//! Each row carries the center plus, optionally, one incoming neighbour
//! (`parent` with relationship `pr`) and one outgoing neighbour (`child` with
//! relationship `cr`). Edges are always rebuilt as parent -> center and
//! center -> child.

use super::assembler::GraphAssembler;
use crate::error::{AdapterError, AdapterResult};
use crate::graph::ResultGraph;
use crate::session::{IdGenerator, NativeNode, NativeRelationship, Record};

pub const CENTER_COLUMN: &str = "c";
pub const PARENT_COLUMN: &str = "parent";
pub const PARENT_REL_COLUMN: &str = "pr";
pub const CHILD_COLUMN: &str = "child";
pub const CHILD_REL_COLUMN: &str = "cr";

/// A neighbour node with the relationship linking it to the center
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub node: NativeNode,
    pub relationship: NativeRelationship,
}

/// One row of a neighbourhood result
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborRow {
    pub center: NativeNode,
    pub parent: Option<Neighbor>,
    pub child: Option<Neighbor>,
}

impl NeighborRow {
    pub fn new(center: NativeNode) -> Self {
        Self {
            center,
            parent: None,
            child: None,
        }
    }

    pub fn with_parent(mut self, node: NativeNode, relationship: NativeRelationship) -> Self {
        self.parent = Some(Neighbor { node, relationship });
        self
    }

    pub fn with_child(mut self, node: NativeNode, relationship: NativeRelationship) -> Self {
        self.child = Some(Neighbor { node, relationship });
        self
    }
}

/// Read neighbourhood rows off records.
///
/// Records with a null center are skipped. A side is only present when both
/// its node and its relationship are non-null.
pub fn rows_from_records(records: &[Record]) -> AdapterResult<Vec<NeighborRow>> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let center = match record.node(CENTER_COLUMN)? {
            Some(center) => center.clone(),
            None => continue,
        };
        let parent = neighbor(record, PARENT_COLUMN, PARENT_REL_COLUMN)?;
        let child = neighbor(record, CHILD_COLUMN, CHILD_REL_COLUMN)?;
        rows.push(NeighborRow { center, parent, child });
    }
    Ok(rows)
}

fn neighbor(record: &Record, node_field: &str, rel_field: &str) -> AdapterResult<Option<Neighbor>> {
    match (record.node(node_field)?, record.relationship(rel_field)?) {
        (Some(node), Some(rel)) => Ok(Some(Neighbor {
            node: node.clone(),
            relationship: rel.clone(),
        })),
        _ => Ok(None),
    }
}

/// Build the ego graph of `center_id`.
///
/// A `limit` of zero or less yields an empty graph. Every row must describe
/// the same center; a row whose center decodes to another id is an
/// [`AdapterError::UnexpectedShape`].
pub fn assemble_neighborhood(
    center_id: &str,
    rows: &[NeighborRow],
    limit: i64,
    ids: &dyn IdGenerator,
) -> AdapterResult<ResultGraph> {
    if limit <= 0 {
        return Ok(ResultGraph::new());
    }

    let mut assembler = GraphAssembler::new(ids);
    for row in rows {
        let center = assembler.add_node(&row.center)?;
        if center != center_id {
            return Err(AdapterError::UnexpectedShape(format!(
                "neighbourhood row centered on '{}' while expanding '{}'",
                center, center_id
            )));
        }

        if let Some(parent) = &row.parent {
            let parent_id = assembler.add_node(&parent.node)?;
            assembler.add_relationship_between(&parent.relationship, &parent_id, &center)?;
        }
        if let Some(child) = &row.child {
            let child_id = assembler.add_node(&child.node)?;
            assembler.add_relationship_between(&child.relationship, &center, &child_id)?;
        }
    }
    Ok(assembler.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::PropertyMap;
    use crate::session::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counter(AtomicUsize);

    impl IdGenerator for Counter {
        fn new_id(&self) -> String {
            format!("gen-{}", self.0.fetch_add(1, Ordering::SeqCst))
        }
    }

    fn node(identity: i64, id: &str) -> NativeNode {
        let mut props = PropertyMap::new();
        props.insert("id".to_string(), id.into());
        NativeNode::new(identity, vec!["Thing".to_string()], props)
    }

    fn rel(identity: i64, start: i64, end: i64, id: &str) -> NativeRelationship {
        let mut props = PropertyMap::new();
        props.insert("id".to_string(), id.into());
        props.insert("weight".to_string(), 2.into());
        NativeRelationship::new(identity, start, end, Some("RelatedTo"), props)
    }

    #[test]
    fn test_zero_limit_is_empty() {
        let ids = Counter::default();
        let rows = vec![NeighborRow::new(node(1, "c"))];
        let graph = assemble_neighborhood("c", &rows, 0, &ids).unwrap();
        assert!(graph.is_empty());
        let graph = assemble_neighborhood("anything", &[], -1, &ids).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_isolated_center() {
        let ids = Counter::default();
        let rows = vec![NeighborRow::new(node(1, "c"))];
        let graph = assemble_neighborhood("c", &rows, 10, &ids).unwrap();
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_parent_and_child() {
        let ids = Counter::default();
        let rows = vec![NeighborRow::new(node(2, "c"))
            .with_parent(node(1, "p"), rel(10, 1, 2, "e-pc"))
            .with_child(node(3, "k"), rel(11, 2, 3, "e-ck"))];

        let graph = assemble_neighborhood("c", &rows, 100, &ids).unwrap();
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);

        let incoming = graph.get_edge("e-pc").unwrap();
        assert_eq!((incoming.source_id.as_str(), incoming.target_id.as_str()), ("p", "c"));
        assert_eq!(incoming.edge_type().unwrap().as_str(), "RelatedTo");
        assert!(incoming.get_property("weight").is_some());
        assert!(incoming.get_property("id").is_none());

        let outgoing = graph.get_edge("e-ck").unwrap();
        assert_eq!((outgoing.source_id.as_str(), outgoing.target_id.as_str()), ("c", "k"));
    }

    #[test]
    fn test_endpoints_are_overridden() {
        // The relationship's own native endpoints are ignored.
        let ids = Counter::default();
        let rows = vec![NeighborRow::new(node(2, "c")).with_parent(node(1, "p"), rel(10, 7, 8, "e"))];
        let graph = assemble_neighborhood("c", &rows, 5, &ids).unwrap();
        let edge = graph.get_edge("e").unwrap();
        assert_eq!(edge.source_id, "p");
        assert_eq!(edge.target_id, "c");
    }

    #[test]
    fn test_cartesian_rows_dedup() {
        let ids = Counter::default();
        let rows = vec![
            NeighborRow::new(node(2, "c"))
                .with_parent(node(1, "p"), rel(10, 1, 2, "e1"))
                .with_child(node(3, "k1"), rel(11, 2, 3, "e2")),
            NeighborRow::new(node(2, "c"))
                .with_parent(node(1, "p"), rel(10, 1, 2, "e1"))
                .with_child(node(4, "k2"), rel(12, 2, 4, "e3")),
        ];
        let graph = assemble_neighborhood("c", &rows, 100, &ids).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn test_foreign_center_rejected() {
        let ids = Counter::default();
        let rows = vec![NeighborRow::new(node(9, "other"))];
        let err = assemble_neighborhood("c", &rows, 10, &ids).unwrap_err();
        assert!(matches!(err, AdapterError::UnexpectedShape(_)));
    }

    #[test]
    fn test_rows_from_records() {
        let records = vec![
            Record::new()
                .with(PARENT_COLUMN, node(1, "p"))
                .with(PARENT_REL_COLUMN, Value::Null)
                .with(CENTER_COLUMN, node(2, "c"))
                .with(CHILD_REL_COLUMN, rel(11, 2, 3, "e"))
                .with(CHILD_COLUMN, node(3, "k")),
            Record::new().with(CENTER_COLUMN, Value::Null),
        ];
        let rows = rows_from_records(&records).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].parent.is_none());
        assert_eq!(rows[0].child.as_ref().unwrap().node.carried_id().as_deref(), Some("k"));
    }
}
