//! Result-graph assembly from raw records
//!
//! Records are consumed in delivery order. Nodes are decoded as soon as they
//! are met and bound in the identity map; a relationship can only be decoded
//! once both of its endpoints are bound. Path hops decode start, end, then the
//! relationship, which guarantees that ordering for paths.
//!
//! Assembly is all-or-nothing: on the first error the partial graph is dropped.

use super::identity::{IdentityMapper, IdentityMode};
use crate::error::{AdapterError, AdapterResult};
use crate::graph::{without_reserved, GraphEdge, GraphNode, ResultGraph};
use crate::session::{IdGenerator, NativeNode, NativeRelationship, PathSegment, Record, Value};

/// One unit of assembler input
#[derive(Debug, Clone, PartialEq)]
pub enum RawSegment {
    Node(NativeNode),
    Relationship(NativeRelationship),
    Hop(PathSegment),
}

/// Flatten the values found under `column` into segments, record by record.
///
/// Paths contribute one hop per segment, lists are flattened, nulls skipped.
pub fn segments_from_records(records: &[Record], column: &str) -> AdapterResult<Vec<RawSegment>> {
    let mut segments = Vec::new();
    for record in records {
        if let Some(value) = record.get(column) {
            collect_segments(value, column, &mut segments)?;
        }
    }
    Ok(segments)
}

fn collect_segments(value: &Value, column: &str, out: &mut Vec<RawSegment>) -> AdapterResult<()> {
    match value {
        Value::Null => {}
        Value::Node(node) => out.push(RawSegment::Node(node.clone())),
        Value::Relationship(rel) => out.push(RawSegment::Relationship(rel.clone())),
        Value::Path(path) => {
            out.extend(path.segments.iter().cloned().map(RawSegment::Hop));
        }
        Value::List(items) => {
            for item in items {
                collect_segments(item, column, out)?;
            }
        }
        Value::Scalar(scalar) if scalar.is_null() => {}
        Value::Scalar(scalar) => {
            return Err(AdapterError::UnexpectedShape(format!(
                "field '{}' holds a {} where graph elements were expected",
                column,
                scalar.type_name()
            )))
        }
    }
    Ok(())
}

/// Incremental builder of a [`ResultGraph`]
pub struct GraphAssembler<'a> {
    ids: &'a dyn IdGenerator,
    nodes: IdentityMapper,
    relationships: IdentityMapper,
    graph: ResultGraph,
}

impl<'a> GraphAssembler<'a> {
    pub fn new(ids: &'a dyn IdGenerator) -> Self {
        Self {
            ids,
            nodes: IdentityMapper::new(IdentityMode::ReuseIfPresent),
            relationships: IdentityMapper::new(IdentityMode::ReuseIfPresent),
            graph: ResultGraph::new(),
        }
    }

    /// Assemble a whole sequence of segments
    pub fn assemble<I>(ids: &'a dyn IdGenerator, segments: I) -> AdapterResult<ResultGraph>
    where
        I: IntoIterator<Item = RawSegment>,
    {
        let mut assembler = Self::new(ids);
        for segment in segments {
            assembler.push(&segment)?;
        }
        Ok(assembler.finish())
    }

    /// Consume one segment
    pub fn push(&mut self, segment: &RawSegment) -> AdapterResult<()> {
        match segment {
            RawSegment::Node(node) => {
                self.add_node(node)?;
            }
            RawSegment::Relationship(rel) => {
                self.add_relationship(rel)?;
            }
            RawSegment::Hop(hop) => {
                self.add_node(&hop.start)?;
                self.add_node(&hop.end)?;
                self.add_relationship(&hop.relationship)?;
            }
        }
        Ok(())
    }

    /// Decode and insert a node, returning its stable id
    pub fn add_node(&mut self, native: &NativeNode) -> AdapterResult<String> {
        let node = decode_node(native, &mut self.nodes, self.ids)?;
        let id = node.id.clone();
        self.graph.add_node(node);
        Ok(id)
    }

    /// Decode and insert a relationship with its native endpoints
    pub fn add_relationship(&mut self, native: &NativeRelationship) -> AdapterResult<String> {
        let edge_id = self.edge_id(native)?;
        let source = self.nodes.resolve_endpoint(&edge_id, &native.start)?;
        let target = self.nodes.resolve_endpoint(&edge_id, &native.end)?;
        let edge = decode_edge(native, edge_id, source, target);
        let id = edge.id.clone();
        self.graph.add_edge(edge)?;
        Ok(id)
    }

    /// Insert a relationship between explicitly given stable ids,
    /// keeping its own properties and type.
    pub fn add_relationship_between(
        &mut self,
        native: &NativeRelationship,
        source: &str,
        target: &str,
    ) -> AdapterResult<String> {
        let edge_id = self.edge_id(native)?;
        let edge = decode_edge(native, edge_id, source.to_string(), target.to_string());
        let id = edge.id.clone();
        self.graph.add_edge(edge)?;
        Ok(id)
    }

    fn edge_id(&mut self, native: &NativeRelationship) -> AdapterResult<String> {
        let carried = native.carried_id();
        self.relationships
            .assign(&native.identity, carried.as_deref(), self.ids)
    }

    /// Hand the graph over
    pub fn finish(self) -> ResultGraph {
        self.graph
    }
}

/// Decode a native node, assigning its stable id through `mapper`
pub(crate) fn decode_node(
    native: &NativeNode,
    mapper: &mut IdentityMapper,
    ids: &dyn IdGenerator,
) -> AdapterResult<GraphNode> {
    let carried = native.carried_id();
    let id = mapper.assign(&native.identity, carried.as_deref(), ids)?;
    Ok(GraphNode::new_with_properties(
        id,
        native.labels.iter().map(String::as_str),
        without_reserved(&native.properties),
    ))
}

/// Decode a native relationship with already resolved stable ids
pub(crate) fn decode_edge(
    native: &NativeRelationship,
    id: String,
    source: String,
    target: String,
) -> GraphEdge {
    GraphEdge::new_with_properties(
        id,
        source,
        target,
        native.type_label(),
        without_reserved(&native.properties),
    )
}
