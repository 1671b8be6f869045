//! Pattern translation and result reconstruction
//!
//! - [`pattern`]: path patterns to Cypher
//! - [`identity`]: native identity to stable id mapping
//! - [`assembler`], [`neighborhood`], [`schema`]: records to [`ResultGraph`](crate::graph::ResultGraph)
//! - [`statements`]: the statements behind every adapter operation
//!
//! Everything here is synchronous and free of I/O.

pub mod assembler;
pub mod identity;
pub mod neighborhood;
pub mod pattern;
pub mod schema;
pub mod statements;

pub use assembler::{segments_from_records, GraphAssembler, RawSegment};
pub use identity::{IdentityMapper, IdentityMode};
pub use neighborhood::{assemble_neighborhood, rows_from_records, Neighbor, NeighborRow};
pub use pattern::{
    compile, compile_pattern, CompiledQuery, Pattern, QueryShape, Selector, StepKind, DEFAULT_LIMIT, WILDCARD,
};
pub use schema::{assemble_schema, SchemaSnapshot};
