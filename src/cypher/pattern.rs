//! Path-pattern compilation
//!
//! A pattern such as `["Person", "*", "Company", "WORKS_AT", "*"]` alternates
//! node selectors (even positions) and edge selectors (odd positions). Each
//! selector is a concrete label/type or the wildcard `*`. Compilation turns it
//! into a `MATCH p=... RETURN p LIMIT n` query whose steps follow token order,
//! so traversal always runs source to target left to right.

use crate::error::{AdapterError, AdapterResult};
use crate::graph::Label;
use std::fmt;

/// Wildcard token
pub const WILDCARD: &str = "*";

/// Result cap used when the caller does not give one
pub const DEFAULT_LIMIT: i64 = 100;

/// One token of a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Any,
    Labeled(Label),
}

impl Selector {
    pub fn parse(token: &str) -> AdapterResult<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AdapterError::EmptyPattern);
        }
        if token == WILDCARD {
            Ok(Selector::Any)
        } else {
            Ok(Selector::Labeled(Label::new(token)))
        }
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self, Selector::Any)
    }

    /// Cypher fragment for this selector in node position
    pub fn node_step(&self) -> String {
        match self {
            Selector::Any => "()".to_string(),
            Selector::Labeled(label) => format!("(:{})", label.to_cypher()),
        }
    }

    /// Cypher fragment for this selector in edge position
    pub fn edge_step(&self) -> String {
        match self {
            Selector::Any => "-->".to_string(),
            Selector::Labeled(label) => format!("-[:{}]->", label.to_cypher()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Any => write!(f, "{}", WILDCARD),
            Selector::Labeled(label) => write!(f, "{}", label),
        }
    }
}

/// Role of a token inside a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Node,
    Edge,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepKind::Node => write!(f, "node"),
            StepKind::Edge => write!(f, "edge"),
        }
    }
}

/// A validated path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    selectors: Vec<Selector>,
}

impl Pattern {
    /// Validate raw tokens.
    ///
    /// Empty patterns and empty tokens are [`AdapterError::EmptyPattern`];
    /// patterns ending on an edge selector are [`AdapterError::UnsupportedPattern`].
    pub fn parse<I, S>(tokens: I) -> AdapterResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let selectors = tokens
            .into_iter()
            .map(|t| Selector::parse(t.as_ref()))
            .collect::<AdapterResult<Vec<_>>>()?;

        if selectors.is_empty() {
            return Err(AdapterError::EmptyPattern);
        }
        if selectors.len() % 2 == 0 {
            return Err(AdapterError::UnsupportedPattern(format!(
                "a pattern must start and end on a node selector, got {} tokens",
                selectors.len()
            )));
        }
        Ok(Self { selectors })
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn node_count(&self) -> usize {
        (self.selectors.len() + 1) / 2
    }

    pub fn edge_count(&self) -> usize {
        self.selectors.len() / 2
    }

    /// Tokens with their role: even positions are nodes, odd are edges
    pub fn steps(&self) -> impl Iterator<Item = (StepKind, &Selector)> {
        self.selectors.iter().enumerate().map(|(i, s)| {
            let kind = if i % 2 == 0 { StepKind::Node } else { StepKind::Edge };
            (kind, s)
        })
    }

    /// Compiled fragment of a single step
    pub fn fragment(kind: StepKind, selector: &Selector) -> String {
        match kind {
            StepKind::Node => selector.node_step(),
            StepKind::Edge => selector.edge_step(),
        }
    }
}

/// What a compiled query returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// Bare nodes in column [`CompiledQuery::NODE_COLUMN`]
    Nodes,
    /// Whole paths in column [`CompiledQuery::PATH_COLUMN`]
    Paths,
}

/// Query text plus the metadata the adapter needs to decode its result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    pub text: String,
    pub limit: i64,
    pub shape: QueryShape,
    pub node_steps: usize,
    pub edge_steps: usize,
}

impl CompiledQuery {
    pub const NODE_COLUMN: &'static str = "n";
    pub const PATH_COLUMN: &'static str = "p";

    /// A cap of zero or less means the result is known to be empty
    pub fn is_exhausted(&self) -> bool {
        self.limit <= 0
    }

    /// Column holding the result values
    pub fn column(&self) -> &'static str {
        match self.shape {
            QueryShape::Nodes => Self::NODE_COLUMN,
            QueryShape::Paths => Self::PATH_COLUMN,
        }
    }
}

impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Compile a validated pattern.
///
/// A lone wildcard is rejected: enumerating every node of every label is not
/// a path query.
pub fn compile(pattern: &Pattern, limit: i64) -> AdapterResult<CompiledQuery> {
    if pattern.len() == 1 {
        return match &pattern.selectors[0] {
            Selector::Any => Err(AdapterError::UnsupportedPattern(
                "cannot path-query all nodes with a single wildcard".to_string(),
            )),
            Selector::Labeled(label) => Ok(CompiledQuery {
                text: format!(
                    "MATCH ({}:{}) RETURN {} LIMIT {}",
                    CompiledQuery::NODE_COLUMN,
                    label.to_cypher(),
                    CompiledQuery::NODE_COLUMN,
                    limit
                ),
                limit,
                shape: QueryShape::Nodes,
                node_steps: 1,
                edge_steps: 0,
            }),
        };
    }

    let steps: String = pattern
        .steps()
        .map(|(kind, selector)| Pattern::fragment(kind, selector))
        .collect();

    Ok(CompiledQuery {
        text: format!(
            "MATCH {}={} RETURN {} LIMIT {}",
            CompiledQuery::PATH_COLUMN,
            steps,
            CompiledQuery::PATH_COLUMN,
            limit
        ),
        limit,
        shape: QueryShape::Paths,
        node_steps: pattern.node_count(),
        edge_steps: pattern.edge_count(),
    })
}

/// Validate raw tokens and compile them in one go
pub fn compile_pattern<I, S>(tokens: I, limit: i64) -> AdapterResult<CompiledQuery>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pattern = Pattern::parse(tokens)?;
    compile(&pattern, limit)
}
