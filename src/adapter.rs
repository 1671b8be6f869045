//! Caller-facing adapter
//!
//! Every operation builds its statement, acquires a session, runs it,
//! releases the session and decodes the records. Sessions are closed whether
//! the statement succeeded or not.

use crate::config::{AdapterConfig, ConnectionSettings};
use crate::cypher::statements::{
    self, COUNT_COLUMN, EDGE_COLUMN, LABELS_FIELD, LABEL_COLUMN, RELATIONSHIP_TYPE_COLUMN, SOURCE_COLUMN,
    TARGET_COLUMN,
};
use crate::cypher::{
    assemble_neighborhood, assemble_schema, compile_pattern, rows_from_records, segments_from_records, GraphAssembler,
    SchemaSnapshot,
};
use crate::error::{AdapterError, AdapterResult};
use crate::graph::{without_reserved, GraphEdge, GraphNode, Label, PropertyMap, ResultGraph};
use crate::session::{
    AccessMode, CypherSession, FilterCompiler, IdGenerator, Record, SessionProvider, Statement, StoreResult,
    UuidGenerator,
};
use indexmap::IndexSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Column holding nodes in single-node statements
const NODE_COLUMN: &str = "n";

/// Node to create or update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNode {
    /// Stable id; minted on create when absent
    pub id: Option<String>,
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl NewNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<crate::graph::PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Edge to create or upsert
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEdge {
    pub id: Option<String>,
    pub source_id: String,
    pub target_id: String,
    /// At most one; the configured default type is used when empty
    pub labels: Vec<String>,
    pub properties: PropertyMap,
}

impl NewEdge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.labels.push(label.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<crate::graph::PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Graph API over a Cypher store
pub struct CypherAdapter<P: SessionProvider> {
    provider: P,
    config: AdapterConfig,
    ids: Arc<dyn IdGenerator>,
    filters: Arc<dyn FilterCompiler>,
}

impl<P: SessionProvider> CypherAdapter<P> {
    /// Create a new adapter minting UUID v4 ids
    pub fn new(provider: P, config: AdapterConfig, filters: Arc<dyn FilterCompiler>) -> Self {
        Self {
            provider,
            config,
            ids: Arc::new(UuidGenerator),
            filters,
        }
    }

    /// Open the provider with the configured endpoint, database and credentials
    pub fn connect<F>(config: AdapterConfig, filters: Arc<dyn FilterCompiler>, open: F) -> AdapterResult<Self>
    where
        F: FnOnce(&ConnectionSettings) -> StoreResult<P>,
    {
        let settings = config.connection_settings();
        info!(uri = %settings.uri, database = ?settings.database, "Connecting to graph store");
        let provider = open(&settings)?;
        Ok(Self::new(provider, config, filters))
    }

    /// Replace the id generator
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    async fn execute(&self, mode: AccessMode, statement: Statement) -> AdapterResult<Vec<Record>> {
        debug!(%mode, statement = %statement, "Running statement");
        let mut session = self.provider.acquire(mode).await?;
        let outcome = session.run(&statement).await;
        if let Err(e) = session.close().await {
            warn!(error = %e, "Failed to close session");
        }
        let records = outcome?;
        debug!(rows = records.len(), "Statement finished");
        Ok(records)
    }

    async fn read(&self, statement: Statement) -> AdapterResult<Vec<Record>> {
        self.execute(AccessMode::Read, statement).await
    }

    async fn write(&self, statement: Statement) -> AdapterResult<Vec<Record>> {
        self.execute(AccessMode::Write, statement).await
    }

    fn nodes_from(&self, records: &[Record]) -> AdapterResult<Vec<GraphNode>> {
        let segments = segments_from_records(records, NODE_COLUMN)?;
        let graph = GraphAssembler::assemble(self.ids.as_ref(), segments)?;
        Ok(graph.into_parts().0)
    }

    fn edges_from(&self, records: &[Record]) -> AdapterResult<Vec<GraphEdge>> {
        let mut assembler = GraphAssembler::new(self.ids.as_ref());
        for record in records {
            for field in [SOURCE_COLUMN, TARGET_COLUMN] {
                if let Some(node) = record.node(field)? {
                    assembler.add_node(node)?;
                }
            }
            if let Some(rel) = record.relationship(EDGE_COLUMN)? {
                assembler.add_relationship(rel)?;
            }
        }
        Ok(assembler.finish().into_parts().1)
    }

    // ===== Graph queries =====

    /// Paths matching `tokens`; `limit` defaults to the configured cap
    pub async fn path_query<S: AsRef<str> + Sync>(
        &self,
        tokens: &[S],
        limit: Option<i64>,
    ) -> AdapterResult<ResultGraph> {
        let limit = limit.unwrap_or(self.config.default_limit);
        let query = compile_pattern(tokens, limit)?;
        if query.is_exhausted() {
            debug!(limit, "Non-positive limit, skipping path query");
            return Ok(ResultGraph::new());
        }
        let records = self.read(statements::path_query(&query)).await?;
        let segments = segments_from_records(&records, query.column())?;
        GraphAssembler::assemble(self.ids.as_ref(), segments)
    }

    /// Immediate predecessors and successors of `center_id`
    pub async fn neighborhood(&self, center_id: &str, limit: i64) -> AdapterResult<ResultGraph> {
        if limit <= 0 {
            debug!(center_id, limit, "Non-positive limit, skipping neighborhood");
            return Ok(ResultGraph::new());
        }
        let records = self.read(statements::neighborhood(center_id, limit)).await?;
        let rows = rows_from_records(&records)?;
        assemble_neighborhood(center_id, &rows, limit, self.ids.as_ref())
    }

    /// Labels and relationship types as a graph
    pub async fn schema_graph(&self) -> AdapterResult<ResultGraph> {
        let records = self.read(statements::schema()).await?;
        let snapshot = SchemaSnapshot::from_records(&records)?;
        assemble_schema(&snapshot.nodes, &snapshot.relationships, self.ids.as_ref())
    }

    // ===== Nodes =====

    pub async fn node_exists(&self, id: &str) -> AdapterResult<bool> {
        let records = self.read(statements::node_exists(id)).await?;
        Ok(read_count(&records)? > 0)
    }

    pub async fn get_node(&self, id: &str) -> AdapterResult<Option<GraphNode>> {
        let records = self.read(statements::node_by_id(id)).await?;
        Ok(self.nodes_from(&records)?.into_iter().next())
    }

    /// First node matching `filter`
    pub async fn get_node_where(&self, filter: &serde_json::Value) -> AdapterResult<Option<GraphNode>> {
        let statement = statements::node_where(filter, self.filters.as_ref())?;
        let records = self.read(statement).await?;
        Ok(self.nodes_from(&records)?.into_iter().next())
    }

    /// Nodes matching `filter`; `count` defaults to the configured limit
    pub async fn get_nodes(&self, filter: &serde_json::Value, count: Option<i64>) -> AdapterResult<Vec<GraphNode>> {
        let count = count.unwrap_or(self.config.default_limit);
        let statement = statements::nodes(filter, count, self.filters.as_ref())?;
        let records = self.read(statement).await?;
        self.nodes_from(&records)
    }

    pub async fn nodes_with_label(&self, label: &str, amount: i64) -> AdapterResult<Vec<GraphNode>> {
        if amount <= 0 {
            return Ok(Vec::new());
        }
        let label = parse_label(label)?;
        let records = self.read(statements::nodes_with_label(&label, amount)).await?;
        self.nodes_from(&records)
    }

    /// Distinct property names over at most `amount` nodes labelled `label`
    ///
    /// Names come in first-seen order, each node's keys sorted. The stored
    /// `id` counts as a property; `labels` does not.
    pub async fn node_label_properties(&self, label: &str, amount: i64) -> AdapterResult<Vec<String>> {
        if amount <= 0 {
            return Ok(Vec::new());
        }
        let label = parse_label(label)?;
        let records = self.read(statements::nodes_with_label(&label, amount)).await?;

        let mut names = IndexSet::new();
        for record in &records {
            if let Some(node) = record.node(NODE_COLUMN)? {
                let mut keys: Vec<&String> = node.properties.keys().filter(|k| k.as_str() != LABELS_FIELD).collect();
                keys.sort();
                names.extend(keys.into_iter().cloned());
            }
        }
        Ok(names.into_iter().collect())
    }

    /// Case-insensitive substring search; `labels` in `fields` matches label names
    pub async fn search_nodes(
        &self,
        term: &str,
        fields: &[String],
        label: Option<&str>,
        amount: i64,
    ) -> AdapterResult<Vec<GraphNode>> {
        if term.trim().is_empty() || amount <= 0 {
            return Ok(Vec::new());
        }
        let label = label.map(parse_label).transpose()?;
        let records = self
            .read(statements::search_nodes(term, fields, label.as_ref(), amount))
            .await?;
        self.nodes_from(&records)
    }

    pub async fn node_count(&self, filter: &serde_json::Value) -> AdapterResult<i64> {
        let statement = statements::node_count(filter, self.filters.as_ref())?;
        read_count(&self.read(statement).await?)
    }

    /// Create a node; fails with [`AdapterError::ItemExists`] when the id is taken
    pub async fn create_node(&self, request: NewNode) -> AdapterResult<GraphNode> {
        let id = match request.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => self.ids.new_id(),
        };
        if self.node_exists(&id).await? {
            return Err(AdapterError::ItemExists(format!("Node with id '{}'", id)));
        }
        let labels = self.node_labels_or_default(&request.labels)?;
        let properties = without_reserved(&request.properties);

        self.write(statements::create_node(&labels, stored_data(&id, &properties)))
            .await?;
        debug!(id = %id, "Created node");
        Ok(GraphNode::new_with_properties(id, labels, properties))
    }

    /// Create each node in turn; the first failure stops the batch
    pub async fn create_nodes(&self, requests: Vec<NewNode>) -> AdapterResult<Vec<GraphNode>> {
        let mut created = Vec::with_capacity(requests.len());
        for request in requests {
            created.push(self.create_node(request).await?);
        }
        Ok(created)
    }

    /// Replace the properties of an existing node, adding any given labels.
    ///
    /// Returns the node as stored, with every label it carries.
    pub async fn update_node(&self, request: NewNode) -> AdapterResult<GraphNode> {
        let id = request
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| AdapterError::InvalidInput("node update requires an id".to_string()))?;
        if !self.node_exists(&id).await? {
            return Err(AdapterError::ItemMissing(format!("Node with id '{}'", id)));
        }
        let labels = request
            .labels
            .iter()
            .map(|l| parse_label(l))
            .collect::<AdapterResult<Vec<_>>>()?;
        let properties = without_reserved(&request.properties);

        let records = self
            .write(statements::update_node(&id, &labels, stored_data(&id, &properties)))
            .await?;
        let node = self
            .nodes_from(&records)?
            .into_iter()
            .next()
            .ok_or_else(|| AdapterError::ItemMissing(format!("Node with id '{}'", id)))?;
        debug!(id = %id, "Updated node");
        Ok(node)
    }

    /// Update when the id exists, create otherwise
    pub async fn upsert_node(&self, request: NewNode) -> AdapterResult<GraphNode> {
        let exists = match request.id.as_deref() {
            Some(id) if !id.trim().is_empty() => self.node_exists(id).await?,
            _ => false,
        };
        if exists {
            self.update_node(request).await
        } else {
            self.create_node(request).await
        }
    }

    pub async fn delete_node(&self, id: &str) -> AdapterResult<()> {
        self.write(statements::delete_node(id)).await?;
        debug!(id, "Deleted node");
        Ok(())
    }

    pub async fn delete_nodes(&self, filter: &serde_json::Value) -> AdapterResult<()> {
        let statement = statements::delete_nodes(filter, self.filters.as_ref())?;
        self.write(statement).await?;
        Ok(())
    }

    // ===== Edges =====

    pub async fn edge_exists(&self, id: &str) -> AdapterResult<bool> {
        let records = self.read(statements::edge_exists(id)).await?;
        Ok(read_count(&records)? > 0)
    }

    pub async fn get_edge(&self, id: &str) -> AdapterResult<Option<GraphEdge>> {
        let records = self.read(statements::edge_by_id(id)).await?;
        Ok(self.edges_from(&records)?.into_iter().next())
    }

    /// First edge from `source_id` to `target_id`, optionally of one type
    pub async fn get_edge_between(
        &self,
        source_id: &str,
        target_id: &str,
        label: Option<&str>,
    ) -> AdapterResult<Option<GraphEdge>> {
        let label = label.map(parse_label).transpose()?;
        let records = self
            .read(statements::edge_between(source_id, target_id, label.as_ref()))
            .await?;
        Ok(self.edges_from(&records)?.into_iter().next())
    }

    pub async fn edges_with_label(&self, label: &str, amount: i64) -> AdapterResult<Vec<GraphEdge>> {
        if amount <= 0 {
            return Ok(Vec::new());
        }
        let label = parse_label(label)?;
        let records = self.read(statements::edges_with_label(&label, amount)).await?;
        self.edges_from(&records)
    }

    /// Edges whose relationship matches `filter`; `amount` defaults to the configured limit
    pub async fn get_edges(&self, filter: &serde_json::Value, amount: Option<i64>) -> AdapterResult<Vec<GraphEdge>> {
        let amount = amount.unwrap_or(self.config.default_limit);
        let statement = statements::edges(filter, amount, self.filters.as_ref())?;
        let records = self.read(statement).await?;
        self.edges_from(&records)
    }

    pub async fn edge_count(&self, filter: &serde_json::Value) -> AdapterResult<i64> {
        let statement = statements::edge_count(filter, self.filters.as_ref())?;
        read_count(&self.read(statement).await?)
    }

    /// Create an edge between two existing nodes
    pub async fn create_edge(&self, request: NewEdge) -> AdapterResult<GraphEdge> {
        let label = match edge_label(&request.labels)? {
            Some(label) => label,
            None => parse_label(&self.config.default_edge_label)?,
        };
        let id = match request.id.as_deref() {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => self.ids.new_id(),
        };
        if self.edge_exists(&id).await? {
            return Err(AdapterError::ItemExists(format!("Edge with id '{}'", id)));
        }
        let properties = without_reserved(&request.properties);

        let records = self
            .write(statements::create_edge(
                &request.source_id,
                &request.target_id,
                &label,
                stored_data(&id, &properties),
            ))
            .await?;
        if records.is_empty() {
            return Err(AdapterError::ItemMissing(format!(
                "Node '{}' or '{}'",
                request.source_id, request.target_id
            )));
        }
        debug!(id = %id, source = %request.source_id, target = %request.target_id, "Created edge");
        Ok(GraphEdge::new_with_properties(
            id,
            request.source_id,
            request.target_id,
            Some(label),
            properties,
        ))
    }

    /// Replace the properties of an existing edge.
    ///
    /// A relationship's type is fixed; a given label only narrows the match.
    pub async fn update_edge(&self, id: &str, labels: &[String], properties: &PropertyMap) -> AdapterResult<GraphEdge> {
        if id.trim().is_empty() {
            return Err(AdapterError::InvalidInput("edge update requires an id".to_string()));
        }
        let label = edge_label(labels)?;
        if !self.edge_exists(id).await? {
            return Err(AdapterError::ItemMissing(format!("Edge with id '{}'", id)));
        }
        let properties = without_reserved(properties);

        let records = self
            .write(statements::update_edge(id, label.as_ref(), stored_data(id, &properties)))
            .await?;
        let edge = self.edges_from(&records)?.into_iter().next().ok_or_else(|| {
            AdapterError::ItemMissing(match &label {
                Some(label) => format!("Edge with id '{}' of type '{}'", id, label),
                None => format!("Edge with id '{}'", id),
            })
        })?;
        debug!(id, "Updated edge");
        Ok(edge)
    }

    /// Update when the id names an existing edge, create otherwise
    pub async fn upsert_edge(&self, request: NewEdge) -> AdapterResult<GraphEdge> {
        let existing = match request.id.as_deref() {
            Some(id) if !id.trim().is_empty() => self.edge_exists(id).await?.then(|| id.to_string()),
            _ => None,
        };
        match existing {
            Some(id) => self.update_edge(&id, &request.labels, &request.properties).await,
            None => self.create_edge(request).await,
        }
    }

    pub async fn delete_edge(&self, id: &str) -> AdapterResult<()> {
        self.write(statements::delete_edge(id)).await?;
        debug!(id, "Deleted edge");
        Ok(())
    }

    // ===== Catalog =====

    pub async fn node_labels(&self) -> AdapterResult<Vec<String>> {
        let records = self.read(statements::node_labels()).await?;
        read_strings(&records, LABEL_COLUMN)
    }

    pub async fn edge_labels(&self) -> AdapterResult<Vec<String>> {
        let records = self.read(statements::edge_labels()).await?;
        read_strings(&records, RELATIONSHIP_TYPE_COLUMN)
    }

    /// Delete every node and relationship
    pub async fn clear(&self) -> AdapterResult<()> {
        self.write(statements::clear()).await?;
        info!("Cleared graph");
        Ok(())
    }

    fn node_labels_or_default(&self, labels: &[String]) -> AdapterResult<Vec<Label>> {
        if labels.is_empty() {
            return Ok(vec![parse_label(&self.config.default_node_label)?]);
        }
        labels.iter().map(|l| parse_label(l)).collect()
    }
}

fn parse_label(label: &str) -> AdapterResult<Label> {
    let label = label.trim();
    if label.is_empty() {
        return Err(AdapterError::InvalidInput("labels cannot be empty".to_string()));
    }
    Ok(Label::new(label))
}

/// At most one relationship type
fn edge_label(labels: &[String]) -> AdapterResult<Option<Label>> {
    match labels {
        [] => Ok(None),
        [label] => parse_label(label).map(Some),
        _ => Err(AdapterError::InvalidInput(
            "a relationship carries at most one type".to_string(),
        )),
    }
}

fn stored_data(id: &str, properties: &PropertyMap) -> PropertyMap {
    let mut data = properties.clone();
    data.insert("id".to_string(), id.into());
    data
}

fn read_count(records: &[Record]) -> AdapterResult<i64> {
    let record = records
        .first()
        .ok_or_else(|| AdapterError::UnexpectedShape("count query returned no record".to_string()))?;
    record
        .scalar(COUNT_COLUMN)?
        .and_then(|v| v.as_integer())
        .ok_or_else(|| AdapterError::UnexpectedShape(format!("'{}' is not an integer", COUNT_COLUMN)))
}

fn read_strings(records: &[Record], field: &str) -> AdapterResult<Vec<String>> {
    let mut values = Vec::with_capacity(records.len());
    for record in records {
        if let Some(value) = record.scalar(field)? {
            let text = value
                .as_string()
                .ok_or_else(|| AdapterError::UnexpectedShape(format!("'{}' is not a string", field)))?;
            values.push(text.to_string());
        }
    }
    Ok(values)
}
