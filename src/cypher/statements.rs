//! Cypher statements behind the adapter operations
//!
//! Every builder is a pure function. User-provided values travel as
//! parameters; labels, types and property keys are spliced in quoted.

use super::pattern::CompiledQuery;
use crate::error::{AdapterError, AdapterResult};
use crate::graph::{quote_identifier, Label, PropertyMap, PropertyValue};
use crate::session::{FilterCompiler, Statement};

/// Column of `count(...)` results
pub const COUNT_COLUMN: &str = "count";
/// Columns of edge results: source node, edge, target node
pub const SOURCE_COLUMN: &str = "u";
pub const EDGE_COLUMN: &str = "e";
pub const TARGET_COLUMN: &str = "v";
/// Column of `db.labels()`
pub const LABEL_COLUMN: &str = "label";
/// Column of `db.relationshipTypes()`
pub const RELATIONSHIP_TYPE_COLUMN: &str = "relationshipType";

/// Field searched when the caller names none
pub const DEFAULT_SEARCH_FIELD: &str = "name";
/// Pseudo-field matching label names instead of a property
pub const LABELS_FIELD: &str = "labels";

/// Whether a filter selects everything
pub fn is_empty_filter(filter: &serde_json::Value) -> bool {
    match filter {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn where_clause(
    filter: &serde_json::Value,
    variable: &str,
    compiler: &dyn FilterCompiler,
) -> AdapterResult<String> {
    if is_empty_filter(filter) {
        return Ok(String::new());
    }
    let constraint = compiler.compile(filter, variable)?;
    if constraint.trim().is_empty() {
        Ok(String::new())
    } else {
        Ok(format!(" WHERE {}", constraint))
    }
}

fn label_chain<'a>(labels: impl IntoIterator<Item = &'a Label>) -> String {
    labels
        .into_iter()
        .map(|l| format!(":{}", l.to_cypher()))
        .collect()
}

pub fn path_query(query: &CompiledQuery) -> Statement {
    Statement::new(query.text.clone())
}

/// Center by id, then optional incoming and outgoing neighbours.
pub fn neighborhood(center_id: &str, limit: i64) -> Statement {
    Statement::new(format!(
        "MATCH (c {{id: $id}}) \
         OPTIONAL MATCH (parent)-[pr]->(c) \
         OPTIONAL MATCH (c)-[cr]->(child) \
         RETURN parent, pr, c, cr, child LIMIT {}",
        limit
    ))
    .param("id", center_id)
}

pub fn schema() -> Statement {
    Statement::new("CALL db.schema.visualization()")
}

pub fn node_exists(id: &str) -> Statement {
    Statement::new(format!("MATCH (n {{id: $id}}) RETURN count(n) AS {}", COUNT_COLUMN)).param("id", id)
}

pub fn node_by_id(id: &str) -> Statement {
    Statement::new("MATCH (n {id: $id}) RETURN n LIMIT 1").param("id", id)
}

pub fn node_where(filter: &serde_json::Value, compiler: &dyn FilterCompiler) -> AdapterResult<Statement> {
    Ok(Statement::new(format!(
        "MATCH (n){} RETURN n LIMIT 1",
        where_clause(filter, "n", compiler)?
    )))
}

/// Nodes matching `filter`, at most `count`; a non-positive count is invalid.
pub fn nodes(filter: &serde_json::Value, count: i64, compiler: &dyn FilterCompiler) -> AdapterResult<Statement> {
    if count <= 0 {
        return Err(AdapterError::InvalidInput(format!(
            "node count must be positive, got {}",
            count
        )));
    }
    Ok(Statement::new(format!(
        "MATCH (n){} RETURN n LIMIT {}",
        where_clause(filter, "n", compiler)?,
        count
    )))
}

pub fn nodes_with_label(label: &Label, amount: i64) -> Statement {
    Statement::new(format!("MATCH (n:{}) RETURN n LIMIT {}", label.to_cypher(), amount))
}

/// Case-insensitive substring search over `fields`.
///
/// The term is matched as a literal inside a regex passed as `$pattern`.
pub fn search_nodes(term: &str, fields: &[String], label: Option<&Label>, amount: i64) -> Statement {
    let default_fields = [DEFAULT_SEARCH_FIELD.to_string()];
    let fields = if fields.is_empty() { &default_fields[..] } else { fields };

    let disjunction: Vec<String> = fields
        .iter()
        .map(|field| {
            if field == LABELS_FIELD {
                "ANY(l IN labels(n) WHERE toLower(l) =~ $pattern)".to_string()
            } else {
                format!("toLower(toString(n.{})) =~ $pattern", quote_identifier(field))
            }
        })
        .collect();

    let restriction = label.map(|l| format!(":{}", l.to_cypher())).unwrap_or_default();
    Statement::new(format!(
        "MATCH (n{}) WHERE {} RETURN n LIMIT {}",
        restriction,
        disjunction.join(" OR "),
        amount
    ))
    .param("pattern", format!("(?s).*{}.*", regex_literal(&term.trim().to_lowercase())))
}

fn regex_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub fn node_count(filter: &serde_json::Value, compiler: &dyn FilterCompiler) -> AdapterResult<Statement> {
    Ok(Statement::new(format!(
        "MATCH (n){} RETURN count(n) AS {}",
        where_clause(filter, "n", compiler)?,
        COUNT_COLUMN
    )))
}

/// `data` is stored as the full property set and must include `id`.
pub fn create_node(labels: &[Label], data: PropertyMap) -> Statement {
    Statement::new(format!("CREATE (n{}) SET n = $data", label_chain(labels)))
        .param("data", PropertyValue::Map(data))
}

pub fn update_node(id: &str, labels: &[Label], data: PropertyMap) -> Statement {
    let relabel = if labels.is_empty() {
        String::new()
    } else {
        format!(" SET n{}", label_chain(labels))
    };
    Statement::new(format!("MATCH (n {{id: $id}}) SET n = $data{} RETURN n", relabel))
        .param("id", id)
        .param("data", PropertyValue::Map(data))
}

pub fn delete_node(id: &str) -> Statement {
    Statement::new("MATCH (n {id: $id}) DETACH DELETE n").param("id", id)
}

pub fn delete_nodes(filter: &serde_json::Value, compiler: &dyn FilterCompiler) -> AdapterResult<Statement> {
    Ok(Statement::new(format!(
        "MATCH (n){} DETACH DELETE n",
        where_clause(filter, "n", compiler)?
    )))
}

pub fn edge_exists(id: &str) -> Statement {
    Statement::new(format!(
        "MATCH ()-[e {{id: $id}}]->() RETURN count(e) AS {}",
        COUNT_COLUMN
    ))
    .param("id", id)
}

pub fn edge_by_id(id: &str) -> Statement {
    Statement::new("MATCH (u)-[e {id: $id}]->(v) RETURN u, e, v LIMIT 1").param("id", id)
}

pub fn edge_between(source_id: &str, target_id: &str, label: Option<&Label>) -> Statement {
    let edge_type = label.map(|l| format!(":{}", l.to_cypher())).unwrap_or_default();
    Statement::new(format!(
        "MATCH (u {{id: $sourceId}}) MATCH (v {{id: $targetId}}) \
         MATCH (u)-[e{}]->(v) RETURN u, e, v LIMIT 1",
        edge_type
    ))
    .param("sourceId", source_id)
    .param("targetId", target_id)
}

pub fn edges_with_label(label: &Label, amount: i64) -> Statement {
    Statement::new(format!(
        "MATCH (u)-[e:{}]->(v) RETURN u, e, v LIMIT {}",
        label.to_cypher(),
        amount
    ))
}

/// Edges matching `filter` on `e`, at most `amount`; a non-positive amount is invalid.
pub fn edges(filter: &serde_json::Value, amount: i64, compiler: &dyn FilterCompiler) -> AdapterResult<Statement> {
    if amount <= 0 {
        return Err(AdapterError::InvalidInput(format!(
            "edge amount must be positive, got {}",
            amount
        )));
    }
    Ok(Statement::new(format!(
        "MATCH (u)-[e]->(v){} RETURN u, e, v LIMIT {}",
        where_clause(filter, "e", compiler)?,
        amount
    )))
}

pub fn edge_count(filter: &serde_json::Value, compiler: &dyn FilterCompiler) -> AdapterResult<Statement> {
    Ok(Statement::new(format!(
        "MATCH ()-[e]->(){} RETURN count(e) AS {}",
        where_clause(filter, "e", compiler)?,
        COUNT_COLUMN
    )))
}

pub fn create_edge(source_id: &str, target_id: &str, label: &Label, data: PropertyMap) -> Statement {
    Statement::new(format!(
        "MATCH (u {{id: $sourceId}}) MATCH (v {{id: $targetId}}) \
         CREATE (u)-[e:{}]->(v) SET e = $data RETURN u, e, v",
        label.to_cypher()
    ))
    .param("sourceId", source_id)
    .param("targetId", target_id)
    .param("data", PropertyValue::Map(data))
}

/// `data` replaces every property and must include `id`.
pub fn update_edge(id: &str, label: Option<&Label>, data: PropertyMap) -> Statement {
    let edge_type = label.map(|l| format!(":{}", l.to_cypher())).unwrap_or_default();
    Statement::new(format!(
        "MATCH (u)-[e{} {{id: $id}}]->(v) SET e = $data RETURN u, e, v",
        edge_type
    ))
    .param("id", id)
    .param("data", PropertyValue::Map(data))
}

pub fn delete_edge(id: &str) -> Statement {
    Statement::new("MATCH ()-[e {id: $id}]->() DELETE e").param("id", id)
}

pub fn node_labels() -> Statement {
    Statement::new("CALL db.labels()")
}

pub fn edge_labels() -> Statement {
    Statement::new("CALL db.relationshipTypes()")
}

pub fn clear() -> Statement {
    Statement::new("MATCH (n) DETACH DELETE n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::FilterError;
    use serde_json::json;

    /// Equality-only filters, enough to exercise the splicing
    struct Equality;

    impl FilterCompiler for Equality {
        fn compile(&self, filter: &serde_json::Value, variable: &str) -> Result<String, FilterError> {
            let map = filter
                .as_object()
                .ok_or_else(|| FilterError("filter must be an object".to_string()))?;
            Ok(map
                .iter()
                .map(|(k, v)| format!("{}.{} = {}", variable, k, v))
                .collect::<Vec<_>>()
                .join(" AND "))
        }
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let stmt = nodes(&json!({}), 100, &Equality).unwrap();
        assert_eq!(stmt.text, "MATCH (n) RETURN n LIMIT 100");
        let stmt = node_count(&serde_json::Value::Null, &Equality).unwrap();
        assert_eq!(stmt.text, "MATCH (n) RETURN count(n) AS count");
    }

    #[test]
    fn test_filter_is_compiled() {
        let stmt = nodes(&json!({"age": 3}), 10, &Equality).unwrap();
        assert_eq!(stmt.text, "MATCH (n) WHERE n.age = 3 RETURN n LIMIT 10");
        let stmt = edge_count(&json!({"w": 1}), &Equality).unwrap();
        assert_eq!(stmt.text, "MATCH ()-[e]->() WHERE e.w = 1 RETURN count(e) AS count");
    }

    #[test]
    fn test_filter_errors_propagate() {
        let err = delete_nodes(&json!([1, 2]), &Equality).unwrap_err();
        assert!(matches!(err, AdapterError::Filter(_)));
    }

    #[test]
    fn test_non_positive_count() {
        assert!(matches!(
            nodes(&json!({}), 0, &Equality).unwrap_err(),
            AdapterError::InvalidInput(_)
        ));
    }

    #[test]
    fn test_neighborhood_binds_center() {
        let stmt = neighborhood("x' OR 1=1", 20);
        assert!(stmt.text.starts_with("MATCH (c {id: $id}) OPTIONAL MATCH (parent)-[pr]->(c)"));
        assert!(stmt.text.ends_with("RETURN parent, pr, c, cr, child LIMIT 20"));
        assert_eq!(stmt.params.get("id").unwrap().as_string(), Some("x' OR 1=1"));
    }

    #[test]
    fn test_search_nodes() {
        let stmt = search_nodes("  Ali.ce ", &[], None, 5);
        assert_eq!(stmt.text, "MATCH (n) WHERE toLower(toString(n.name)) =~ $pattern RETURN n LIMIT 5");
        assert_eq!(stmt.params.get("pattern").unwrap().as_string(), Some("(?s).*ali\\.ce.*"));

        let fields = vec!["labels".to_string(), "full name".to_string()];
        let stmt = search_nodes("x", &fields, Some(&Label::new("Person")), 3);
        assert_eq!(
            stmt.text,
            "MATCH (n:Person) WHERE ANY(l IN labels(n) WHERE toLower(l) =~ $pattern) \
             OR toLower(toString(n.`full name`)) =~ $pattern RETURN n LIMIT 3"
        );
    }

    #[test]
    fn test_create_and_update_node() {
        let mut data = PropertyMap::new();
        data.insert("id".to_string(), "n1".into());
        let labels = vec![Label::new("Person"), Label::new("Big Co")];

        let stmt = create_node(&labels, data.clone());
        assert_eq!(stmt.text, "CREATE (n:Person:`Big Co`) SET n = $data");
        assert!(stmt.params.get("data").unwrap().as_map().unwrap().contains_key("id"));

        let stmt = update_node("n1", &[], data.clone());
        assert_eq!(stmt.text, "MATCH (n {id: $id}) SET n = $data RETURN n");
        let stmt = update_node("n1", &labels[..1], data);
        assert_eq!(stmt.text, "MATCH (n {id: $id}) SET n = $data SET n:Person RETURN n");
    }

    #[test]
    fn test_edge_statements() {
        let stmt = edge_between("a", "b", None);
        assert!(stmt.text.contains("MATCH (u)-[e]->(v)"));
        let stmt = edge_between("a", "b", Some(&Label::new("KNOWS")));
        assert!(stmt.text.contains("MATCH (u)-[e:KNOWS]->(v)"));
        assert_eq!(stmt.params.len(), 2);

        let stmt = create_edge("a", "b", &Label::new("RelatedTo"), PropertyMap::new());
        assert!(stmt.text.contains("CREATE (u)-[e:RelatedTo]->(v) SET e = $data RETURN u, e, v"));
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_update_edge() {
        let mut data = PropertyMap::new();
        data.insert("id".to_string(), "e1".into());

        let stmt = update_edge("e1", None, data.clone());
        assert_eq!(stmt.text, "MATCH (u)-[e {id: $id}]->(v) SET e = $data RETURN u, e, v");
        assert_eq!(stmt.params.get("id").unwrap().as_string(), Some("e1"));

        let stmt = update_edge("e1", Some(&Label::new("WORKS AT")), data);
        assert_eq!(stmt.text, "MATCH (u)-[e:`WORKS AT` {id: $id}]->(v) SET e = $data RETURN u, e, v");
    }

    #[test]
    fn test_edges_filter_on_relationship() {
        let stmt = edges(&json!({}), 100, &Equality).unwrap();
        assert_eq!(stmt.text, "MATCH (u)-[e]->(v) RETURN u, e, v LIMIT 100");
        let stmt = edges(&json!({"since": 2020}), 5, &Equality).unwrap();
        assert_eq!(stmt.text, "MATCH (u)-[e]->(v) WHERE e.since = 2020 RETURN u, e, v LIMIT 5");
        assert!(matches!(
            edges(&json!({}), -1, &Equality).unwrap_err(),
            AdapterError::InvalidInput(_)
        ));
    }
}
