//! Raw graph payloads as supplied by the host.
//!
//! The payload shape is
//! `{ nodes: [{ id, type, data: { label, columns? } }], edges: [{ id, source, target, label? }] }`.
//! Previously published snapshots use the same shape with extra fields
//! (`position`, `data.nodeType`, `data._originalType`), so a snapshot can be fed
//! back in and keeps its semantic classification and positions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    geometry::Point,
    graph::{Column, DiagramVariant, Edge, Graph, GraphBuild, Node, SemanticType},
};

/// Errors raised while decoding a payload.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Malformed graph payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// A raw node as found in a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub data: RawNodeData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    /// Top-level label, used when `data.label` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// The `data` object of a raw node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNodeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<Column>,
    #[serde(rename = "nodeType", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(rename = "_originalType", default, skip_serializing_if = "Option::is_none")]
    pub original_type: Option<String>,
}

/// A raw edge as found in a payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A raw node/edge payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl RawGraph {
    /// Decodes a payload from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Json`] if the text is not a valid payload.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// A generated blueprint carrying one payload per diagram variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    #[serde(default)]
    pub logic_flow: RawGraph,
    #[serde(default)]
    pub database_schema: RawGraph,
}

impl Blueprint {
    /// Envelope keys that mark a document as a blueprint rather than a bare graph.
    pub const KEYS: [&'static str; 2] = ["logicFlow", "databaseSchema"];

    /// Returns the payload for `variant`.
    pub fn graph(&self, variant: DiagramVariant) -> &RawGraph {
        match variant {
            DiagramVariant::Flow => &self.logic_flow,
            DiagramVariant::Schema => &self.database_schema,
        }
    }

    /// Consumes the blueprint, keeping the payload for `variant`.
    pub fn into_graph(self, variant: DiagramVariant) -> RawGraph {
        match variant {
            DiagramVariant::Flow => self.logic_flow,
            DiagramVariant::Schema => self.database_schema,
        }
    }
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let label = raw.data.label.or(raw.label).unwrap_or_else(|| raw.id.clone());
        let original = raw.data.original_type.as_deref().and_then(SemanticType::from_tag);
        let current = raw.data.node_type.as_deref().and_then(SemanticType::from_tag);

        let mut node = Node::new(raw.id, label)
            .with_semantic_tags(original, current)
            .with_columns(raw.data.columns);
        if let Some(kind) = raw.kind {
            node = node.with_type_tag(kind);
        }
        if let Some(position) = raw.position {
            node = node.with_position(position);
        }
        node
    }
}

impl From<RawEdge> for Edge {
    fn from(raw: RawEdge) -> Self {
        let edge = Edge::new(raw.id, raw.source, raw.target);
        match raw.label {
            Some(label) => edge.with_label(label),
            None => edge,
        }
    }
}

impl Graph {
    /// Builds a graph from a raw payload, dropping dangling edges.
    ///
    /// # Examples
    ///
    /// ```
    /// # use draftboard_core::payload::RawGraph;
    /// # use draftboard_core::graph::Graph;
    /// let raw = RawGraph::from_json(r#"{
    ///     "nodes": [{ "id": "client_app", "type": "frontend", "data": { "label": "Client" } }],
    ///     "edges": [{ "id": "e1", "source": "client_app", "target": "api_gateway" }]
    /// }"#).unwrap();
    /// let build = Graph::from_raw(raw);
    /// assert_eq!(build.graph.len(), 1);
    /// assert_eq!(build.dropped.len(), 1);
    /// ```
    pub fn from_raw(raw: RawGraph) -> GraphBuild {
        Graph::new(
            raw.nodes.into_iter().map(Node::from),
            raw.edges.into_iter().map(Edge::from),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_schema_columns() {
        let raw = RawGraph::from_json(
            r#"{
                "nodes": [{
                    "id": "users",
                    "type": "databaseSchema",
                    "data": {
                        "label": "Users",
                        "columns": [
                            { "name": "id", "type": "uuid", "isPrimary": true },
                            { "name": "email", "dataType": "varchar" }
                        ]
                    }
                }]
            }"#,
        )
        .unwrap();

        let columns = &raw.nodes[0].data.columns;
        assert_eq!(columns.len(), 2);
        assert!(columns[0].is_primary_key);
        assert_eq!(columns[1].data_type, "varchar");
        assert!(!columns[1].is_primary_key);
    }

    #[test]
    fn test_snapshot_tags_are_restored() {
        let raw = RawGraph::from_json(
            r#"{
                "nodes": [{
                    "id": "ui",
                    "type": "logicNode",
                    "position": { "x": 12.0, "y": 34.0 },
                    "data": { "label": "UI", "nodeType": "default", "_originalType": "frontend" }
                }]
            }"#,
        )
        .unwrap();
        let build = Graph::from_raw(raw);
        let node = build.graph.node("ui").unwrap();

        assert_eq!(node.tags().original(), Some(SemanticType::Frontend));
        assert_eq!(node.tags().current(), Some(SemanticType::Default));
        assert_eq!(node.tags().raw(), Some("logicNode"));
        assert_eq!(node.position(), Some(Point::new(12.0, 34.0)));
    }

    #[test]
    fn test_label_fallbacks() {
        let top_level: Node = RawNode {
            id: "a".to_string(),
            label: Some("Top".to_string()),
            ..RawNode::default()
        }
        .into();
        assert_eq!(top_level.label(), "Top");

        let bare: Node = RawNode {
            id: "b".to_string(),
            ..RawNode::default()
        }
        .into();
        assert_eq!(bare.label(), "b");
    }

    #[test]
    fn test_blueprint_selects_variant() {
        let blueprint: Blueprint = serde_json::from_str(
            r#"{
                "logicFlow": { "nodes": [{ "id": "client_app" }] },
                "databaseSchema": { "nodes": [{ "id": "users" }, { "id": "orders" }] }
            }"#,
        )
        .unwrap();
        assert_eq!(blueprint.graph(DiagramVariant::Flow).nodes.len(), 1);
        assert_eq!(blueprint.into_graph(DiagramVariant::Schema).nodes.len(), 2);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        let err = RawGraph::from_json(r#"{ "nodes": [ { "type": "frontend" } ] }"#).unwrap_err();
        assert!(err.to_string().starts_with("Malformed graph payload"));
    }
}
