//! Node and edge value types for diagram graphs.
//!
//! A [`Graph`] is an insertion-ordered set of [`Node`]s keyed by id plus a list
//! of [`Edge`]s. Construction through [`Graph::new`] enforces two invariants:
//!
//! - node ids are unique (the first occurrence wins)
//! - every edge's `source` and `target` name a node in the graph
//!
//! Edges that violate the second invariant are not silently lost: they are
//! reported back as [`DanglingEdge`]s so callers can surface them.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};

use crate::{
    geometry::{Point, Size},
    handle::{SourceHandle, TargetHandle},
    style::{EdgeStyle, NodeStyle},
};

/// Node id type. Ids are unique within a graph.
pub type NodeId = String;

/// The domain role of a node, independent of how it is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Frontend,
    Backend,
    Database,
    Service,
    Logic,
    Input,
    Output,
    #[default]
    Default,
}

impl SemanticType {
    /// Parses an incoming type tag.
    ///
    /// Aliases are folded onto their canonical type (`api` is [`Backend`],
    /// `storage` is [`Database`], `external` is [`Service`], `process` is
    /// [`Logic`]). Tags naming a generic rendering component rather than a
    /// domain role (`logicNode`, `databaseSchema`) and empty tags carry no
    /// semantic information and yield `None`. Any other unknown tag is
    /// [`Default`].
    ///
    /// [`Backend`]: SemanticType::Backend
    /// [`Database`]: SemanticType::Database
    /// [`Service`]: SemanticType::Service
    /// [`Logic`]: SemanticType::Logic
    /// [`Default`]: SemanticType::Default
    ///
    /// # Examples
    ///
    /// ```
    /// # use draftboard_core::graph::SemanticType;
    /// assert_eq!(SemanticType::from_tag("api"), Some(SemanticType::Backend));
    /// assert_eq!(SemanticType::from_tag("Storage"), Some(SemanticType::Database));
    /// assert_eq!(SemanticType::from_tag("logicNode"), None);
    /// assert_eq!(SemanticType::from_tag("quantum"), Some(SemanticType::Default));
    /// ```
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() || tag == "logicNode" || tag == "databaseSchema" {
            return None;
        }
        let semantic = match tag.to_ascii_lowercase().as_str() {
            "frontend" => SemanticType::Frontend,
            "backend" | "api" => SemanticType::Backend,
            "database" | "storage" => SemanticType::Database,
            "service" | "external" => SemanticType::Service,
            "logic" | "process" => SemanticType::Logic,
            "input" => SemanticType::Input,
            "output" => SemanticType::Output,
            _ => SemanticType::Default,
        };
        Some(semantic)
    }

    /// Returns the canonical tag for this type.
    pub fn as_str(self) -> &'static str {
        match self {
            SemanticType::Frontend => "frontend",
            SemanticType::Backend => "backend",
            SemanticType::Database => "database",
            SemanticType::Service => "service",
            SemanticType::Logic => "logic",
            SemanticType::Input => "input",
            SemanticType::Output => "output",
            SemanticType::Default => "default",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SemanticType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Which of the two diagram views a graph belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagramVariant {
    /// System architecture flow.
    #[default]
    Flow,
    /// Entity (table) diagram.
    Schema,
}

impl DiagramVariant {
    /// All variants, in display order.
    pub const ALL: [DiagramVariant; 2] = [DiagramVariant::Flow, DiagramVariant::Schema];

    /// Returns the primary layout direction for this variant.
    pub fn direction(self) -> Direction {
        match self {
            DiagramVariant::Flow => Direction::TopToBottom,
            DiagramVariant::Schema => Direction::LeftToRight,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiagramVariant::Flow => "flow",
            DiagramVariant::Schema => "schema",
        }
    }
}

impl fmt::Display for DiagramVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiagramVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "flow" => Ok(DiagramVariant::Flow),
            "schema" => Ok(DiagramVariant::Schema),
            other => Err(format!("unknown diagram variant `{other}` (expected flow or schema)")),
        }
    }
}

/// Primary direction along which layout ranks are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    TopToBottom,
    LeftToRight,
}

/// A column of a schema-variant table node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", alias = "dataType", default)]
    pub data_type: String,
    #[serde(rename = "isPrimary", alias = "isPrimaryKey", alias = "pk", default)]
    pub is_primary_key: bool,
}

/// Returns `true` if a node id names a structural anchor of the diagram.
///
/// # Examples
///
/// ```
/// # use draftboard_core::graph::is_hub;
/// assert!(is_hub("client_app"));
/// assert!(is_hub("payments_gateway"));
/// assert!(is_hub("auth_service"));
/// assert!(!is_hub("validate_creds"));
/// ```
pub fn is_hub(id: &str) -> bool {
    matches!(id, "client_app" | "api_gateway" | "main_db")
        || id.contains("main_")
        || id.contains("gateway")
        || id.contains("_service")
        || id.contains("client_")
}

/// Bounding box sizes used by layout and routing.
pub struct NodeBox;

impl NodeBox {
    /// Box for ordinary flow nodes.
    pub const FLOW: Size = Size::new(180.0, 50.0);
    /// Box for flow hub nodes.
    pub const HUB: Size = Size::new(250.0, 70.0);
    /// Box for every schema-variant node, tall enough for several table rows.
    pub const SCHEMA: Size = Size::new(240.0, 200.0);

    /// Returns the bounding box of a node with `id` in `variant`.
    pub fn for_node(id: &str, variant: DiagramVariant) -> Size {
        match variant {
            DiagramVariant::Schema => Self::SCHEMA,
            DiagramVariant::Flow if is_hub(id) => Self::HUB,
            DiagramVariant::Flow => Self::FLOW,
        }
    }
}

/// Semantic type state carried across styling passes.
///
/// `original` is written once, on first resolution, and never overwritten.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticTags {
    pub(crate) original: Option<SemanticType>,
    pub(crate) current: Option<SemanticType>,
    pub(crate) raw: Option<String>,
}

impl SemanticTags {
    /// The immutable type captured on first resolution.
    pub fn original(&self) -> Option<SemanticType> {
        self.original
    }

    /// The type assigned by the most recent resolution.
    pub fn current(&self) -> Option<SemanticType> {
        self.current
    }

    /// The raw type tag the node arrived with.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }
}

/// A diagram node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    label: String,
    tags: SemanticTags,
    columns: Vec<Column>,
    position: Option<Point>,
    style: Option<NodeStyle>,
}

impl Node {
    /// Creates an unstyled, unpositioned node.
    pub fn new(id: impl Into<NodeId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            tags: SemanticTags::default(),
            columns: Vec::new(),
            position: None,
            style: None,
        }
    }

    /// Sets the raw incoming type tag.
    pub fn with_type_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.raw = Some(tag.into());
        self
    }

    /// Restores tags captured by an earlier styling pass.
    pub fn with_semantic_tags(
        mut self,
        original: Option<SemanticType>,
        current: Option<SemanticType>,
    ) -> Self {
        self.tags.original = original;
        self.tags.current = current;
        self
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tags(&self) -> &SemanticTags {
        &self.tags
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn style(&self) -> Option<&NodeStyle> {
        self.style.as_ref()
    }

    /// Returns `true` if this node is a hub (see [`is_hub`]).
    pub fn is_hub(&self) -> bool {
        is_hub(&self.id)
    }

    /// Returns the node's bounding box in `variant`.
    pub fn size(&self, variant: DiagramVariant) -> Size {
        NodeBox::for_node(&self.id, variant)
    }

    /// Overwrites the transient current type.
    ///
    /// Renderers may coerce the current type to a generic category; the
    /// original type is unaffected.
    pub fn set_current_type(&mut self, semantic: SemanticType) {
        self.tags.current = Some(semantic);
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = Some(position);
    }

    /// Forgets the node's position so the next layout places it freshly.
    pub fn clear_position(&mut self) {
        self.position = None;
    }

    pub(crate) fn tags_mut(&mut self) -> &mut SemanticTags {
        &mut self.tags
    }

    pub(crate) fn set_style(&mut self, style: NodeStyle) {
        self.style = Some(style);
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let render_kind = match self.style.as_ref().map(|style| style.variant()) {
            Some(DiagramVariant::Schema) => "databaseSchema",
            _ => "logicNode",
        };
        let mut state = serializer.serialize_struct("Node", 5)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", render_kind)?;
        state.serialize_field("position", &self.position)?;
        state.serialize_field(
            "zIndex",
            &self.style.as_ref().map_or(NodeStyle::BASE_Z_INDEX, NodeStyle::z_index),
        )?;
        state.serialize_field(
            "data",
            &NodeData {
                label: &self.label,
                node_type: self.tags.current,
                original_type: self.tags.original,
                columns: &self.columns,
                style: self.style.as_ref(),
            },
        )?;
        state.end()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeData<'a> {
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_type: Option<SemanticType>,
    #[serde(rename = "_originalType", skip_serializing_if = "Option::is_none")]
    original_type: Option<SemanticType>,
    #[serde(skip_serializing_if = "no_columns")]
    columns: &'a [Column],
    #[serde(flatten)]
    style: Option<&'a NodeStyle>,
}

fn no_columns(columns: &&[Column]) -> bool {
    columns.is_empty()
}

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    id: String,
    source: NodeId,
    target: NodeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_handle: Option<SourceHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_handle: Option<TargetHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<EdgeStyle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    waypoints: Vec<Point>,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            source_handle: None,
            target_handle: None,
            style: None,
            waypoints: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn source_handle(&self) -> Option<SourceHandle> {
        self.source_handle
    }

    pub fn target_handle(&self) -> Option<TargetHandle> {
        self.target_handle
    }

    pub fn style(&self) -> Option<&EdgeStyle> {
        self.style.as_ref()
    }

    /// Orthogonal polyline from the source handle anchor to the target handle anchor.
    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Assigns connection handles and the routed polyline.
    pub fn set_route(
        &mut self,
        source_handle: SourceHandle,
        target_handle: TargetHandle,
        waypoints: Vec<Point>,
    ) {
        self.source_handle = Some(source_handle);
        self.target_handle = Some(target_handle);
        self.waypoints = waypoints;
    }

    pub(crate) fn set_style(&mut self, style: EdgeStyle) {
        self.style = Some(style);
    }
}

/// An edge that named a node absent from its graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingEdge {
    pub edge_id: String,
    /// The endpoint ids that could not be found.
    pub missing: Vec<NodeId>,
}

/// Result of assembling a [`Graph`]: the valid graph plus the edges that
/// were dropped because an endpoint was missing.
#[derive(Debug, Clone)]
pub struct GraphBuild {
    pub graph: Graph,
    pub dropped: Vec<DanglingEdge>,
}

/// A set of uniquely identified nodes and the edges between them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Graph {
    #[serde(serialize_with = "serialize_node_values")]
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<Edge>,
}

fn serialize_node_values<S: Serializer>(
    nodes: &IndexMap<NodeId, Node>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(nodes.values())
}

impl Graph {
    /// Assembles a graph, enforcing id uniqueness and edge endpoint existence.
    ///
    /// # Examples
    ///
    /// ```
    /// # use draftboard_core::graph::{Edge, Graph, Node};
    /// let build = Graph::new(
    ///     [Node::new("a", "A"), Node::new("b", "B")],
    ///     [Edge::new("e1", "a", "b"), Edge::new("e2", "a", "ghost")],
    /// );
    /// assert_eq!(build.graph.edges().len(), 1);
    /// assert_eq!(build.dropped[0].edge_id, "e2");
    /// ```
    pub fn new(
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> GraphBuild {
        let mut node_map: IndexMap<NodeId, Node> = IndexMap::new();
        for node in nodes {
            if node_map.contains_key(node.id()) {
                warn!(node_id = node.id(); "Duplicate node id, keeping first occurrence");
                continue;
            }
            node_map.insert(node.id.clone(), node);
        }

        let mut kept = Vec::new();
        let mut dropped = Vec::new();
        for edge in edges {
            let missing: Vec<NodeId> = [edge.source(), edge.target()]
                .into_iter()
                .filter(|id| !node_map.contains_key(*id))
                .map(str::to_string)
                .collect();
            if missing.is_empty() {
                kept.push(edge);
            } else {
                warn!(edge_id = edge.id(), missing:? = missing; "Dropping edge with dangling endpoint");
                dropped.push(DanglingEdge {
                    edge_id: edge.id,
                    missing,
                });
            }
        }

        GraphBuild {
            graph: Graph {
                nodes: node_map,
                edges: kept,
            },
            dropped,
        }
    }

    pub fn nodes(&self) -> impl ExactSizeIterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Mutable access to edges. Endpoints are immutable through [`Edge`]'s API.
    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Mutable iteration over nodes in insertion order.
    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    /// Id-keyed node lookup, in insertion order.
    pub fn node_map(&self) -> &IndexMap<NodeId, Node> {
        &self.nodes
    }

    /// Returns the insertion index of a node.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.nodes.get_index_of(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Splits the graph into its node map and edge list.
    pub fn into_parts(self) -> (IndexMap<NodeId, Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }

    /// Returns a copy with every node position cleared, keeping ids, tags and edges.
    pub fn without_positions(&self) -> Graph {
        let mut graph = self.clone();
        for node in graph.nodes.values_mut() {
            node.clear_position();
        }
        graph
    }
}
