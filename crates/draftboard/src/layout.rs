//! Layout engine for positioning diagram nodes.
//!
//! This module turns a styled [`Graph`] into a positioned one. It wraps a
//! layered-graph backend behind the narrow [`LayeredLayout`] trait, validates
//! what the backend returns and, when the backend fails, places nodes on a
//! deterministic staggered grid instead. Edge handles are assigned last, once
//! final node coordinates are known.
//!
//! # Pipeline Position
//!
//! ```text
//! Graph (styled)
//!     ↓ layout (this module)
//! Positions
//!     ↓ routing
//! Graph (positioned, routed)
//! ```
//!
//! Layout failures never leave this module: [`LayoutEngine::layout`] always
//! returns a fully positioned graph, and reports a recovered failure through
//! [`LayoutOutcome::fallback`].

mod engines;
mod fallback;

pub use engines::{LayeredLayout, SugiyamaLayout};
pub use fallback::staggered_grid;

use indexmap::IndexMap;
use log::{debug, info, trace, warn};
use thiserror::Error;

use draftboard_core::{
    geometry::{Point, Size},
    graph::{DiagramVariant, Direction, Graph, NodeId},
};

use crate::{
    config::{LayoutConfig, SpacingConfig},
    routing::EdgeRouter,
};

/// Top-left node positions keyed by node id.
pub type Positions = IndexMap<NodeId, Point>;

/// A node as seen by a layout backend.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub id: NodeId,
    /// Bounding box the backend must keep clear of other nodes.
    pub size: Size,
}

/// A directed edge between two [`LayoutNode`]s, by index into the node slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEdge {
    pub source: usize,
    pub target: usize,
}

/// Parameters handed to a layout backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayeredConfig {
    /// Direction along which ranks advance.
    pub direction: Direction,
    pub spacing: SpacingConfig,
    /// Route edges as right-angled polylines instead of straight segments.
    pub orthogonal_routing: bool,
    /// Break ordering ties within a rank by input position.
    pub model_order_tie_break: bool,
}

impl LayeredConfig {
    /// Returns the backend configuration for `variant`.
    pub fn for_variant(spacing: &SpacingConfig, variant: DiagramVariant) -> Self {
        Self {
            direction: variant.direction(),
            spacing: *spacing,
            orthogonal_routing: true,
            model_order_tie_break: true,
        }
    }
}

/// Failures of a layout computation.
///
/// These are recovered inside [`LayoutEngine`] and only reported for diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Layout computation failed: {0}")]
    Computation(String),

    #[error("Layout backend panicked: {0}")]
    Panicked(String),

    #[error("Layout result is missing nodes: {missing:?}")]
    InconsistentResult { missing: Vec<NodeId> },
}

/// A positioned, routed graph plus the failure that forced a fallback, if any.
#[derive(Debug, Clone)]
pub struct LayoutOutcome {
    pub graph: Graph,
    pub fallback: Option<LayoutError>,
}

impl LayoutOutcome {
    pub fn used_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Positions graphs with a [`LayeredLayout`] backend and a grid fallback.
///
/// # Examples
///
/// ```
/// # use draftboard::layout::LayoutEngine;
/// # use draftboard_core::graph::{DiagramVariant, Edge, Graph, Node};
/// let graph = Graph::new(
///     [Node::new("a", "A"), Node::new("b", "B")],
///     [Edge::new("e1", "a", "b")],
/// )
/// .graph;
///
/// let outcome = LayoutEngine::default().layout(&graph, DiagramVariant::Flow);
/// assert!(outcome.graph.nodes().all(|node| node.position().is_some()));
/// ```
#[derive(Debug, Clone)]
pub struct LayoutEngine<L = SugiyamaLayout> {
    backend: L,
    config: LayoutConfig,
}

impl Default for LayoutEngine<SugiyamaLayout> {
    fn default() -> Self {
        Self::with_config(LayoutConfig::default())
    }
}

impl LayoutEngine<SugiyamaLayout> {
    /// Create an engine using the layered Sugiyama backend.
    pub fn with_config(config: LayoutConfig) -> Self {
        Self::new(SugiyamaLayout::new(), config)
    }
}

impl<L: LayeredLayout> LayoutEngine<L> {
    pub fn new(backend: L, config: LayoutConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &L {
        &self.backend
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Returns the backend configuration used for `variant`.
    pub fn layered_config(&self, variant: DiagramVariant) -> LayeredConfig {
        LayeredConfig::for_variant(&self.config.spacing(variant), variant)
    }

    /// Returns the edge router matching this engine's settings for `variant`.
    ///
    /// Detour lanes keep the variant's `edge_node` distance from boxes.
    pub fn router(&self, variant: DiagramVariant) -> EdgeRouter {
        let config = self.layered_config(variant);
        EdgeRouter::new(variant)
            .with_orthogonal(config.orthogonal_routing)
            .with_clearance(config.spacing.edge_node)
    }

    /// Positions every node of `graph` and routes its edges.
    ///
    /// Input positions are ignored; callers that want to keep user-placed
    /// coordinates should not lay the graph out again.
    pub fn layout(&self, graph: &Graph, variant: DiagramVariant) -> LayoutOutcome {
        info!(
            variant:% = variant,
            nodes = graph.len(),
            edges = graph.edges().len();
            "Calculating layout"
        );

        let (positions, fallback) = self.positions(graph, variant);

        let mut positioned = graph.clone();
        for node in positioned.nodes_mut() {
            match positions.get(node.id()) {
                Some(&position) => node.set_position(position),
                None => node.clear_position(),
            }
        }

        let (graph, dropped) = self.router(variant).route_graph(positioned);
        if !dropped.is_empty() {
            warn!(dropped = dropped.len(); "Edges dropped during routing");
        }

        debug!(fallback = fallback.is_some(); "Layout calculated");
        LayoutOutcome { graph, fallback }
    }

    /// Computes node positions, recovering from backend failures.
    ///
    /// The second element is the failure that caused the grid fallback.
    pub fn positions(
        &self,
        graph: &Graph,
        variant: DiagramVariant,
    ) -> (Positions, Option<LayoutError>) {
        let config = self.layered_config(variant);
        let nodes: Vec<LayoutNode> = graph
            .nodes()
            .map(|node| LayoutNode {
                id: node.id().to_string(),
                size: node.size(variant),
            })
            .collect();
        if nodes.is_empty() {
            return (Positions::new(), None);
        }

        let edges: Vec<LayoutEdge> = graph
            .edges()
            .iter()
            .filter_map(|edge| {
                Some(LayoutEdge {
                    source: graph.index_of(edge.source())?,
                    target: graph.index_of(edge.target())?,
                })
            })
            .collect();

        let result = self
            .backend
            .layout(&nodes, &edges, &config)
            .and_then(|positions| validate(&nodes, positions));

        match result {
            Ok(positions) => {
                trace!(positions:?; "Backend positions");
                (positions, None)
            }
            Err(err) => {
                warn!(err:% = err; "Layout failed, using staggered grid");
                (staggered_grid(&nodes, &config), Some(err))
            }
        }
    }
}

/// Checks that every input node received a finite position.
///
/// Returns positions in input order with unknown ids discarded.
fn validate(nodes: &[LayoutNode], mut positions: Positions) -> Result<Positions, LayoutError> {
    let missing: Vec<NodeId> = nodes
        .iter()
        .filter(|node| !positions.contains_key(&node.id))
        .map(|node| node.id.clone())
        .collect();
    if !missing.is_empty() {
        return Err(LayoutError::InconsistentResult { missing });
    }

    let mut ordered = Positions::with_capacity(nodes.len());
    for node in nodes {
        if let Some(position) = positions.swap_remove(&node.id) {
            if !position.x().is_finite() || !position.y().is_finite() {
                return Err(LayoutError::Computation(format!(
                    "non-finite position for node `{}`",
                    node.id
                )));
            }
            ordered.insert(node.id.clone(), position);
        }
    }
    Ok(ordered)
}

#[cfg(test)]
mod tests {
    use super::*;

    use draftboard_core::{
        geometry::Bounds,
        graph::{Edge, Node},
    };

    /// Backend returning a fixed result.
    struct Fixed(Result<Vec<(&'static str, Point)>, LayoutError>);

    impl LayeredLayout for Fixed {
        fn layout(
            &self,
            _nodes: &[LayoutNode],
            _edges: &[LayoutEdge],
            _config: &LayeredConfig,
        ) -> Result<Positions, LayoutError> {
            self.0.clone().map(|points| {
                points
                    .into_iter()
                    .map(|(id, point)| (id.to_string(), point))
                    .collect()
            })
        }
    }

    fn chain() -> Graph {
        Graph::new(
            [Node::new("a", "A"), Node::new("b", "B"), Node::new("c", "C")],
            [Edge::new("ab", "a", "b"), Edge::new("bc", "b", "c")],
        )
        .graph
    }

    #[test]
    fn test_backend_positions_are_applied() {
        let engine = LayoutEngine::new(
            Fixed(Ok(vec![
                ("c", Point::new(0.0, 800.0)),
                ("a", Point::new(0.0, 0.0)),
                ("b", Point::new(0.0, 400.0)),
                ("ghost", Point::new(5.0, 5.0)),
            ])),
            LayoutConfig::default(),
        );
        let outcome = engine.layout(&chain(), DiagramVariant::Flow);

        assert!(!outcome.used_fallback());
        assert_eq!(
            outcome.graph.node("b").unwrap().position(),
            Some(Point::new(0.0, 400.0))
        );
        assert_eq!(outcome.graph.edges()[0].source_handle().unwrap().to_string(), "bottom");
    }

    #[test]
    fn test_missing_ids_fall_back_to_grid() {
        let engine = LayoutEngine::new(
            Fixed(Ok(vec![("a", Point::new(0.0, 0.0))])),
            LayoutConfig::default(),
        );
        let outcome = engine.layout(&chain(), DiagramVariant::Flow);

        assert_eq!(
            outcome.fallback,
            Some(LayoutError::InconsistentResult {
                missing: vec!["b".to_string(), "c".to_string()]
            })
        );
        assert!(outcome.graph.nodes().all(|node| node.position().is_some()));
    }

    #[test]
    fn test_backend_error_falls_back_to_grid() {
        let engine = LayoutEngine::new(
            Fixed(Err(LayoutError::Computation("boom".to_string()))),
            LayoutConfig::default(),
        );
        let outcome = engine.layout(&chain(), DiagramVariant::Schema);

        assert!(outcome.used_fallback());
        let bounds: Vec<Bounds> = outcome
            .graph
            .nodes()
            .map(|node| {
                Bounds::new_from_top_left(
                    node.position().unwrap(),
                    node.size(DiagramVariant::Schema),
                )
            })
            .collect();
        for (i, a) in bounds.iter().enumerate() {
            for b in &bounds[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn test_non_finite_positions_are_rejected() {
        let engine = LayoutEngine::new(
            Fixed(Ok(vec![
                ("a", Point::new(f32::NAN, 0.0)),
                ("b", Point::new(0.0, 0.0)),
                ("c", Point::new(0.0, 0.0)),
            ])),
            LayoutConfig::default(),
        );
        let (_, fallback) = engine.positions(&chain(), DiagramVariant::Flow);
        assert!(matches!(fallback, Some(LayoutError::Computation(_))));
    }

    #[test]
    fn test_empty_graph_needs_no_backend() {
        let engine = LayoutEngine::new(
            Fixed(Err(LayoutError::Computation("unreachable".to_string()))),
            LayoutConfig::default(),
        );
        let outcome = engine.layout(&Graph::default(), DiagramVariant::Flow);
        assert!(outcome.graph.is_empty());
        assert!(!outcome.used_fallback());
    }

    #[test]
    fn test_layered_config_for_variant() {
        let engine = LayoutEngine::default();
        let flow = engine.layered_config(DiagramVariant::Flow);
        let schema = engine.layered_config(DiagramVariant::Schema);
        assert_eq!(flow.direction, Direction::TopToBottom);
        assert_eq!(schema.direction, Direction::LeftToRight);
        assert_eq!(schema.spacing, SpacingConfig::SCHEMA);
        assert!(flow.orthogonal_routing);
    }
}
