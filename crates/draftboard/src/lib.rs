//! Draftboard - layout, routing and interaction state for diagram canvases.
//!
//! Turns an abstract node/edge payload describing a system architecture or a
//! database schema into a styled, laid-out and routed diagram, keeps
//! user-dragged positions across view switches, and sizes the resizable
//! panels that host the canvas.
//!
//! # Modules
//!
//! - [`layout`] - Layered layout with a deterministic grid fallback
//! - [`routing`] - Position-dependent connection handles
//! - [`controller`] - The per-view state machine hosts drive with events
//! - [`resize`] - Pointer-drag panel resizing
//! - [`config`] - Spacing, theme and panel configuration

pub mod config;
pub mod controller;
pub mod layout;
pub mod resize;
pub mod routing;

mod error;

pub use draftboard_core::{color, geometry, graph, handle, payload, style};

pub use error::DraftboardError;

use log::{debug, info, trace};

use draftboard_core::{
    graph::{DiagramVariant, Graph},
    payload::{Blueprint, RawGraph},
};

use config::AppConfig;
use controller::{DiagramController, Event, PublishReason, Publication, Response};

/// Builder for turning payloads into published diagram snapshots.
///
/// This is the one-shot counterpart of [`DiagramController`]: it activates a
/// view, runs its layout to completion and returns the resulting publication.
///
/// # Examples
///
/// ```
/// use draftboard::{DiagramBuilder, config::AppConfig, graph::DiagramVariant};
///
/// let source = r#"{
///     "nodes": [
///         { "id": "client_app", "type": "frontend", "data": { "label": "Client" } },
///         { "id": "api_gateway", "type": "backend", "data": { "label": "Gateway" } }
///     ],
///     "edges": [{ "id": "e1", "source": "client_app", "target": "api_gateway" }]
/// }"#;
///
/// let builder = DiagramBuilder::new(AppConfig::default());
/// let raw = builder.parse(source, DiagramVariant::Flow).expect("Failed to parse");
/// let publication = builder.render(raw, DiagramVariant::Flow);
///
/// let edge = &publication.snapshot.edges()[0];
/// assert_eq!(edge.source_handle().unwrap().to_string(), "bottom");
/// ```
#[derive(Debug, Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Create a new diagram builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse a payload document.
    ///
    /// The document is either a bare `{nodes, edges}` graph or a blueprint
    /// envelope `{logicFlow, databaseSchema}`, in which case the graph for
    /// `variant` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`DraftboardError::Payload`] if the text is not valid JSON or
    /// does not have the payload shape.
    pub fn parse(&self, source: &str, variant: DiagramVariant) -> Result<RawGraph, DraftboardError> {
        info!(variant:% = variant; "Parsing payload");

        let document: serde_json::Value = serde_json::from_str(source)
            .map_err(|err| DraftboardError::new_payload_error(err, source))?;

        let is_blueprint = document
            .as_object()
            .is_some_and(|object| Blueprint::KEYS.iter().any(|key| object.contains_key(*key)));

        let raw = if is_blueprint {
            debug!("Payload is a blueprint envelope");
            serde_json::from_value::<Blueprint>(document)
                .map(|blueprint| blueprint.into_graph(variant))
        } else {
            serde_json::from_value::<RawGraph>(document)
        }
        .map_err(|err| DraftboardError::new_payload_error(err, source))?;

        debug!(nodes = raw.nodes.len(), edges = raw.edges.len(); "Payload parsed");
        trace!(raw:?; "Parsed payload");
        Ok(raw)
    }

    /// Style, lay out and route `raw` as the `variant` view.
    ///
    /// Never fails: layout problems fall back to a grid, dangling edges are
    /// dropped and listed on the publication.
    pub fn render(&self, raw: RawGraph, variant: DiagramVariant) -> Publication {
        let mut controller = DiagramController::from_config(&self.config);

        let response = controller.handle(Event::VariantActivated { variant, raw });
        if let Response::StartLayout(job) = response {
            controller.complete(job);
        }

        // An empty payload leaves the view idle and publishes nothing.
        let dropped_edges = controller.view(variant).dropped_edges().to_vec();
        controller.tick().pop().unwrap_or_else(|| Publication {
            variant,
            reason: PublishReason::LayoutCompleted,
            snapshot: Graph::default(),
            dropped_edges,
            fallback_used: false,
        })
    }
}
