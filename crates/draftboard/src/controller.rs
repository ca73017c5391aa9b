//! Per-view diagram state machine.
//!
//! A [`DiagramController`] owns one [`DiagramView`] per [`DiagramVariant`] and
//! reconciles freshly computed layouts with positions the user dragged by
//! hand. It is driven by typed [`Event`]s and never runs a layout itself while
//! handling one: starting a layout returns a [`LayoutJob`] that the host runs
//! (on whatever executor it likes) and feeds back as
//! [`Event::LayoutCompleted`].
//!
//! # States
//!
//! ```text
//!            VariantActivated (no saved graph)
//!   Idle ─────────────────────────────────────▶ LayingOut{run}
//!    ▲  ◀── VariantActivated (empty graph)          │
//!    │                                              │ LayoutCompleted{run}
//!    │       VariantActivated (saved graph)         ▼
//!    └─────────────────────────────────────────▶  Ready
//!                                                   │ AutoFormatRequested
//!                                                   ▼
//!                                              LayingOut{run'}
//! ```
//!
//! Only the most recently started run of a view is accepted; completions of
//! older runs are ignored. Results reach the host through [`Publication`]s,
//! which are queued by the transition that produced them and handed out by
//! the next [`DiagramController::tick`].

use std::fmt;

use log::{debug, info, warn};
use serde::Serialize;

use draftboard_core::{
    geometry::Point,
    graph::{DanglingEdge, DiagramVariant, Graph, NodeId},
    payload::RawGraph,
    style::StyleResolver,
};

use crate::{
    config::AppConfig,
    layout::{LayeredLayout, LayoutEngine, LayoutOutcome, SugiyamaLayout},
};

/// Identifier of a layout run. Monotonic across all views of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl RunId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

/// Lifecycle state of a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing to lay out.
    #[default]
    Idle,
    /// A layout run is in flight.
    LayingOut { run_id: RunId },
    /// Positions and handles are resolved.
    Ready,
}

/// The cached state of one diagram variant.
#[derive(Debug, Clone, Default)]
pub struct DiagramView {
    state: ViewState,
    /// Styled input of the latest run, kept while the run is in flight.
    pending: Option<Graph>,
    current: Option<Graph>,
    saved: Option<Graph>,
    selection: Option<NodeId>,
    dropped_edges: Vec<DanglingEdge>,
    /// Whether the shown positions came from the grid fallback.
    fallback_used: bool,
}

impl DiagramView {
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// The graph currently shown, once a layout or saved snapshot is applied.
    pub fn current(&self) -> Option<&Graph> {
        self.current.as_ref()
    }

    /// The user-edited snapshot that takes precedence over fresh input.
    pub fn saved(&self) -> Option<&Graph> {
        self.saved.as_ref()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    /// Edges dropped from the latest input because an endpoint was missing.
    pub fn dropped_edges(&self) -> &[DanglingEdge] {
        &self.dropped_edges
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, ViewState::LayingOut { .. })
    }

    /// Returns `true` if the shown positions came from the grid fallback.
    pub fn fallback_used(&self) -> bool {
        self.fallback_used
    }

    /// Node/edge identity of the view, if it has any.
    fn identity(&self) -> Option<&Graph> {
        self.current.as_ref().or(self.pending.as_ref())
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum Event {
    /// A view became active with a freshly generated payload.
    VariantActivated {
        variant: DiagramVariant,
        raw: RawGraph,
    },
    /// A layout run finished.
    LayoutCompleted(LayoutCompletion),
    /// Discard the saved snapshot and lay the view out again.
    AutoFormatRequested { variant: DiagramVariant },
    /// A node moved during a drag. Does not publish.
    NodeDragged {
        variant: DiagramVariant,
        node: NodeId,
        position: Point,
    },
    /// The user released a dragged node.
    NodeDragEnded { variant: DiagramVariant },
    NodeSelected {
        variant: DiagramVariant,
        node: Option<NodeId>,
    },
    /// A new blueprint replaces everything; saved snapshots are discarded.
    NewBlueprintRequested,
    ThemeChanged { dark_mode: bool },
}

/// Why an event had no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The completion belongs to a superseded run.
    StaleRun { expected: Option<RunId>, got: RunId },
    /// The view is not in the `Ready` state.
    NotReady,
    /// The view has no graph to operate on.
    NoGraph,
    UnknownNode(NodeId),
}

/// Result of handling an [`Event`].
#[derive(Debug, Clone)]
pub enum Response {
    /// The view has nothing to show.
    Idle,
    /// The host must run this job and report back with [`Event::LayoutCompleted`].
    StartLayout(LayoutJob),
    Applied,
    Ignored(IgnoreReason),
}

/// A layout run the host should execute.
#[derive(Debug, Clone)]
pub struct LayoutJob {
    pub variant: DiagramVariant,
    pub run_id: RunId,
    /// Styled graph with positions cleared.
    pub graph: Graph,
}

impl LayoutJob {
    /// Runs the job. Layout failures are recovered inside the engine.
    pub fn run<L: LayeredLayout>(self, engine: &LayoutEngine<L>) -> LayoutCompletion {
        let outcome = engine.layout(&self.graph, self.variant);
        LayoutCompletion {
            variant: self.variant,
            run_id: self.run_id,
            outcome,
        }
    }
}

/// The result of a [`LayoutJob`].
#[derive(Debug, Clone)]
pub struct LayoutCompletion {
    pub variant: DiagramVariant,
    pub run_id: RunId,
    pub outcome: LayoutOutcome,
}

/// What caused a publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PublishReason {
    LayoutCompleted,
    DragEnded,
    ThemeChanged,
}

/// A snapshot handed to the host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub variant: DiagramVariant,
    pub reason: PublishReason,
    pub snapshot: Graph,
    /// Edges dropped from the input because an endpoint was missing.
    pub dropped_edges: Vec<DanglingEdge>,
    /// `true` if the layout backend failed and the grid fallback was used.
    pub fallback_used: bool,
}

/// Orchestrates layout runs, saved snapshots and publishing for both views.
///
/// # Examples
///
/// ```
/// # use draftboard::controller::{DiagramController, Event, Response};
/// # use draftboard_core::{graph::DiagramVariant, payload::RawGraph};
/// let mut controller = DiagramController::default();
/// let raw = RawGraph::from_json(r#"{
///     "nodes": [
///         { "id": "client_app", "type": "frontend", "data": { "label": "Client" } },
///         { "id": "api_gateway", "type": "backend", "data": { "label": "Gateway" } }
///     ],
///     "edges": [{ "id": "e1", "source": "client_app", "target": "api_gateway" }]
/// }"#).unwrap();
///
/// let Response::StartLayout(job) = controller.handle(Event::VariantActivated {
///     variant: DiagramVariant::Flow,
///     raw,
/// }) else {
///     panic!("expected a layout run");
/// };
/// controller.complete(job);
///
/// let publications = controller.tick();
/// assert_eq!(publications.len(), 1);
/// assert_eq!(publications[0].snapshot.len(), 2);
/// ```
#[derive(Debug)]
pub struct DiagramController<L = SugiyamaLayout> {
    engine: LayoutEngine<L>,
    dark_mode: bool,
    views: [DiagramView; 2],
    active: Option<DiagramVariant>,
    next_run: u64,
    outbox: Vec<Publication>,
}

impl Default for DiagramController<SugiyamaLayout> {
    fn default() -> Self {
        Self::new(LayoutEngine::default(), true)
    }
}

impl DiagramController<SugiyamaLayout> {
    /// Create a controller with the Sugiyama backend configured from `config`.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            LayoutEngine::with_config(config.layout().clone()),
            config.style().dark_mode(),
        )
    }
}

impl<L: LayeredLayout> DiagramController<L> {
    pub fn new(engine: LayoutEngine<L>, dark_mode: bool) -> Self {
        Self {
            engine,
            dark_mode,
            views: Default::default(),
            active: None,
            next_run: 0,
            outbox: Vec::new(),
        }
    }

    pub fn engine(&self) -> &LayoutEngine<L> {
        &self.engine
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn active_variant(&self) -> Option<DiagramVariant> {
        self.active
    }

    pub fn view(&self, variant: DiagramVariant) -> &DiagramView {
        &self.views[slot(variant)]
    }

    /// Returns `true` while a layout run is in flight for `variant`.
    pub fn is_busy(&self, variant: DiagramVariant) -> bool {
        self.view(variant).is_busy()
    }

    /// Hands out every publication queued before this call.
    pub fn tick(&mut self) -> Vec<Publication> {
        let publications = std::mem::take(&mut self.outbox);
        for publication in &publications {
            info!(
                variant:% = publication.variant,
                reason:? = publication.reason,
                nodes = publication.snapshot.len();
                "Snapshot published"
            );
        }
        publications
    }

    /// Runs `job` on this controller's engine and applies its completion.
    pub fn complete(&mut self, job: LayoutJob) -> Response {
        let completion = job.run(&self.engine);
        self.handle(Event::LayoutCompleted(completion))
    }

    /// Applies an event to the state machine.
    pub fn handle(&mut self, event: Event) -> Response {
        match event {
            Event::VariantActivated { variant, raw } => self.activate(variant, raw),
            Event::LayoutCompleted(completion) => self.accept_layout(completion),
            Event::AutoFormatRequested { variant } => self.auto_format(variant),
            Event::NodeDragged {
                variant,
                node,
                position,
            } => self.drag(variant, node, position),
            Event::NodeDragEnded { variant } => self.end_drag(variant),
            Event::NodeSelected { variant, node } => self.select(variant, node),
            Event::NewBlueprintRequested => {
                info!("New blueprint requested, discarding saved snapshots");
                for view in &mut self.views {
                    view.saved = None;
                    view.selection = None;
                }
                Response::Applied
            }
            Event::ThemeChanged { dark_mode } => self.change_theme(dark_mode),
        }
    }

    fn activate(&mut self, variant: DiagramVariant, raw: RawGraph) -> Response {
        self.active = Some(variant);
        let view = &mut self.views[slot(variant)];

        if let Some(saved) = &view.saved {
            debug!(variant:% = variant; "Restoring saved snapshot");
            view.current = Some(saved.clone());
            view.pending = None;
            view.state = ViewState::Ready;
            return Response::Applied;
        }

        let build = Graph::from_raw(raw);
        if !build.dropped.is_empty() {
            warn!(
                variant:% = variant,
                dropped = build.dropped.len();
                "Input references unknown nodes, dropping edges"
            );
        }
        view.dropped_edges = build.dropped;

        if build.graph.is_empty() {
            debug!(variant:% = variant; "Empty graph, view idle");
            view.state = ViewState::Idle;
            view.current = None;
            view.pending = None;
            view.fallback_used = false;
            return Response::Idle;
        }

        let styled = StyleResolver::new(self.dark_mode, variant).resolve_graph(&build.graph);
        self.start_run(variant, styled)
    }

    fn start_run(&mut self, variant: DiagramVariant, graph: Graph) -> Response {
        self.next_run += 1;
        let run_id = RunId(self.next_run);
        let graph = graph.without_positions();

        let view = &mut self.views[slot(variant)];
        if let ViewState::LayingOut { run_id: previous } = view.state {
            debug!(variant:% = variant, previous:% = previous, run_id:% = run_id; "Superseding layout run");
        }
        view.state = ViewState::LayingOut { run_id };
        view.pending = Some(graph.clone());

        debug!(variant:% = variant, run_id:% = run_id; "Layout run started");
        Response::StartLayout(LayoutJob {
            variant,
            run_id,
            graph,
        })
    }

    fn accept_layout(&mut self, completion: LayoutCompletion) -> Response {
        let LayoutCompletion {
            variant,
            run_id,
            outcome,
        } = completion;
        let view = &mut self.views[slot(variant)];

        let expected = match view.state {
            ViewState::LayingOut { run_id } => Some(run_id),
            _ => None,
        };
        if expected != Some(run_id) {
            warn!(variant:% = variant, run_id:% = run_id; "Discarding stale layout result");
            return Response::Ignored(IgnoreReason::StaleRun {
                expected,
                got: run_id,
            });
        }

        // The job carries a copy styled when the run started; the theme may
        // have changed since.
        let graph = StyleResolver::new(self.dark_mode, variant).resolve_graph(&outcome.graph);

        let fallback_used = outcome.used_fallback();
        view.state = ViewState::Ready;
        view.pending = None;
        view.current = Some(graph);
        view.fallback_used = fallback_used;
        info!(variant:% = variant, run_id:% = run_id, fallback_used = fallback_used; "Layout completed");

        self.queue(variant, PublishReason::LayoutCompleted);
        Response::Applied
    }

    fn auto_format(&mut self, variant: DiagramVariant) -> Response {
        let view = &mut self.views[slot(variant)];
        view.saved = None;
        let Some(graph) = view.identity().cloned() else {
            return Response::Ignored(IgnoreReason::NoGraph);
        };
        info!(variant:% = variant; "Auto-format requested");
        self.start_run(variant, graph)
    }

    fn drag(&mut self, variant: DiagramVariant, id: NodeId, position: Point) -> Response {
        let view = &mut self.views[slot(variant)];
        let Some(current) = ready_graph(view) else {
            return Response::Ignored(IgnoreReason::NotReady);
        };
        match current.node_mut(&id) {
            Some(node) => {
                node.set_position(position);
                Response::Applied
            }
            None => Response::Ignored(IgnoreReason::UnknownNode(id)),
        }
    }

    fn end_drag(&mut self, variant: DiagramVariant) -> Response {
        let router = self.engine.router(variant);
        let view = &mut self.views[slot(variant)];
        if view.state != ViewState::Ready {
            return Response::Ignored(IgnoreReason::NotReady);
        }
        let Some(current) = view.current.take() else {
            return Response::Ignored(IgnoreReason::NoGraph);
        };

        let (routed, _) = router.route_graph(current);
        view.saved = Some(routed.clone());
        view.current = Some(routed);
        debug!(variant:% = variant; "Drag ended, snapshot saved");

        self.queue(variant, PublishReason::DragEnded);
        Response::Applied
    }

    fn select(&mut self, variant: DiagramVariant, node: Option<NodeId>) -> Response {
        let view = &mut self.views[slot(variant)];
        let Some(current) = ready_graph(view) else {
            return Response::Ignored(IgnoreReason::NotReady);
        };
        if let Some(id) = &node {
            if current.node(id).is_none() {
                return Response::Ignored(IgnoreReason::UnknownNode(id.clone()));
            }
        }
        view.selection = node;
        Response::Applied
    }

    fn change_theme(&mut self, dark_mode: bool) -> Response {
        if self.dark_mode == dark_mode {
            return Response::Applied;
        }
        info!(dark_mode = dark_mode; "Theme changed");
        self.dark_mode = dark_mode;

        for variant in DiagramVariant::ALL {
            let resolver = StyleResolver::new(dark_mode, variant);
            let view = &mut self.views[slot(variant)];
            for graph in [&mut view.current, &mut view.saved, &mut view.pending]
                .into_iter()
                .flatten()
            {
                *graph = resolver.resolve_graph(graph);
            }
            if view.state == ViewState::Ready {
                self.queue(variant, PublishReason::ThemeChanged);
            }
        }
        Response::Applied
    }

    /// Queues the view's current graph for the next tick.
    fn queue(&mut self, variant: DiagramVariant, reason: PublishReason) {
        let view = &self.views[slot(variant)];
        let Some(snapshot) = view.current.clone() else {
            return;
        };
        self.outbox.push(Publication {
            variant,
            reason,
            snapshot,
            dropped_edges: view.dropped_edges.clone(),
            fallback_used: view.fallback_used,
        });
    }
}

fn slot(variant: DiagramVariant) -> usize {
    match variant {
        DiagramVariant::Flow => 0,
        DiagramVariant::Schema => 1,
    }
}

fn ready_graph(view: &mut DiagramView) -> Option<&mut Graph> {
    if view.state == ViewState::Ready {
        view.current.as_mut()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use draftboard_core::payload::{RawEdge, RawNode};

    fn raw(ids: &[&str], edges: &[(&str, &str)]) -> RawGraph {
        RawGraph {
            nodes: ids
                .iter()
                .map(|id| RawNode {
                    id: id.to_string(),
                    kind: Some("backend".to_string()),
                    ..RawNode::default()
                })
                .collect(),
            edges: edges
                .iter()
                .map(|(source, target)| RawEdge {
                    id: format!("{source}-{target}"),
                    source: source.to_string(),
                    target: target.to_string(),
                    label: None,
                })
                .collect(),
        }
    }

    fn start(controller: &mut DiagramController, variant: DiagramVariant, raw: RawGraph) -> LayoutJob {
        match controller.handle(Event::VariantActivated { variant, raw }) {
            Response::StartLayout(job) => job,
            other => panic!("expected a layout job, got {other:?}"),
        }
    }

    #[test]
    fn test_activation_starts_layout() {
        let mut controller = DiagramController::default();
        let job = start(&mut controller, DiagramVariant::Flow, raw(&["a", "b"], &[("a", "b")]));

        assert!(controller.is_busy(DiagramVariant::Flow));
        assert!(!controller.is_busy(DiagramVariant::Schema));
        assert_eq!(controller.active_variant(), Some(DiagramVariant::Flow));
        assert!(job.graph.nodes().all(|node| node.style().is_some()));
        assert!(job.graph.nodes().all(|node| node.position().is_none()));
    }

    #[test]
    fn test_empty_graph_goes_idle() {
        let mut controller = DiagramController::default();
        let response = controller.handle(Event::VariantActivated {
            variant: DiagramVariant::Schema,
            raw: RawGraph::default(),
        });
        assert!(matches!(response, Response::Idle));
        assert_eq!(controller.view(DiagramVariant::Schema).state(), ViewState::Idle);
    }

    #[test]
    fn test_publish_is_deferred_to_tick() {
        let mut controller = DiagramController::default();
        let job = start(&mut controller, DiagramVariant::Flow, raw(&["a", "b"], &[("a", "b")]));
        assert!(controller.tick().is_empty());

        assert!(matches!(controller.complete(job), Response::Applied));
        assert_eq!(controller.view(DiagramVariant::Flow).state(), ViewState::Ready);

        let publications = controller.tick();
        assert_eq!(publications.len(), 1);
        assert_eq!(publications[0].reason, PublishReason::LayoutCompleted);
        assert!(!publications[0].fallback_used);
        assert!(controller.tick().is_empty());
    }

    #[test]
    fn test_stale_run_is_ignored() {
        let mut controller = DiagramController::default();
        let first = start(&mut controller, DiagramVariant::Flow, raw(&["a"], &[]));
        let second = start(&mut controller, DiagramVariant::Flow, raw(&["a", "b"], &[]));
        assert!(second.run_id > first.run_id);

        let stale_run = first.run_id;
        let response = controller.complete(first);
        assert!(matches!(
            response,
            Response::Ignored(IgnoreReason::StaleRun { got, .. }) if got == stale_run
        ));
        assert!(controller.is_busy(DiagramVariant::Flow));

        controller.complete(second);
        let current = controller.view(DiagramVariant::Flow).current().unwrap();
        assert_eq!(current.len(), 2);
    }

    #[test]
    fn test_drag_requires_ready_view() {
        let mut controller = DiagramController::default();
        let response = controller.handle(Event::NodeDragged {
            variant: DiagramVariant::Flow,
            node: "a".to_string(),
            position: Point::new(1.0, 1.0),
        });
        assert_eq!(
            match response {
                Response::Ignored(reason) => Some(reason),
                _ => None,
            },
            Some(IgnoreReason::NotReady)
        );
    }

    #[test]
    fn test_drag_publishes_only_on_release() {
        let mut controller = DiagramController::default();
        let job = start(&mut controller, DiagramVariant::Flow, raw(&["a", "b"], &[("a", "b")]));
        controller.complete(job);
        controller.tick();

        for step in 0..3 {
            controller.handle(Event::NodeDragged {
                variant: DiagramVariant::Flow,
                node: "a".to_string(),
                position: Point::new(step as f32 * 10.0, 0.0),
            });
            assert!(controller.tick().is_empty());
        }
        controller.handle(Event::NodeDragEnded {
            variant: DiagramVariant::Flow,
        });

        let publications = controller.tick();
        assert_eq!(publications.len(), 1);
        assert_eq!(publications[0].reason, PublishReason::DragEnded);
        let saved = controller.view(DiagramVariant::Flow).saved().unwrap();
        assert_eq!(saved.node("a").unwrap().position(), Some(Point::new(20.0, 0.0)));
    }

    #[test]
    fn test_selection_and_new_blueprint() {
        let mut controller = DiagramController::default();
        let job = start(&mut controller, DiagramVariant::Flow, raw(&["a"], &[]));
        controller.complete(job);

        let unknown = controller.handle(Event::NodeSelected {
            variant: DiagramVariant::Flow,
            node: Some("ghost".to_string()),
        });
        assert!(matches!(unknown, Response::Ignored(IgnoreReason::UnknownNode(_))));

        controller.handle(Event::NodeSelected {
            variant: DiagramVariant::Flow,
            node: Some("a".to_string()),
        });
        controller.handle(Event::NodeDragEnded {
            variant: DiagramVariant::Flow,
        });
        assert_eq!(controller.view(DiagramVariant::Flow).selection(), Some("a"));
        assert!(controller.view(DiagramVariant::Flow).saved().is_some());

        controller.handle(Event::NewBlueprintRequested);
        assert_eq!(controller.view(DiagramVariant::Flow).selection(), None);
        assert!(controller.view(DiagramVariant::Flow).saved().is_none());
    }

    #[test]
    fn test_dangling_edges_are_reported() {
        let mut controller = DiagramController::default();
        let job = start(&mut controller, DiagramVariant::Flow, raw(&["a"], &[("a", "gone")]));
        controller.complete(job);

        let publications = controller.tick();
        assert_eq!(publications[0].dropped_edges.len(), 1);
        assert_eq!(publications[0].dropped_edges[0].missing, vec!["gone".to_string()]);
        assert!(publications[0].snapshot.edges().is_empty());
    }

    #[test]
    fn test_theme_change_keeps_positions() {
        let mut controller = DiagramController::default();
        let job = start(&mut controller, DiagramVariant::Flow, raw(&["a", "b"], &[("a", "b")]));
        controller.complete(job);
        controller.tick();
        let before = controller.view(DiagramVariant::Flow).current().unwrap().clone();

        controller.handle(Event::ThemeChanged { dark_mode: false });
        let publications = controller.tick();
        assert_eq!(publications.len(), 1);
        assert_eq!(publications[0].reason, PublishReason::ThemeChanged);

        let after = &publications[0].snapshot;
        for node in before.nodes() {
            let restyled = after.node(node.id()).unwrap();
            assert_eq!(restyled.position(), node.position());
            assert!(!restyled.style().unwrap().is_dark_mode());
        }
    }

    #[test]
    fn test_theme_change_during_layout_styles_result() {
        let mut controller = DiagramController::default();
        let job = start(&mut controller, DiagramVariant::Flow, raw(&["a", "b"], &[("a", "b")]));
        assert!(job.graph.nodes().all(|node| node.style().unwrap().is_dark_mode()));

        controller.handle(Event::ThemeChanged { dark_mode: false });
        assert!(controller.tick().is_empty());
        controller.complete(job);

        let publications = controller.tick();
        assert_eq!(publications.len(), 1);
        let snapshot = &publications[0].snapshot;
        assert!(snapshot.nodes().all(|node| !node.style().unwrap().is_dark_mode()));
        assert!(snapshot.nodes().all(|node| node.position().is_some()));
        assert!(snapshot.edges().iter().all(|edge| edge.source_handle().is_some()));
    }

    struct Failing;

    impl LayeredLayout for Failing {
        fn layout(
            &self,
            _nodes: &[crate::layout::LayoutNode],
            _edges: &[crate::layout::LayoutEdge],
            _config: &crate::layout::LayeredConfig,
        ) -> Result<crate::layout::Positions, crate::layout::LayoutError> {
            Err(crate::layout::LayoutError::Computation("no solution".to_string()))
        }
    }

    #[test]
    fn test_fallback_flag_survives_drag_and_theme() {
        let engine = LayoutEngine::new(Failing, crate::config::LayoutConfig::default());
        let mut controller = DiagramController::new(engine, true);
        let job = match controller.handle(Event::VariantActivated {
            variant: DiagramVariant::Flow,
            raw: raw(&["a", "b"], &[("a", "b")]),
        }) {
            Response::StartLayout(job) => job,
            other => panic!("expected a layout job, got {other:?}"),
        };
        controller.complete(job);
        assert!(controller.view(DiagramVariant::Flow).fallback_used());
        assert!(controller.tick()[0].fallback_used);

        controller.handle(Event::NodeDragged {
            variant: DiagramVariant::Flow,
            node: "a".to_string(),
            position: Point::new(5.0, 5.0),
        });
        controller.handle(Event::NodeDragEnded {
            variant: DiagramVariant::Flow,
        });
        controller.handle(Event::ThemeChanged { dark_mode: false });

        let publications = controller.tick();
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[0].reason, PublishReason::DragEnded);
        assert_eq!(publications[1].reason, PublishReason::ThemeChanged);
        assert!(publications.iter().all(|publication| publication.fallback_used));
    }
}
