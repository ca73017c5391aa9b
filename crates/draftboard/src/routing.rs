//! Post-layout edge routing.
//!
//! Once nodes have final coordinates, every edge gets a connection side on
//! each endpoint, picked from the relative position of the two node centers:
//!
//! | Dominant axis | Sign   | Source   | Target          |
//! |---------------|--------|----------|-----------------|
//! | horizontal    | Δx > 0 | `right`  | `left-target`   |
//! | horizontal    | Δx ≤ 0 | `left`   | `right-target`  |
//! | vertical      | Δy > 0 | `bottom` | `top-target`    |
//! | vertical      | Δy ≤ 0 | `top`    | `bottom-target` |
//!
//! The horizontal axis dominates only when `|Δx| > |Δy|`.
//!
//! Orthogonal polylines keep clear of every node the edge does not connect.
//! The plain elbow halfway along the dominant axis is tried first; when it
//! cuts through a box, the elbow moves into a free gap between nodes, and as
//! a last resort the edge detours around the blocking boxes along a lane
//! offset by the router's clearance.

use indexmap::IndexMap;
use log::{trace, warn};

use draftboard_core::{
    geometry::{Bounds, Point, Size},
    graph::{DanglingEdge, DiagramVariant, Edge, Graph, Node, NodeId},
    handle::{Side, SourceHandle, TargetHandle},
};

/// Picks the handle pair for an edge between two node centers.
///
/// # Examples
///
/// ```
/// # use draftboard::routing::handles_for;
/// # use draftboard_core::geometry::Point;
/// let (source, target) = handles_for(Point::new(0.0, 0.0), Point::new(200.0, 10.0));
/// assert_eq!((source.to_string().as_str(), target.to_string().as_str()), ("right", "left-target"));
/// ```
pub fn handles_for(source_center: Point, target_center: Point) -> (SourceHandle, TargetHandle) {
    let delta = target_center.sub_point(source_center);
    let (from, to) = if delta.x().abs() > delta.y().abs() {
        if delta.x() > 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if delta.y() > 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    };
    (SourceHandle(from), TargetHandle(to))
}

/// Edges with handles assigned, plus those that could not be routed.
#[derive(Debug, Clone, Default)]
pub struct RoutedEdges {
    pub edges: Vec<Edge>,
    /// Edges whose endpoints are missing or not yet positioned. `missing`
    /// lists the offending endpoint ids.
    pub dropped: Vec<DanglingEdge>,
}

/// Margin around node boxes that routed segments must stay out of.
const OBSTACLE_PAD: f32 = 6.0;

/// Lane offset used when no spacing configuration is supplied.
const DEFAULT_CLEARANCE: f32 = 40.0;

/// Assigns connection handles and polylines to edges.
#[derive(Debug, Clone, Copy)]
pub struct EdgeRouter {
    variant: DiagramVariant,
    orthogonal: bool,
    /// Distance a detour lane keeps from the boxes it passes.
    clearance: f32,
}

impl EdgeRouter {
    /// Create a router for nodes sized as in `variant`, with orthogonal polylines.
    pub fn new(variant: DiagramVariant) -> Self {
        Self {
            variant,
            orthogonal: true,
            clearance: DEFAULT_CLEARANCE,
        }
    }

    /// Choose between right-angled polylines and straight segments.
    pub fn with_orthogonal(mut self, orthogonal: bool) -> Self {
        self.orthogonal = orthogonal;
        self
    }

    /// Sets how far detour lanes stay from the boxes they pass.
    pub fn with_clearance(mut self, clearance: f32) -> Self {
        self.clearance = clearance.max(0.0);
        self
    }

    /// Routes `edges` against the positioned `nodes`.
    ///
    /// Straight routing runs in O(E); orthogonal routing checks every
    /// segment against every positioned node, O(E·V).
    pub fn route_edges(&self, nodes: &IndexMap<NodeId, Node>, edges: Vec<Edge>) -> RoutedEdges {
        let mut routed = RoutedEdges {
            edges: Vec::with_capacity(edges.len()),
            dropped: Vec::new(),
        };

        let boxes: Vec<(&str, Bounds)> = nodes
            .keys()
            .filter_map(|id| {
                let (position, size) = self.placed(nodes, id)?;
                Some((id.as_str(), Bounds::new_from_top_left(position, size)))
            })
            .collect();

        for mut edge in edges {
            let source = self.placed(nodes, edge.source());
            let target = self.placed(nodes, edge.target());
            let (source, target) = match (source, target) {
                (Some(source), Some(target)) => (source, target),
                (source, target) => {
                    let mut missing = Vec::new();
                    if source.is_none() {
                        missing.push(edge.source().to_string());
                    }
                    if target.is_none() {
                        missing.push(edge.target().to_string());
                    }
                    warn!(edge_id = edge.id(), missing:? = missing; "Dropping unroutable edge");
                    routed.dropped.push(DanglingEdge {
                        edge_id: edge.id().to_string(),
                        missing,
                    });
                    continue;
                }
            };

            let (source_handle, target_handle) =
                handles_for(source.0.center_of(source.1), target.0.center_of(target.1));
            let start = source_handle.side().anchor(source.0, source.1);
            let end = target_handle.side().anchor(target.0, target.1);
            let waypoints = if self.orthogonal {
                let obstacles: Vec<Bounds> = boxes
                    .iter()
                    .filter(|(id, _)| *id != edge.source() && *id != edge.target())
                    .map(|(_, bounds)| bounds.inflate(OBSTACLE_PAD))
                    .collect();
                self.orthogonal_polyline(
                    start,
                    end,
                    Frame::new(source_handle.side().is_horizontal()),
                    &obstacles,
                )
            } else {
                vec![start, end]
            };

            trace!(
                edge_id = edge.id(),
                source_handle:% = source_handle,
                target_handle:% = target_handle;
                "Routed edge"
            );
            edge.set_route(source_handle, target_handle, waypoints);
            routed.edges.push(edge);
        }

        routed
    }

    /// Routes every edge of `graph`, returning the routed graph and the
    /// edges that had to be dropped.
    pub fn route_graph(&self, graph: Graph) -> (Graph, Vec<DanglingEdge>) {
        let (nodes, edges) = graph.into_parts();
        let routed = self.route_edges(&nodes, edges);
        let build = Graph::new(nodes.into_values(), routed.edges);
        (build.graph, routed.dropped)
    }

    /// Position and box of a positioned node.
    fn placed(&self, nodes: &IndexMap<NodeId, Node>, id: &str) -> Option<(Point, Size)> {
        let node = nodes.get(id)?;
        let size = node
            .style()
            .map_or_else(|| node.size(self.variant), |style| style.size());
        Some((node.position()?, size))
    }

    /// Right-angled path from `start` to `end` that crosses as few
    /// `obstacles` as possible; earlier candidates win ties.
    fn orthogonal_polyline(
        &self,
        start: Point,
        end: Point,
        frame: Frame,
        obstacles: &[Bounds],
    ) -> Vec<Point> {
        let (from, to) = (frame.along(start), frame.along(end));
        let elbow = |at: f32| {
            vec![
                start,
                frame.point(at, frame.across(start)),
                frame.point(at, frame.across(end)),
                end,
            ]
        };

        let middle = (from + to) / 2.0;
        let mut best = elbow(middle);
        let mut best_hits = crossings(&best, obstacles);
        if best_hits == 0 {
            return best;
        }

        let gaps = free_gaps(from, to, obstacles.iter().map(|b| frame.along_range(b)));
        let mut by_distance = gaps.clone();
        by_distance.sort_by(|a, b| (a - middle).abs().total_cmp(&(b - middle).abs()));
        let mut candidates: Vec<Vec<Point>> = by_distance.into_iter().map(elbow).collect();

        if let (Some(&first), Some(&last)) = (gaps.first(), gaps.last()) {
            if gaps.len() > 1 {
                let lane = free_lane(
                    (frame.across(start) + frame.across(end)) / 2.0,
                    obstacles
                        .iter()
                        .filter(|b| {
                            let (lo, hi) = frame.along_range(b);
                            lo < first.max(last) && hi > first.min(last)
                        })
                        .map(|b| {
                            let (lo, hi) = frame.across_range(b);
                            (lo - self.clearance, hi + self.clearance)
                        }),
                );
                candidates.push(vec![
                    start,
                    frame.point(first, frame.across(start)),
                    frame.point(first, lane),
                    frame.point(last, lane),
                    frame.point(last, frame.across(end)),
                    end,
                ]);
            }
        }

        for candidate in candidates {
            let hits = crossings(&candidate, obstacles);
            if hits < best_hits {
                best = candidate;
                best_hits = hits;
                if hits == 0 {
                    break;
                }
            }
        }
        if best_hits > 0 {
            trace!(hits = best_hits; "No clear orthogonal route");
        }
        best
    }
}

/// Coordinates split into the edge's dominant axis (`along`) and the other
/// one (`across`).
#[derive(Debug, Clone, Copy)]
struct Frame {
    horizontal: bool,
}

impl Frame {
    fn new(horizontal: bool) -> Self {
        Self { horizontal }
    }

    fn along(self, point: Point) -> f32 {
        if self.horizontal { point.x() } else { point.y() }
    }

    fn across(self, point: Point) -> f32 {
        if self.horizontal { point.y() } else { point.x() }
    }

    fn point(self, along: f32, across: f32) -> Point {
        if self.horizontal {
            Point::new(along, across)
        } else {
            Point::new(across, along)
        }
    }

    fn along_range(self, bounds: &Bounds) -> (f32, f32) {
        if self.horizontal {
            (bounds.min_x(), bounds.max_x())
        } else {
            (bounds.min_y(), bounds.max_y())
        }
    }

    fn across_range(self, bounds: &Bounds) -> (f32, f32) {
        if self.horizontal {
            (bounds.min_y(), bounds.max_y())
        } else {
            (bounds.min_x(), bounds.max_x())
        }
    }
}

/// Number of (segment, obstacle) pairs whose interiors meet.
fn crossings(points: &[Point], obstacles: &[Bounds]) -> usize {
    points
        .windows(2)
        .map(|pair| {
            let segment = Bounds::from_points(pair[0], pair[1]);
            obstacles.iter().filter(|b| segment.intersects(b)).count()
        })
        .sum()
}

/// Sorts and joins overlapping intervals.
fn merge(intervals: impl Iterator<Item = (f32, f32)>) -> Vec<(f32, f32)> {
    let mut sorted: Vec<(f32, f32)> = intervals.collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut merged: Vec<(f32, f32)> = Vec::with_capacity(sorted.len());
    for (lo, hi) in sorted {
        match merged.last_mut() {
            Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    merged
}

/// Midpoints of the stretches between `from` and `to` that no obstacle
/// covers, ordered from `from` towards `to`.
fn free_gaps(from: f32, to: f32, blocked: impl Iterator<Item = (f32, f32)>) -> Vec<f32> {
    let (lo, hi) = (from.min(to), from.max(to));
    let mut gaps = Vec::new();
    let mut cursor = lo;
    for (start, stop) in merge(blocked.filter(|&(start, stop)| stop > lo && start < hi)) {
        if start > cursor {
            gaps.push((cursor + start) / 2.0);
        }
        cursor = cursor.max(stop);
    }
    if hi > cursor {
        gaps.push((cursor + hi) / 2.0);
    }
    if from > to {
        gaps.reverse();
    }
    gaps
}

/// The free coordinate closest to `target` outside every blocked interval.
fn free_lane(target: f32, blocked: impl Iterator<Item = (f32, f32)>) -> f32 {
    merge(blocked)
        .into_iter()
        .find(|&(lo, hi)| lo < target && target < hi)
        .map_or(target, |(lo, hi)| {
            if target - lo < hi - target { lo } else { hi }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use draftboard_core::graph::NodeBox;
    use proptest::prelude::*;

    fn ids(edge: &Edge) -> (String, String) {
        (
            edge.source_handle().unwrap().to_string(),
            edge.target_handle().unwrap().to_string(),
        )
    }

    fn positioned(id: &str, x: f32, y: f32) -> Node {
        Node::new(id, id).with_position(Point::new(x, y))
    }

    #[test]
    fn test_handle_table() {
        let origin = Point::new(0.0, 0.0);
        let cases = [
            (Point::new(200.0, 10.0), ("right", "left-target")),
            (Point::new(-200.0, 10.0), ("left", "right-target")),
            (Point::new(0.0, 200.0), ("bottom", "top-target")),
            (Point::new(10.0, -200.0), ("top", "bottom-target")),
        ];
        for (target, (source_id, target_id)) in cases {
            let (source, target) = handles_for(origin, target);
            assert_eq!(source.to_string(), source_id);
            assert_eq!(target.to_string(), target_id);
        }
    }

    #[test]
    fn test_diagonal_tie_is_vertical() {
        let (source, target) = handles_for(Point::new(0.0, 0.0), Point::new(100.0, 100.0));
        assert_eq!(source, SourceHandle(Side::Bottom));
        assert_eq!(target, TargetHandle(Side::Top));

        let (source, _) = handles_for(Point::new(0.0, 0.0), Point::new(0.0, 0.0));
        assert_eq!(source, SourceHandle(Side::Top));
    }

    #[test]
    fn test_route_uses_node_centers() {
        // Hub boxes are wider, so centers differ from top-left corners.
        let graph = Graph::new(
            [
                positioned("api_gateway", 0.0, 0.0),
                positioned("worker", 35.0, 400.0),
            ],
            [Edge::new("e", "api_gateway", "worker")],
        )
        .graph;
        let (routed, dropped) = EdgeRouter::new(DiagramVariant::Flow).route_graph(graph);

        assert!(dropped.is_empty());
        let edge = &routed.edges()[0];
        assert_eq!(ids(edge), ("bottom".to_string(), "top-target".to_string()));
        assert_eq!(
            edge.waypoints(),
            [
                Point::new(125.0, 70.0),
                Point::new(125.0, 235.0),
                Point::new(125.0, 235.0),
                Point::new(125.0, 400.0),
            ]
        );
    }

    #[test]
    fn test_straight_routing() {
        let graph = Graph::new(
            [positioned("a", 0.0, 0.0), positioned("b", 400.0, 0.0)],
            [Edge::new("e", "a", "b")],
        )
        .graph;
        let (routed, _) = EdgeRouter::new(DiagramVariant::Flow)
            .with_orthogonal(false)
            .route_graph(graph);
        assert_eq!(
            routed.edges()[0].waypoints(),
            [Point::new(180.0, 25.0), Point::new(400.0, 25.0)]
        );
    }

    #[test]
    fn test_unpositioned_endpoint_is_dropped() {
        let graph = Graph::new(
            [positioned("a", 0.0, 0.0), Node::new("b", "B")],
            [Edge::new("e", "a", "b")],
        )
        .graph;
        let (routed, dropped) = EdgeRouter::new(DiagramVariant::Flow).route_graph(graph);
        assert!(routed.edges().is_empty());
        assert_eq!(dropped[0].missing, vec!["b".to_string()]);
    }

    #[test]
    fn test_missing_endpoint_is_dropped() {
        let (nodes, _) = Graph::new([positioned("a", 0.0, 0.0)], []).graph.into_parts();
        let routed = EdgeRouter::new(DiagramVariant::Flow)
            .route_edges(&nodes, vec![Edge::new("e", "ghost", "a")]);
        assert!(routed.edges.is_empty());
        assert_eq!(routed.dropped[0].edge_id, "e");
        assert_eq!(routed.dropped[0].missing, vec!["ghost".to_string()]);
    }

    fn is_axis_aligned(points: &[Point]) -> bool {
        points
            .windows(2)
            .all(|pair| pair[0].x() == pair[1].x() || pair[0].y() == pair[1].y())
    }

    #[test]
    fn test_route_detours_around_node_in_between() {
        let graph = Graph::new(
            [
                positioned("a", 0.0, 0.0),
                positioned("b", 0.0, 400.0),
                positioned("c", 0.0, 800.0),
            ],
            [Edge::new("e", "a", "c")],
        )
        .graph;
        let (routed, _) = EdgeRouter::new(DiagramVariant::Flow)
            .with_clearance(120.0)
            .route_graph(graph);

        let waypoints = routed.edges()[0].waypoints();
        assert_eq!(waypoints.len(), 6);
        assert_eq!(waypoints[0], Point::new(90.0, 50.0));
        assert_eq!(waypoints[5], Point::new(90.0, 800.0));
        assert!(is_axis_aligned(waypoints));

        let middle = Bounds::new_from_top_left(Point::new(0.0, 400.0), NodeBox::FLOW);
        assert!(
            waypoints
                .windows(2)
                .all(|pair| !Bounds::from_points(pair[0], pair[1]).intersects(&middle))
        );
        // The lane keeps the requested clearance from the box it passes.
        let lane = waypoints[2].x();
        assert_eq!(lane, waypoints[3].x());
        assert!(lane >= 180.0 + 120.0 || lane <= -120.0);
    }

    #[test]
    fn test_elbow_moves_out_of_blocked_middle() {
        // The plain elbow at y = 400 would run through `wide`.
        let graph = Graph::new(
            [
                positioned("a", 0.0, 0.0),
                positioned("wide", 150.0, 380.0),
                positioned("b", 300.0, 750.0),
            ],
            [Edge::new("e", "a", "b")],
        )
        .graph;
        let (routed, _) = EdgeRouter::new(DiagramVariant::Flow).route_graph(graph);

        let waypoints = routed.edges()[0].waypoints();
        assert_eq!(waypoints.len(), 4);
        assert!(is_axis_aligned(waypoints));
        let elbow = waypoints[1].y();
        assert!(!(374.0..=436.0).contains(&elbow));
    }

    #[test]
    fn test_free_gaps_run_from_source_to_target() {
        let blocked = [(100.0, 200.0), (150.0, 300.0), (500.0, 600.0)];
        assert_eq!(free_gaps(0.0, 800.0, blocked.into_iter()), [50.0, 400.0, 700.0]);
        assert_eq!(free_gaps(800.0, 0.0, blocked.into_iter()), [700.0, 400.0, 50.0]);
        assert_eq!(free_lane(120.0, blocked.into_iter()), 100.0);
        assert_eq!(free_lane(280.0, blocked.into_iter()), 300.0);
        assert_eq!(free_lane(400.0, blocked.into_iter()), 400.0);
    }

    proptest! {
        #[test]
        fn prop_reversed_edge_mirrors_handles(
            dx in -1000.0f32..1000.0,
            dy in -1000.0f32..1000.0,
        ) {
            prop_assume!(dx.abs() != dy.abs() && dx != 0.0 && dy != 0.0);
            let a = Point::new(0.0, 0.0);
            let b = Point::new(dx, dy);
            let (forward_source, forward_target) = handles_for(a, b);
            let (backward_source, backward_target) = handles_for(b, a);
            prop_assert_eq!(forward_source.side(), backward_target.side());
            prop_assert_eq!(forward_target.side(), backward_source.side());
        }
    }
}
