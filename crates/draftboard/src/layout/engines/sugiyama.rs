//! Sugiyama layered layout backend.
//!
//! `rust-sugiyama` assigns ranks and crossing-minimising orders; this module
//! maps those onto pixel coordinates using the real node boxes, so no two
//! boxes overlap and the configured gaps hold regardless of what abstract
//! coordinates the algorithm picked.
//!
//! An edge spanning several ranks reserves an empty slot in every rank it
//! passes, so the nodes of those ranks move aside and leave the router a
//! corridor. Slots are spaced by `edge_node` from nodes and by `edge_edge`
//! from each other.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};
use rust_sugiyama::configure::Config;

use draftboard_core::{geometry::Point, graph::Direction};

use crate::layout::{LayeredConfig, LayeredLayout, LayoutEdge, LayoutError, LayoutNode, Positions};

/// Distance under which two algorithm y coordinates count as the same rank.
const RANK_EPSILON: f64 = 1e-6;

/// The Sugiyama layout backend.
///
/// Based on the Sugiyama algorithm for layered drawing of directed graphs,
/// via the rust-sugiyama implementation. Each connected component is laid
/// out separately; components and isolated nodes are placed side by side in
/// input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct SugiyamaLayout;

impl SugiyamaLayout {
    pub fn new() -> Self {
        Self
    }

    /// Run rust-sugiyama and convert its output into ranked components.
    fn ranked_components(
        &self,
        nodes: &[LayoutNode],
        pairs: &[(u32, u32)],
    ) -> Result<Vec<Component>, LayoutError> {
        let avg_node_size = nodes
            .iter()
            .map(|node| (node.size.width() + node.size.height()) / 2.0)
            .sum::<f32>()
            / nodes.len() as f32;
        let vertex_spacing = (avg_node_size / 50.0).clamp(2.0, 5.0) as f64;

        debug!(
            nodes = nodes.len(),
            edges = pairs.len();
            "Applying Sugiyama algorithm"
        );

        let input = pairs.to_vec();
        // Try the rust_sugiyama crate, catching any panics
        let layouts = std::panic::catch_unwind(move || {
            let config = Config {
                minimum_length: 1,
                vertex_spacing,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&input, &config)
        })
        .map_err(|err| {
            let message = if let Some(msg) = err.downcast_ref::<String>() {
                msg.clone()
            } else if let Some(msg) = err.downcast_ref::<&str>() {
                (*msg).to_string()
            } else {
                "unknown panic".to_string()
            };
            LayoutError::Panicked(message)
        })?;

        if layouts.is_empty() {
            return Err(LayoutError::Computation(
                "rust-sugiyama returned empty layout results".to_string(),
            ));
        }

        let mut components = Vec::with_capacity(layouts.len());
        for (coords, _, _) in &layouts {
            let mut raw = Vec::with_capacity(coords.len());
            for &(id, (x, y)) in coords {
                if id >= nodes.len() {
                    debug!(id = id; "Node id from rust-sugiyama result is out of range");
                    continue;
                }
                raw.push((id, x, y));
            }
            if !raw.is_empty() {
                components.push(Component::from_coordinates(raw, pairs));
            }
        }
        Ok(components)
    }
}

impl LayeredLayout for SugiyamaLayout {
    fn layout(
        &self,
        nodes: &[LayoutNode],
        edges: &[LayoutEdge],
        config: &LayeredConfig,
    ) -> Result<Positions, LayoutError> {
        // Self-loops do not affect ranking and duplicates add nothing.
        let mut seen = BTreeSet::new();
        let mut pairs = Vec::new();
        for edge in edges {
            if edge.source >= nodes.len() || edge.target >= nodes.len() {
                return Err(LayoutError::Computation(format!(
                    "edge {} -> {} references a node outside the input",
                    edge.source, edge.target
                )));
            }
            if edge.source == edge.target {
                continue;
            }
            let pair = (vertex_id(edge.source)?, vertex_id(edge.target)?);
            if seen.insert(pair) {
                pairs.push(pair);
            }
        }

        let mut components = if pairs.is_empty() {
            Vec::new()
        } else {
            self.ranked_components(nodes, &pairs)?
        };

        let mut placed = vec![false; nodes.len()];
        for component in &components {
            for member in &component.members {
                placed[member.index] = true;
            }
        }
        components.extend(
            placed
                .iter()
                .enumerate()
                .filter(|(_, placed)| !**placed)
                .map(|(index, _)| Component::single(index)),
        );
        components.sort_by_key(Component::first_index);

        let positions = arrange(nodes, &components, &pairs, config);
        trace!(components = components.len(); "Sugiyama components arranged");
        Ok(positions)
    }
}

fn vertex_id(index: usize) -> Result<u32, LayoutError> {
    u32::try_from(index)
        .map_err(|_| LayoutError::Computation(format!("node index {index} exceeds u32")))
}

#[derive(Debug, Clone, Copy)]
struct Member {
    index: usize,
    rank: usize,
    /// Position within the rank as chosen by the algorithm.
    order: f64,
}

/// One connected component with discrete ranks.
#[derive(Debug, Clone)]
struct Component {
    members: Vec<Member>,
}

impl Component {
    fn single(index: usize) -> Self {
        Self {
            members: vec![Member {
                index,
                rank: 0,
                order: 0.0,
            }],
        }
    }

    /// Builds a component from `(index, x, y)` triples.
    ///
    /// Distinct y values become consecutive ranks. Ranks are flipped when most
    /// edges would otherwise point against the rank direction.
    fn from_coordinates(coords: Vec<(usize, f64, f64)>, pairs: &[(u32, u32)]) -> Self {
        let mut levels: Vec<f64> = coords.iter().map(|&(_, _, y)| y).collect();
        levels.sort_by(f64::total_cmp);
        levels.dedup_by(|a, b| (*a - *b).abs() < RANK_EPSILON);

        let mut members: Vec<Member> = coords
            .into_iter()
            .map(|(index, x, y)| Member {
                index,
                rank: levels.partition_point(|level| *level < y - RANK_EPSILON),
                order: x,
            })
            .collect();

        let ranks: BTreeMap<usize, usize> = members.iter().map(|m| (m.index, m.rank)).collect();
        let (mut forward, mut backward) = (0usize, 0usize);
        for &(source, target) in pairs {
            if let (Some(s), Some(t)) = (ranks.get(&(source as usize)), ranks.get(&(target as usize)))
            {
                if s < t {
                    forward += 1;
                } else if s > t {
                    backward += 1;
                }
            }
        }
        if backward > forward {
            let last = levels.len().saturating_sub(1);
            for member in &mut members {
                member.rank = last - member.rank;
            }
        }

        Self { members }
    }

    fn first_index(&self) -> usize {
        self.members.iter().map(|m| m.index).min().unwrap_or(usize::MAX)
    }
}

/// Extent of a box along the rank axis and across it.
fn extents(node: &LayoutNode, direction: Direction) -> (f32, f32) {
    match direction {
        Direction::TopToBottom => (node.size.height(), node.size.width()),
        Direction::LeftToRight => (node.size.width(), node.size.height()),
    }
}

/// An entry in a rank row: a node, or a slot held for an edge passing by.
#[derive(Debug, Clone, Copy)]
struct Slot {
    node: Option<usize>,
    order: f64,
    /// Secondary sort key; passing edges sort after nodes on equal orders.
    tie: usize,
}

/// Rows of one component keyed by rank, with slots for edges that skip ranks.
fn rows(
    nodes: &[LayoutNode],
    component: &Component,
    pairs: &[(u32, u32)],
    passing: &mut usize,
) -> BTreeMap<usize, Vec<Slot>> {
    let mut rows: BTreeMap<usize, Vec<Slot>> = BTreeMap::new();
    let mut placed: BTreeMap<usize, Member> = BTreeMap::new();
    for member in &component.members {
        placed.insert(member.index, *member);
        rows.entry(member.rank).or_default().push(Slot {
            node: Some(member.index),
            order: member.order,
            tie: member.index,
        });
    }

    for &(source, target) in pairs {
        let (Some(from), Some(to)) = (placed.get(&(source as usize)), placed.get(&(target as usize)))
        else {
            continue;
        };
        let (low, high) = (from.rank.min(to.rank), from.rank.max(to.rank));
        for rank in low + 1..high {
            let t = (rank as f64 - from.rank as f64) / (to.rank as f64 - from.rank as f64);
            rows.entry(rank).or_default().push(Slot {
                node: None,
                order: from.order + (to.order - from.order) * t,
                tie: nodes.len() + *passing,
            });
            *passing += 1;
        }
    }
    rows
}

/// Converts ranked components into top-left pixel positions.
fn arrange(
    nodes: &[LayoutNode],
    components: &[Component],
    pairs: &[(u32, u32)],
    config: &LayeredConfig,
) -> Positions {
    let spacing = config.spacing;
    let gap_within = spacing.node_node.max(spacing.edge_edge);
    let gap_ranks = spacing.between_layers.max(2.0 * spacing.edge_node);
    let gap = |left: &Slot, right: &Slot| match (left.node, right.node) {
        (Some(_), Some(_)) => gap_within,
        (None, None) => spacing.edge_edge,
        _ => spacing.edge_node,
    };
    let extent = |slot: &Slot| {
        slot.node
            .map_or((0.0, 0.0), |index| extents(&nodes[index], config.direction))
    };

    let mut passing = 0;
    let mut all_rows: Vec<BTreeMap<usize, Vec<Slot>>> = components
        .iter()
        .map(|component| rows(nodes, component, pairs, &mut passing))
        .collect();
    if passing > 0 {
        debug!(slots = passing; "Reserved slots for rank-spanning edges");
    }

    // Ranks share one band across components so inter-rank gaps stay clear.
    let mut bands: BTreeMap<usize, f32> = BTreeMap::new();
    for rows in &all_rows {
        for (rank, slots) in rows {
            let widest = slots.iter().map(|slot| extent(slot).0).fold(0.0_f32, f32::max);
            let band = bands.entry(*rank).or_insert(0.0);
            *band = band.max(widest);
        }
    }
    let mut band_centers: BTreeMap<usize, f32> = BTreeMap::new();
    let mut rank_start = 0.0_f32;
    for (rank, band) in &bands {
        band_centers.insert(*rank, rank_start + band / 2.0);
        rank_start += band + gap_ranks;
    }

    // (primary, secondary) center of every placed node
    let mut centers: Vec<Option<(f32, f32)>> = vec![None; nodes.len()];
    let mut cursor = 0.0_f32;

    for rows in &mut all_rows {
        let mut local = Vec::new();
        let (mut min_s, mut max_s) = (f32::MAX, f32::MIN);

        for (rank, slots) in rows.iter_mut() {
            if config.model_order_tie_break {
                slots.sort_by(|a, b| a.order.total_cmp(&b.order).then(a.tie.cmp(&b.tie)));
            } else {
                slots.sort_by(|a, b| a.order.total_cmp(&b.order));
            }

            let row_width = slots.iter().map(|slot| extent(slot).1).sum::<f32>()
                + slots.windows(2).map(|pair| gap(&pair[0], &pair[1])).sum::<f32>();

            let primary = band_centers.get(rank).copied().unwrap_or_default();
            let mut start = -row_width / 2.0;
            for (i, slot) in slots.iter().enumerate() {
                let secondary_extent = extent(slot).1;
                min_s = min_s.min(start);
                max_s = max_s.max(start + secondary_extent);
                if let Some(index) = slot.node {
                    local.push((index, primary, start + secondary_extent / 2.0));
                }
                start += secondary_extent;
                if let Some(next) = slots.get(i + 1) {
                    start += gap(slot, next);
                }
            }
        }

        let shift = cursor - min_s;
        for (index, primary, secondary) in local {
            centers[index] = Some((primary, secondary + shift));
        }
        cursor += (max_s - min_s) + gap_within;
    }

    nodes
        .iter()
        .zip(centers)
        .filter_map(|(node, center)| {
            let (primary, secondary) = center?;
            let (primary_extent, secondary_extent) = extents(node, config.direction);
            let near = primary - primary_extent / 2.0 + spacing.padding;
            let side = secondary - secondary_extent / 2.0 + spacing.padding;
            let top_left = match config.direction {
                Direction::TopToBottom => Point::new(side, near),
                Direction::LeftToRight => Point::new(near, side),
            };
            Some((node.id.clone(), top_left))
        })
        .collect()
}
