//! Deterministic grid placement used when a layout backend fails.

use draftboard_core::geometry::{Point, Size};

use super::{LayeredConfig, LayoutNode, Positions};

/// Places nodes on a staggered grid by input index.
///
/// The grid has `ceil(sqrt(n))` columns. Cells are sized to the largest box
/// plus the node gap, and every odd column is shifted down by half a cell so
/// edges between neighbours are not hidden behind each other. The result only
/// depends on node order and sizes.
///
/// # Examples
///
/// ```
/// # use draftboard::config::SpacingConfig;
/// # use draftboard::layout::{staggered_grid, LayeredConfig, LayoutNode};
/// # use draftboard_core::graph::{DiagramVariant, NodeBox};
/// let nodes: Vec<LayoutNode> = ["a", "b", "c", "d"]
///     .iter()
///     .map(|id| LayoutNode { id: id.to_string(), size: NodeBox::FLOW })
///     .collect();
/// let config = LayeredConfig::for_variant(&SpacingConfig::FLOW, DiagramVariant::Flow);
///
/// let positions = staggered_grid(&nodes, &config);
/// assert_eq!(positions.len(), 4);
/// assert!(positions["b"].y() > positions["a"].y());
/// ```
pub fn staggered_grid(nodes: &[LayoutNode], config: &LayeredConfig) -> Positions {
    if nodes.is_empty() {
        return Positions::new();
    }

    let columns = (nodes.len() as f64).sqrt().ceil() as usize;
    let largest = nodes
        .iter()
        .fold(Size::default(), |acc, node| acc.max(node.size));
    let gap = config.spacing.node_node;
    let cell_width = largest.width() + gap;
    let cell_height = largest.height() + gap;
    let padding = config.spacing.padding;

    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let column = index % columns;
            let row = index / columns;
            let stagger = if column % 2 == 1 { cell_height / 2.0 } else { 0.0 };
            let position = Point::new(
                padding + column as f32 * cell_width,
                padding + row as f32 * cell_height + stagger,
            );
            (node.id.clone(), position)
        })
        .collect()
}
