//! Layout backends.
//!
//! A backend only computes coordinates. Validation, fallback and edge routing
//! are the [`LayoutEngine`](super::LayoutEngine)'s job, so backends can be
//! swapped or mocked without touching either.

mod sugiyama;

pub use sugiyama::SugiyamaLayout;

use super::{LayeredConfig, LayoutEdge, LayoutError, LayoutNode, Positions};

/// Trait defining the interface for layered layout backends.
pub trait LayeredLayout {
    /// Calculate top-left positions for `nodes`.
    ///
    /// - `nodes`: Nodes to place, in input order, with their bounding boxes
    /// - `edges`: Directed edges, by index into `nodes`
    /// - `config`: Direction and spacing minimums
    ///
    /// # Errors
    ///
    /// Returns a [`LayoutError`] if the positions cannot be computed. A result
    /// that omits nodes is also treated as a failure by the caller.
    fn layout(
        &self,
        nodes: &[LayoutNode],
        edges: &[LayoutEdge],
        config: &LayeredConfig,
    ) -> Result<Positions, LayoutError>;
}

impl<T: LayeredLayout + ?Sized> LayeredLayout for &T {
    fn layout(
        &self,
        nodes: &[LayoutNode],
        edges: &[LayoutEdge],
        config: &LayeredConfig,
    ) -> Result<Positions, LayoutError> {
        (**self).layout(nodes, edges, config)
    }
}

impl<T: LayeredLayout + ?Sized> LayeredLayout for Box<T> {
    fn layout(
        &self,
        nodes: &[LayoutNode],
        edges: &[LayoutEdge],
        config: &LayeredConfig,
    ) -> Result<Positions, LayoutError> {
        (**self).layout(nodes, edges, config)
    }
}
