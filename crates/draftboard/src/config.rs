//! Configuration types for Draftboard canvases.
//!
//! All types implement [`serde::Deserialize`] with every section optional, so
//! a partial configuration file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout, style and panel settings.
//! - [`LayoutConfig`] - Spacing for each diagram variant.
//! - [`StyleConfig`] - Theme selection.
//! - [`PanelConfig`] - Initial sizes and limits of the resizable panels around the canvas.
//!
//! # Example
//!
//! ```
//! # use draftboard::config::AppConfig;
//! # use draftboard_core::graph::DiagramVariant;
//! let config = AppConfig::default();
//! assert!(config.style().dark_mode());
//! assert_eq!(config.layout().spacing(DiagramVariant::Schema).between_layers, 1350.0);
//! ```

use serde::Deserialize;

use draftboard_core::graph::DiagramVariant;

use crate::resize::{HandleSide, PercentSpec, PixelSpec};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    style: StyleConfig,

    #[serde(default)]
    panels: PanelConfig,
}

impl AppConfig {
    pub fn new(layout: LayoutConfig, style: StyleConfig, panels: PanelConfig) -> Self {
        Self {
            layout,
            style,
            panels,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn panels(&self) -> &PanelConfig {
        &self.panels
    }
}

/// Minimum gaps used by the layered layout, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpacingConfig {
    /// Gap between neighbouring nodes within a rank.
    pub node_node: f32,
    /// Gap between consecutive ranks.
    pub between_layers: f32,
    /// Clearance between an edge and an unrelated node.
    pub edge_node: f32,
    /// Clearance between parallel edges.
    pub edge_edge: f32,
    /// Margin around the whole drawing.
    pub padding: f32,
}

impl SpacingConfig {
    /// Spacing for the flow (architecture) variant.
    pub const FLOW: SpacingConfig = SpacingConfig {
        node_node: 450.0,
        between_layers: 300.0,
        edge_node: 120.0,
        edge_edge: 75.0,
        padding: 180.0,
    };

    /// Spacing for the schema variant; wide tables need far more room.
    pub const SCHEMA: SpacingConfig = SpacingConfig {
        node_node: 600.0,
        between_layers: 1350.0,
        edge_node: 300.0,
        edge_edge: 240.0,
        padding: 180.0,
    };
}

impl Default for SpacingConfig {
    fn default() -> Self {
        Self::FLOW
    }
}

fn default_schema_spacing() -> SpacingConfig {
    SpacingConfig::SCHEMA
}

/// Layout spacing for each diagram variant.
#[derive(Debug, Clone, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    flow: SpacingConfig,

    #[serde(default = "default_schema_spacing")]
    schema: SpacingConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            flow: SpacingConfig::FLOW,
            schema: SpacingConfig::SCHEMA,
        }
    }
}

impl LayoutConfig {
    pub fn new(flow: SpacingConfig, schema: SpacingConfig) -> Self {
        Self { flow, schema }
    }

    /// Returns the spacing used for `variant`.
    pub fn spacing(&self, variant: DiagramVariant) -> SpacingConfig {
        match variant {
            DiagramVariant::Flow => self.flow,
            DiagramVariant::Schema => self.schema,
        }
    }
}

fn default_dark_mode() -> bool {
    true
}

/// Theme configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_dark_mode")]
    dark_mode: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self { dark_mode: true }
    }
}

impl StyleConfig {
    pub fn new(dark_mode: bool) -> Self {
        Self { dark_mode }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }
}

/// Sizes of the resizable panels hosting the canvas.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    /// Fixed-width sidebar, handle on its right edge.
    #[serde(default = "PanelConfig::default_sidebar")]
    pub sidebar: PixelSpec,

    /// Percentage split between canvas and detail pane, handle on the left.
    #[serde(default = "PanelConfig::default_split")]
    pub split: PercentSpec,
}

impl PanelConfig {
    fn default_sidebar() -> PixelSpec {
        PixelSpec {
            initial: 320.0,
            min: 200.0,
            max: 500.0,
            side: HandleSide::Right,
        }
    }

    fn default_split() -> PercentSpec {
        PercentSpec {
            initial: 35.0,
            min: 20.0,
            max: 50.0,
            side: HandleSide::Left,
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            sidebar: Self::default_sidebar(),
            split: Self::default_split(),
        }
    }
}
