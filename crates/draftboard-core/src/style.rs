//! Node and edge styling.
//!
//! [`StyleResolver`] maps a node's semantic type to a deterministic visual
//! class. It is a pure function of the node, the theme and the diagram
//! variant: resolving the same node twice yields the same style.
//!
//! # Semantic type precedence
//!
//! A node's semantic type is resolved from, in order:
//!
//! 1. the original type captured by the first resolution (never overwritten)
//! 2. the current type assigned by a previous resolution
//! 3. the raw incoming type tag
//! 4. [`SemanticType::Default`]
//!
//! Because the original type is consulted first, re-styling a node whose
//! current type was later coerced to a generic category still reports the
//! type it was first classified as.

use serde::Serialize;

use crate::{
    color::Color,
    geometry::Size,
    graph::{DiagramVariant, Graph, Node, SemanticType},
};

/// Icon drawn inside a node, named after the host's icon set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Icon {
    Monitor,
    Globe,
    Server,
    Layers,
    Database,
    Cloud,
    Cog,
    CircleCheck,
    CircleX,
    Table,
}

/// The visual class of a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeClass {
    /// Base fill color.
    pub fill: Color,
    /// Second gradient stop; equal to `fill` for solid nodes.
    pub fill_accent: Color,
    pub border: Color,
    pub text: Color,
    pub icon: Icon,
    pub corner_radius: f32,
    pub border_width: f32,
    /// Glow color with the glow intensity as its alpha.
    pub glow: Color,
    /// Short badge text, may be empty.
    pub tag: &'static str,
}

impl NodeClass {
    /// Returns the amplified variant used for hub nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use draftboard_core::{graph::SemanticType, style::NodeClass};
    /// let base = NodeClass::for_semantic(SemanticType::Backend, true);
    /// let hub = base.clone().amplified();
    /// assert!(hub.corner_radius > base.corner_radius);
    /// assert!(hub.border_width > base.border_width);
    /// assert!(hub.glow.alpha() > base.glow.alpha());
    /// ```
    pub fn amplified(mut self) -> Self {
        self.corner_radius += 4.0;
        self.border_width = 4.0;
        self.glow = self.glow.with_alpha(0.6);
        self
    }

    /// Returns the flow-variant class for a semantic type.
    pub fn for_semantic(semantic: SemanticType, dark_mode: bool) -> Self {
        let palette = Palette::for_semantic(semantic);
        let pick = |swatch: (&str, &str)| Color::literal(if dark_mode { swatch.0 } else { swatch.1 });
        let (fill_dark, fill_light) = palette.fill;
        let (fill, fill_accent) = if dark_mode { fill_dark } else { fill_light };
        let accent = Color::literal(palette.accent);

        Self {
            fill: Color::literal(fill),
            fill_accent: Color::literal(fill_accent),
            border: accent,
            text: pick(palette.text),
            icon: palette.icon,
            corner_radius: palette.corner_radius,
            border_width: 3.0,
            glow: accent.with_alpha(palette.glow),
            tag: palette.tag,
        }
    }

    /// Returns the table class used for every schema-variant node.
    pub fn table(dark_mode: bool) -> Self {
        let (fill, border, text) = if dark_mode {
            ("#0b1120", Color::literal("#f97316").with_alpha(0.7), "#e2e8f0")
        } else {
            ("#ffffff", Color::literal("#fb923c"), "#1e293b")
        };
        let fill = Color::literal(fill);
        Self {
            fill,
            fill_accent: fill,
            border,
            text: Color::literal(text),
            icon: Icon::Table,
            corner_radius: 8.0,
            border_width: 2.0,
            glow: Color::literal("#000000").with_alpha(0.0),
            tag: "",
        }
    }
}

struct Palette {
    /// (dark (from, to), light (from, to)) gradient stops.
    fill: ((&'static str, &'static str), (&'static str, &'static str)),
    accent: &'static str,
    /// (dark, light)
    text: (&'static str, &'static str),
    icon: Icon,
    corner_radius: f32,
    glow: f32,
    tag: &'static str,
}

impl Palette {
    fn for_semantic(semantic: SemanticType) -> Self {
        match semantic {
            SemanticType::Frontend => Palette {
                fill: (("#1e3a8a", "#2563eb"), ("#bfdbfe", "#93c5fd")),
                accent: "#3b82f6",
                text: ("#ffffff", "#1e3a8a"),
                icon: Icon::Monitor,
                corner_radius: 10.0,
                glow: 0.2,
                tag: "UI",
            },
            SemanticType::Backend => Palette {
                fill: (("#065f46", "#059669"), ("#a7f3d0", "#6ee7b7")),
                accent: "#10b981",
                text: ("#ffffff", "#065f46"),
                icon: Icon::Server,
                corner_radius: 10.0,
                glow: 0.2,
                tag: "API",
            },
            SemanticType::Database => Palette {
                fill: (("#92400e", "#d97706"), ("#fde68a", "#fbbf24")),
                accent: "#f59e0b",
                text: ("#ffffff", "#78350f"),
                icon: Icon::Database,
                corner_radius: 10.0,
                glow: 0.2,
                tag: "DB",
            },
            SemanticType::Service => Palette {
                fill: (("#5b21b6", "#7c3aed"), ("#ddd6fe", "#c4b5fd")),
                accent: "#8b5cf6",
                text: ("#ffffff", "#5b21b6"),
                icon: Icon::Cloud,
                corner_radius: 14.0,
                glow: 0.2,
                tag: "EXT",
            },
            SemanticType::Logic => Palette {
                fill: (("#334155", "#475569"), ("#e2e8f0", "#cbd5e1")),
                accent: "#64748b",
                text: ("#f1f5f9", "#334155"),
                icon: Icon::Cog,
                corner_radius: 10.0,
                glow: 0.2,
                tag: "\u{2699}",
            },
            SemanticType::Input => Palette {
                fill: (("#0d9488", "#14b8a6"), ("#99f6e4", "#5eead4")),
                accent: "#14b8a6",
                text: ("#ffffff", "#0f766e"),
                icon: Icon::CircleCheck,
                corner_radius: 10.0,
                glow: 0.3,
                tag: "IN",
            },
            SemanticType::Output => Palette {
                fill: (("#b91c1c", "#dc2626"), ("#fecaca", "#fca5a5")),
                accent: "#ef4444",
                text: ("#ffffff", "#991b1b"),
                icon: Icon::CircleX,
                corner_radius: 10.0,
                glow: 0.3,
                tag: "OUT",
            },
            SemanticType::Default => Palette {
                fill: (("#7c2d12", "#c2410c"), ("#fed7aa", "#fdba74")),
                accent: "#f97316",
                text: ("#ffffff", "#7c2d12"),
                icon: Icon::Layers,
                corner_radius: 10.0,
                glow: 0.2,
                tag: "",
            },
        }
    }
}

/// Resolved style attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(skip)]
    variant: DiagramVariant,
    #[serde(skip)]
    semantic: SemanticType,
    is_hub: bool,
    is_dark_mode: bool,
    #[serde(flatten)]
    size: Size,
    #[serde(skip)]
    z_index: i32,
    visual: NodeClass,
}

impl NodeStyle {
    /// Rendering priority of ordinary nodes.
    pub const BASE_Z_INDEX: i32 = 1001;

    pub fn variant(&self) -> DiagramVariant {
        self.variant
    }

    /// The semantic type this style was resolved from.
    pub fn semantic(&self) -> SemanticType {
        self.semantic
    }

    pub fn is_hub(&self) -> bool {
        self.is_hub
    }

    pub fn is_dark_mode(&self) -> bool {
        self.is_dark_mode
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn class(&self) -> &NodeClass {
        &self.visual
    }
}

/// Arrow marker drawn at an edge's target end.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowMarker {
    pub color: Color,
    pub width: f32,
    pub height: f32,
}

/// Resolved style attached to an edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: Color,
    pub stroke_width: f32,
    pub label: Color,
    pub label_background: Color,
    /// Corner radius of the orthogonal path's bends.
    pub corner_radius: f32,
    pub marker_end: ArrowMarker,
}

impl EdgeStyle {
    /// Returns the style of an edge leaving a node of `source` type.
    pub fn for_source(source: SemanticType, variant: DiagramVariant, dark_mode: bool) -> Self {
        let pick = |dark: &str, light: &str| Color::literal(if dark_mode { dark } else { light });
        let (stroke, label) = match variant {
            DiagramVariant::Schema => (pick("#64748b", "#94a3b8"), pick("#e2e8f0", "#334155")),
            DiagramVariant::Flow => {
                let (stroke, dark, light) = match source {
                    SemanticType::Frontend => ("#3b82f6", "#93c5fd", "#1e40af"),
                    SemanticType::Backend => ("#10b981", "#6ee7b7", "#065f46"),
                    SemanticType::Database => ("#f59e0b", "#fcd34d", "#92400e"),
                    SemanticType::Service => ("#8b5cf6", "#c4b5fd", "#5b21b6"),
                    SemanticType::Logic => ("#64748b", "#cbd5e1", "#475569"),
                    SemanticType::Input => ("#14b8a6", "#5eead4", "#0f766e"),
                    SemanticType::Output => ("#ef4444", "#fca5a5", "#991b1b"),
                    SemanticType::Default => ("#f97316", "#fdba74", "#9a3412"),
                };
                (Color::literal(stroke), pick(dark, light))
            }
        };
        let corner_radius = match variant {
            DiagramVariant::Flow => 25.0,
            DiagramVariant::Schema => 15.0,
        };

        Self {
            stroke,
            stroke_width: 2.0,
            label,
            label_background: pick("#1e293b", "#f1f5f9").with_alpha(0.95),
            corner_radius,
            marker_end: ArrowMarker {
                color: stroke,
                width: 18.0,
                height: 18.0,
            },
        }
    }
}

/// Resolves node and edge styles for one theme and diagram variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleResolver {
    dark_mode: bool,
    variant: DiagramVariant,
}

impl StyleResolver {
    pub fn new(dark_mode: bool, variant: DiagramVariant) -> Self {
        Self { dark_mode, variant }
    }

    pub fn variant(&self) -> DiagramVariant {
        self.variant
    }

    /// Resolves a node's semantic type by precedence.
    pub fn semantic_type(node: &Node) -> SemanticType {
        let tags = node.tags();
        tags.original()
            .or(tags.current())
            .or_else(|| tags.raw().and_then(SemanticType::from_tag))
            .unwrap_or_default()
    }

    /// Returns a styled copy of `node`.
    ///
    /// The copy's current type is set to the resolved type and its original
    /// type is captured if it was not already set.
    pub fn resolve_node(&self, node: &Node) -> Node {
        let semantic = Self::semantic_type(node);
        let mut styled = node.clone();
        let tags = styled.tags_mut();
        tags.current = Some(semantic);
        tags.original = tags.original.or(Some(semantic));

        let hub = self.variant == DiagramVariant::Flow && node.is_hub();
        let visual = match self.variant {
            DiagramVariant::Schema => NodeClass::table(self.dark_mode),
            DiagramVariant::Flow => {
                let mut class = NodeClass::for_semantic(semantic, self.dark_mode);
                class.icon = match (semantic, node.id()) {
                    (SemanticType::Frontend, "client_app") => Icon::Globe,
                    (SemanticType::Backend, id) if id.contains("gateway") => Icon::Layers,
                    _ => class.icon,
                };
                if hub { class.amplified() } else { class }
            }
        };

        styled.set_style(NodeStyle {
            variant: self.variant,
            semantic,
            is_hub: hub,
            is_dark_mode: self.dark_mode,
            size: node.size(self.variant),
            z_index: if hub {
                NodeStyle::BASE_Z_INDEX + 1
            } else {
                NodeStyle::BASE_Z_INDEX
            },
            visual,
        });
        styled
    }

    /// Styles every edge of `graph` from its (already styled) source node.
    pub fn resolve_edges(&self, graph: &mut Graph) {
        let sources: Vec<SemanticType> = graph
            .edges()
            .iter()
            .map(|edge| {
                graph
                    .node(edge.source())
                    .map(Self::semantic_type)
                    .unwrap_or_default()
            })
            .collect();
        for (edge, source) in graph.edges_mut().iter_mut().zip(sources) {
            edge.set_style(EdgeStyle::for_source(source, self.variant, self.dark_mode));
        }
    }

    /// Returns a copy of `graph` with every node and edge styled.
    pub fn resolve_graph(&self, graph: &Graph) -> Graph {
        let mut styled = graph.clone();
        for node in styled.nodes_mut() {
            *node = self.resolve_node(node);
        }
        self.resolve_edges(&mut styled);
        styled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Edge, NodeBox};

    fn flow() -> StyleResolver {
        StyleResolver::new(true, DiagramVariant::Flow)
    }

    #[test]
    fn test_precedence_raw_tag() {
        let node = Node::new("login", "Login").with_type_tag("api");
        assert_eq!(StyleResolver::semantic_type(&node), SemanticType::Backend);
    }

    #[test]
    fn test_precedence_generic_tag_falls_back_to_default() {
        let node = Node::new("x", "X").with_type_tag("logicNode");
        assert_eq!(StyleResolver::semantic_type(&node), SemanticType::Default);
    }

    #[test]
    fn test_first_resolution_captures_original() {
        let styled = flow().resolve_node(&Node::new("ui", "UI").with_type_tag("frontend"));
        assert_eq!(styled.tags().original(), Some(SemanticType::Frontend));
        assert_eq!(styled.tags().current(), Some(SemanticType::Frontend));
        assert_eq!(styled.style().unwrap().semantic(), SemanticType::Frontend);
    }

    #[test]
    fn test_restyling_survives_coerced_current_type() {
        let resolver = flow();
        let mut styled = resolver.resolve_node(&Node::new("ui", "UI").with_type_tag("frontend"));
        styled.set_current_type(SemanticType::Default);

        let restyled = resolver.resolve_node(&styled);
        assert_eq!(restyled.tags().original(), Some(SemanticType::Frontend));
        assert_eq!(restyled.tags().current(), Some(SemanticType::Frontend));
        assert_eq!(restyled.style().unwrap().semantic(), SemanticType::Frontend);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = flow();
        let node = Node::new("auth_service", "Auth").with_type_tag("service");
        assert_eq!(resolver.resolve_node(&node), resolver.resolve_node(&node));
    }

    #[test]
    fn test_hub_is_amplified() {
        let resolver = flow();
        let hub = resolver.resolve_node(&Node::new("api_gateway", "GW").with_type_tag("backend"));
        let plain = resolver.resolve_node(&Node::new("posts", "Posts").with_type_tag("backend"));

        let hub_style = hub.style().unwrap();
        let plain_style = plain.style().unwrap();
        assert!(hub_style.is_hub());
        assert_eq!(hub_style.size(), NodeBox::HUB);
        assert_eq!(plain_style.size(), NodeBox::FLOW);
        assert_eq!(hub_style.class().icon, Icon::Layers);
        assert!(hub_style.class().border_width > plain_style.class().border_width);
        assert!(hub_style.z_index() > plain_style.z_index());
    }

    #[test]
    fn test_schema_nodes_use_table_class_and_box() {
        let resolver = StyleResolver::new(false, DiagramVariant::Schema);
        let styled = resolver.resolve_node(&Node::new("main_db", "Users").with_type_tag("databaseSchema"));
        let style = styled.style().unwrap();
        assert_eq!(style.size(), NodeBox::SCHEMA);
        assert!(!style.is_hub());
        assert_eq!(style.class().icon, Icon::Table);
    }

    #[test]
    fn test_edge_color_follows_source_type() {
        let build = Graph::new(
            [
                Node::new("ui", "UI").with_type_tag("frontend"),
                Node::new("db", "DB").with_type_tag("database"),
            ],
            [Edge::new("e1", "ui", "db"), Edge::new("e2", "db", "ui")],
        );
        let styled = flow().resolve_graph(&build.graph);
        let edges = styled.edges();
        assert_eq!(edges[0].style().unwrap().stroke.to_css(), "#3b82f6");
        assert_eq!(edges[1].style().unwrap().stroke.to_css(), "#f59e0b");
        assert_eq!(edges[0].style().unwrap().corner_radius, 25.0);
    }

    #[test]
    fn test_schema_edges_use_neutral_stroke() {
        let build = Graph::new(
            [Node::new("users", "Users"), Node::new("posts", "Posts")],
            [Edge::new("e1", "users", "posts")],
        );
        let styled = StyleResolver::new(true, DiagramVariant::Schema).resolve_graph(&build.graph);
        let style = styled.edges()[0].style().unwrap();
        assert_eq!(style.stroke.to_css(), "#64748b");
        assert_eq!(style.corner_radius, 15.0);
    }
}
