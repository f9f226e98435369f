//! Style resolution injected by the host.
//!
//! Nodes and edges carry a typed [`Category`]; a [`StyleResolver`] turns that into
//! concrete colours so no palette lives in global state.

use crate::connector::{ConnectorStyle, FillBand, LabelStyle};
use crate::ir::{Category, Edge, Node};
use crate::surface::{ShapeStyle, TextStyle};
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeStyle {
    pub shape: ShapeStyle,
    pub text: TextStyle,
}

pub trait StyleResolver {
    fn node_style(&self, node: &Node) -> NodeStyle;

    fn edge_style(&self, edge: &Edge) -> ConnectorStyle;

    /// Colour used for centre-to-centre arrows.
    fn edge_color(&self, edge: &Edge) -> String;
}

/// Resolves categories through a [`Theme`].
#[derive(Debug, Clone)]
pub struct ThemeResolver {
    pub theme: Theme,
    pub corner_radius: f32,
    /// Optional `"color|width"` band drawn under every curved edge.
    pub edge_band: Option<String>,
}

impl ThemeResolver {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            corner_radius: 5.0,
            edge_band: None,
        }
    }

    pub fn category_color(&self, category: Category) -> &str {
        match category {
            Category::Root => &self.theme.root_color,
            Category::ParentCompany => &self.theme.parent_company_color,
            Category::Company => &self.theme.company_color,
            Category::Other => &self.theme.other_color,
        }
    }
}

impl Default for ThemeResolver {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl StyleResolver for ThemeResolver {
    fn node_style(&self, node: &Node) -> NodeStyle {
        let color = self.category_color(node.category).to_string();
        NodeStyle {
            shape: ShapeStyle {
                fill: color.clone(),
                stroke: color,
                stroke_width: 1.0,
                corner_radius: self.corner_radius,
            },
            text: TextStyle {
                fill: self.theme.node_text_color.clone(),
                font_size: self.theme.node_font_size,
                font_family: Some(self.theme.font_family.clone()),
            },
        }
    }

    fn edge_style(&self, edge: &Edge) -> ConnectorStyle {
        let stroke = match edge.category {
            Category::Other => self.theme.line_color.clone(),
            category => self.category_color(category).to_string(),
        };
        ConnectorStyle {
            directed: edge.directed,
            label: edge.label.clone(),
            stroke: Some(stroke),
            fill_band: self
                .edge_band
                .as_deref()
                .and_then(|spec| spec.parse::<FillBand>().ok()),
            label_style: LabelStyle {
                fill: self.theme.edge_label_color.clone(),
                font_size: self.theme.edge_label_font_size,
                font_family: Some(self.theme.font_family.clone()),
            },
            straight: false,
        }
    }

    fn edge_color(&self, edge: &Edge) -> String {
        self.category_color(edge.category).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(category: Category) -> Node {
        Node {
            id: "n".to_string(),
            label: "N".to_string(),
            category,
        }
    }

    #[test]
    fn categories_resolve_to_palette() {
        let resolver = ThemeResolver::new(Theme::company());
        assert_eq!(resolver.node_style(&node(Category::Root)).shape.fill, "#7c120d");
        assert_eq!(resolver.node_style(&node(Category::Company)).shape.fill, "#0A6014");
        assert_eq!(
            resolver.node_style(&node(Category::ParentCompany)).shape.stroke,
            "#08464C"
        );
    }

    #[test]
    fn edge_style_carries_label_and_band() {
        let mut resolver = ThemeResolver::new(Theme::company());
        resolver.edge_band = Some("#ddd|4".to_string());
        let edge = Edge {
            source: "a".to_string(),
            target: "b".to_string(),
            label: Some("owns".to_string()),
            category: Category::Company,
            directed: true,
        };
        let style = resolver.edge_style(&edge);
        assert!(style.directed);
        assert_eq!(style.stroke.as_deref(), Some("#0A6014"));
        assert_eq!(style.fill_band.unwrap().width, 4.0);
        assert_eq!(style.label_style.font_size, 12.0);
    }
}
