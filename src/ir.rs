use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::PinnedLayout;
use crate::error::{Error, Result};
use crate::geometry::Point;

/// Typed style key for nodes and edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Root,
    ParentCompany,
    Company,
    #[default]
    Other,
}

impl Category {
    /// Subsidiaries are drawn as companies; any other relationship marks a parent company.
    pub fn from_relationship(relationship: &str) -> Self {
        match relationship.trim().to_ascii_lowercase().as_str() {
            "subsidary" | "subsidiary" => Category::Company,
            _ => Category::ParentCompany,
        }
    }
}

/// A company related to the root of a company structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyEntry {
    pub name: String,
    pub relationship: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub category: Category,
    pub directed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: BTreeMap<String, Node>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ensure_node(&mut self, id: &str, label: Option<String>, category: Option<Category>) {
        let entry = self.nodes.entry(id.to_string()).or_insert(Node {
            id: id.to_string(),
            label: id.to_string(),
            category: Category::Other,
        });
        if let Some(label) = label {
            entry.label = label;
        }
        if let Some(category) = category {
            entry.category = category;
        }
    }

    pub fn add_edge(&mut self, source: &str, target: &str, label: Option<String>, directed: bool) {
        self.edges.push(Edge {
            source: source.to_string(),
            target: target.to_string(),
            label,
            category: Category::Other,
            directed,
        });
    }

    /// Star-shaped graph: a root company joined to each related company.
    ///
    /// Company names double as node ids. Each edge carries the relationship as its label
    /// and the related company's category, so it is drawn in that company's colour.
    pub fn from_company_structure(company_name: &str, structure: &[CompanyEntry]) -> Result<Self> {
        let mut graph = Graph::new();
        graph.ensure_node(company_name, None, Some(Category::Root));
        for entry in structure {
            if graph.nodes.contains_key(&entry.name) {
                return Err(Error::DuplicateNode {
                    id: entry.name.clone(),
                });
            }
            let category = Category::from_relationship(&entry.relationship);
            graph.ensure_node(&entry.name, None, Some(category));
            graph.edges.push(Edge {
                source: company_name.to_string(),
                target: entry.name.clone(),
                label: Some(entry.relationship.clone()),
                category,
                directed: false,
            });
        }
        Ok(graph)
    }

    /// Every edge must join two known nodes.
    pub fn validate(&self) -> Result<()> {
        for edge in &self.edges {
            if !self.nodes.contains_key(&edge.source) || !self.nodes.contains_key(&edge.target) {
                return Err(Error::MissingEndpoint {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                });
            }
        }
        Ok(())
    }
}

/// On-disk graph description: nodes with their simulation positions plus edges.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GraphDocument {
    pub nodes: Vec<NodeEntry>,
    pub edges: Vec<EdgeEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeEntry {
    pub id: String,
    pub label: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EdgeEntry {
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_directed")]
    pub directed: bool,
}

fn default_directed() -> bool {
    true
}

impl GraphDocument {
    /// Parses JSON5 (plain JSON included).
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        Ok(json5::from_str(input)?)
    }

    /// Splits the document into the host graph and a pinned engine holding positions.
    pub fn into_parts(self) -> Result<(Graph, PinnedLayout)> {
        let mut graph = Graph::new();
        let mut layout = PinnedLayout::new();
        for node in self.nodes {
            if graph.nodes.contains_key(&node.id) {
                return Err(Error::DuplicateNode { id: node.id });
            }
            graph.ensure_node(&node.id, node.label, Some(node.category));
            layout.insert(node.id, Point::new(node.x, node.y));
        }
        for edge in self.edges {
            graph.edges.push(Edge {
                source: edge.source,
                target: edge.target,
                label: edge.label,
                category: edge.category,
                directed: edge.directed,
            });
        }
        graph.validate()?;
        Ok((graph, layout))
    }
}
