use crate::connector::{RetractOptions, RouteOptions};
use crate::error::Error;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which connector the view draws for each edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    /// Boundary-anchored cubic curves.
    #[default]
    Curve,
    /// Straight centre-to-centre arrows retracted to the node borders.
    Arrow,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// `current` moves `1 / easing_divisor` of the remaining distance per tick.
    pub easing_divisor: f32,
    pub frame_interval_ms: u64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            easing_divisor: 10.0,
            frame_interval_ms: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Added to the measured label width.
    pub padding_x: f32,
    /// Added to the label line height.
    pub padding_y: f32,
    pub corner_radius: f32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            padding_x: 20.0,
            padding_y: 10.0,
            corner_radius: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub canvas: CanvasConfig,
    pub viewport: ViewportConfig,
    pub node: NodeConfig,
    pub route: RouteOptions,
    pub retract: RetractOptions,
    pub edge_mode: EdgeMode,
    /// `"color|width"` band drawn under curved edges.
    pub edge_band: Option<String>,
}

impl Config {
    /// A zero-area canvas cannot be rendered; reported before any frame runs.
    pub fn validate(&self) -> Result<(), Error> {
        let CanvasConfig { width, height, .. } = self.canvas;
        if !(width > 0.0 && height > 0.0) {
            return Err(Error::EmptyCanvas { width, height });
        }
        Ok(())
    }

    /// Applies a JSON document of overrides on top of this configuration.
    pub fn merge_json(mut self, contents: &str) -> anyhow::Result<Self> {
        let parsed: ConfigFile = serde_json::from_str(contents)?;

        if let Some(theme_name) = parsed.theme.as_deref() {
            match Theme::by_name(theme_name) {
                Some(theme) => self.theme = theme,
                None => log::warn!("unknown theme '{theme_name}', keeping the current one"),
            }
        }

        if let Some(vars) = parsed.theme_variables {
            if let Some(v) = vars.font_family {
                self.theme.font_family = v;
            }
            if let Some(v) = vars.node_font_size.as_ref().and_then(NumberOrString::as_f32) {
                self.theme.node_font_size = v;
            }
            if let Some(v) = vars.node_text_color {
                self.theme.node_text_color = v;
            }
            if let Some(v) = vars.root_color {
                self.theme.root_color = v;
            }
            if let Some(v) = vars.parent_company_color {
                self.theme.parent_company_color = v;
            }
            if let Some(v) = vars.company_color {
                self.theme.company_color = v;
            }
            if let Some(v) = vars.other_color {
                self.theme.other_color = v;
            }
            if let Some(v) = vars.line_color {
                self.theme.line_color = v;
            }
            if let Some(v) = vars.edge_label_color {
                self.theme.edge_label_color = v;
            }
            if let Some(v) = vars.edge_label_font_size.as_ref().and_then(NumberOrString::as_f32) {
                self.theme.edge_label_font_size = v;
            }
            if let Some(v) = vars.background {
                self.canvas.background = v;
            }
        }

        if let Some(canvas) = parsed.canvas {
            if let Some(v) = canvas.width {
                self.canvas.width = v;
            }
            if let Some(v) = canvas.height {
                self.canvas.height = v;
            }
            if let Some(v) = canvas.background {
                self.canvas.background = v;
            }
        }

        if let Some(viewport) = parsed.viewport {
            if let Some(v) = viewport.easing_divisor {
                self.viewport.easing_divisor = v;
            }
            if let Some(v) = viewport.frame_interval_ms {
                self.viewport.frame_interval_ms = v;
            }
        }

        if let Some(node) = parsed.node {
            if let Some(v) = node.padding_x {
                self.node.padding_x = v;
            }
            if let Some(v) = node.padding_y {
                self.node.padding_y = v;
            }
            if let Some(v) = node.corner_radius {
                self.node.corner_radius = v;
            }
        }

        if let Some(route) = parsed.route {
            self.route = route;
        }
        if let Some(retract) = parsed.retract {
            self.retract = retract;
        }
        if let Some(mode) = parsed.edge_mode {
            self.edge_mode = mode;
        }
        if parsed.edge_band.is_some() {
            self.edge_band = parsed.edge_band;
        }

        Ok(self)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    /// Accepts plain numbers and CSS pixel strings such as `"12px"`.
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").trim().parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    node_font_size: Option<NumberOrString>,
    node_text_color: Option<String>,
    root_color: Option<String>,
    parent_company_color: Option<String>,
    company_color: Option<String>,
    other_color: Option<String>,
    line_color: Option<String>,
    edge_label_color: Option<String>,
    edge_label_font_size: Option<NumberOrString>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CanvasFile {
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ViewportFile {
    easing_divisor: Option<f32>,
    frame_interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeFile {
    padding_x: Option<f32>,
    padding_y: Option<f32>,
    corner_radius: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    canvas: Option<CanvasFile>,
    viewport: Option<ViewportFile>,
    node: Option<NodeFile>,
    route: Option<RouteOptions>,
    retract: Option<RetractOptions>,
    edge_mode: Option<EdgeMode>,
    edge_band: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    config.merge_json(&contents)
}
