use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub node_font_size: f32,
    pub node_text_color: String,
    pub root_color: String,
    pub parent_company_color: String,
    pub company_color: String,
    pub other_color: String,
    pub line_color: String,
    pub edge_label_color: String,
    pub edge_label_font_size: f32,
}

impl Theme {
    /// Company-structure palette: dark red root, teal parents, green subsidiaries.
    pub fn company() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            node_font_size: 15.0,
            node_text_color: "#ffffff".to_string(),
            root_color: "#7c120d".to_string(),
            parent_company_color: "#08464C".to_string(),
            company_color: "#0A6014".to_string(),
            other_color: "#4A5568".to_string(),
            line_color: "#000000".to_string(),
            edge_label_color: "#000000".to_string(),
            edge_label_font_size: 12.0,
        }
    }

    pub fn mono() -> Self {
        Self {
            font_family: "\"trebuchet ms\", verdana, arial, sans-serif".to_string(),
            node_font_size: 14.0,
            node_text_color: "#333333".to_string(),
            root_color: "#ECECFF".to_string(),
            parent_company_color: "#F4F4F4".to_string(),
            company_color: "#FFFFFF".to_string(),
            other_color: "#FFFFFF".to_string(),
            line_color: "#333333".to_string(),
            edge_label_color: "#333333".to_string(),
            edge_label_font_size: 12.0,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "company" | "default" => Some(Self::company()),
            "mono" => Some(Self::mono()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::company()
    }
}
