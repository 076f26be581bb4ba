use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_weight: String,
    pub background: String,
    /// Word colors, handed out round-robin in placement order.
    pub palette: Vec<String>,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Impact, \"Arial Black\", sans-serif".to_string(),
            font_weight: "normal".to_string(),
            background: "#FFFFFF".to_string(),
            palette: [
                "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2",
                "#7F7F7F", "#BCBD22", "#17BECF",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_weight: "600".to_string(),
            background: "#FFFFFF".to_string(),
            palette: ["#1C2430", "#3B5BDB", "#7A8AA6", "#0CA678", "#E8590C"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_weight: "600".to_string(),
            background: "#111827".to_string(),
            palette: ["#F9FAFB", "#93C5FD", "#FCD34D", "#6EE7B7", "#F9A8D4"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" | "default" | "base" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }

    pub fn color_for(&self, index: usize) -> &str {
        if self.palette.is_empty() {
            return "#000000";
        }
        &self.palette[index % self.palette.len()]
    }
}
