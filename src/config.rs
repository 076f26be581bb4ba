use crate::layout::PackError;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DilationShape {
    Square,
    Diamond,
}

/// Tunables of the packing core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackConfig {
    /// Pixels kept free along the right and bottom edges of the field.
    pub edge_margin: usize,
    /// Extra pixels marked occupied around each committed word.
    pub dilation: usize,
    pub dilation_shape: DilationShape,
    /// Approximate distance in pixels between consecutive spiral candidates.
    pub spiral_chord: f64,
    /// Angle added to every spiral point, in radians.
    pub spiral_phase: f64,
    /// Upper bound on how much a word's aspect ratio stretches its spiral.
    pub max_aspect_bias: f64,
    /// Random-quadrant restarts after the initial spiral is exhausted.
    pub restart_attempts: usize,
    /// Pull randomly started words back toward the center after placement.
    pub recenter: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            edge_margin: 2,
            dilation: 0,
            dilation_shape: DilationShape::Square,
            spiral_chord: 2.0,
            spiral_phase: 0.0,
            max_aspect_bias: 2.0,
            restart_attempts: 4,
            recenter: true,
        }
    }
}

impl PackConfig {
    pub fn validate(&self) -> Result<(), PackError> {
        if !self.spiral_chord.is_finite() || self.spiral_chord <= 0.0 {
            return Err(PackError::InvalidArgument(format!(
                "spiral chord must be positive, got {}",
                self.spiral_chord
            )));
        }
        if !self.spiral_phase.is_finite() {
            return Err(PackError::InvalidArgument(
                "spiral phase must be finite".to_string(),
            ));
        }
        if !self.max_aspect_bias.is_finite() || self.max_aspect_bias < 1.0 {
            return Err(PackError::InvalidArgument(format!(
                "max aspect bias must be at least 1, got {}",
                self.max_aspect_bias
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub min_font_size: f32,
    pub max_font_size: f32,
    /// Every n-th word is set vertically; 0 keeps all words horizontal.
    pub rotate_every: usize,
    pub max_words: usize,
    /// Height of a word's box relative to its font size.
    pub line_height: f32,
    /// Skip font lookups and use the built-in width table for ASCII text.
    pub fast_text_metrics: bool,
    /// Rasterize real glyph outlines instead of whole text boxes (needs the
    /// `png` feature; falls back to boxes otherwise).
    pub glyph_masks: bool,
    /// Coverage above which a glyph pixel counts as opaque.
    pub alpha_threshold: u8,
    pub pack: PackConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1200.0,
            canvas_height: 800.0,
            min_font_size: 12.0,
            max_font_size: 96.0,
            rotate_every: 0,
            max_words: 200,
            line_height: 1.0,
            fast_text_metrics: false,
            glyph_masks: true,
            alpha_threshold: 32,
            pack: PackConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

impl Config {
    /// Canvas size drives both the packing field and the rendered output.
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.layout.canvas_width = width;
        self.layout.canvas_height = height;
        self.render.width = width;
        self.render.height = height;
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThemeVariables {
    font_family: Option<String>,
    font_weight: Option<String>,
    background: Option<String>,
    palette: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LayoutConfigFile {
    min_font_size: Option<f32>,
    max_font_size: Option<f32>,
    rotate_every: Option<usize>,
    max_words: Option<usize>,
    line_height: Option<f32>,
    fast_text_metrics: Option<bool>,
    glyph_masks: Option<bool>,
    alpha_threshold: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    pack: Option<PackConfig>,
    width: Option<f32>,
    height: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let is_json5 = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json5"))
        .unwrap_or(false);
    let parsed: ConfigFile = if is_json5 {
        json5::from_str(&contents)?
    } else {
        serde_json::from_str(&contents)?
    };
    Ok(apply_config_file(config, parsed))
}

/// Merge an inline `%%{init: ...}%%` directive over an existing config.
pub fn merge_init_config(config: Config, init: serde_json::Value) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_value(init)?;
    Ok(apply_config_file(config, parsed))
}

fn apply_config_file(mut config: Config, parsed: ConfigFile) -> Config {
    if let Some(theme_name) = parsed.theme.as_deref() {
        if let Some(theme) = Theme::by_name(theme_name) {
            config.theme = theme;
            config.render.background = config.theme.background.clone();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_weight {
            config.theme.font_weight = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v.clone();
            config.render.background = v;
        }
        if let Some(v) = vars.palette
            && !v.is_empty()
        {
            config.theme.palette = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.min_font_size {
            config.layout.min_font_size = v;
        }
        if let Some(v) = layout.max_font_size {
            config.layout.max_font_size = v;
        }
        if let Some(v) = layout.rotate_every {
            config.layout.rotate_every = v;
        }
        if let Some(v) = layout.max_words {
            config.layout.max_words = v;
        }
        if let Some(v) = layout.line_height {
            config.layout.line_height = v;
        }
        if let Some(v) = layout.fast_text_metrics {
            config.layout.fast_text_metrics = v;
        }
        if let Some(v) = layout.glyph_masks {
            config.layout.glyph_masks = v;
        }
        if let Some(v) = layout.alpha_threshold {
            config.layout.alpha_threshold = v;
        }
    }

    if let Some(pack) = parsed.pack {
        config.layout.pack = pack;
    }

    if let (Some(width), Some(height)) = (parsed.width, parsed.height) {
        config.set_canvas_size(width, height);
    } else if let Some(width) = parsed.width {
        let height = config.layout.canvas_height;
        config.set_canvas_size(width, height);
    } else if let Some(height) = parsed.height {
        let width = config.layout.canvas_width;
        config.set_canvas_size(width, height);
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pack_defaults_are_valid() {
        let pack = PackConfig::default();
        assert!(pack.validate().is_ok());
        assert_eq!(pack.edge_margin, 2);
        assert_eq!(pack.dilation, 0);
        assert_eq!(pack.restart_attempts, 4);
    }

    #[test]
    fn rejects_non_positive_chord() {
        let pack = PackConfig {
            spiral_chord: 0.0,
            ..PackConfig::default()
        };
        assert!(matches!(pack.validate(), Err(PackError::InvalidArgument(_))));
    }

    #[test]
    fn init_directive_overrides_selected_fields() {
        let init = json!({
            "theme": "dark",
            "themeVariables": { "fontFamily": "Georgia", "palette": ["#111111", "#222222"] },
            "layout": { "rotateEvery": 3, "maxWords": 50 },
            "pack": { "dilation": 2, "dilationShape": "diamond" },
            "width": 640
        });
        let config = merge_init_config(Config::default(), init).unwrap();
        assert_eq!(config.theme.font_family, "Georgia");
        assert_eq!(config.theme.palette, vec!["#111111", "#222222"]);
        assert_eq!(config.render.background, Theme::dark().background);
        assert_eq!(config.layout.rotate_every, 3);
        assert_eq!(config.layout.max_words, 50);
        assert_eq!(config.layout.pack.dilation, 2);
        assert_eq!(config.layout.pack.dilation_shape, DilationShape::Diamond);
        // Unspecified pack fields keep their defaults.
        assert_eq!(config.layout.pack.edge_margin, 2);
        assert_eq!(config.layout.canvas_width, 640.0);
        assert_eq!(config.layout.canvas_height, 800.0);
    }

    #[test]
    fn unknown_theme_name_keeps_current_theme() {
        let config = merge_init_config(Config::default(), json!({ "theme": "neon" })).unwrap();
        assert_eq!(config.theme.palette, Theme::classic().palette);
    }
}
