#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod raster;
pub mod render;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, PackConfig, load_config};
pub use layout::{CancelFlag, CloudLayout, PackingSession, RngRandomizer, WordMask, compute_cloud};
pub use parser::parse_words;
pub use render::render_svg;
pub use theme::Theme;

use config::merge_init_config;

/// Options for one-shot rendering of a word list to SVG.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub theme: Theme,
    pub layout: LayoutConfig,
    /// Fixed seed for reproducible output; `None` draws from the OS (needs the
    /// `entropy` feature).
    pub seed: Option<u64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::classic(),
            layout: LayoutConfig::default(),
            seed: None,
        }
    }
}

impl RenderOptions {
    pub fn modern() -> Self {
        Self {
            theme: Theme::modern(),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn into_config(self) -> Config {
        let mut config = Config {
            theme: self.theme,
            layout: self.layout,
            ..Config::default()
        };
        config.render.background = config.theme.background.clone();
        let (width, height) = (config.layout.canvas_width, config.layout.canvas_height);
        config.set_canvas_size(width, height);
        config
    }
}

pub fn render_with_options(input: &str, options: RenderOptions) -> anyhow::Result<String> {
    let seed = options.seed;
    let parsed = parser::parse_words(input)?;
    let mut config = options.into_config();
    if let Some(init_cfg) = parsed.init_config {
        config = merge_init_config(config, init_cfg)?;
    }
    let cancel = CancelFlag::new();
    let layout = match seed {
        Some(seed) => compute_cloud(&parsed.words, &config, RngRandomizer::seeded(seed), &cancel)?,
        #[cfg(feature = "entropy")]
        None => compute_cloud(&parsed.words, &config, RngRandomizer::from_entropy(), &cancel)?,
        #[cfg(not(feature = "entropy"))]
        None => return Err(anyhow::anyhow!("a seed is required without the `entropy` feature")),
    };
    Ok(render::render_svg(&layout, &config.theme))
}
