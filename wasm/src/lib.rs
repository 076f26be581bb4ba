use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wordcloud_rs_renderer::{RenderOptions, render_with_options};

// Browsers have no OS entropy source we rely on, so clouds are always seeded.
const DEFAULT_SEED: u64 = 0x5EED;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CloudRenderOptions {
    theme: Option<String>,
    font_family: Option<String>,
    width: Option<f32>,
    height: Option<f32>,
    min_font_size: Option<f32>,
    max_font_size: Option<f32>,
    rotate_every: Option<usize>,
    max_words: Option<usize>,
    dilation: Option<usize>,
    seed: Option<u64>,
}

fn build_render_options(options: CloudRenderOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::default()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    let layout = &mut render_options.layout;
    // No font database or rasterizer in the browser build.
    layout.fast_text_metrics = true;
    layout.glyph_masks = false;
    if let Some(width) = options.width {
        layout.canvas_width = width;
    }
    if let Some(height) = options.height {
        layout.canvas_height = height;
    }
    if let Some(size) = options.min_font_size {
        layout.min_font_size = size;
    }
    if let Some(size) = options.max_font_size {
        layout.max_font_size = size;
    }
    if let Some(every) = options.rotate_every {
        layout.rotate_every = every;
    }
    if let Some(max_words) = options.max_words {
        layout.max_words = max_words;
    }
    if let Some(dilation) = options.dilation {
        layout.pack.dilation = dilation;
    }

    render_options.with_seed(options.seed.unwrap_or(DEFAULT_SEED))
}

#[wasm_bindgen]
pub fn render_cloud_svg(words: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<CloudRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        CloudRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(words, render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use wordcloud_rs_renderer::render_with_options;

    use crate::{CloudRenderOptions, build_render_options};

    #[test]
    fn renders_weighted_word_list() {
        let words = "rust 10\nwasm 6\nbrowser 3\ncloud: 2";

        let svg = render_with_options(words, build_render_options(CloudRenderOptions::default()))
            .expect("word list should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains(">rust</text>"));
        assert!(svg.contains(">cloud</text>"));
    }

    #[test]
    fn options_json_fields_are_applied() {
        let options: CloudRenderOptions =
            serde_json::from_str(r#"{"theme": "modern", "width": 320, "height": 240, "seed": 3}"#)
                .unwrap();
        let built = build_render_options(options);
        assert_eq!(built.layout.canvas_width, 320.0);
        assert_eq!(built.layout.canvas_height, 240.0);
        assert_eq!(built.seed, Some(3));
        assert!(!built.layout.glyph_masks);
    }
}
