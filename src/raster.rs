//! Turning words into occupancy masks for the packer.
//!
//! `BoxRasterizer` covers each word's text box and needs nothing beyond font
//! metrics. With the `png` feature, `GlyphRasterizer` renders the word through
//! resvg and keeps only the pixels actually inked, which lets small words
//! nest inside the counters and descender gaps of larger ones.

use crate::config::LayoutConfig;
use crate::layout::text::{baseline_offset, text_width};
use crate::layout::{PackError, WordMask};
use crate::theme::Theme;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("cannot rasterize empty text")]
    EmptyText,
    #[error("font size must be positive, got {0}")]
    InvalidFontSize(f32),
    #[error(transparent)]
    Mask(#[from] PackError),
    #[cfg(feature = "png")]
    #[error("svg error: {0}")]
    Svg(#[from] usvg::Error),
    #[error("failed to allocate {0}x{1} pixmap")]
    Pixmap(u32, u32),
}

/// A mask plus the point, relative to the mask's top-left corner, where the
/// text anchor (start of baseline) sits. For rotated words the text runs
/// downward from the anchor.
#[derive(Debug, Clone)]
pub struct RasterizedWord {
    pub mask: WordMask,
    pub anchor_x: f32,
    pub anchor_y: f32,
}

impl RasterizedWord {
    /// Quarter turn clockwise, carrying the anchor along.
    pub fn rotated(self) -> Self {
        let height = self.mask.height() as f32;
        Self {
            mask: self.mask.rotated_cw(),
            anchor_x: height - self.anchor_y,
            anchor_y: self.anchor_x,
        }
    }
}

pub trait Rasterizer {
    fn rasterize(
        &mut self,
        text: &str,
        font_size: f32,
        rotated: bool,
    ) -> Result<RasterizedWord, RasterError>;
}

fn check_input(text: &str, font_size: f32) -> Result<(), RasterError> {
    if text.trim().is_empty() {
        return Err(RasterError::EmptyText);
    }
    if !font_size.is_finite() || font_size <= 0.0 {
        return Err(RasterError::InvalidFontSize(font_size));
    }
    Ok(())
}

/// Solid text boxes sized from font metrics.
#[derive(Debug, Clone)]
pub struct BoxRasterizer {
    font_family: String,
    line_height: f32,
    fast_metrics: bool,
}

impl BoxRasterizer {
    pub fn new(font_family: &str, line_height: f32, fast_metrics: bool) -> Self {
        Self {
            font_family: font_family.to_string(),
            line_height: if line_height > 0.0 { line_height } else { 1.0 },
            fast_metrics,
        }
    }
}

impl Rasterizer for BoxRasterizer {
    fn rasterize(
        &mut self,
        text: &str,
        font_size: f32,
        rotated: bool,
    ) -> Result<RasterizedWord, RasterError> {
        check_input(text, font_size)?;
        let width = text_width(text, font_size, &self.font_family, self.fast_metrics)
            .ceil()
            .max(1.0);
        let height = (font_size * self.line_height).ceil().max(1.0);
        let word = RasterizedWord {
            mask: WordMask::filled(width as usize, height as usize)?,
            anchor_x: 0.0,
            anchor_y: baseline_offset(&self.font_family, height, self.fast_metrics),
        };
        Ok(if rotated { word.rotated() } else { word })
    }
}

#[cfg(feature = "png")]
pub struct GlyphRasterizer {
    options: usvg::Options<'static>,
    font_family: String,
    font_weight: String,
    threshold: u8,
    fast_metrics: bool,
    fallback: BoxRasterizer,
}

#[cfg(feature = "png")]
impl GlyphRasterizer {
    pub fn new(theme: &Theme, config: &LayoutConfig) -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        Self {
            options,
            font_family: theme.font_family.clone(),
            font_weight: theme.font_weight.clone(),
            threshold: config.alpha_threshold,
            fast_metrics: config.fast_text_metrics,
            fallback: BoxRasterizer::new(
                &theme.font_family,
                config.line_height,
                config.fast_text_metrics,
            ),
        }
    }

    fn render_alpha(&self, text: &str, font_size: f32) -> Result<(WordMask, f32, f32), RasterError> {
        let advance = text_width(text, font_size, &self.font_family, self.fast_metrics);
        let pad = (font_size * 0.25).ceil();
        let width = (advance * 1.2 + 2.0 * pad).ceil().max(1.0) as u32;
        let height = (font_size * 1.6 + 2.0 * pad).ceil().max(1.0) as u32;
        let baseline = pad + font_size * 1.15;

        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\"><text x=\"{pad}\" y=\"{baseline}\" font-family=\"{}\" font-weight=\"{}\" font-size=\"{font_size}\" fill=\"#000000\">{}</text></svg>",
            crate::render::escape_xml(&self.font_family),
            crate::render::escape_xml(&self.font_weight),
            crate::render::escape_xml(text),
        );
        let tree = usvg::Tree::from_str(&svg, &self.options)?;
        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or(RasterError::Pixmap(width, height))?;
        let mut pixmap_mut = pixmap.as_mut();
        resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);

        let alpha: Vec<u8> = pixmap.data().chunks_exact(4).map(|px| px[3]).collect();
        let mask = WordMask::from_alpha(width as usize, height as usize, &alpha, self.threshold)?;
        Ok((mask, pad, baseline))
    }
}

#[cfg(feature = "png")]
impl Rasterizer for GlyphRasterizer {
    fn rasterize(
        &mut self,
        text: &str,
        font_size: f32,
        rotated: bool,
    ) -> Result<RasterizedWord, RasterError> {
        check_input(text, font_size)?;
        let (mask, pad, baseline) = self.render_alpha(text, font_size)?;
        let (mask, (offset_x, offset_y)) = mask.trimmed();
        if mask.opaque_count() == 0 {
            // No usable font was found; a solid box still packs correctly.
            return self.fallback.rasterize(text, font_size, rotated);
        }
        let word = RasterizedWord {
            mask,
            anchor_x: pad - offset_x as f32,
            anchor_y: baseline - offset_y as f32,
        };
        Ok(if rotated { word.rotated() } else { word })
    }
}

/// Pick the most precise rasterizer this build supports.
pub fn rasterizer_for(theme: &Theme, config: &LayoutConfig) -> Box<dyn Rasterizer> {
    #[cfg(feature = "png")]
    if config.glyph_masks {
        return Box::new(GlyphRasterizer::new(theme, config));
    }
    Box::new(BoxRasterizer::new(
        &theme.font_family,
        config.line_height,
        config.fast_text_metrics,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::text::fallback_text_width;

    #[test]
    fn box_mask_matches_text_box() {
        let mut raster = BoxRasterizer::new("sans-serif", 1.0, true);
        let word = raster.rasterize("cloud", 20.0, false).unwrap();
        let expected_width = fallback_text_width("cloud", 20.0).ceil() as usize;
        assert_eq!(word.mask.width(), expected_width);
        assert_eq!(word.mask.height(), 20);
        assert_eq!(word.mask.opaque_count(), expected_width * 20);
        assert_eq!((word.anchor_x, word.anchor_y), (0.0, 16.0));
    }

    #[test]
    fn rotation_swaps_box_and_moves_anchor() {
        let mut raster = BoxRasterizer::new("sans-serif", 1.0, true);
        let flat = raster.rasterize("cloud", 20.0, false).unwrap();
        let upright = raster.rasterize("cloud", 20.0, true).unwrap();
        assert_eq!(upright.mask.width(), flat.mask.height());
        assert_eq!(upright.mask.height(), flat.mask.width());
        assert_eq!((upright.anchor_x, upright.anchor_y), (4.0, 0.0));
    }

    #[test]
    fn rejects_empty_text_and_bad_sizes() {
        let mut raster = BoxRasterizer::new("sans-serif", 1.0, true);
        assert!(matches!(raster.rasterize("  ", 12.0, false), Err(RasterError::EmptyText)));
        assert!(matches!(
            raster.rasterize("word", 0.0, false),
            Err(RasterError::InvalidFontSize(_))
        ));
    }

    #[cfg(feature = "png")]
    #[test]
    fn glyph_rasterizer_always_yields_a_mask() {
        let config = LayoutConfig::default();
        let mut raster = GlyphRasterizer::new(&Theme::classic(), &config);
        let word = raster.rasterize("Wg", 32.0, false).unwrap();
        assert!(word.mask.width() > 0 && word.mask.height() > 0);
        assert!(word.mask.opaque_count() > 0);
    }
}
