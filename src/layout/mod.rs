mod error;
mod field;
mod mask;
mod random;
mod session;
mod sizing;
mod spiral;
pub(crate) mod text;
pub(crate) mod types;

pub use error::PackError;
pub use field::CollisionField;
pub use mask::{BitGrid, WordMask};
pub use random::{Randomizer, RngRandomizer};
pub use session::{CancelFlag, PackingSession, Quadrant, SessionReport};
pub use sizing::{SizedWord, size_words};
pub use spiral::{SpiralPoint, SpiralPositioner};
pub use types::*;

use crate::config::Config;
use crate::ir::WordList;
use crate::raster::{Rasterizer, rasterizer_for};
use tracing::{debug, info, warn};

/// Size, rasterize and place `words` in order on the configured canvas.
pub fn compute_cloud<R: Randomizer>(
    words: &WordList,
    config: &Config,
    randomizer: R,
    cancel: &CancelFlag,
) -> anyhow::Result<CloudLayout> {
    let mut rasterizer = rasterizer_for(&config.theme, &config.layout);
    compute_cloud_with(words, config, randomizer, rasterizer.as_mut(), cancel)
}

/// Same as [`compute_cloud`] with a caller-supplied rasterizer.
pub fn compute_cloud_with<R: Randomizer>(
    words: &WordList,
    config: &Config,
    randomizer: R,
    rasterizer: &mut dyn Rasterizer,
    cancel: &CancelFlag,
) -> anyhow::Result<CloudLayout> {
    let layout_cfg = &config.layout;
    let mut session = PackingSession::new(
        layout_cfg.canvas_width as f64,
        layout_cfg.canvas_height as f64,
        randomizer,
        layout_cfg.pack.clone(),
    )?;

    let sized = size_words(words, layout_cfg);
    let mut placed = Vec::with_capacity(sized.len());
    let mut failed = Vec::new();
    let mut canceled = false;

    for (idx, word) in sized.into_iter().enumerate() {
        if cancel.is_canceled() {
            debug!(remaining = words.len().min(layout_cfg.max_words) - idx, "cloud canceled");
            canceled = true;
            break;
        }
        let raster = match rasterizer.rasterize(&word.text, word.font_size, word.rotated) {
            Ok(raster) => raster,
            Err(err) => {
                warn!(
                    word = %word.text,
                    font_size = word.font_size,
                    error = %err,
                    "word could not be rasterized"
                );
                failed.push(FailedWord {
                    text: word.text,
                    weight: word.weight,
                    reason: FailureReason::Rasterize,
                });
                continue;
            }
        };
        match session.try_place(&raster.mask) {
            Placement::Placed { rect, .. } => placed.push(PlacedWord {
                color: config.theme.color_for(idx).to_string(),
                x: rect.x as f32,
                y: rect.y as f32,
                width: rect.width as f32,
                height: rect.height as f32,
                anchor_x: rect.x as f32 + raster.anchor_x,
                anchor_y: rect.y as f32 + raster.anchor_y,
                text: word.text,
                weight: word.weight,
                font_size: word.font_size,
                rotated: word.rotated,
            }),
            Placement::Failed(failure) => {
                failed.push(FailedWord {
                    text: word.text,
                    weight: word.weight,
                    reason: failure.reason,
                });
            }
        }
    }

    if !failed.is_empty() {
        warn!(count = failed.len(), "some words did not fit on the canvas");
    }
    info!(
        placed = placed.len(),
        failed = failed.len(),
        canceled,
        "cloud layout complete"
    );

    Ok(CloudLayout {
        width: layout_cfg.canvas_width,
        height: layout_cfg.canvas_height,
        words: placed,
        failed,
        canceled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{BoxRasterizer, RasterError, RasterizedWord};

    // Box rasterizer that refuses one particular word.
    struct RefusingRasterizer {
        inner: BoxRasterizer,
        refuse: &'static str,
    }

    impl Rasterizer for RefusingRasterizer {
        fn rasterize(
            &mut self,
            text: &str,
            font_size: f32,
            rotated: bool,
        ) -> Result<RasterizedWord, RasterError> {
            if text == self.refuse {
                return Err(RasterError::InvalidFontSize(f32::NAN));
            }
            self.inner.rasterize(text, font_size, rotated)
        }
    }

    fn fast_config(width: f32, height: f32) -> Config {
        let mut config = Config::default();
        config.set_canvas_size(width, height);
        config.layout.fast_text_metrics = true;
        config.layout.glyph_masks = false;
        config
    }

    fn words(entries: &[(&str, f64)]) -> WordList {
        WordList::from_entries(
            entries
                .iter()
                .map(|(text, weight)| (text.to_string(), *weight)),
        )
    }

    #[test]
    fn heaviest_word_is_centered() {
        let mut config = fast_config(400.0, 300.0);
        config.layout.min_font_size = 10.0;
        config.layout.max_font_size = 40.0;
        let list = words(&[("center", 5.0), ("side", 1.0)]);
        let layout = compute_cloud(&list, &config, RngRandomizer::seeded(7), &CancelFlag::new())
            .unwrap();
        assert_eq!(layout.words.len(), 2);
        let first = &layout.words[0];
        assert_eq!(first.text, "center");
        assert_eq!(first.font_size, 40.0);
        let cx = first.x + first.width / 2.0;
        let cy = first.y + first.height / 2.0;
        assert!((cx - 200.0).abs() <= 1.0 && (cy - 150.0).abs() <= 1.0);
        assert_eq!(first.color, config.theme.color_for(0));
        assert_eq!(first.anchor_x, first.x);
        assert_eq!(first.anchor_y, first.y + 32.0);
    }

    #[test]
    fn words_too_large_are_reported_failed() {
        let mut config = fast_config(60.0, 40.0);
        config.layout.min_font_size = 30.0;
        config.layout.max_font_size = 30.0;
        let list = words(&[("supercalifragilistic", 1.0), ("a", 1.0)]);
        let layout = compute_cloud(&list, &config, RngRandomizer::seeded(1), &CancelFlag::new())
            .unwrap();
        assert_eq!(layout.failed.len(), 1);
        assert_eq!(layout.failed[0].text, "supercalifragilistic");
        assert_eq!(layout.failed[0].reason, FailureReason::OutOfBounds);
        assert_eq!(layout.words.len(), 1);
    }

    #[test]
    fn canceled_run_places_nothing() {
        let config = fast_config(200.0, 200.0);
        let cancel = CancelFlag::new();
        cancel.cancel();
        let mut raster = BoxRasterizer::new("sans-serif", 1.0, true);
        let layout = compute_cloud_with(
            &words(&[("one", 1.0)]),
            &config,
            RngRandomizer::seeded(1),
            &mut raster,
            &cancel,
        )
        .unwrap();
        assert!(layout.canceled);
        assert!(layout.words.is_empty());
        assert!(layout.failed.is_empty());
    }

    #[test]
    fn raster_failure_skips_only_that_word() {
        let mut config = fast_config(300.0, 200.0);
        config.layout.min_font_size = 10.0;
        config.layout.max_font_size = 30.0;
        let mut raster = RefusingRasterizer {
            inner: BoxRasterizer::new("sans-serif", 1.0, true),
            refuse: "broken",
        };
        let layout = compute_cloud_with(
            &words(&[("first", 5.0), ("broken", 3.0), ("last", 1.0)]),
            &config,
            RngRandomizer::seeded(4),
            &mut raster,
            &CancelFlag::new(),
        )
        .unwrap();
        let placed: Vec<&str> = layout.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(placed, vec!["first", "last"]);
        assert_eq!(layout.failed.len(), 1);
        assert_eq!(layout.failed[0].text, "broken");
        assert_eq!(layout.failed[0].reason, FailureReason::Rasterize);
        assert!(!layout.canceled);
    }

    #[test]
    fn infinite_weight_does_not_abort_the_cloud() {
        let mut config = fast_config(400.0, 300.0);
        config.layout.min_font_size = 10.0;
        config.layout.max_font_size = 40.0;
        let list = words(&[("small", 1.0), ("huge", f64::INFINITY)]);
        let layout = compute_cloud(&list, &config, RngRandomizer::seeded(8), &CancelFlag::new())
            .unwrap();
        assert_eq!(layout.words.len(), 2);
        assert_eq!(layout.words[0].text, "huge");
        assert_eq!(layout.words[0].font_size, config.layout.max_font_size);
        assert!(layout.failed.is_empty());
    }

    #[test]
    fn same_seed_same_cloud() {
        let config = fast_config(300.0, 200.0);
        let entries: Vec<(String, f64)> = (0..30)
            .map(|i| (format!("word{i}"), (30 - i) as f64))
            .collect();
        let list = WordList::from_entries(entries);
        let run = || {
            compute_cloud(&list, &config, RngRandomizer::seeded(99), &CancelFlag::new())
                .unwrap()
                .words
                .iter()
                .map(|w| (w.text.clone(), w.x, w.y))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
