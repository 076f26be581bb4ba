use crate::config::LayoutConfig;
use crate::ir::WordList;

#[derive(Debug, Clone, PartialEq)]
pub struct SizedWord {
    pub text: String,
    pub weight: f64,
    pub font_size: f32,
    pub rotated: bool,
}

/// Map weights linearly onto `[min_font_size, max_font_size]`. When every
/// weight is equal all words get the maximum size. Weights beyond `f64::MAX`
/// are treated as `f64::MAX`.
pub fn size_words(words: &WordList, config: &LayoutConfig) -> Vec<SizedWord> {
    let min_size = config.min_font_size.max(1.0);
    let max_size = config.max_font_size.max(min_size);
    let kept = &words.words[..words.len().min(config.max_words)];
    let (low, high) = kept
        .iter()
        .map(|w| finite_weight(w.weight))
        .fold(None, |range: Option<(f64, f64)>, w| match range {
            Some((lo, hi)) => Some((lo.min(w), hi.max(w))),
            None => Some((w, w)),
        })
        .unwrap_or((0.0, 0.0));
    let span = high - low;

    kept.iter()
        .enumerate()
        .map(|(idx, word)| {
            let t = if span > f64::EPSILON {
                ((finite_weight(word.weight) - low) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            SizedWord {
                text: word.text.clone(),
                weight: word.weight,
                font_size: (min_size + (max_size - min_size) * t as f32).round(),
                rotated: is_rotated(idx, config.rotate_every),
            }
        })
        .collect()
}

// `min` discards NaN, so merged weights that overflowed still order correctly.
fn finite_weight(weight: f64) -> f64 {
    weight.min(f64::MAX).max(0.0)
}

fn is_rotated(idx: usize, rotate_every: usize) -> bool {
    rotate_every > 0 && idx % rotate_every == rotate_every - 1
}
