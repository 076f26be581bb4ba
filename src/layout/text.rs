use crate::text_metrics;

// Fallback ascent when no font is available; the rest of the box is descent.
const FALLBACK_ASCENT: f32 = 0.8;

pub(crate) fn text_width(text: &str, font_size: f32, font_family: &str, fast_metrics: bool) -> f32 {
    if fast_metrics && text.is_ascii() {
        return fallback_text_width(text, font_size);
    }
    text_metrics::measure_text_width(text, font_size, font_family)
        .unwrap_or_else(|| fallback_text_width(text, font_size))
}

/// Baseline position within a box of `box_height`, measured from its top.
pub(crate) fn baseline_offset(font_family: &str, box_height: f32, fast_metrics: bool) -> f32 {
    let ratio = if fast_metrics {
        FALLBACK_ASCENT
    } else {
        text_metrics::vertical_metrics(font_family)
            .map(|(ascent, descent)| {
                let total = ascent + descent;
                if total > 0.0 { ascent / total } else { FALLBACK_ASCENT }
            })
            .unwrap_or(FALLBACK_ASCENT)
    };
    box_height * ratio
}

pub(crate) fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(width_class).sum::<f32>() * font_size
}

// Coarse per-character advance in ems for display faces.
fn width_class(ch: char) -> f32 {
    match ch {
        '\n' => 0.0,
        'i' | 'j' | 'l' | 'I' | '!' | '|' | '.' | ',' | ':' | ';' | '\'' => 0.28,
        'f' | 't' | 'r' | ' ' | '(' | ')' | '[' | ']' | '-' => 0.36,
        'm' | 'w' | 'M' | 'W' | '@' | '%' => 0.88,
        'A'..='Z' | '0'..='9' | '#' | '&' => 0.66,
        c if c.is_ascii() => 0.56,
        c if is_wide(c) => 1.0,
        _ => 0.6,
    }
}

fn is_wide(ch: char) -> bool {
    matches!(ch as u32,
        0x1100..=0x115F
        | 0x2E80..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x20000..=0x3FFFD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_width_scales_with_font_size() {
        let w16 = fallback_text_width("Hello", 16.0);
        let w32 = fallback_text_width("Hello", 32.0);
        assert!((w32 - w16 * 2.0).abs() < 0.01);
    }

    #[test]
    fn wide_glyphs_take_a_full_em() {
        assert_eq!(width_class('\u{4e2d}'), 1.0);
        assert!(width_class('i') < width_class('m'));
    }

    #[test]
    fn fast_metrics_skip_font_lookup() {
        assert_eq!(text_width("abc", 10.0, "no-such-font", true), fallback_text_width("abc", 10.0));
        assert_eq!(baseline_offset("no-such-font", 50.0, true), 40.0);
    }
}
