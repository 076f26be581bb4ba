use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_BOOK: Lazy<Mutex<FontBook>> = Lazy::new(|| Mutex::new(FontBook::new()));

/// Advance width of `text` in pixels using the first installed family of the
/// CSS-style `font_family` list. `None` when no usable font is found.
pub fn measure_text_width(text: &str, font_size: f32, font_family: &str) -> Option<f32> {
    if text.is_empty() || font_size <= 0.0 {
        return Some(0.0);
    }
    let mut book = FONT_BOOK.lock().ok()?;
    let font = book.font(font_family)?;
    font.advance_width(text, font_size)
}

/// Ascent and descent as fractions of the font size.
pub fn vertical_metrics(font_family: &str) -> Option<(f32, f32)> {
    let mut book = FONT_BOOK.lock().ok()?;
    let font = book.font(font_family)?;
    Some((font.ascent, font.descent))
}

struct FontBook {
    db: Database,
    system_fonts_loaded: bool,
    fonts: HashMap<String, Option<LoadedFont>>,
}

impl FontBook {
    fn new() -> Self {
        Self {
            db: Database::new(),
            system_fonts_loaded: false,
            fonts: HashMap::new(),
        }
    }

    fn font(&mut self, font_family: &str) -> Option<&mut LoadedFont> {
        let key = font_family.trim().to_string();
        if !self.fonts.contains_key(&key) {
            let loaded = self.load(&key);
            self.fonts.insert(key.clone(), loaded);
        }
        self.fonts.get_mut(&key).and_then(|font| font.as_mut())
    }

    fn load(&mut self, font_family: &str) -> Option<LoadedFont> {
        if !self.system_fonts_loaded {
            self.db.load_system_fonts();
            self.system_fonts_loaded = true;
        }

        let names = family_names(font_family);
        let families: Vec<Family<'_>> = names.iter().map(|name| to_family(name)).collect();
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| LoadedFont::parse(data.to_vec(), index))
            .flatten()
    }
}

fn family_names(font_family: &str) -> Vec<String> {
    let mut names: Vec<String> = font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        names.push("sans-serif".to_string());
    }
    names
}

fn to_family(name: &str) -> Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => Family::Serif,
        "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => Family::SansSerif,
        "monospace" | "ui-monospace" => Family::Monospace,
        "cursive" => Family::Cursive,
        "fantasy" => Family::Fantasy,
        _ => Family::Name(name),
    }
}

struct LoadedFont {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascent: f32,
    descent: f32,
    advances: HashMap<char, Option<u16>>,
}

impl LoadedFont {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let (units_per_em, ascent, descent) = {
            let face = Face::parse(&data, index).ok()?;
            let upem = face.units_per_em().max(1) as f32;
            (
                upem,
                face.ascender() as f32 / upem,
                -(face.descender() as f32) / upem,
            )
        };
        Some(Self {
            data,
            index,
            units_per_em,
            ascent,
            descent,
            advances: HashMap::new(),
        })
    }

    fn advance_width(&mut self, text: &str, font_size: f32) -> Option<f32> {
        let missing: Vec<char> = text
            .chars()
            .filter(|ch| !self.advances.contains_key(ch))
            .collect();
        if !missing.is_empty() {
            let face = Face::parse(&self.data, self.index).ok()?;
            for ch in missing {
                let advance = face
                    .glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph));
                self.advances.insert(ch, advance);
            }
        }

        let scale = font_size / self.units_per_em;
        let fallback = font_size * 0.56;
        let width = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| match self.advances.get(&ch).copied().flatten() {
                Some(advance) if advance > 0 => advance as f32 * scale,
                _ => fallback,
            })
            .sum::<f32>();
        Some(width.max(0.0))
    }
}
