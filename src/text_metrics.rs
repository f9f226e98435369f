//! Label measurement for node shapes.
//!
//! Widths come from the horizontal advances of a system font resolved through fontdb;
//! when no face can be found the width is estimated from the character count.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use log::debug;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

/// Average glyph width as a fraction of the font size, used without a font face.
const ESTIMATED_CHAR_WIDTH: f32 = 0.56;
/// Line box height as a multiple of the font size.
const LINE_HEIGHT_RATIO: f32 = 1.2;

static FACES: Lazy<Mutex<FaceCache>> = Lazy::new(|| Mutex::new(FaceCache::default()));

/// Rendered width of a single-line label.
pub fn label_width(text: &str, font_size: f32, font_family: &str) -> f32 {
    if text.is_empty() || font_size <= 0.0 {
        return 0.0;
    }
    let measured = FACES
        .lock()
        .ok()
        .and_then(|mut cache| cache.measure(text, font_size, font_family));
    measured.unwrap_or_else(|| estimate_width(text, font_size))
}

pub fn line_height(font_size: f32) -> f32 {
    font_size.max(0.0) * LINE_HEIGHT_RATIO
}

pub fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().filter(|ch| *ch != '\n').count() as f32 * font_size * ESTIMATED_CHAR_WIDTH
}

#[derive(Default)]
struct FaceCache {
    db: Option<Database>,
    faces: HashMap<String, Option<LoadedFace>>,
}

struct LoadedFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascii: [u16; 128],
}

impl FaceCache {
    fn measure(&mut self, text: &str, font_size: f32, font_family: &str) -> Option<f32> {
        let key = font_family.trim().to_ascii_lowercase();
        if !self.faces.contains_key(&key) {
            let face = self.load(font_family);
            if face.is_none() {
                debug!("no font face for '{font_family}', estimating label widths");
            }
            self.faces.insert(key.clone(), face);
        }
        self.faces.get(&key)?.as_ref()?.width(text, font_size)
    }

    fn load(&mut self, font_family: &str) -> Option<LoadedFace> {
        let db = self.db.get_or_insert_with(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            db
        });
        let families = family_list(font_family);
        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = db.query(&query)?;
        db.with_face_data(id, |data, index| LoadedFace::parse(data.to_vec(), index))
            .flatten()
    }
}

fn family_list(font_family: &str) -> Vec<Family<'_>> {
    let mut families: Vec<Family<'_>> = font_family
        .split(',')
        .map(|part| part.trim().trim_matches('"').trim_matches('\''))
        .filter(|name| !name.is_empty())
        .map(|name| match name.to_ascii_lowercase().as_str() {
            "serif" => Family::Serif,
            "sans-serif" | "system-ui" | "-apple-system" => Family::SansSerif,
            "monospace" => Family::Monospace,
            _ => Family::Name(name),
        })
        .collect();
    families.push(Family::SansSerif);
    families
}

impl LoadedFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let (units_per_em, ascii) = {
            let face = Face::parse(&data, index).ok()?;
            let mut ascii = [0u16; 128];
            for byte in 0u8..128 {
                if let Some(glyph) = face.glyph_index(byte as char) {
                    ascii[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
                }
            }
            (face.units_per_em().max(1) as f32, ascii)
        };
        Some(Self {
            data,
            index,
            units_per_em,
            ascii,
        })
    }

    fn width(&self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em;
        let fallback = font_size * ESTIMATED_CHAR_WIDTH;
        let advance = |units: u16| {
            if units == 0 {
                fallback
            } else {
                units as f32 * scale
            }
        };

        if text.is_ascii() {
            let width: f32 = text
                .bytes()
                .filter(|b| *b != b'\n')
                .map(|b| advance(self.ascii[b as usize]))
                .sum();
            return Some(width);
        }

        let face = Face::parse(&self.data, self.index).ok()?;
        let width: f32 = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map_or(fallback, advance)
            })
            .sum();
        Some(width)
    }
}
