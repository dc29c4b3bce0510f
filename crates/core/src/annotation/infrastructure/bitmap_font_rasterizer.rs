use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};

use crate::annotation::domain::glyph_rasterizer::GlyphRasterizer;
use crate::annotation::domain::text_mask::TextMask;

/// Side of one glyph cell in the built-in font.
const CELL: usize = 8;

/// Rasterizer backed by the public-domain 8x8 bitmap font from `font8x8`.
///
/// Needs no font file. Glyphs are scaled by the integer factor closest to
/// `size / 8`, so text stays crisp but sizes snap to multiples of 8 px.
/// Characters outside Basic Latin and Latin-1 render as `?`.
pub struct BitmapFontRasterizer;

impl BitmapFontRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Integer magnification applied to the 8x8 cells for a line height.
    pub fn scale_for(size: u32) -> usize {
        ((size as usize + CELL / 2) / CELL).max(1)
    }
}

impl Default for BitmapFontRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GlyphRasterizer for BitmapFontRasterizer {
    fn rasterize_line(&mut self, text: &str, size: u32) -> TextMask {
        let scale = Self::scale_for(size);
        let cell = CELL * scale;
        let chars: Vec<char> = text.chars().collect();
        let mut mask = TextMask::blank(chars.len() * cell, cell);

        for (i, &c) in chars.iter().enumerate() {
            let cell_x = i * cell;
            for (gy, row) in glyph_rows(c).iter().enumerate() {
                // Bit 0 is the leftmost column.
                for gx in (0..CELL).filter(|&gx| row & (1u8 << gx) != 0) {
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let x = cell_x + gx * scale + dx;
                            let y = gy * scale + dy;
                            mask.max_at(x as i64, y as i64, u8::MAX);
                        }
                    }
                }
            }
        }
        mask
    }
}

fn glyph_rows(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}
