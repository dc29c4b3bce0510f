use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use fontdue::layout::{
    CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle as LayoutStyle,
};
use fontdue::{Font, FontSettings};
use thiserror::Error;

use crate::annotation::domain::glyph_rasterizer::GlyphRasterizer;
use crate::annotation::domain::text_mask::TextMask;

#[derive(Debug, Error)]
pub enum FontError {
    #[error("failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse font {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Rasterizes TrueType/OpenType fonts with `fontdue`.
pub struct FontdueRasterizer {
    font: Font,
    glyph_cache: HashMap<GlyphRasterConfig, Vec<u8>>,
}

impl FontdueRasterizer {
    pub fn from_file(path: &Path) -> Result<Self, FontError> {
        let bytes = fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|message| {
            FontError::Parse {
                path: path.to_path_buf(),
                message: message.to_string(),
            }
        })?;
        Ok(Self {
            font,
            glyph_cache: HashMap::new(),
        })
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn rasterize_line(&mut self, text: &str, size: u32) -> TextMask {
        let px = size.max(1) as f32;
        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings::default());
        layout.append(&[&self.font], &LayoutStyle::new(text, px, 0));

        let glyphs = layout.glyphs();
        let width = glyphs
            .iter()
            .map(|g| g.x.max(0.0).round() as usize + g.width)
            .max()
            .unwrap_or(0);
        let height = (layout.height().ceil() as usize).max(size as usize);
        let mut mask = TextMask::blank(width, height);

        for glyph in glyphs {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let bitmap = self
                .glyph_cache
                .entry(glyph.key)
                .or_insert_with(|| self.font.rasterize_config(glyph.key).1);

            let origin_x = glyph.x.round() as i64;
            let origin_y = glyph.y.round() as i64;
            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    let coverage = bitmap[gy * glyph.width + gx];
                    if coverage > 0 {
                        mask.max_at(origin_x + gx as i64, origin_y + gy as i64, coverage);
                    }
                }
            }
        }
        mask
    }
}
