use std::path::Path;

use crate::annotation::domain::glyph_rasterizer::GlyphRasterizer;

use super::bitmap_font_rasterizer::BitmapFontRasterizer;
use super::fontdue_rasterizer::{FontError, FontdueRasterizer};

/// Creates the rasterizer for a job: the given font file, or the built-in
/// bitmap font when none is configured. Logs which one is selected.
pub fn create_rasterizer(font: Option<&Path>) -> Result<Box<dyn GlyphRasterizer>, FontError> {
    match font {
        Some(path) => {
            log::info!("Rendering text with font {}", path.display());
            Ok(Box::new(FontdueRasterizer::from_file(path)?))
        }
        None => {
            log::info!("No font configured, rendering text with the built-in 8x8 font");
            Ok(Box::new(BitmapFontRasterizer::new()))
        }
    }
}
