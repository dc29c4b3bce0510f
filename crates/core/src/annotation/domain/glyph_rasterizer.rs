use super::text_mask::TextMask;

/// Domain interface for turning a line of text into a coverage mask.
pub trait GlyphRasterizer: Send {
    /// Renders `text` (no line breaks) with a line height of about `size`
    /// pixels.
    ///
    /// The mask's origin is the top-left corner of the line box; its height
    /// is the line height even for blank text.
    fn rasterize_line(&mut self, text: &str, size: u32) -> TextMask;
}
