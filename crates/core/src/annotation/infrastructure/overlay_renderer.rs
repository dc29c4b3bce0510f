use crate::annotation::domain::color::Color;
use crate::annotation::domain::frame_annotator::FrameAnnotator;
use crate::annotation::domain::glyph_rasterizer::GlyphRasterizer;
use crate::annotation::domain::text_mask::{LineAlign, TextMask};
use crate::annotation::domain::text_overlay::{Position, TextOverlay};
use crate::shared::frame::Frame;

/// One overlay, rasterized once and reused for every frame.
struct RenderedOverlay {
    position: Position,
    /// Undilated block size, used for placement.
    block_width: usize,
    block_height: usize,
    fill: TextMask,
    color: Color,
    outline: Option<(TextMask, Color)>,
}

/// Burns a fixed list of text overlays into frames.
///
/// Text is static for the whole run, so every overlay is rasterized up
/// front and each frame only pays for alpha compositing. Overlays are drawn
/// in list order; later entries cover earlier ones.
pub struct OverlayRenderer {
    overlays: Vec<RenderedOverlay>,
}

impl OverlayRenderer {
    pub fn new(overlays: &[TextOverlay], rasterizer: &mut dyn GlyphRasterizer) -> Self {
        let overlays = overlays
            .iter()
            .map(|overlay| render_overlay(overlay, rasterizer))
            .collect();
        Self { overlays }
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Top-left corner of overlay `index`'s text block on a frame of the
    /// given size, before any stroke or outline widening.
    #[cfg(test)]
    pub fn origin(&self, index: usize, frame_width: u32, frame_height: u32) -> Option<(i64, i64)> {
        self.overlays
            .get(index)
            .map(|o| block_origin(o, frame_width, frame_height))
    }
}

impl FrameAnnotator for OverlayRenderer {
    fn annotate(&self, frame: &mut Frame) {
        let (fw, fh) = (frame.width(), frame.height());
        for overlay in &self.overlays {
            let (x, y) = block_origin(overlay, fw, fh);
            if let Some((mask, color)) = &overlay.outline {
                blend_mask(frame, mask, x, y, *color);
            }
            blend_mask(frame, &overlay.fill, x, y, overlay.color);
        }
    }
}

fn render_overlay(overlay: &TextOverlay, rasterizer: &mut dyn GlyphRasterizer) -> RenderedOverlay {
    let style = &overlay.style;
    let lines: Vec<TextMask> = overlay
        .lines()
        .map(|line| rasterizer.rasterize_line(line, style.size))
        .collect();
    let align = match overlay.position {
        Position::Center => LineAlign::Center,
        Position::At { .. } => LineAlign::Left,
    };
    let block = TextMask::stack(&lines, style.line_spacing as usize, align);

    let fill = stroke(&block, style.thickness);
    let outline = style
        .outline
        .filter(|o| o.width > 0)
        .map(|o| (fill.dilate(o.width as usize), o.color));

    log::debug!(
        "Rasterized overlay {:?}: {}x{} px, {} covered",
        overlay.content,
        block.width(),
        block.height(),
        fill.coverage()
    );

    RenderedOverlay {
        position: overlay.position,
        block_width: block.width(),
        block_height: block.height(),
        fill,
        color: style.color,
        outline,
    }
}

/// Widens every stroke by `thickness - 1` pixels, the odd pixel going to
/// the right and bottom.
fn stroke(block: &TextMask, thickness: u32) -> TextMask {
    let extra = thickness.saturating_sub(1) as usize;
    block.grow(extra / 2, extra - extra / 2)
}

fn block_origin(overlay: &RenderedOverlay, frame_width: u32, frame_height: u32) -> (i64, i64) {
    match overlay.position {
        Position::At { x, y } => (i64::from(x), i64::from(y)),
        Position::Center => (
            (i64::from(frame_width) - overlay.block_width as i64) / 2,
            (i64::from(frame_height) - overlay.block_height as i64) / 2,
        ),
    }
}

/// Alpha-blends `color` into `frame` wherever `mask` has coverage. The part
/// of the mask that falls outside the frame is skipped.
fn blend_mask(frame: &mut Frame, mask: &TextMask, origin_x: i64, origin_y: i64, color: Color) {
    let left = origin_x + i64::from(mask.left());
    let top = origin_y + i64::from(mask.top());
    let x0 = left.max(0);
    let y0 = top.max(0);
    let x1 = (left + mask.width() as i64).min(i64::from(frame.width()));
    let y1 = (top + mask.height() as i64).min(i64::from(frame.height()));
    if x0 >= x1 || y0 >= y1 {
        return;
    }

    let rgb = color.to_array();
    let mut pixels = frame.as_ndarray_mut();
    for y in y0..y1 {
        for x in x0..x1 {
            let alpha = u32::from(mask.alpha_at((x - left) as usize, (y - top) as usize));
            if alpha == 0 {
                continue;
            }
            for (c, &value) in rgb.iter().enumerate() {
                let px = &mut pixels[[y as usize, x as usize, c]];
                *px = ((u32::from(*px) * (255 - alpha) + u32::from(value) * alpha + 127) / 255)
                    as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::domain::text_overlay::{Outline, TextStyle};
    use crate::annotation::infrastructure::bitmap_font_rasterizer::BitmapFontRasterizer;
    use rstest::rstest;

    /// Renders every line as a solid block, `size / 2` wide per character.
    struct BlockRasterizer;

    impl GlyphRasterizer for BlockRasterizer {
        fn rasterize_line(&mut self, text: &str, size: u32) -> TextMask {
            let w = text.chars().count() * (size as usize / 2);
            let h = size as usize;
            TextMask::new(w, h, vec![255; w * h])
        }
    }

    const BLACK: [u8; 3] = [0, 0, 0];

    fn style(size: u32, color: Color) -> TextStyle {
        TextStyle {
            size,
            color,
            thickness: 1,
            outline: None,
            line_spacing: 0,
        }
    }

    fn renderer(overlays: &[TextOverlay]) -> OverlayRenderer {
        OverlayRenderer::new(overlays, &mut BlockRasterizer)
    }

    fn painted(frame: &Frame, background: [u8; 3]) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if frame.pixel(x, y) != background {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_draws_at_configured_position() {
        // "AB" at size 4 -> 4x4 block
        let r = renderer(&[TextOverlay::new("AB", 10, 5).with_style(style(4, Color::WHITE))]);
        let mut frame = Frame::filled(32, 16, BLACK, 0);
        r.annotate(&mut frame);

        let hits = painted(&frame, BLACK);
        assert_eq!(hits.len(), 16);
        assert!(hits.iter().all(|&(x, y)| (10..14).contains(&x) && (5..9).contains(&y)));
        assert_eq!(frame.pixel(10, 5), [255, 255, 255]);
        assert_eq!(frame.pixel(13, 8), [255, 255, 255]);
    }

    #[test]
    fn test_no_overlays_leaves_frame_untouched() {
        let r = renderer(&[]);
        assert!(r.is_empty());
        let mut frame = Frame::filled(8, 8, [12, 34, 56], 0);
        let original = frame.clone();
        r.annotate(&mut frame);
        assert_eq!(frame, original);
    }

    #[test]
    fn test_text_past_edges_is_clipped() {
        let r = renderer(&[
            TextOverlay::new("AB", -2, -2).with_style(style(4, Color::WHITE)),
            TextOverlay::new("AB", 30, 14).with_style(style(4, Color::WHITE)),
            TextOverlay::new("AB", 500, 500).with_style(style(4, Color::WHITE)),
            TextOverlay::new("AB", -500, 0).with_style(style(4, Color::WHITE)),
        ]);
        let mut frame = Frame::filled(32, 16, BLACK, 0);
        r.annotate(&mut frame);

        // 2x2 visible at the top-left corner, 2x2 at the bottom-right
        assert_eq!(painted(&frame, BLACK).len(), 8);
        assert_eq!(frame.pixel(0, 0), [255, 255, 255]);
        assert_eq!(frame.pixel(31, 15), [255, 255, 255]);
    }

    #[test]
    fn test_later_overlays_cover_earlier_ones() {
        let red = Color::rgb(255, 0, 0);
        let blue = Color::rgb(0, 0, 255);
        let r = renderer(&[
            TextOverlay::new("AB", 0, 0).with_style(style(4, red)),
            TextOverlay::new("AB", 2, 0).with_style(style(4, blue)),
        ]);
        let mut frame = Frame::filled(16, 8, BLACK, 0);
        r.annotate(&mut frame);

        assert_eq!(frame.pixel(1, 1), [255, 0, 0]);
        assert_eq!(frame.pixel(2, 1), [0, 0, 255]);
        assert_eq!(frame.pixel(5, 1), [0, 0, 255]);
    }

    #[test]
    fn test_centered_block_is_centered() {
        let r = renderer(&[TextOverlay::centered("ABCD").with_style(style(4, Color::WHITE))]);
        // block is 8x4 on a 20x10 frame
        assert_eq!(r.origin(0, 20, 10), Some((6, 3)));

        let mut frame = Frame::filled(20, 10, BLACK, 0);
        r.annotate(&mut frame);
        let hits = painted(&frame, BLACK);
        assert_eq!(hits.len(), 32);
        assert!(hits.iter().all(|&(x, y)| (6..14).contains(&x) && (3..7).contains(&y)));
    }

    #[test]
    fn test_centered_lines_are_individually_centered() {
        let mut s = style(4, Color::WHITE);
        s.line_spacing = 2;
        let r = renderer(&[TextOverlay::centered("ABCD\nAB").with_style(s)]);
        // block 8 wide, 4 + 2 + 4 tall on a 20x20 frame -> origin (6, 5)
        assert_eq!(r.origin(0, 20, 20), Some((6, 5)));

        let mut frame = Frame::filled(20, 20, BLACK, 0);
        r.annotate(&mut frame);
        // second line (4 wide) sits at x 8..12, y 11..15
        assert_eq!(frame.pixel(8, 11), [255, 255, 255]);
        assert_eq!(frame.pixel(11, 14), [255, 255, 255]);
        assert_eq!(frame.pixel(7, 11), BLACK);
        assert_eq!(frame.pixel(12, 11), BLACK);
        // spacing rows stay clear
        assert_eq!(frame.pixel(8, 9), BLACK);
    }

    #[test]
    fn test_outline_surrounds_fill() {
        let mut s = style(4, Color::WHITE);
        s.outline = Some(Outline {
            color: Color::rgb(255, 0, 0),
            width: 1,
        });
        let r = renderer(&[TextOverlay::new("AB", 5, 5).with_style(s)]);
        let mut frame = Frame::filled(16, 16, BLACK, 0);
        r.annotate(&mut frame);

        assert_eq!(frame.pixel(5, 5), [255, 255, 255]);
        assert_eq!(frame.pixel(4, 4), [255, 0, 0]);
        assert_eq!(frame.pixel(9, 9), [255, 0, 0]);
        assert_eq!(frame.pixel(3, 3), BLACK);
        assert_eq!(painted(&frame, BLACK).len(), 36);
    }

    #[test]
    fn test_thickness_widens_strokes() {
        let mut s = style(4, Color::WHITE);
        s.thickness = 4;
        let r = renderer(&[TextOverlay::new("AB", 5, 5).with_style(s)]);
        let mut frame = Frame::filled(16, 16, BLACK, 0);
        r.annotate(&mut frame);
        // 4x4 block grown by 1 up/left and 2 down/right
        assert_eq!(painted(&frame, BLACK).len(), 49);
        assert_eq!(frame.pixel(4, 4), [255, 255, 255]);
        assert_eq!(frame.pixel(10, 10), [255, 255, 255]);
        assert_eq!(frame.pixel(3, 3), BLACK);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    #[case(5)]
    fn test_hairline_stroke_is_thickness_pixels_wide(#[case] thickness: u32) {
        struct HairlineRasterizer;
        impl GlyphRasterizer for HairlineRasterizer {
            fn rasterize_line(&mut self, _text: &str, size: u32) -> TextMask {
                TextMask::new(1, size as usize, vec![255; size as usize])
            }
        }
        let mut s = style(8, Color::WHITE);
        s.thickness = thickness;
        let overlay = TextOverlay::new("|", 10, 2).with_style(s);
        let r = OverlayRenderer::new(&[overlay], &mut HairlineRasterizer);
        let mut frame = Frame::filled(24, 16, BLACK, 0);
        r.annotate(&mut frame);

        let run = (0..24).filter(|&x| frame.pixel(x, 5) != BLACK).count();
        assert_eq!(run, thickness as usize);
    }

    #[test]
    fn test_partial_coverage_blends() {
        struct HalfRasterizer;
        impl GlyphRasterizer for HalfRasterizer {
            fn rasterize_line(&mut self, _text: &str, _size: u32) -> TextMask {
                TextMask::new(1, 1, vec![128])
            }
        }
        let overlay = TextOverlay::new("x", 0, 0).with_style(style(1, Color::WHITE));
        let r = OverlayRenderer::new(&[overlay], &mut HalfRasterizer);
        let mut frame = Frame::filled(2, 2, BLACK, 0);
        r.annotate(&mut frame);
        assert_eq!(frame.pixel(0, 0), [128, 128, 128]);
    }

    #[test]
    fn test_hello_at_50_50_on_vga_frame() {
        let overlay = TextOverlay::new("HELLO", 50, 50).with_style(TextStyle {
            thickness: 1,
            ..TextStyle::default()
        });
        let r = OverlayRenderer::new(&[overlay], &mut BitmapFontRasterizer::new());
        let mut frame = Frame::filled(640, 480, [40, 80, 120], 0);
        r.annotate(&mut frame);

        let hits = painted(&frame, [40, 80, 120]);
        assert!(!hits.is_empty());
        // 5 glyphs of 32x32 starting at (50, 50)
        assert!(hits
            .iter()
            .all(|&(x, y)| (50..210).contains(&x) && (50..82).contains(&y)));
        assert!(hits.iter().all(|&(x, y)| frame.pixel(x, y) == [255, 255, 255]));
    }

    #[test]
    fn test_annotating_identical_frames_gives_identical_output() {
        let r = OverlayRenderer::new(
            &[TextOverlay::centered("same\nevery time")],
            &mut BitmapFontRasterizer::new(),
        );
        let mut a = Frame::filled(200, 100, [9, 9, 9], 0);
        let mut b = Frame::filled(200, 100, [9, 9, 9], 1);
        r.annotate(&mut a);
        r.annotate(&mut b);
        assert_eq!(a.data(), b.data());
    }
}
