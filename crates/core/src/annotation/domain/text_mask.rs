/// Horizontal alignment of lines inside a multi-line block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineAlign {
    Left,
    Center,
}

/// 8-bit coverage bitmap of rendered text.
///
/// `left`/`top` give the mask's offset from the text origin; they are zero
/// for freshly rasterized text and go negative as the mask is dilated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextMask {
    width: usize,
    height: usize,
    left: i32,
    top: i32,
    alpha: Vec<u8>,
}

impl TextMask {
    pub fn new(width: usize, height: usize, alpha: Vec<u8>) -> Self {
        debug_assert_eq!(alpha.len(), width * height, "alpha length must equal width * height");
        Self {
            width,
            height,
            left: 0,
            top: 0,
            alpha,
        }
    }

    pub fn blank(width: usize, height: usize) -> Self {
        Self::new(width, height, vec![0; width * height])
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn alpha_at(&self, x: usize, y: usize) -> u8 {
        self.alpha[y * self.width + x]
    }

    /// Merges `value` into the pixel at (x, y), keeping the stronger coverage.
    /// Out-of-range coordinates are ignored.
    pub fn max_at(&mut self, x: i64, y: i64, value: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.alpha[idx] = self.alpha[idx].max(value);
    }

    /// Number of pixels with any coverage.
    pub fn coverage(&self) -> usize {
        self.alpha.iter().filter(|&&a| a > 0).count()
    }

    /// Grows every stroke by `radius` pixels in each direction (square
    /// structuring element). The mask grows by `radius` on every side.
    pub fn dilate(&self, radius: usize) -> TextMask {
        self.grow(radius, radius)
    }

    /// Grows every stroke by `before` pixels to the left and up and by
    /// `after` pixels to the right and down, so a stroke `w` pixels wide
    /// becomes `w + before + after` wide.
    pub fn grow(&self, before: usize, after: usize) -> TextMask {
        let span = before + after;
        if span == 0 {
            return self.clone();
        }
        let out_w = self.width + span;
        let out_h = self.height + span;

        // Separable max filter: rows first into a buffer that is only
        // padded horizontally, then columns.
        let mut rows = vec![0u8; out_w * self.height];
        for y in 0..self.height {
            let src = &self.alpha[y * self.width..(y + 1) * self.width];
            for x in 0..out_w {
                rows[y * out_w + x] = window_max(self.width, x, span, |i| src[i]);
            }
        }

        let mut alpha = vec![0u8; out_w * out_h];
        for x in 0..out_w {
            for y in 0..out_h {
                alpha[y * out_w + x] = window_max(self.height, y, span, |i| rows[i * out_w + x]);
            }
        }

        let shift = i32::try_from(before).unwrap_or(i32::MAX);
        TextMask {
            width: out_w,
            height: out_h,
            left: self.left.saturating_sub(shift),
            top: self.top.saturating_sub(shift),
            alpha,
        }
    }

    /// Stacks single-line masks top to bottom with `spacing` pixels between
    /// them. The result's origin is the block's top-left corner.
    pub fn stack(lines: &[TextMask], spacing: usize, align: LineAlign) -> TextMask {
        if lines.is_empty() {
            return TextMask::blank(0, 0);
        }
        let width = lines.iter().map(|l| l.width).max().unwrap_or(0);
        let height =
            lines.iter().map(|l| l.height).sum::<usize>() + spacing * (lines.len() - 1);

        let mut block = TextMask::blank(width, height);
        let mut y_offset = 0;
        for line in lines {
            let x_offset = match align {
                LineAlign::Left => 0,
                LineAlign::Center => (width - line.width) / 2,
            };
            for y in 0..line.height {
                let dst = (y_offset + y) * width + x_offset;
                let src = y * line.width;
                block.alpha[dst..dst + line.width]
                    .copy_from_slice(&line.alpha[src..src + line.width]);
            }
            y_offset += line.height + spacing;
        }
        block
    }
}

/// Max over the source window that maps onto padded output position `pos`,
/// i.e. source indices `pos - span ..= pos`, clamped to `0..len`.
fn window_max(len: usize, pos: usize, span: usize, value: impl Fn(usize) -> u8) -> u8 {
    if len == 0 {
        return 0;
    }
    let lo = pos.saturating_sub(span);
    let hi = pos.min(len - 1);
    (lo..=hi).map(value).max().unwrap_or(0)
}
