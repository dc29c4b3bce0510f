use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_FONT_SIZE, DEFAULT_LINE_SPACING, DEFAULT_THICKNESS};

use super::color::Color;

/// Where a text block is placed on the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Centre the block in the frame; each line is centred horizontally.
    Center,
    /// Top-left corner of the block, in frame pixels. May lie outside the
    /// frame, in which case the text is clipped.
    #[serde(untagged)]
    At { x: i32, y: i32 },
}

/// A darker band drawn underneath the text strokes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default = "default_outline_color")]
    pub color: Color,
    /// How far the outline extends past the strokes, in pixels.
    pub width: u32,
}

fn default_outline_color() -> Color {
    Color::BLACK
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    /// Line height in pixels.
    pub size: u32,
    pub color: Color,
    /// Stroke weight: every stroke is widened by `thickness - 1` pixels, so
    /// 1 draws the glyphs as rasterized.
    pub thickness: u32,
    pub outline: Option<Outline>,
    /// Extra pixels between consecutive lines.
    pub line_spacing: u32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: DEFAULT_FONT_SIZE,
            color: Color::WHITE,
            thickness: DEFAULT_THICKNESS,
            outline: None,
            line_spacing: DEFAULT_LINE_SPACING,
        }
    }
}

/// A fixed piece of text drawn identically on every frame.
///
/// `content` may contain `\n` to draw several lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub content: String,
    pub position: Position,
    #[serde(default)]
    pub style: TextStyle,
}

impl TextOverlay {
    pub fn new(content: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            content: content.into(),
            position: Position::At { x, y },
            style: TextStyle::default(),
        }
    }

    #[cfg(test)]
    pub fn centered(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            position: Position::Center,
            style: TextStyle::default(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.content.split('\n')
    }
}
