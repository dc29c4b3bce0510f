use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annotation::domain::text_overlay::TextOverlay;
use crate::shared::constants::{
    MAX_FONT_SIZE, MAX_OUTLINE_WIDTH, MAX_OVERLAY_CHARS, MAX_THICKNESS,
};

use super::config_error::ConfigError;
use super::video_config::{rebase, VideoConfig};

/// Everything one annotate run needs, loaded once and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotateConfig {
    pub video: VideoConfig,
    /// TrueType/OpenType font; the built-in bitmap font is used when absent.
    #[serde(default)]
    pub font: Option<PathBuf>,
    #[serde(default)]
    pub overlays: Vec<TextOverlay>,
}

impl AnnotateConfig {
    pub fn new(video: VideoConfig, overlays: Vec<TextOverlay>) -> Self {
        Self {
            video,
            font: None,
            overlays,
        }
    }

    /// Reads and validates a JSON job file. Relative paths inside it are
    /// taken relative to the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        config.video.resolve_paths(base);
        config.font = config.font.map(|font| rebase(base, &font));

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.video.validate()?;
        for (i, overlay) in self.overlays.iter().enumerate() {
            validate_overlay(overlay)
                .map_err(|reason| ConfigError::Invalid(format!("overlay {i}: {reason}")))?;
        }
        if self.overlays.is_empty() {
            log::warn!("No overlays configured; output will be a re-encode of the source");
        }
        Ok(())
    }
}

fn validate_overlay(overlay: &TextOverlay) -> Result<(), String> {
    let style = &overlay.style;
    if !(1..=MAX_FONT_SIZE).contains(&style.size) {
        return Err(format!("size must be between 1 and {MAX_FONT_SIZE}"));
    }
    if !(1..=MAX_THICKNESS).contains(&style.thickness) {
        return Err(format!("thickness must be between 1 and {MAX_THICKNESS}"));
    }
    if let Some(outline) = style.outline {
        if outline.width > MAX_OUTLINE_WIDTH {
            return Err(format!("outline width must be at most {MAX_OUTLINE_WIDTH}"));
        }
    }
    if overlay.content.chars().count() > MAX_OVERLAY_CHARS {
        return Err(format!("content must be at most {MAX_OVERLAY_CHARS} characters"));
    }
    Ok(())
}
