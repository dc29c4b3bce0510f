use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_CODEC, FALLBACK_FPS};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::EncoderSettings;

use super::config_error::ConfigError;

/// Source, destination and output stream parameters for one run.
///
/// `width`, `height` and `frame_rate` default to the source's own values.
/// When a size is given that differs from the source, frames are resampled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VideoConfig {
    pub source_path: PathBuf,
    pub destination_path: PathBuf,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub frame_rate: Option<f64>,
    #[serde(default = "default_codec")]
    pub codec: String,
    /// Bits per second; derived from size and frame rate when absent.
    #[serde(default)]
    pub bit_rate: Option<usize>,
}

fn default_codec() -> String {
    DEFAULT_CODEC.to_string()
}

impl VideoConfig {
    pub fn new(source_path: impl Into<PathBuf>, destination_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            destination_path: destination_path.into(),
            width: None,
            height: None,
            frame_rate: None,
            codec: default_codec(),
            bit_rate: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_frame_rate(mut self, frame_rate: f64) -> Self {
        self.frame_rate = Some(frame_rate);
        self
    }

    #[cfg(test)]
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.width, self.height) {
            (Some(_), None) | (None, Some(_)) => {
                return Err(ConfigError::Invalid(
                    "width and height must be given together".into(),
                ));
            }
            (Some(w), Some(h)) => {
                if w == 0 || h == 0 {
                    return Err(ConfigError::Invalid(format!(
                        "output size must be positive, got {w}x{h}"
                    )));
                }
                if w % 2 != 0 || h % 2 != 0 {
                    return Err(ConfigError::Invalid(format!(
                        "output size must be even for 4:2:0 encoding, got {w}x{h}"
                    )));
                }
            }
            (None, None) => {}
        }
        if let Some(fps) = self.frame_rate {
            if !(fps.is_finite() && fps > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "frame rate must be positive, got {fps}"
                )));
            }
        }
        if self.codec.trim().is_empty() {
            return Err(ConfigError::Invalid("codec must not be empty".into()));
        }
        if self.bit_rate == Some(0) {
            return Err(ConfigError::Invalid("bit rate must be positive".into()));
        }
        if self.source_path == self.destination_path {
            return Err(ConfigError::Invalid(format!(
                "destination {} would overwrite the source",
                self.destination_path.display()
            )));
        }
        Ok(())
    }

    /// Output size: the configured one, else the source's.
    pub fn output_size(&self, source: &VideoMetadata) -> (u32, u32) {
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            _ => (source.width, source.height),
        }
    }

    /// Output frame rate: configured, else the source's, else a fallback.
    pub fn output_frame_rate(&self, source: &VideoMetadata) -> f64 {
        self.frame_rate
            .or_else(|| (source.fps > 0.0).then_some(source.fps))
            .unwrap_or(FALLBACK_FPS)
    }

    pub fn encoder_settings(&self, source: &VideoMetadata) -> EncoderSettings {
        let (width, height) = self.output_size(source);
        EncoderSettings {
            width,
            height,
            fps: self.output_frame_rate(source),
            codec: self.codec.clone(),
            bit_rate: self.bit_rate,
        }
    }

    /// Rebases relative paths onto `base`.
    pub(crate) fn resolve_paths(&mut self, base: &Path) {
        self.source_path = rebase(base, &self.source_path);
        self.destination_path = rebase(base, &self.destination_path);
    }
}

pub(crate) fn rebase(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
