/// Encoder used when the job does not name one (the `mp4v` fourcc).
pub const DEFAULT_CODEC: &str = "mpeg4";

/// Frame rate substituted when a container reports none.
pub const FALLBACK_FPS: f64 = 30.0;

/// Target bits per pixel per frame for the default encoder bit rate.
pub const DEFAULT_BITS_PER_PIXEL: f64 = 0.3;

/// Job file read by the CLI when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "annotate.json";

pub const DEFAULT_FONT_SIZE: u32 = 32;
pub const DEFAULT_THICKNESS: u32 = 2;
pub const DEFAULT_LINE_SPACING: u32 = 8;

/// Upper bounds on overlay style values accepted from a job file. They keep
/// the pre-rendered text masks to a bounded size.
pub const MAX_FONT_SIZE: u32 = 512;
pub const MAX_THICKNESS: u32 = 64;
pub const MAX_OUTLINE_WIDTH: u32 = 64;
pub const MAX_OVERLAY_CHARS: usize = 256;
