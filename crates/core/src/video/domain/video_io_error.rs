use std::path::PathBuf;

use thiserror::Error;

/// I/O failures raised by the video adapters.
#[derive(Debug, Error)]
pub enum VideoIoError {
    #[error("source video not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("no decodable video stream in {0}")]
    NoVideoStream(PathBuf),
    #[error("encoder '{0}' is not available")]
    EncoderNotFound(String),
    #[error("{0}: not opened")]
    NotOpened(&'static str),
    #[error("frame is {actual_width}x{actual_height}, writer expects {expected_width}x{expected_height}")]
    FrameSizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("output size {width}x{height} is not supported: width and height must be even")]
    OddFrameSize { width: u32, height: u32 },
    #[error("source advertised {expected} frames but only {decoded} could be decoded")]
    TruncatedStream { expected: usize, decoded: usize },
}
