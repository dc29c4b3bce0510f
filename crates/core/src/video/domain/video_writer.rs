use std::path::Path;

use crate::shared::frame::Frame;

/// Output stream parameters handed to a [`VideoWriter`] when it is opened.
#[derive(Clone, Debug, PartialEq)]
pub struct EncoderSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Encoder name as understood by the backend (e.g. `mpeg4`).
    pub codec: String,
    /// Target bit rate in bits/s. `None` lets the writer pick one.
    pub bit_rate: Option<usize>,
}

/// Abstracts video encoding so the pipeline can write output without
/// depending on a specific codec library.
pub trait VideoWriter: Send {
    fn open(
        &mut self,
        path: &Path,
        settings: &EncoderSettings,
    ) -> Result<(), Box<dyn std::error::Error>>;

    /// Encodes one frame. Any error is fatal for the run.
    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes buffered packets and finalizes the container. Calling it on a
    /// writer that is not open is a no-op.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
