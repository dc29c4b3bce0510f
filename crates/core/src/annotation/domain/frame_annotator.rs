use crate::shared::frame::Frame;

/// Draws onto a decoded frame in place.
///
/// Drawing cannot fail: anything that falls outside the frame is clipped.
pub trait FrameAnnotator: Send {
    fn annotate(&self, frame: &mut Frame);
}
