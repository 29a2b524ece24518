use crate::shared::frame::Frame;

/// Destination for processed frames: an image file, a video container, an
/// in-memory buffer or a display.
pub trait FrameSink: Send {
    fn accept(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Called once after the last frame, on success or failure.
    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
