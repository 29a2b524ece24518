use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;

/// Domain interface for obscuring one face region of a frame.
///
/// Implementations modify the frame in place and must not touch any pixel
/// outside `rect`. The rect is already clamped and non-empty; implementations
/// reject a rect that does not fit the frame.
pub trait FrameAnonymizer: Send + Sync {
    fn anonymize(&self, frame: &mut Frame, rect: &PixelRect)
        -> Result<(), Box<dyn std::error::Error>>;
}
