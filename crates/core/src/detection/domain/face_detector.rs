use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::{ChannelOrder, Frame};

/// Domain interface for face detection.
///
/// Returned boxes are normalized to the frame's dimensions. Implementations
/// hold model state and are not required to be reentrant, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>>;

    /// Channel order the detector expects its input frames in.
    fn channel_order(&self) -> ChannelOrder {
        ChannelOrder::Rgb
    }
}
