use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Reads frames from an image, a video file or a live device.
///
/// The source runner only sees `Frame` and `VideoMetadata`; decoding,
/// containers and capture APIs stay behind this trait.
pub trait VideoReader: Send {
    /// Opens a file and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in decode order.
    ///
    /// A live source never returns `None` on its own; an `Err` item means
    /// the stream could not produce another frame.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader. Safe to call twice.
    fn close(&mut self);
}
