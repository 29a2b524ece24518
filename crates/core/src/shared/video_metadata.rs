use std::path::PathBuf;

/// Properties of an opened frame source.
///
/// Images are single-frame sources with `fps = 0`. Live cameras report
/// `total_frames = 0` since the stream has no natural end.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Metadata for an output stream sized after its first frame.
    pub fn for_output(width: u32, height: u32, fps: u32) -> Self {
        Self {
            width,
            height,
            fps: fps as f64,
            total_frames: 0,
            source_path: None,
        }
    }

    pub fn is_still_image(&self) -> bool {
        self.total_frames == 1 && self.fps == 0.0
    }
}
