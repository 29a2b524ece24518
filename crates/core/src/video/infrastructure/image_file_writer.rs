use std::path::Path;

use crate::shared::frame::{ChannelOrder, Frame};
use crate::video::domain::image_writer::ImageWriter;

/// Saves a frame with the `image` crate; the extension picks the format.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let frame = frame.in_order(ChannelOrder::Rgb);
        let (w, h) = (frame.width(), frame.height());
        match frame.channels() {
            3 => image::RgbImage::from_raw(w, h, frame.data().to_vec())
                .ok_or("frame buffer does not match its dimensions")?
                .save(path)?,
            4 => image::RgbaImage::from_raw(w, h, frame.data().to_vec())
                .ok_or("frame buffer does not match its dimensions")?
                .save(path)?,
            n => return Err(format!("cannot save a {n}-channel frame").into()),
        }
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}
