use crate::shared::frame::Frame;
use crate::video::domain::frame_sink::FrameSink;

use super::png_codec;

/// Keeps the most recent frame as PNG bytes in memory.
#[derive(Default)]
pub struct PngBufferSink {
    bytes: Option<Vec<u8>>,
}

impl PngBufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        self.bytes
    }
}

impl FrameSink for PngBufferSink {
    fn accept(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.bytes = Some(png_codec::encode_png(frame)?);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
