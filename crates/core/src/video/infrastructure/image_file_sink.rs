use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::video::domain::frame_sink::FrameSink;
use crate::video::domain::image_writer::ImageWriter;

/// Saves the accepted frame as a still image. A later frame overwrites an
/// earlier one.
pub struct ImageFileSink {
    writer: Box<dyn ImageWriter>,
    path: PathBuf,
}

impl ImageFileSink {
    pub fn new(writer: Box<dyn ImageWriter>, path: &Path) -> Self {
        Self {
            writer,
            path: path.to_path_buf(),
        }
    }
}

impl FrameSink for ImageFileSink {
    fn accept(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        self.writer.write(&self.path, frame)?;
        log::info!("Saved {}", self.path.display());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct StubImageWriter {
        written: Arc<Mutex<Vec<(PathBuf, Frame)>>>,
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), frame.clone()));
            Ok(())
        }
    }

    #[test]
    fn test_accept_writes_to_configured_path() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let writer = StubImageWriter {
            written: written.clone(),
        };
        let mut sink = ImageFileSink::new(Box::new(writer), Path::new("out/face.png"));

        let frame = Frame::filled(4, 4, 3, 9);
        sink.accept(&frame).unwrap();
        sink.finish().unwrap();

        let written = written.lock().unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, PathBuf::from("out/face.png"));
        assert_eq!(written[0].1, frame);
    }
}
