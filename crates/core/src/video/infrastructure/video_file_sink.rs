use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_sink::FrameSink;
use crate::video::domain::video_writer::VideoWriter;

/// Appends frames to a video file.
///
/// The writer is opened on the first accepted frame, sized after it, at a
/// fixed frame rate. A run that produces no frames leaves no file behind.
pub struct VideoFileSink {
    writer: Box<dyn VideoWriter>,
    path: PathBuf,
    fps: u32,
    opened: bool,
    frames: usize,
}

impl VideoFileSink {
    pub fn new(writer: Box<dyn VideoWriter>, path: &Path, fps: u32) -> Self {
        Self {
            writer,
            path: path.to_path_buf(),
            fps,
            opened: false,
            frames: 0,
        }
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }
}

impl FrameSink for VideoFileSink {
    fn accept(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if !self.opened {
            let metadata = VideoMetadata::for_output(frame.width(), frame.height(), self.fps);
            self.writer.open(&self.path, &metadata)?;
            self.opened = true;
        }
        self.writer.write(frame)?;
        self.frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.opened {
            log::warn!("No frames were written to {}", self.path.display());
            return Ok(());
        }
        self.opened = false;
        self.writer.close()?;
        log::info!("Wrote {} frames to {}", self.frames, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls {
        opened: Vec<(PathBuf, VideoMetadata)>,
        written: Vec<usize>,
        closed: usize,
    }

    struct StubWriter {
        calls: Arc<Mutex<Calls>>,
    }

    impl VideoWriter for StubWriter {
        fn open(
            &mut self,
            path: &Path,
            metadata: &VideoMetadata,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.calls
                .lock()
                .unwrap()
                .opened
                .push((path.to_path_buf(), metadata.clone()));
            Ok(())
        }

        fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.calls.lock().unwrap().written.push(frame.index());
            Ok(())
        }

        fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            self.calls.lock().unwrap().closed += 1;
            Ok(())
        }
    }

    fn sink() -> (VideoFileSink, Arc<Mutex<Calls>>) {
        let calls = Arc::new(Mutex::new(Calls::default()));
        let writer = StubWriter {
            calls: calls.clone(),
        };
        (
            VideoFileSink::new(Box::new(writer), Path::new("/tmp/out.mp4"), 25),
            calls,
        )
    }

    #[test]
    fn test_opens_lazily_with_first_frame_size() {
        let (mut sink, calls) = sink();
        assert!(calls.lock().unwrap().opened.is_empty());

        sink.accept(&Frame::filled(64, 48, 3, 0)).unwrap();
        sink.accept(&Frame::filled(64, 48, 3, 0).with_index(1)).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.opened.len(), 1);
        let (path, meta) = &calls.opened[0];
        assert_eq!(path, Path::new("/tmp/out.mp4"));
        assert_eq!((meta.width, meta.height), (64, 48));
        assert_eq!(meta.fps, 25.0);
        assert_eq!(calls.written, vec![0, 1]);
    }

    #[test]
    fn test_finish_closes_once() {
        let (mut sink, calls) = sink();
        sink.accept(&Frame::filled(8, 8, 3, 0)).unwrap();
        sink.finish().unwrap();
        sink.finish().unwrap();
        assert_eq!(calls.lock().unwrap().closed, 1);
        assert_eq!(sink.frames_written(), 1);
    }

    #[test]
    fn test_finish_without_frames_never_opens() {
        let (mut sink, calls) = sink();
        sink.finish().unwrap();
        let calls = calls.lock().unwrap();
        assert!(calls.opened.is_empty());
        assert_eq!(calls.closed, 0);
    }
}
