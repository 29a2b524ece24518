use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::anonymizing::domain::effect_kind::EffectKind;
use crate::shared::constants::{IMAGE_EXTENSIONS, OUTPUT_FPS, VIDEO_EXTENSIONS};
use crate::shared::error::AnonymizeError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::frame_sink::FrameSink;
use crate::video::domain::image_writer::ImageWriter;
use crate::video::domain::video_reader::VideoReader;
use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use crate::video::infrastructure::image_file_reader::ImageFileReader;
use crate::video::infrastructure::image_file_sink::ImageFileSink;
use crate::video::infrastructure::image_file_writer::ImageFileWriter;
use crate::video::infrastructure::png_buffer_sink::PngBufferSink;
use crate::video::infrastructure::png_codec;
use crate::video::infrastructure::video_file_sink::VideoFileSink;

use super::frame_pipeline::FramePipeline;
use super::interactive_controller::InteractiveController;
use super::key_source::KeySource;
use super::pipeline_logger::PipelineLogger;

/// Input classification by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Image,
    Video,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self, AnonymizeError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Ok(SourceKind::Image)
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Ok(SourceKind::Video)
        } else {
            Err(AnonymizeError::UnsupportedFileType(path.to_path_buf()))
        }
    }
}

/// Frame and face counts for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub faces: usize,
}

struct SnapshotTarget {
    writer: Box<dyn ImageWriter>,
    dir: PathBuf,
    taken: usize,
}

/// Drives frames from a source through the [`FramePipeline`] into a sink.
///
/// Processing is strictly sequential: each frame is detected, anonymized,
/// annotated and handed to the sink before the next one is read. The reader
/// is closed and the sink finished on every exit path once the source has
/// been opened.
pub struct SourceRunner {
    pipeline: FramePipeline,
    logger: Box<dyn PipelineLogger>,
    output_fps: u32,
    snapshots: Option<SnapshotTarget>,
}

impl SourceRunner {
    pub fn new(pipeline: FramePipeline, logger: Box<dyn PipelineLogger>) -> Self {
        Self {
            pipeline,
            logger,
            output_fps: OUTPUT_FPS,
            snapshots: None,
        }
    }

    pub fn with_output_fps(mut self, fps: u32) -> Self {
        self.output_fps = fps;
        self
    }

    /// Live sessions save a frame here on the snapshot key.
    pub fn with_snapshots(mut self, writer: Box<dyn ImageWriter>, dir: &Path) -> Self {
        self.snapshots = Some(SnapshotTarget {
            writer,
            dir: dir.to_path_buf(),
            taken: 0,
        });
        self
    }

    pub fn pipeline_mut(&mut self) -> &mut FramePipeline {
        &mut self.pipeline
    }

    /// Classifies `input` and runs it with the built-in file readers and
    /// sinks. Video output is re-encoded at the configured output rate.
    pub fn run_file(
        &mut self,
        input: &Path,
        output: &Path,
        effect: EffectKind,
    ) -> Result<RunSummary, Box<dyn std::error::Error>> {
        match SourceKind::from_path(input)? {
            SourceKind::Image => {
                let mut reader = ImageFileReader::new();
                let mut sink = ImageFileSink::new(Box::new(ImageFileWriter::new()), output);
                self.run_image(&mut reader, input, &mut sink, effect)
            }
            SourceKind::Video => {
                let mut reader = FfmpegReader::new();
                let mut sink =
                    VideoFileSink::new(Box::new(FfmpegWriter::new()), output, self.output_fps);
                self.run_video(&mut reader, input, &mut sink, effect)
            }
        }
    }

    /// Reads exactly one frame, processes it once and hands it to `sink`.
    pub fn run_image(
        &mut self,
        reader: &mut dyn VideoReader,
        path: &Path,
        sink: &mut dyn FrameSink,
        effect: EffectKind,
    ) -> Result<RunSummary, Box<dyn std::error::Error>> {
        let metadata = open_source(reader, path)?;
        if !metadata.is_still_image() {
            log::debug!("{} has more than one frame; using the first", path.display());
        }

        let first = reader.frames().next();
        reader.close();
        let result = match first {
            Some(Ok(mut frame)) => self
                .process(&mut frame, effect, Some(&mut *sink))
                .map(|faces| RunSummary { frames: 1, faces }),
            Some(Err(e)) => Err(AnonymizeError::unreadable(path, e).into()),
            None => Err(AnonymizeError::EmptyStream(path.display().to_string()).into()),
        };
        let result = finish_sink(result, sink);
        self.logger.summary();
        result
    }

    /// Processes every frame of a finite video into `sink`.
    ///
    /// A missing or unreadable first frame fails the run. A read failure
    /// after that ends the stream normally.
    pub fn run_video(
        &mut self,
        reader: &mut dyn VideoReader,
        path: &Path,
        sink: &mut dyn FrameSink,
        effect: EffectKind,
    ) -> Result<RunSummary, Box<dyn std::error::Error>> {
        let metadata = open_source(reader, path)?;
        log::info!(
            "Processing {} ({}x{}, {:.2} fps, {} frames) with {effect}",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.fps,
            metadata.total_frames
        );

        let result = self.drive(
            reader,
            &path.display().to_string(),
            metadata.total_frames,
            Some(&mut *sink),
            None,
            effect,
        );
        reader.close();
        let result = finish_sink(result, sink);
        self.logger.summary();
        result
    }

    /// Processes a live stream from an already opened `reader` until the
    /// controller signals quit or the stream fails.
    ///
    /// The controller is polled once per frame, after that frame is
    /// processed, so effect changes apply from the next frame on.
    pub fn run_camera(
        &mut self,
        reader: &mut dyn VideoReader,
        device: &str,
        mut record: Option<&mut dyn FrameSink>,
        controller: &mut InteractiveController,
        keys: &mut dyn KeySource,
    ) -> Result<RunSummary, Box<dyn std::error::Error>> {
        log::info!("Live session on {device}, starting with {}", controller.effect());
        let result = self.drive(
            reader,
            device,
            0,
            record.as_deref_mut(),
            Some((controller, keys)),
            EffectKind::default(),
        );
        reader.close();
        let result = match record {
            Some(sink) => finish_sink(result, sink),
            None => result,
        };
        self.logger.summary();
        result
    }

    /// Decodes an encoded image, processes it and returns it as PNG bytes.
    pub fn process_encoded(
        &mut self,
        bytes: &[u8],
        effect: EffectKind,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let mut frame = png_codec::decode_image(bytes)
            .map_err(|e| AnonymizeError::unreadable("<in-memory image>", e))?;
        let mut sink = PngBufferSink::new();
        self.process(&mut frame, effect, Some(&mut sink))?;
        Ok(sink.into_bytes().ok_or("no frame was encoded")?)
    }

    fn drive(
        &mut self,
        reader: &mut dyn VideoReader,
        source: &str,
        total: usize,
        mut sink: Option<&mut (dyn FrameSink + '_)>,
        mut live: Option<(&mut InteractiveController, &mut dyn KeySource)>,
        effect: EffectKind,
    ) -> Result<RunSummary, Box<dyn std::error::Error>> {
        let mut summary = RunSummary::default();
        let mut frames = reader.frames();

        loop {
            let mut frame = match frames.next() {
                Some(Ok(frame)) => frame,
                Some(Err(e)) if summary.frames == 0 => {
                    return Err(AnonymizeError::unreadable(source, e).into());
                }
                None if summary.frames == 0 => {
                    return Err(AnonymizeError::EmptyStream(source.to_string()).into());
                }
                Some(Err(e)) => {
                    log::warn!("Stopping {source} after {} frames: {e}", summary.frames);
                    break;
                }
                None => break,
            };

            let effect = live.as_ref().map_or(effect, |(c, _)| c.effect());
            summary.faces += self.process(&mut frame, effect, sink.as_deref_mut())?;
            summary.frames += 1;
            self.logger.progress(summary.frames, total);

            if let Some((controller, keys)) = live.as_mut() {
                let signal = controller.poll(&mut **keys);
                if signal.snapshot {
                    self.snapshot(&frame, effect);
                }
                if signal.quit {
                    break;
                }
            }
        }

        Ok(summary)
    }

    fn process(
        &mut self,
        frame: &mut Frame,
        effect: EffectKind,
        sink: Option<&mut (dyn FrameSink + '_)>,
    ) -> Result<usize, Box<dyn std::error::Error>> {
        let outcome = self.pipeline.run(frame, effect)?;
        self.logger.timing("detect", outcome.detect_ms);
        self.logger.timing("anonymize", outcome.anonymize_ms);
        self.logger.metric("faces", outcome.detections.len() as f64);

        if let Some(sink) = sink {
            let sink_start = Instant::now();
            sink.accept(frame)?;
            self.logger
                .timing("sink", sink_start.elapsed().as_secs_f64() * 1000.0);
        }
        Ok(outcome.anonymized)
    }

    fn snapshot(&mut self, frame: &Frame, effect: EffectKind) {
        let Some(target) = self.snapshots.as_mut() else {
            log::warn!("Snapshot requested but no snapshot directory is configured");
            return;
        };
        target.taken += 1;
        let path = target
            .dir
            .join(format!("anonymized_{effect}_{}.png", target.taken));
        match target.writer.write(&path, frame) {
            Ok(()) => self.logger.info(&format!("Snapshot saved to {}", path.display())),
            Err(e) => log::warn!("Could not save snapshot {}: {e}", path.display()),
        }
    }
}

fn open_source(
    reader: &mut dyn VideoReader,
    path: &Path,
) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
    reader.open(path).map_err(|e| {
        reader.close();
        if e.is::<AnonymizeError>() {
            e
        } else {
            AnonymizeError::unreadable(path, e).into()
        }
    })
}

/// Finishes the sink; a run error takes precedence over a finish error.
fn finish_sink(
    result: Result<RunSummary, Box<dyn std::error::Error>>,
    sink: &mut dyn FrameSink,
) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let finished = sink.finish();
    match (result, finished) {
        (Err(e), Err(finish_err)) => {
            log::warn!("Sink cleanup failed after error: {finish_err}");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(_), Err(e)) => Err(e),
        (Ok(summary), Ok(())) => Ok(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymizing::infrastructure::anonymizer_set::AnonymizerSet;
    use crate::detection::domain::face_detector::FaceDetector;
    use crate::pipeline::key_source::{KeyPress, NoKeys};
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::settings::AnonymizeSettings;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubReader {
        frames: Vec<Result<Frame, String>>,
        fps: f64,
        fail_open: bool,
        closed: Arc<Mutex<usize>>,
    }

    impl StubReader {
        fn video(count: usize) -> Self {
            Self {
                frames: (0..count)
                    .map(|i| Ok(Frame::filled(40, 40, 3, 255).with_index(i)))
                    .collect(),
                fps: 30.0,
                fail_open: false,
                closed: Arc::new(Mutex::new(0)),
            }
        }

        fn image() -> Self {
            Self {
                fps: 0.0,
                ..Self::video(1)
            }
        }
    }

    impl VideoReader for StubReader {
        fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err("moov atom not found".into());
            }
            Ok(VideoMetadata {
                width: 40,
                height: 40,
                fps: self.fps,
                total_frames: self.frames.len(),
                source_path: Some(path.to_path_buf()),
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            Box::new(self.frames.drain(..).map(|r| r.map_err(Into::into)))
        }

        fn close(&mut self) {
            *self.closed.lock().unwrap() += 1;
        }
    }

    #[derive(Clone, Default)]
    struct StubSink {
        accepted: Arc<Mutex<Vec<Frame>>>,
        finished: Arc<Mutex<usize>>,
    }

    impl FrameSink for StubSink {
        fn accept(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.accepted.lock().unwrap().push(frame.clone());
            Ok(())
        }

        fn finish(&mut self) -> Result<(), Box<dyn std::error::Error>> {
            *self.finished.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct StubDetector {
        boxes: Vec<BoundingBox>,
        fail_on: Option<usize>,
    }

    impl FaceDetector for StubDetector {
        fn detect(
            &mut self,
            frame: &Frame,
        ) -> Result<Vec<BoundingBox>, Box<dyn std::error::Error>> {
            if self.fail_on == Some(frame.index()) {
                return Err("session run failed".into());
            }
            Ok(self.boxes.clone())
        }
    }

    #[derive(Default)]
    struct RecordingLogger {
        timings: Arc<Mutex<Vec<String>>>,
        progress: Arc<Mutex<Vec<(usize, usize)>>>,
        summaries: Arc<Mutex<usize>>,
    }

    impl PipelineLogger for RecordingLogger {
        fn progress(&mut self, current: usize, total: usize) {
            self.progress.lock().unwrap().push((current, total));
        }
        fn timing(&mut self, stage: &str, _duration_ms: f64) {
            self.timings.lock().unwrap().push(stage.to_string());
        }
        fn metric(&mut self, _name: &str, _value: f64) {}
        fn info(&mut self, _message: &str) {}
        fn summary(&self) {
            *self.summaries.lock().unwrap() += 1;
        }
    }

    struct StubImageWriter {
        written: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl ImageWriter for StubImageWriter {
        fn write(&self, path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            self.written.lock().unwrap().push(path.to_path_buf());
            Ok(())
        }
    }

    /// One entry per frame; each entry is drained by that frame's poll.
    struct ScriptedKeys {
        per_poll: VecDeque<Vec<KeyPress>>,
        pending: VecDeque<KeyPress>,
        draining: bool,
    }

    impl ScriptedKeys {
        fn new(script: Vec<Vec<KeyPress>>) -> Self {
            Self {
                per_poll: script.into(),
                pending: VecDeque::new(),
                draining: false,
            }
        }
    }

    impl KeySource for ScriptedKeys {
        fn poll(&mut self) -> Option<KeyPress> {
            if !self.draining {
                self.pending = self.per_poll.pop_front().unwrap_or_default().into();
                self.draining = true;
            }
            let key = self.pending.pop_front();
            if key.is_none() {
                self.draining = false;
            }
            key
        }
    }

    // --- Helpers ---

    fn face() -> BoundingBox {
        BoundingBox::new(0.25, 0.25, 0.5, 0.5, 0.9)
    }

    fn runner(boxes: Vec<BoundingBox>) -> SourceRunner {
        runner_with(StubDetector {
            boxes,
            fail_on: None,
        })
    }

    fn runner_with(detector: StubDetector) -> SourceRunner {
        runner_logging(detector, Box::new(NullPipelineLogger))
    }

    fn runner_logging(detector: StubDetector, logger: Box<dyn PipelineLogger>) -> SourceRunner {
        let settings = AnonymizeSettings::default();
        let pipeline = FramePipeline::new(
            Box::new(detector),
            AnonymizerSet::new(&settings, None),
            &settings,
        );
        SourceRunner::new(pipeline, logger)
    }

    fn center(frame: &Frame) -> u8 {
        frame.data()[((20 * 40 + 20) * 3) as usize]
    }

    // --- Tests ---

    #[test]
    fn test_source_kind_from_extension() {
        assert_eq!(
            SourceKind::from_path(Path::new("a/face.JPG")).unwrap(),
            SourceKind::Image
        );
        assert_eq!(
            SourceKind::from_path(Path::new("clip.mkv")).unwrap(),
            SourceKind::Video
        );
        assert!(matches!(
            SourceKind::from_path(Path::new("notes.txt")),
            Err(AnonymizeError::UnsupportedFileType(_))
        ));
        assert!(SourceKind::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_run_file_rejects_unsupported_before_reading() {
        let mut r = runner(vec![]);
        let err = r
            .run_file(Path::new("/nonexistent/notes.txt"), Path::new("out.png"), EffectKind::Blur)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnonymizeError>(),
            Some(AnonymizeError::UnsupportedFileType(_))
        ));
    }

    #[test]
    fn test_run_file_image_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out").join("result.png");
        image::RgbImage::from_pixel(40, 40, image::Rgb([255, 255, 255]))
            .save(&input)
            .unwrap();

        let summary = runner(vec![face()])
            .run_file(&input, &output, EffectKind::Blackout)
            .unwrap();

        assert_eq!(summary, RunSummary { frames: 1, faces: 1 });
        let img = image::open(&output).unwrap().to_rgb8();
        assert_eq!(img.get_pixel(20, 20).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_run_image_processes_single_frame() {
        let mut reader = StubReader::image();
        let closed = reader.closed.clone();
        let mut sink = StubSink::default();

        let summary = runner(vec![face()])
            .run_image(&mut reader, Path::new("face.png"), &mut sink, EffectKind::Blackout)
            .unwrap();

        assert_eq!(summary.frames, 1);
        let accepted = sink.accepted.lock().unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(center(&accepted[0]), 0);
        assert_eq!(*sink.finished.lock().unwrap(), 1);
        assert!(*closed.lock().unwrap() >= 1);
    }

    #[test]
    fn test_open_failure_is_unreadable_input() {
        let mut reader = StubReader::video(3);
        reader.fail_open = true;
        let mut sink = StubSink::default();

        let err = runner(vec![])
            .run_video(&mut reader, Path::new("broken.mp4"), &mut sink, EffectKind::Blur)
            .unwrap_err();

        match err.downcast_ref::<AnonymizeError>() {
            Some(AnonymizeError::UnreadableInput { path, reason }) => {
                assert_eq!(path, Path::new("broken.mp4"));
                assert!(reason.contains("moov"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(sink.accepted.lock().unwrap().is_empty());
    }

    #[test]
    fn test_run_video_processes_every_frame_in_order() {
        let mut reader = StubReader::video(3);
        let closed = reader.closed.clone();
        let mut sink = StubSink::default();
        let logger = RecordingLogger::default();
        let timings = logger.timings.clone();
        let progress = logger.progress.clone();

        let settings = AnonymizeSettings::default();
        let pipeline = FramePipeline::new(
            Box::new(StubDetector {
                boxes: vec![face()],
                fail_on: None,
            }),
            AnonymizerSet::new(&settings, None),
            &settings,
        );
        let mut r = SourceRunner::new(pipeline, Box::new(logger));

        let summary = r
            .run_video(&mut reader, Path::new("clip.mp4"), &mut sink, EffectKind::Blackout)
            .unwrap();

        assert_eq!(summary, RunSummary { frames: 3, faces: 3 });
        let accepted = sink.accepted.lock().unwrap();
        let indices: Vec<_> = accepted.iter().map(Frame::index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert!(accepted.iter().all(|f| center(f) == 0));
        assert_eq!(*progress.lock().unwrap(), vec![(1, 3), (2, 3), (3, 3)]);
        let timings = timings.lock().unwrap();
        assert_eq!(&timings[..3], &["detect", "anonymize", "sink"]);
        assert_eq!(*closed.lock().unwrap(), 1);
        assert_eq!(*sink.finished.lock().unwrap(), 1);
    }

    #[test]
    fn test_run_image_and_run_video_each_log_one_summary() {
        let logger = RecordingLogger::default();
        let summaries = logger.summaries.clone();
        let timings = logger.timings.clone();
        let mut r = runner_logging(
            StubDetector {
                boxes: vec![face()],
                fail_on: None,
            },
            Box::new(logger),
        );

        r.run_image(
            &mut StubReader::image(),
            Path::new("face.png"),
            &mut StubSink::default(),
            EffectKind::Blur,
        )
        .unwrap();
        assert_eq!(*summaries.lock().unwrap(), 1);
        assert_eq!(&timings.lock().unwrap()[..], &["detect", "anonymize", "sink"]);

        r.run_video(
            &mut StubReader::video(2),
            Path::new("clip.mp4"),
            &mut StubSink::default(),
            EffectKind::Blur,
        )
        .unwrap();
        assert_eq!(*summaries.lock().unwrap(), 2);
    }

    #[test]
    fn test_empty_video_is_empty_stream() {
        let mut reader = StubReader::video(0);
        let mut sink = StubSink::default();

        let err = runner(vec![])
            .run_video(&mut reader, Path::new("empty.mp4"), &mut sink, EffectKind::Blur)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AnonymizeError>(),
            Some(AnonymizeError::EmptyStream(_))
        ));
        assert_eq!(*sink.finished.lock().unwrap(), 1);
    }

    #[test]
    fn test_first_frame_read_error_is_fatal() {
        let mut reader = StubReader::video(2);
        reader.frames[0] = Err("corrupt header".into());
        let mut sink = StubSink::default();

        let err = runner(vec![])
            .run_video(&mut reader, Path::new("bad.mp4"), &mut sink, EffectKind::Blur)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AnonymizeError>(),
            Some(AnonymizeError::UnreadableInput { .. })
        ));
    }

    #[test]
    fn test_mid_stream_read_error_ends_gracefully() {
        let mut reader = StubReader::video(4);
        reader.frames[2] = Err("truncated packet".into());
        let mut sink = StubSink::default();

        let summary = runner(vec![])
            .run_video(&mut reader, Path::new("cut.mp4"), &mut sink, EffectKind::Blur)
            .unwrap();

        assert_eq!(summary.frames, 2);
        assert_eq!(sink.accepted.lock().unwrap().len(), 2);
        assert_eq!(*sink.finished.lock().unwrap(), 1);
    }

    #[test]
    fn test_detection_failure_propagates_and_releases() {
        let mut reader = StubReader::video(3);
        let closed = reader.closed.clone();
        let mut sink = StubSink::default();
        let mut r = runner_with(StubDetector {
            boxes: vec![],
            fail_on: Some(1),
        });

        let err = r
            .run_video(&mut reader, Path::new("clip.mp4"), &mut sink, EffectKind::Blur)
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AnonymizeError>(),
            Some(AnonymizeError::DetectionFailure { frame_index: 1, .. })
        ));
        assert_eq!(sink.accepted.lock().unwrap().len(), 1);
        assert_eq!(*closed.lock().unwrap(), 1);
        assert_eq!(*sink.finished.lock().unwrap(), 1);
    }

    #[test]
    fn test_camera_quits_on_key_and_switches_effect() {
        let mut reader = StubReader::video(10);
        let mut record = StubSink::default();
        let mut controller = InteractiveController::new(EffectKind::Blur);
        let mut keys = ScriptedKeys::new(vec![
            vec![KeyPress::Char('k')],
            vec![],
            vec![KeyPress::Char('q')],
        ]);

        let summary = runner(vec![face()])
            .run_camera(
                &mut reader,
                "/dev/video0",
                Some(&mut record),
                &mut controller,
                &mut keys,
            )
            .unwrap();

        // frame 0 blurred (uniform white stays white), frames 1 and 2 blacked out
        assert_eq!(summary.frames, 3);
        let accepted = record.accepted.lock().unwrap();
        assert_eq!(center(&accepted[0]), 255);
        assert_eq!(center(&accepted[1]), 0);
        assert_eq!(center(&accepted[2]), 0);
        assert_eq!(controller.effect(), EffectKind::Blackout);
        assert!(controller.quit_requested());
        assert_eq!(*record.finished.lock().unwrap(), 1);
    }

    #[test]
    fn test_camera_without_input_runs_until_stream_ends() {
        let mut reader = StubReader::video(5);
        let mut controller = InteractiveController::new(EffectKind::Pixelate);

        let summary = runner(vec![])
            .run_camera(&mut reader, "cam", None, &mut controller, &mut NoKeys)
            .unwrap();

        assert_eq!(summary.frames, 5);
        assert_eq!(controller.effect(), EffectKind::Pixelate);
    }

    #[test]
    fn test_camera_with_no_frames_is_empty_stream() {
        let mut reader = StubReader::video(0);
        let mut controller = InteractiveController::new(EffectKind::Blur);

        let err = runner(vec![])
            .run_camera(&mut reader, "/dev/video0", None, &mut controller, &mut NoKeys)
            .unwrap_err();

        match err.downcast_ref::<AnonymizeError>() {
            Some(AnonymizeError::EmptyStream(source)) => assert_eq!(source, "/dev/video0"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_key_saves_named_frame() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let writer = StubImageWriter {
            written: written.clone(),
        };
        let mut r = runner(vec![]).with_snapshots(Box::new(writer), Path::new("/tmp/snaps"));
        let mut reader = StubReader::video(3);
        let mut controller = InteractiveController::new(EffectKind::Pixelate);
        let mut keys = ScriptedKeys::new(vec![
            vec![KeyPress::Char('s')],
            vec![KeyPress::Char('s')],
            vec![KeyPress::Escape],
        ]);

        r.run_camera(&mut reader, "cam", None, &mut controller, &mut keys)
            .unwrap();

        assert_eq!(
            *written.lock().unwrap(),
            vec![
                PathBuf::from("/tmp/snaps/anonymized_pixelate_1.png"),
                PathBuf::from("/tmp/snaps/anonymized_pixelate_2.png"),
            ]
        );
    }

    #[test]
    fn test_process_encoded_returns_png() {
        let mut input = Vec::new();
        image::RgbImage::from_pixel(40, 40, image::Rgb([255, 255, 255]))
            .write_to(&mut std::io::Cursor::new(&mut input), image::ImageFormat::Jpeg)
            .unwrap();

        let png = runner(vec![face()])
            .process_encoded(&input, EffectKind::Blackout)
            .unwrap();

        let decoded = png_codec::decode_image(&png).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(center(&decoded), 0);
    }

    #[test]
    fn test_process_encoded_rejects_garbage() {
        let err = runner(vec![])
            .process_encoded(b"plain text", EffectKind::Blur)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnonymizeError>(),
            Some(AnonymizeError::UnreadableInput { .. })
        ));
    }
}
