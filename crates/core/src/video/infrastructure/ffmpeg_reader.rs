use std::path::Path;

use ffmpeg_next::format::format::Format;

use crate::shared::error::AnonymizeError;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

/// Decodes frames via ffmpeg-next (libavformat + libavcodec + libavdevice).
///
/// Handles both video files and capture devices; each decoded frame is
/// converted to packed RGB24.
pub struct FfmpegReader {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    video_stream_index: usize,
    width: u32,
    height: u32,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self {
            input_ctx: None,
            decoder: None,
            scaler: None,
            video_stream_index: 0,
            width: 0,
            height: 0,
        }
    }

    /// Opens a capture device such as `/dev/video0` through an ffmpeg input
    /// device format (`v4l2`, `avfoundation`, `dshow`).
    ///
    /// Every failure is reported as unreadable input naming the device.
    pub fn open_camera(
        &mut self,
        device: &str,
        input_format: &str,
    ) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let unreadable = |e: &dyn std::fmt::Display| AnonymizeError::unreadable(device, e);

        let mut formats = Self::capture_formats().map_err(|e| unreadable(&e))?;
        let Some(pos) = formats.iter().position(|f| f.name() == input_format) else {
            let names: Vec<&str> = formats.iter().map(Format::name).collect();
            return Err(unreadable(&format!(
                "capture format '{input_format}' is not available (have: {})",
                names.join(", ")
            ))
            .into());
        };
        let format = formats.swap_remove(pos);

        let ctx = ffmpeg_next::format::open_with(&device, &format, ffmpeg_next::Dictionary::new())
            .map_err(|e| unreadable(&e))?;
        let ictx = match ctx {
            ffmpeg_next::format::context::Context::Input(ictx) => ictx,
            _ => return Err(unreadable(&"device did not open as an input").into()),
        };

        let metadata = self.attach(ictx, None).map_err(|e| unreadable(&e))?;
        log::info!(
            "Opened camera {device} ({input_format}): {}x{} @ {:.1} fps",
            metadata.width,
            metadata.height,
            metadata.fps
        );
        Ok(metadata)
    }

    /// Video capture formats compiled into libavdevice.
    pub fn capture_formats() -> Result<Vec<Format>, ffmpeg_next::Error> {
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();
        // The device iterator yields a null format instead of ending when
        // nothing is registered, so stop at the first null entry.
        Ok(ffmpeg_next::device::input::video()
            .take_while(|format| match format {
                // Safety: the pointers are compared against null, never dereferenced.
                Format::Input(input) => unsafe { !input.as_ptr().is_null() },
                Format::Output(output) => unsafe { !output.as_ptr().is_null() },
            })
            .collect())
    }

    fn attach(
        &mut self,
        ictx: ffmpeg_next::format::context::Input,
        source_path: Option<&Path>,
    ) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;
        let (width, height) = (decoder.width(), decoder.height());

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };
        let total_frames = match source_path {
            Some(_) => stream.frames().max(0) as usize,
            None => 0,
        };

        let metadata = VideoMetadata {
            width,
            height,
            fps,
            total_frames,
            source_path: source_path.map(Path::to_path_buf),
        };

        self.video_stream_index = video_stream_index;
        self.width = width;
        self.height = height;
        self.decoder = Some(decoder);
        self.scaler = Some(scaler);
        self.input_ctx = Some(ictx);
        Ok(metadata)
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        let ictx = ffmpeg_next::format::input(path)?;
        self.attach(ictx, Some(path))
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        let (Some(ictx), Some(decoder), Some(scaler)) = (
            self.input_ctx.as_mut(),
            self.decoder.as_mut(),
            self.scaler.as_mut(),
        ) else {
            return Box::new(std::iter::once(Err("FfmpegReader: not opened".into())));
        };

        Box::new(FfmpegFrameIter {
            ictx,
            decoder,
            scaler,
            width: self.width,
            height: self.height,
            video_stream_index: self.video_stream_index,
            frame_index: 0,
            flushing: false,
            done: false,
        })
    }

    fn close(&mut self) {
        self.scaler = None;
        self.decoder = None;
        self.input_ctx = None;
    }
}

/// Decodes one frame per `next()` call.
struct FfmpegFrameIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    decoder: &'a mut ffmpeg_next::decoder::Video,
    scaler: &'a mut ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    video_stream_index: usize,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        self.decoder.receive_frame(&mut decoded).ok()?;

        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut rgb_frame) {
            return Some(Err(Box::new(e)));
        }
        let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
        let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
        self.frame_index += 1;
        Some(Ok(frame))
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if let Some(result) = self.try_receive() {
            return Some(result);
        }
        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }
            if let Err(e) = self.decoder.send_packet(&packet) {
                log::debug!("Dropping undecodable packet: {e}");
                continue;
            }
            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

/// Copies an RGB24 ffmpeg frame into a tightly packed buffer, dropping the
/// per-row stride padding.
pub(crate) fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let row_len = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for row in 0..height as usize {
        let start = row * stride;
        pixels.extend_from_slice(&data[start..start + row_len]);
    }
    pixels
}
