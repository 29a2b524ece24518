mod terminal_keys;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Parser, ValueEnum};

use facecloak_core::anonymizing::domain::effect_kind::EffectKind;
use facecloak_core::anonymizing::infrastructure::anonymizer_set::AnonymizerSet;
use facecloak_core::anonymizing::infrastructure::overlay_file_reader::load_overlay;
use facecloak_core::detection::domain::face_detector::FaceDetector;
use facecloak_core::detection::infrastructure::model_resolver::{self, ModelSource};
use facecloak_core::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use facecloak_core::pipeline::frame_pipeline::FramePipeline;
use facecloak_core::pipeline::interactive_controller::InteractiveController;
use facecloak_core::pipeline::key_source::ChannelKeySource;
use facecloak_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use facecloak_core::pipeline::source_runner::{SourceKind, SourceRunner};
use facecloak_core::shared::constants::{
    BLAZEFACE_MODEL_NAME, CAMERA_INPUT_FORMAT, DEFAULT_CAMERA_DEVICE,
};
use facecloak_core::shared::settings::AnonymizeSettings;
use facecloak_core::video::domain::frame_sink::FrameSink;
use facecloak_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use facecloak_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use facecloak_core::video::infrastructure::image_file_writer::ImageFileWriter;
use facecloak_core::video::infrastructure::video_file_sink::VideoFileSink;

use terminal_keys::TerminalKeys;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Image,
    Video,
    Webcam,
}

/// Detect faces and blur, pixelate, black out or cover them.
#[derive(Parser)]
#[command(name = "facecloak")]
struct Cli {
    /// Source type.
    #[arg(value_enum)]
    mode: Mode,

    /// Input image or video (not used for webcam).
    input: Option<PathBuf>,

    /// Output file. Defaults to `<input>_anonymized` next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Effect: blur, pixelate, blackout or emoji.
    #[arg(short, long)]
    effect: Option<EffectKind>,

    /// Overlay image for the emoji effect (PNG with alpha recommended).
    #[arg(long)]
    emoji: Option<PathBuf>,

    /// JSON settings file; flags given on the command line take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    /// BlazeFace ONNX model. Looked up in the cache directory when omitted.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Download URL used when the model is not cached.
    #[arg(long)]
    model_url: Option<String>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Fraction trimmed from each side of a face box (0.0-0.5).
    #[arg(long)]
    padding: Option<f64>,

    /// Mean blur window in pixels.
    #[arg(long)]
    blur_kernel: Option<usize>,

    /// Pixelation grid is the face width divided by this.
    #[arg(long)]
    pixel_divisor: Option<u32>,

    /// Upper bound on the pixelation grid size.
    #[arg(long)]
    max_pixel_size: Option<u32>,

    /// Draw a box and confidence label on every face.
    #[arg(long)]
    annotate: bool,

    /// Capture device (webcam mode).
    #[arg(long, default_value = DEFAULT_CAMERA_DEVICE)]
    camera: String,

    /// Record the processed webcam stream to this video file.
    #[arg(long)]
    record: Option<PathBuf>,

    /// Directory for snapshots taken with `s` in webcam mode.
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;
    let settings = build_settings(&cli)?;

    let detector = build_detector(&cli, settings.confidence)?;
    let overlay = match &cli.emoji {
        Some(path) => Some(Arc::new(load_overlay(path)?)),
        None => None,
    };
    if settings.effect == EffectKind::Emoji && overlay.is_none() {
        log::warn!("Emoji effect without --emoji: faces will be left unchanged");
    }

    let anonymizers = AnonymizerSet::new(&settings, overlay);
    let pipeline = FramePipeline::new(detector, anonymizers, &settings);
    let mut runner = SourceRunner::new(pipeline, Box::new(StdoutPipelineLogger::default()))
        .with_output_fps(settings.output_fps);

    match cli.mode {
        Mode::Image | Mode::Video => {
            let input = cli.input.as_deref().ok_or("An input file is required")?;
            let output = cli
                .output
                .clone()
                .unwrap_or_else(|| default_output(input, cli.mode));
            let summary = runner.run_file(input, &output, settings.effect)?;
            log::info!(
                "Anonymized {} faces in {} frames, output written to {}",
                summary.faces,
                summary.frames,
                output.display()
            );
        }
        Mode::Webcam => {
            if let Some(dir) = &cli.snapshot_dir {
                runner = runner.with_snapshots(Box::new(ImageFileWriter::new()), dir);
            }
            run_webcam(&cli, &mut runner, &settings)?;
        }
    }

    Ok(())
}

fn run_webcam(
    cli: &Cli,
    runner: &mut SourceRunner,
    settings: &AnonymizeSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut reader = FfmpegReader::new();
    reader.open_camera(&cli.camera, CAMERA_INPUT_FORMAT)?;

    let mut record = cli
        .record
        .as_deref()
        .map(|path| VideoFileSink::new(Box::new(FfmpegWriter::new()), path, settings.output_fps));
    let mut controller = InteractiveController::new(settings.effect);

    eprintln!("Keys: b/p/k/e or 1-4 pick an effect, space cycles, s saves a snapshot, q quits");
    let (tx, rx) = crossbeam_channel::unbounded();
    let summary = {
        let _terminal = TerminalKeys::start(tx)?;
        let mut keys = ChannelKeySource::new(rx);
        runner.run_camera(
            &mut reader,
            &cli.camera,
            record.as_mut().map(|sink| sink as &mut dyn FrameSink),
            &mut controller,
            &mut keys,
        )?
    };
    log::info!(
        "Webcam session ended after {} frames ({} faces anonymized)",
        summary.frames,
        summary.faces
    );
    Ok(())
}

fn build_settings(cli: &Cli) -> Result<AnonymizeSettings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.config {
        Some(path) => AnonymizeSettings::load(path)?,
        None => AnonymizeSettings::default(),
    };

    if let Some(effect) = cli.effect {
        settings.effect = effect;
    }
    if let Some(confidence) = cli.confidence {
        settings.confidence = confidence;
    }
    if let Some(padding) = cli.padding {
        settings.padding = padding;
    }
    if let Some(kernel) = cli.blur_kernel {
        settings.blur_kernel_size = kernel;
    }
    if let Some(divisor) = cli.pixel_divisor {
        settings.pixel_divisor = divisor;
    }
    if let Some(max) = cli.max_pixel_size {
        settings.max_pixel_size = max;
    }
    if cli.annotate {
        settings.annotate = true;
    }

    settings.validate()?;
    Ok(settings)
}

fn build_detector(
    cli: &Cli,
    confidence: f64,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {BLAZEFACE_MODEL_NAME}");
    let bundled_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("models")));
    let source = ModelSource {
        explicit: cli.model.as_deref(),
        bundled_dir: bundled_dir.as_deref(),
        url: cli.model_url.as_deref(),
    };
    let model_path =
        model_resolver::resolve(BLAZEFACE_MODEL_NAME, &source, Some(Box::new(download_progress)))?;

    Ok(Box::new(OnnxBlazefaceDetector::new(&model_path, confidence)?))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.mode {
        Mode::Image | Mode::Video => {
            let input = cli
                .input
                .as_ref()
                .ok_or("An input file is required for image and video modes")?;
            if !input.exists() {
                return Err(format!("Input file not found: {}", input.display()).into());
            }
            let expected = if cli.mode == Mode::Image {
                SourceKind::Image
            } else {
                SourceKind::Video
            };
            if SourceKind::from_path(input)? != expected {
                return Err(format!(
                    "{} is not a {} file",
                    input.display(),
                    if expected == SourceKind::Image { "image" } else { "video" }
                )
                .into());
            }
            if cli.record.is_some() || cli.snapshot_dir.is_some() {
                return Err("--record and --snapshot-dir only apply to webcam mode".into());
            }
        }
        Mode::Webcam => {
            if cli.input.is_some() || cli.output.is_some() {
                return Err("Webcam mode takes no input or output file; use --record".into());
            }
            if cli.record.is_none() && cli.snapshot_dir.is_none() {
                return Err(
                    "Webcam mode has no preview window; pass --record and/or --snapshot-dir".into(),
                );
            }
            if let Some(record) = &cli.record {
                if SourceKind::from_path(record).ok() != Some(SourceKind::Video) {
                    return Err(format!(
                        "--record needs a video file name, got {}",
                        record.display()
                    )
                    .into());
                }
            }
        }
    }
    if let Some(path) = &cli.emoji {
        if !path.exists() {
            return Err(format!("Overlay image not found: {}", path.display()).into());
        }
    }
    Ok(())
}

/// `clip.mov` becomes `clip_anonymized.mp4`; images keep their extension.
fn default_output(input: &Path, mode: Mode) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    let ext = match mode {
        Mode::Video | Mode::Webcam => "mp4".to_string(),
        Mode::Image => input
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "png".into()),
    };
    input.with_file_name(format!("{stem}_anonymized.{ext}"))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face detection model... {pct}%");
    } else {
        eprint!("\rDownloading face detection model... {downloaded} bytes");
    }
}
