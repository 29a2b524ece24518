/// BlazeFace short-range detector, looked up in the model cache directory.
pub const BLAZEFACE_MODEL_NAME: &str = "blazeface.onnx";

/// Frame rate of every encoded output video.
pub const OUTPUT_FPS: u32 = 25;

/// Default face detection confidence threshold.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv"];

#[cfg(target_os = "linux")]
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";
#[cfg(target_os = "linux")]
pub const CAMERA_INPUT_FORMAT: &str = "v4l2";

#[cfg(target_os = "macos")]
pub const DEFAULT_CAMERA_DEVICE: &str = "0";
#[cfg(target_os = "macos")]
pub const CAMERA_INPUT_FORMAT: &str = "avfoundation";

#[cfg(target_os = "windows")]
pub const DEFAULT_CAMERA_DEVICE: &str = "video=Integrated Camera";
#[cfg(target_os = "windows")]
pub const CAMERA_INPUT_FORMAT: &str = "dshow";

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const DEFAULT_CAMERA_DEVICE: &str = "/dev/video0";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
pub const CAMERA_INPUT_FORMAT: &str = "v4l2";
