use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::anonymizing::domain::effect_kind::EffectKind;
use crate::shared::constants::{DEFAULT_CONFIDENCE, OUTPUT_FPS};

pub const DEFAULT_BLUR_KERNEL_SIZE: usize = 25;
pub const DEFAULT_PIXEL_DIVISOR: u32 = 8;
pub const DEFAULT_MAX_PIXEL_SIZE: u32 = 20;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings from {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Tunable effect and pipeline parameters.
///
/// Every field has a default, so a settings file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnonymizeSettings {
    pub effect: EffectKind,
    /// Mean-filter window, in pixels per axis.
    pub blur_kernel_size: usize,
    /// Pixelation block count is the region width divided by this.
    pub pixel_divisor: u32,
    /// Upper bound on the pixelation block count per axis.
    pub max_pixel_size: u32,
    /// Fraction of the face box trimmed from each side before anonymizing.
    pub padding: f64,
    pub confidence: f64,
    pub annotate: bool,
    pub output_fps: u32,
}

impl Default for AnonymizeSettings {
    fn default() -> Self {
        Self {
            effect: EffectKind::Blur,
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            pixel_divisor: DEFAULT_PIXEL_DIVISOR,
            max_pixel_size: DEFAULT_MAX_PIXEL_SIZE,
            padding: 0.0,
            confidence: DEFAULT_CONFIDENCE,
            annotate: false,
            output_fps: OUTPUT_FPS,
        }
    }
}

impl AnonymizeSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.blur_kernel_size == 0 {
            return Err(SettingsError::Invalid(
                "Blur kernel size must be at least 1".into(),
            ));
        }
        if self.pixel_divisor == 0 {
            return Err(SettingsError::Invalid(
                "Pixel divisor must be at least 1".into(),
            ));
        }
        if self.max_pixel_size == 0 {
            return Err(SettingsError::Invalid(
                "Max pixel size must be at least 1".into(),
            ));
        }
        if !(0.0..0.5).contains(&self.padding) {
            return Err(SettingsError::Invalid(format!(
                "Padding must be in [0.0, 0.5), got {}",
                self.padding
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(SettingsError::Invalid(format!(
                "Confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            )));
        }
        if self.output_fps == 0 {
            return Err(SettingsError::Invalid("Output fps must be positive".into()));
        }
        Ok(())
    }
}
