use crate::shared::error::AnonymizeError;

/// A decoded image pasted over faces by the emoji effect.
///
/// Loaded once at startup and shared read-only (usually behind an `Arc`).
/// Samples are RGB or RGBA, matching the frame channel order.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayAsset {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl OverlayAsset {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self, AnonymizeError> {
        if channels != 3 && channels != 4 {
            return Err(AnonymizeError::InvalidOverlay(format!(
                "expected 3 or 4 channels, got {channels}"
            )));
        }
        if width == 0 || height == 0 {
            return Err(AnonymizeError::InvalidOverlay(
                "overlay dimensions are zero".into(),
            ));
        }
        let expected = width as usize * height as usize * channels as usize;
        if data.len() != expected {
            return Err(AnonymizeError::InvalidOverlay(format!(
                "expected {expected} bytes for {width}x{height}x{channels}, got {}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }
}
