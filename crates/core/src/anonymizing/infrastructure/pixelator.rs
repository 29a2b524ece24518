use crate::anonymizing::domain::frame_anonymizer::FrameAnonymizer;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;
use crate::shared::settings::{DEFAULT_MAX_PIXEL_SIZE, DEFAULT_PIXEL_DIVISOR};

use super::{resample, roi};

/// Replaces the face region with a coarse grid of flat blocks.
///
/// The region is shrunk to a `pixel_size` x `pixel_size` image with bilinear
/// sampling, then blown back up with nearest-neighbour sampling.
///
/// Pixelating an already pixelated region leaves it unchanged when the
/// region height is a multiple of `pixel_size`. Other heights can shift a
/// block row between passes.
pub struct Pixelator {
    divisor: u32,
    max_pixel_size: u32,
}

impl Pixelator {
    pub fn new(divisor: u32, max_pixel_size: u32) -> Self {
        Self {
            divisor: divisor.max(1),
            max_pixel_size: max_pixel_size.max(1),
        }
    }

    /// Side of the intermediate square for a region `region_width` pixels wide.
    pub fn pixel_size(&self, region_width: u32) -> u32 {
        (region_width / self.divisor).clamp(1, self.max_pixel_size)
    }
}

impl Default for Pixelator {
    fn default() -> Self {
        Self::new(DEFAULT_PIXEL_DIVISOR, DEFAULT_MAX_PIXEL_SIZE)
    }
}

impl FrameAnonymizer for Pixelator {
    fn anonymize(
        &self,
        frame: &mut Frame,
        rect: &PixelRect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        roi::ensure_fits(frame, rect)?;

        let channels = frame.channels() as usize;
        let (rw, rh) = (rect.width() as usize, rect.height() as usize);
        let side = self.pixel_size(rect.width()) as usize;

        let mut region = Vec::new();
        roi::extract_roi(frame, rect, &mut region);
        let small = resample::resize_bilinear(&region, rw, rh, channels, side, side);
        let blocks = resample::resize_nearest(&small, side, side, channels, rw, rh);
        roi::write_roi_back(frame, rect, &blocks);
        Ok(())
    }
}
