use std::sync::Mutex;

use crate::anonymizing::domain::frame_anonymizer::FrameAnonymizer;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;
use crate::shared::settings::DEFAULT_BLUR_KERNEL_SIZE;

use super::roi;

/// Mean (box) filter over the face region only.
///
/// The filter reads nothing outside the region: samples past the region
/// border are mirrored back inside it (reflect-101, `gfedcb|abcdefgh|gfedcba`).
pub struct BoxBlurrer {
    kernel_size: usize,
    roi_buf: Mutex<Vec<u8>>,
}

impl BoxBlurrer {
    pub fn new(kernel_size: usize) -> Self {
        Self {
            kernel_size: kernel_size.max(1),
            roi_buf: Mutex::new(Vec::new()),
        }
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }
}

impl Default for BoxBlurrer {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_KERNEL_SIZE)
    }
}

impl FrameAnonymizer for BoxBlurrer {
    fn anonymize(
        &self,
        frame: &mut Frame,
        rect: &PixelRect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        roi::ensure_fits(frame, rect)?;
        if self.kernel_size <= 1 {
            return Ok(());
        }

        let channels = frame.channels() as usize;
        let mut roi_buf = self.roi_buf.lock().map_err(|_| "blur buffer poisoned")?;
        roi::extract_roi(frame, rect, &mut roi_buf);
        box_blur(
            &mut roi_buf,
            rect.width() as usize,
            rect.height() as usize,
            channels,
            self.kernel_size,
        );
        roi::write_roi_back(frame, rect, &roi_buf);
        Ok(())
    }
}

/// Separable box blur of an interleaved buffer, in place.
///
/// The window spans `kernel_size` samples anchored at `kernel_size / 2`.
pub fn box_blur(data: &mut [u8], width: usize, height: usize, channels: usize, kernel_size: usize) {
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let anchor = kernel_size as isize / 2;
    let norm = 1.0 / kernel_size as f32;
    let mut temp = vec![0f32; width * height * channels];

    // Horizontal pass: data -> temp (unnormalized sums)
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0u32;
                for k in 0..kernel_size as isize {
                    let sx = reflect_101(x as isize + k - anchor, width);
                    sum += data[(y * width + sx) * channels + c] as u32;
                }
                temp[(y * width + x) * channels + c] = sum as f32;
            }
        }
    }

    // Vertical pass: temp -> data
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0f32;
                for k in 0..kernel_size as isize {
                    let sy = reflect_101(y as isize + k - anchor, height);
                    sum += temp[(sy * width + x) * channels + c];
                }
                let mean = sum * norm * norm;
                data[(y * width + x) * channels + c] = mean.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Mirrors an out-of-range index back into `0..len` without repeating the edge.
fn reflect_101(mut i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    loop {
        if i < 0 {
            i = -i;
        } else if i > last {
            i = 2 * last - i;
        } else {
            return i as usize;
        }
    }
}
