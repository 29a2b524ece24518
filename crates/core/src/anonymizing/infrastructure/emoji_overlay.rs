use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgb, Rgba};

use crate::anonymizing::domain::frame_anonymizer::FrameAnonymizer;
use crate::anonymizing::domain::overlay_asset::OverlayAsset;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;

use super::roi;

/// Covers the face region with an overlay image stretched to fit.
///
/// RGBA overlays are alpha-blended over the original pixels; RGB overlays
/// replace them. Without an overlay the region is left as is.
pub struct EmojiOverlay {
    asset: Option<Arc<OverlayAsset>>,
}

impl EmojiOverlay {
    pub fn new(asset: Option<Arc<OverlayAsset>>) -> Self {
        Self { asset }
    }

    pub fn has_asset(&self) -> bool {
        self.asset.is_some()
    }
}

impl FrameAnonymizer for EmojiOverlay {
    fn anonymize(
        &self,
        frame: &mut Frame,
        rect: &PixelRect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        roi::ensure_fits(frame, rect)?;
        let Some(asset) = self.asset.as_deref() else {
            log::debug!("Emoji effect requested without an overlay asset; region left unchanged");
            return Ok(());
        };

        let overlay_channels = asset.channels() as usize;
        let resized = stretch_to(asset, rect.width(), rect.height())?;

        let frame_channels = frame.channels() as usize;
        let color_channels = frame_channels.min(3);
        let mut region = Vec::new();
        roi::extract_roi(frame, rect, &mut region);

        for (dst, src) in region
            .chunks_exact_mut(frame_channels)
            .zip(resized.chunks_exact(overlay_channels))
        {
            if asset.has_alpha() {
                let alpha = src[3] as f32 / 255.0;
                for c in 0..color_channels {
                    let blended = (1.0 - alpha) * dst[c] as f32 + alpha * src[c] as f32;
                    dst[c] = blended.clamp(0.0, 255.0) as u8;
                }
            } else {
                dst[..color_channels].copy_from_slice(&src[..color_channels]);
            }
        }

        roi::write_roi_back(frame, rect, &region);
        Ok(())
    }
}

/// Resizes the overlay samples to `width` x `height` with a triangle filter.
fn stretch_to(
    asset: &OverlayAsset,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let (w, h) = (asset.width(), asset.height());
    let resized = if asset.has_alpha() {
        let img = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(w, h, asset.data())
            .ok_or("overlay buffer does not match its dimensions")?;
        imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
    } else {
        let img = ImageBuffer::<Rgb<u8>, &[u8]>::from_raw(w, h, asset.data())
            .ok_or("overlay buffer does not match its dimensions")?;
        imageops::resize(&img, width, height, FilterType::Triangle).into_raw()
    };
    Ok(resized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_asset(rgba: [u8; 4], w: u32, h: u32) -> Arc<OverlayAsset> {
        let data = rgba.iter().copied().cycle().take((w * h * 4) as usize).collect();
        Arc::new(OverlayAsset::new(data, w, h, 4).unwrap())
    }

    fn gradient_frame(w: u32, h: u32) -> Frame {
        let data = (0..(w * h * 3) as usize).map(|i| (i % 200) as u8).collect();
        Frame::new(data, w, h, 3, 0)
    }

    fn rect() -> PixelRect {
        PixelRect::clamped(5, 5, 25, 20, 40, 30).unwrap()
    }

    #[test]
    fn test_opaque_overlay_replaces_region() {
        let mut frame = gradient_frame(40, 30);
        let overlay = EmojiOverlay::new(Some(rgba_asset([250, 200, 10, 255], 7, 9)));
        overlay.anonymize(&mut frame, &rect()).unwrap();

        for y in 5..20u32 {
            for x in 5..25u32 {
                let i = ((y * 40 + x) * 3) as usize;
                assert_eq!(&frame.data()[i..i + 3], &[250, 200, 10]);
            }
        }
    }

    #[test]
    fn test_transparent_overlay_is_noop() {
        let mut frame = gradient_frame(40, 30);
        let original = frame.clone();
        let overlay = EmojiOverlay::new(Some(rgba_asset([250, 200, 10, 0], 7, 9)));
        overlay.anonymize(&mut frame, &rect()).unwrap();
        assert_eq!(frame, original);
    }

    #[test]
    fn test_half_alpha_blends_and_truncates() {
        let mut frame = Frame::filled(4, 4, 3, 100);
        let overlay = EmojiOverlay::new(Some(rgba_asset([201, 0, 255, 128], 2, 2)));
        let r = PixelRect::clamped(0, 0, 2, 2, 4, 4).unwrap();
        overlay.anonymize(&mut frame, &r).unwrap();

        let a = 128.0f32 / 255.0;
        let expected = |o: f32| ((1.0 - a) * 100.0 + a * o) as u8;
        assert_eq!(
            &frame.data()[..3],
            &[expected(201.0), expected(0.0), expected(255.0)]
        );
        // outside the rect
        assert_eq!(&frame.data()[2 * 3..2 * 3 + 3], &[100, 100, 100]);
    }

    #[test]
    fn test_rgb_overlay_replaces_without_blending() {
        let mut frame = Frame::filled(10, 10, 3, 0);
        let asset = Arc::new(OverlayAsset::new(vec![9, 8, 7], 1, 1, 3).unwrap());
        let r = PixelRect::clamped(2, 2, 6, 6, 10, 10).unwrap();
        EmojiOverlay::new(Some(asset)).anonymize(&mut frame, &r).unwrap();

        let i = ((3 * 10 + 3) * 3) as usize;
        assert_eq!(&frame.data()[i..i + 3], &[9, 8, 7]);
        assert_eq!(&frame.data()[..3], &[0, 0, 0]);
    }

    #[test]
    fn test_missing_asset_leaves_frame_unchanged() {
        let mut frame = gradient_frame(40, 30);
        let original = frame.clone();
        let overlay = EmojiOverlay::new(None);
        assert!(!overlay.has_asset());
        overlay.anonymize(&mut frame, &rect()).unwrap();
        assert_eq!(frame, original);
    }

    #[test]
    fn test_pixels_outside_region_unchanged() {
        let mut frame = gradient_frame(40, 30);
        let original = frame.clone();
        let r = rect();
        EmojiOverlay::new(Some(rgba_asset([1, 2, 3, 200], 3, 3)))
            .anonymize(&mut frame, &r)
            .unwrap();

        for y in 0..30u32 {
            for x in 0..40u32 {
                if !r.contains(x, y) {
                    let i = ((y * 40 + x) * 3) as usize;
                    assert_eq!(frame.data()[i..i + 3], original.data()[i..i + 3]);
                }
            }
        }
    }

    #[test]
    fn test_overlay_is_stretched_with_triangle_filter() {
        let mut frame = Frame::filled(12, 6, 3, 0);
        let asset = Arc::new(OverlayAsset::new(vec![0, 0, 0, 200, 100, 50], 2, 1, 3).unwrap());
        let r = PixelRect::clamped(2, 1, 10, 5, 12, 6).unwrap();
        EmojiOverlay::new(Some(asset.clone()))
            .anonymize(&mut frame, &r)
            .unwrap();

        let source = image::RgbImage::from_raw(2, 1, asset.data().to_vec()).unwrap();
        let expected = imageops::resize(&source, 8, 4, FilterType::Triangle);
        for y in 0..4u32 {
            for x in 0..8u32 {
                let i = (((y + 1) * 12 + x + 2) * 3) as usize;
                assert_eq!(&frame.data()[i..i + 3], &expected.get_pixel(x, y).0);
            }
        }
        let (left, right) = (frame.data()[(12 + 2) * 3], frame.data()[(12 + 9) * 3]);
        assert!(left < right, "left edge {left} should be darker than right edge {right}");
    }
}
