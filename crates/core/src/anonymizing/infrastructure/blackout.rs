use ndarray::s;

use crate::anonymizing::domain::frame_anonymizer::FrameAnonymizer;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;

use super::roi;

/// Sets every sample in the face region to zero.
#[derive(Default)]
pub struct Blackout;

impl FrameAnonymizer for Blackout {
    fn anonymize(
        &self,
        frame: &mut Frame,
        rect: &PixelRect,
    ) -> Result<(), Box<dyn std::error::Error>> {
        roi::ensure_fits(frame, rect)?;
        let (x1, y1) = (rect.x1 as usize, rect.y1 as usize);
        let (x2, y2) = (rect.x2 as usize, rect.y2 as usize);
        frame
            .as_ndarray_mut()
            .slice_mut(s![y1..y2, x1..x2, ..])
            .fill(0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_is_zeroed_rest_untouched() {
        let mut frame = Frame::filled(20, 10, 3, 200);
        let rect = PixelRect::clamped(4, 2, 9, 7, 20, 10).unwrap();
        Blackout.anonymize(&mut frame, &rect).unwrap();

        for y in 0..10u32 {
            for x in 0..20u32 {
                let i = ((y * 20 + x) * 3) as usize;
                let expected = if rect.contains(x, y) { 0 } else { 200 };
                assert!(frame.data()[i..i + 3].iter().all(|&v| v == expected));
            }
        }
    }

    #[test]
    fn test_blackout_is_idempotent() {
        let mut frame = Frame::new((0..300).map(|v| (v % 256) as u8).collect(), 10, 10, 3, 0);
        let rect = PixelRect::clamped(1, 1, 6, 8, 10, 10).unwrap();
        Blackout.anonymize(&mut frame, &rect).unwrap();
        let once = frame.clone();
        Blackout.anonymize(&mut frame, &rect).unwrap();
        assert_eq!(frame, once);
    }

    #[test]
    fn test_zeroes_every_channel_of_four_channel_frame() {
        let mut frame = Frame::filled(2, 2, 4, 255);
        let rect = PixelRect::clamped(0, 0, 1, 1, 2, 2).unwrap();
        Blackout.anonymize(&mut frame, &rect).unwrap();
        assert_eq!(&frame.data()[..4], &[0, 0, 0, 0]);
        assert_eq!(&frame.data()[4..8], &[255, 255, 255, 255]);
    }
}
