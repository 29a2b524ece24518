use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;

/// Fails when `rect` does not lie inside `frame`.
pub fn ensure_fits(frame: &Frame, rect: &PixelRect) -> Result<(), Box<dyn std::error::Error>> {
    if rect.fits_within(frame.width(), frame.height()) {
        Ok(())
    } else {
        Err(format!(
            "region {rect:?} does not fit {}x{} frame",
            frame.width(),
            frame.height()
        )
        .into())
    }
}

/// Copies the rect's pixels into `roi`, row by row, resizing it to fit.
pub fn extract_roi(frame: &Frame, rect: &PixelRect, roi: &mut Vec<u8>) {
    let channels = frame.channels() as usize;
    let fw = frame.width() as usize;
    let (rx, ry) = (rect.x1 as usize, rect.y1 as usize);
    let (rw, rh) = (rect.width() as usize, rect.height() as usize);
    let row_len = rw * channels;
    let data = frame.data();

    roi.resize(row_len * rh, 0);
    for row in 0..rh {
        let src = ((ry + row) * fw + rx) * channels;
        roi[row * row_len..(row + 1) * row_len].copy_from_slice(&data[src..src + row_len]);
    }
}

/// Writes an ROI buffer produced by [`extract_roi`] back into the frame.
pub fn write_roi_back(frame: &mut Frame, rect: &PixelRect, roi: &[u8]) {
    let channels = frame.channels() as usize;
    let fw = frame.width() as usize;
    let (rx, ry) = (rect.x1 as usize, rect.y1 as usize);
    let (rw, rh) = (rect.width() as usize, rect.height() as usize);
    let row_len = rw * channels;
    let data = frame.data_mut();

    for row in 0..rh {
        let dst = ((ry + row) * fw + rx) * channels;
        data[dst..dst + row_len].copy_from_slice(&roi[row * row_len..(row + 1) * row_len]);
    }
}
