use std::io::Cursor;

use image::{ExtendedColorType, ImageEncoder};

use crate::shared::frame::{ChannelOrder, Frame};

/// Decodes any format the `image` crate recognizes into a packed RGB frame.
pub fn decode_image(bytes: &[u8]) -> Result<Frame, image::ImageError> {
    let img = image::load_from_memory(bytes)?.to_rgb8();
    let (width, height) = img.dimensions();
    Ok(Frame::new(img.into_raw(), width, height, 3, 0))
}

/// Encodes a 3- or 4-channel frame as PNG, in RGB order.
pub fn encode_png(frame: &Frame) -> Result<Vec<u8>, image::ImageError> {
    let frame = frame.in_order(ChannelOrder::Rgb);
    let color = match frame.channels() {
        4 => ExtendedColorType::Rgba8,
        3 => ExtendedColorType::Rgb8,
        1 => ExtendedColorType::L8,
        _ => ExtendedColorType::Unknown(frame.channels() * 8),
    };

    let mut buf = Cursor::new(Vec::new());
    image::codecs::png::PngEncoder::new(&mut buf).write_image(
        frame.data(),
        frame.width(),
        frame.height(),
        color,
    )?;
    Ok(buf.into_inner())
}
