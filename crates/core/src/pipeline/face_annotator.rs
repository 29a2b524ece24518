use image::{ImageBuffer, Pixel, Rgb, Rgba};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::shared::bounding_box::BoundingBox;
use crate::shared::frame::Frame;
use crate::shared::pixel_rect::PixelRect;

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_ADVANCE: u32 = 6;
const LABEL_GAP: u32 = 3;

/// Draws a box outline and a `Face: NN%` label for each detected face.
pub struct FaceAnnotator {
    color: [u8; 3],
}

impl FaceAnnotator {
    pub fn new(color: [u8; 3]) -> Self {
        Self { color }
    }

    pub fn label(bbox: &BoundingBox) -> String {
        format!("Face: {}%", bbox.confidence_percent())
    }

    pub fn annotate(
        &self,
        frame: &mut Frame,
        rect: &PixelRect,
        bbox: &BoundingBox,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (w, h) = (frame.width(), frame.height());
        let label = Self::label(bbox);
        let [r, g, b] = self.color;

        match frame.channels() {
            3 => {
                let mut canvas = ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, frame.data_mut())
                    .ok_or("frame buffer does not match its dimensions")?;
                draw(&mut canvas, rect, &label, Rgb([r, g, b]), Rgb([0, 0, 0]));
            }
            4 => {
                let mut canvas = ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, frame.data_mut())
                    .ok_or("frame buffer does not match its dimensions")?;
                draw(&mut canvas, rect, &label, Rgba([r, g, b, 255]), Rgba([0, 0, 0, 255]));
            }
            n => return Err(format!("cannot annotate a {n}-channel frame").into()),
        }
        Ok(())
    }
}

impl Default for FaceAnnotator {
    fn default() -> Self {
        Self::new([0, 255, 0])
    }
}

fn draw<P>(
    canvas: &mut ImageBuffer<P, &mut [u8]>,
    rect: &PixelRect,
    label: &str,
    color: P,
    background: P,
) where
    P: Pixel<Subpixel = u8>,
{
    let outline = Rect::at(rect.x1 as i32, rect.y1 as i32).of_size(rect.width(), rect.height());
    draw_hollow_rect_mut(canvas, outline, color);

    // above the box when there is room, otherwise just inside its top edge
    let text_top = if rect.y1 >= GLYPH_HEIGHT + LABEL_GAP {
        rect.y1 - GLYPH_HEIGHT - LABEL_GAP
    } else {
        rect.y1 + LABEL_GAP
    };
    draw_text(canvas, rect.x1, text_top, label, color, background);
}

fn draw_text<P>(
    canvas: &mut ImageBuffer<P, &mut [u8]>,
    x: u32,
    y: u32,
    text: &str,
    color: P,
    background: P,
) where
    P: Pixel<Subpixel = u8>,
{
    let (cw, ch) = canvas.dimensions();
    let text_width = text.chars().count() as u32 * GLYPH_ADVANCE;

    for py in y.saturating_sub(1)..(y + GLYPH_HEIGHT + 1).min(ch) {
        for px in x..(x + text_width).min(cw) {
            canvas.put_pixel(px, py, background);
        }
    }

    for (i, c) in text.chars().enumerate() {
        let gx = x + i as u32 * GLYPH_ADVANCE;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                let (px, py) = (gx + col, y + row as u32);
                if px < cw && py < ch {
                    canvas.put_pixel(px, py, color);
                }
            }
        }
    }
}

/// 5x7 bitmap rows, most significant of the low five bits on the left.
fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
        '3' => [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b01110, 0b10000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00001, 0b01110],
        '%' => [0b11001, 0b11010, 0b00100, 0b01000, 0b10000, 0b01011, 0b10011],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        _ => [0; 7],
    }
}
