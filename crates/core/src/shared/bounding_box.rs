/// A detected face, in coordinates relative to the frame size.
///
/// `x_min`/`y_min` locate the top-left corner and `width`/`height` the
/// extent, all as fractions of the frame dimensions. Detectors may report
/// values slightly outside [0, 1] for faces cut by the frame edge; clamping
/// happens when the box is turned into a [`PixelRect`](super::pixel_rect::PixelRect).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x_min: f64,
    pub y_min: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

impl BoundingBox {
    pub fn new(x_min: f64, y_min: f64, width: f64, height: f64, confidence: f64) -> Self {
        Self {
            x_min,
            y_min,
            width,
            height,
            confidence,
        }
    }

    /// Confidence as a whole percentage, as shown in annotation labels.
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}
