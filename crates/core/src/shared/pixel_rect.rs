use super::bounding_box::BoundingBox;

/// Pixel-space face region: columns `x1..x2`, rows `y1..y2` (end-exclusive).
///
/// Always clamped to the frame it was derived from and never empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl PixelRect {
    /// Builds a rect from explicit corners, returning `None` when it is
    /// empty after clamping to a `frame_width` x `frame_height` frame.
    pub fn clamped(
        x1: i64,
        y1: i64,
        x2: i64,
        y2: i64,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Self> {
        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(frame_width as i64);
        let y2 = y2.min(frame_height as i64);
        if x1 < x2 && y1 < y2 {
            Some(Self {
                x1: x1 as u32,
                y1: y1 as u32,
                x2: x2 as u32,
                y2: y2 as u32,
            })
        } else {
            None
        }
    }

    /// Denormalizes a bounding box against the frame size.
    ///
    /// Coordinates truncate toward zero. `padding` trims that fraction of
    /// the box width (height) from the left and right (top and bottom)
    /// sides; `0.0` keeps the detector's box. Out-of-range coordinates
    /// saturate instead of overflowing.
    pub fn from_bounding_box(
        bbox: &BoundingBox,
        frame_width: u32,
        frame_height: u32,
        padding: f64,
    ) -> Option<Self> {
        let fw = frame_width as f64;
        let fh = frame_height as f64;
        let x = (bbox.x_min * fw) as i64;
        let y = (bbox.y_min * fh) as i64;
        let w = (bbox.width * fw) as i64;
        let h = (bbox.height * fh) as i64;

        let pad_x = (w as f64 * padding) as i64;
        let pad_y = (h as f64 * padding) as i64;

        Self::clamped(
            x.saturating_add(pad_x),
            y.saturating_add(pad_y),
            x.saturating_add(w).saturating_sub(pad_x),
            y.saturating_add(h).saturating_sub(pad_y),
            frame_width,
            frame_height,
        )
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }

    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2 && self.x2 <= frame_width && self.y2 <= frame_height
    }
}
