use std::borrow::Cow;

use ndarray::{ArrayView3, ArrayViewMut3};

/// Order of the colour samples inside each pixel.
///
/// Readers always produce `Rgb`. Detectors may require another order; the
/// frame pipeline converts a private copy before detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Bgr,
}

/// A single image or video frame: contiguous 8-bit samples in row-major
/// order, `channels` samples per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
    order: ChannelOrder,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
            order: ChannelOrder::Rgb,
        }
    }

    /// A frame of `width` x `height` pixels with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self::new(vec![value; len], width, height, channels, 0)
    }

    pub fn with_order(mut self, order: ChannelOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
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

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn order(&self) -> ChannelOrder {
        self.order
    }

    /// Returns the frame in the requested channel order, borrowing when no
    /// conversion is needed. Only the first and third samples of each pixel
    /// are swapped; a fourth (alpha) sample stays in place.
    pub fn in_order(&self, order: ChannelOrder) -> Cow<'_, Frame> {
        if self.order == order || self.channels < 3 {
            return Cow::Borrowed(self);
        }
        let mut converted = self.clone();
        for pixel in converted.data.chunks_exact_mut(self.channels as usize) {
            pixel.swap(0, 2);
        }
        converted.order = order;
        Cow::Owned(converted)
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
