//! Face anonymization: detect faces in images, videos and camera streams
//! and blur, pixelate, black out or cover each one.

pub mod anonymizing;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod video;
