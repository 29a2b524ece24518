pub mod anonymizer_set;
pub mod blackout;
pub mod box_blurrer;
pub mod emoji_overlay;
pub mod overlay_file_reader;
pub mod pixelator;
mod resample;
mod roi;
