pub mod face_annotator;
pub mod frame_pipeline;
pub mod interactive_controller;
pub mod key_source;
pub mod pipeline_logger;
pub mod source_runner;
