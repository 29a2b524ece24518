pub mod ffmpeg_reader;
pub mod ffmpeg_writer;
pub mod image_file_reader;
pub mod image_file_sink;
pub mod image_file_writer;
pub mod png_buffer_sink;
pub mod png_codec;
pub mod video_file_sink;
