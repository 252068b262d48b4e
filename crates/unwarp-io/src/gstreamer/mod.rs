/// File-based video source/sink implementations.
mod video;

pub use video::{GstVideoIo, VideoSink, VideoSource};
