use std::path::Path;

use unwarp_image::{Image, ImageSize};

/// An error type for the video collaborators.
///
/// Backend-specific failures are carried as strings so the pipeline does
/// not depend on any particular video stack.
#[derive(thiserror::Error, Debug)]
pub enum VideoError {
    /// Error when opening a frame source.
    #[error("Failed to open the video source: {0}")]
    OpenSourceError(String),

    /// Error when opening a frame sink.
    #[error("Failed to open the video sink: {0}")]
    OpenSinkError(String),

    /// Error when reading a frame.
    #[error("Failed to read a frame: {0}")]
    ReadFrameError(String),

    /// Error when writing a frame.
    #[error("Failed to write a frame: {0}")]
    WriteFrameError(String),

    /// Error when closing a stream.
    #[error("Failed to close the video stream: {0}")]
    CloseError(String),

    /// The build carries no video backend.
    #[error("Video support is not enabled in this build")]
    Unsupported,
}

/// Properties of an opened video stream.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamInfo {
    /// Total number of frames, when the container reports one.
    pub frame_count: Option<u64>,
    /// Frames per second.
    pub fps: f64,
    /// Frame resolution.
    pub size: ImageSize,
}

/// A source of decoded video frames.
pub trait FrameSource {
    /// The stream properties, known from open time.
    fn info(&self) -> StreamInfo;

    /// Read the next frame; `None` signals end of stream.
    fn read_frame(&mut self) -> Result<Option<Image<u8, 3>>, VideoError>;

    /// Release the decoder resources.
    fn close(&mut self) -> Result<(), VideoError>;
}

/// A sink accepting corrected video frames.
pub trait FrameSink {
    /// Append one frame to the output stream.
    fn write_frame(&mut self, frame: &Image<u8, 3>) -> Result<(), VideoError>;

    /// Finalize the output stream and release the encoder resources.
    fn close(&mut self) -> Result<(), VideoError>;
}

/// Factory for frame sources and sinks.
///
/// The batch orchestrator holds one of these and opens per-item streams
/// through it, so tests and feature-gated backends can swap in freely.
pub trait VideoIo: Send + Sync {
    /// Open a frame source for a video file.
    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>, VideoError>;

    /// Open a frame sink with a fixed encoding profile.
    fn open_sink(
        &self,
        path: &Path,
        fps: f64,
        size: ImageSize,
    ) -> Result<Box<dyn FrameSink>, VideoError>;
}

/// A [`VideoIo`] for builds without a video backend; every open fails with
/// [`VideoError::Unsupported`], which the batch records as an item failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedVideoIo;

impl VideoIo for UnsupportedVideoIo {
    fn open_source(&self, _path: &Path) -> Result<Box<dyn FrameSource>, VideoError> {
        Err(VideoError::Unsupported)
    }

    fn open_sink(
        &self,
        _path: &Path,
        _fps: f64,
        _size: ImageSize,
    ) -> Result<Box<dyn FrameSink>, VideoError> {
        Err(VideoError::Unsupported)
    }
}
