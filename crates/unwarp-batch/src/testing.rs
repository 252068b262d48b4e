//! Mock I/O collaborators for orchestrator and pipeline tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use unwarp_image::{DynImage, Image, ImageSize};
use unwarp_io::error::IoError;
use unwarp_io::functional::ImageCodec;
use unwarp_io::video::{FrameSink, FrameSource, StreamInfo, VideoError, VideoIo};

use crate::progress::CancelToken;

/// An in-memory [`ImageCodec`]: decodes registered file names to flat gray
/// images and records every encode instead of touching the filesystem.
///
/// Unregistered names fail to decode, which is how tests model unreadable
/// sources.
#[derive(Default)]
pub struct MockImageCodec {
    images: HashMap<String, ImageSize>,
    encoded: Mutex<Vec<(PathBuf, DynImage)>>,
}

impl MockImageCodec {
    /// A codec where every decode fails.
    pub fn failing() -> Self {
        Self::default()
    }

    /// A codec with one registered gray image.
    pub fn with_gray_image(name: &str, size: ImageSize) -> Self {
        Self::default().and_gray_image(name, size)
    }

    /// Register another gray image.
    pub fn and_gray_image(mut self, name: &str, size: ImageSize) -> Self {
        self.images.insert(name.to_string(), size);
        self
    }

    /// Ensure the given name stays unreadable.
    pub fn failing_on(mut self, name: &str) -> Self {
        self.images.remove(name);
        self
    }

    /// Everything encoded so far, in call order.
    pub fn encoded(&self) -> Vec<(PathBuf, DynImage)> {
        self.encoded.lock().unwrap().clone()
    }
}

impl ImageCodec for MockImageCodec {
    fn decode(&self, path: &Path) -> Result<DynImage, IoError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let size = self
            .images
            .get(&name)
            .ok_or_else(|| IoError::FileDoesNotExist(path.to_path_buf()))?;

        Ok(DynImage::Mono8(Image::from_size_val(*size, 128u8)?))
    }

    fn encode(&self, path: &Path, image: &DynImage) -> Result<(), IoError> {
        self.encoded
            .lock()
            .unwrap()
            .push((path.to_path_buf(), image.clone()));
        Ok(())
    }
}

const MOCK_FRAME_SIZE: ImageSize = ImageSize {
    width: 16,
    height: 12,
};

/// A [`VideoIo`] producing synthetic fixed-size frames and counting the
/// frames written to its sinks.
#[derive(Default)]
pub struct MockVideoIo {
    frames: u64,
    hide_frame_count: bool,
    fail_open: bool,
    cancel_after: Option<(u64, CancelToken)>,
    written: Arc<AtomicU64>,
}

impl MockVideoIo {
    /// A source of `frames` synthetic frames with a known frame count.
    pub fn with_frames(frames: u64) -> Self {
        Self {
            frames,
            ..Self::default()
        }
    }

    /// Stop reporting a frame count, like a container without one.
    pub fn without_frame_count(mut self) -> Self {
        self.hide_frame_count = true;
        self
    }

    /// Trip the token after the source has produced `after` frames.
    ///
    /// The trip happens synchronously inside `read_frame`, so tests see
    /// deterministic cancellation points.
    pub fn cancelling_after(mut self, after: u64, token: CancelToken) -> Self {
        self.cancel_after = Some((after, token));
        self
    }

    /// Fail every open, like a corrupt or missing container.
    pub fn failing_open() -> Self {
        Self {
            fail_open: true,
            ..Self::default()
        }
    }

    /// Total frames written across all sinks.
    pub fn frames_written(&self) -> u64 {
        self.written.load(Ordering::SeqCst)
    }
}

impl VideoIo for MockVideoIo {
    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>, VideoError> {
        if self.fail_open {
            return Err(VideoError::OpenSourceError(format!(
                "mock open failure: {}",
                path.display()
            )));
        }

        Ok(Box::new(MockFrameSource {
            total: self.frames,
            emitted: 0,
            hide_frame_count: self.hide_frame_count,
            cancel_after: self.cancel_after.clone(),
        }))
    }

    fn open_sink(
        &self,
        path: &Path,
        _fps: f64,
        _size: ImageSize,
    ) -> Result<Box<dyn FrameSink>, VideoError> {
        if self.fail_open {
            return Err(VideoError::OpenSinkError(format!(
                "mock open failure: {}",
                path.display()
            )));
        }

        Ok(Box::new(MockFrameSink {
            written: self.written.clone(),
        }))
    }
}

struct MockFrameSource {
    total: u64,
    emitted: u64,
    hide_frame_count: bool,
    cancel_after: Option<(u64, CancelToken)>,
}

impl FrameSource for MockFrameSource {
    fn info(&self) -> StreamInfo {
        StreamInfo {
            frame_count: (!self.hide_frame_count).then_some(self.total),
            fps: 25.0,
            size: MOCK_FRAME_SIZE,
        }
    }

    fn read_frame(&mut self) -> Result<Option<Image<u8, 3>>, VideoError> {
        if self.emitted == self.total {
            return Ok(None);
        }
        self.emitted += 1;

        if let Some((after, token)) = &self.cancel_after {
            if self.emitted == *after {
                token.cancel();
            }
        }

        let frame = Image::from_size_val(MOCK_FRAME_SIZE, 100u8)
            .map_err(|e| VideoError::ReadFrameError(e.to_string()))?;
        Ok(Some(frame))
    }

    fn close(&mut self) -> Result<(), VideoError> {
        Ok(())
    }
}

struct MockFrameSink {
    written: Arc<AtomicU64>,
}

impl FrameSink for MockFrameSink {
    fn write_frame(&mut self, _frame: &Image<u8, 3>) -> Result<(), VideoError> {
        self.written.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn close(&mut self) -> Result<(), VideoError> {
        Ok(())
    }
}
