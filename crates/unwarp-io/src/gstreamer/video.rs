use std::path::Path;

use gstreamer::prelude::*;

use unwarp_image::{Image, ImageSize};

use crate::video::{FrameSink, FrameSource, StreamInfo, VideoError, VideoIo};

// make sure that we do not initialize gstreamer several times
fn ensure_gst_initialized() -> Result<(), String> {
    if !gstreamer::INITIALIZED.load(std::sync::atomic::Ordering::Relaxed) {
        gstreamer::init().map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// A [`FrameSource`] reading a video file through GStreamer.
///
/// Decodes any container/codec the installed GStreamer plugins support and
/// converts frames to 8-bit RGB.
pub struct VideoSource {
    pipeline: gstreamer::Pipeline,
    appsink: gstreamer_app::AppSink,
    info: StreamInfo,
    closed: bool,
}

impl VideoSource {
    /// Open a video file and preroll the pipeline.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the video file to be read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, VideoError> {
        ensure_gst_initialized().map_err(VideoError::OpenSourceError)?;

        let path = path.as_ref();
        if !path.exists() {
            return Err(VideoError::OpenSourceError(format!(
                "file does not exist: {}",
                path.display()
            )));
        }

        let pipeline_str = format!(
            "filesrc location=\"{}\" ! \
            decodebin ! \
            videoconvert ! \
            video/x-raw,format=RGB ! \
            appsink name=sink sync=false",
            path.to_string_lossy()
        );

        let pipeline = gstreamer::parse::launch(&pipeline_str)
            .map_err(|e| VideoError::OpenSourceError(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| VideoError::OpenSourceError("failed to downcast pipeline".to_string()))?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or_else(|| VideoError::OpenSourceError("appsink not found".to_string()))?
            .dynamic_cast::<gstreamer_app::AppSink>()
            .map_err(|_| VideoError::OpenSourceError("failed to downcast appsink".to_string()))?;

        pipeline
            .set_state(gstreamer::State::Paused)
            .map_err(|e| VideoError::OpenSourceError(e.to_string()))?;

        // the preroll sample carries the negotiated caps; the first
        // pull_sample after Playing still delivers the first frame
        let sample = appsink
            .pull_preroll()
            .map_err(|e| VideoError::OpenSourceError(e.to_string()))?;

        let caps = sample
            .caps()
            .ok_or_else(|| VideoError::OpenSourceError("no caps on preroll".to_string()))?;
        let structure = caps
            .structure(0)
            .ok_or_else(|| VideoError::OpenSourceError("empty caps".to_string()))?;

        let width = structure
            .get::<i32>("width")
            .map_err(|e| VideoError::OpenSourceError(e.to_string()))? as usize;
        let height = structure
            .get::<i32>("height")
            .map_err(|e| VideoError::OpenSourceError(e.to_string()))? as usize;

        let fps = structure
            .get::<gstreamer::Fraction>("framerate")
            .map(|f| {
                if f.denom() != 0 {
                    f.numer() as f64 / f.denom() as f64
                } else {
                    0.0
                }
            })
            .unwrap_or(0.0);

        // estimate the frame count from the container duration; not every
        // container reports one
        let frame_count = pipeline
            .query_duration::<gstreamer::ClockTime>()
            .and_then(|duration| {
                if fps > 0.0 {
                    let seconds = duration.nseconds() as f64 / 1e9;
                    Some((seconds * fps).round() as u64)
                } else {
                    None
                }
            });

        pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| VideoError::OpenSourceError(e.to_string()))?;

        log::debug!(
            "opened video source {} ({}x{} @ {} fps, {:?} frames)",
            path.display(),
            width,
            height,
            fps,
            frame_count
        );

        Ok(Self {
            pipeline,
            appsink,
            info: StreamInfo {
                frame_count,
                fps,
                size: ImageSize { width, height },
            },
            closed: false,
        })
    }
}

impl FrameSource for VideoSource {
    fn info(&self) -> StreamInfo {
        self.info
    }

    fn read_frame(&mut self) -> Result<Option<Image<u8, 3>>, VideoError> {
        if self.closed || self.appsink.is_eos() {
            return Ok(None);
        }

        let sample = match self.appsink.pull_sample() {
            Ok(sample) => sample,
            Err(_) if self.appsink.is_eos() => return Ok(None),
            Err(e) => return Err(VideoError::ReadFrameError(e.to_string())),
        };

        let buffer = sample
            .buffer()
            .ok_or_else(|| VideoError::ReadFrameError("no buffer on sample".to_string()))?
            .map_readable()
            .map_err(|e| VideoError::ReadFrameError(e.to_string()))?;

        let frame = Image::<u8, 3>::new(self.info.size, buffer.as_slice().to_vec())
            .map_err(|e| VideoError::ReadFrameError(e.to_string()))?;

        Ok(Some(frame))
    }

    fn close(&mut self) -> Result<(), VideoError> {
        if !self.closed {
            self.pipeline
                .set_state(gstreamer::State::Null)
                .map_err(|e| VideoError::CloseError(e.to_string()))?;
            self.closed = true;
        }
        Ok(())
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        let _ = FrameSource::close(self);
    }
}

/// A [`FrameSink`] writing an H.264 mp4 file through GStreamer.
///
/// One fixed encoding profile is used for every sink the batch opens.
pub struct VideoSink {
    pipeline: gstreamer::Pipeline,
    appsrc: gstreamer_app::AppSrc,
    size: ImageSize,
    fps: f64,
    counter: u64,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl VideoSink {
    /// Open a video file for writing and start the encoder pipeline.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to save the video file.
    /// * `fps` - The frames per second of the video.
    /// * `size` - The frame resolution.
    pub fn open(path: impl AsRef<Path>, fps: f64, size: ImageSize) -> Result<Self, VideoError> {
        ensure_gst_initialized().map_err(VideoError::OpenSinkError)?;

        if fps <= 0.0 {
            return Err(VideoError::OpenSinkError(format!("invalid fps: {fps}")));
        }

        let path = path.as_ref().to_owned();

        let pipeline_str = format!(
            "appsrc name=src ! \
            videoconvert ! video/x-raw,format=I420 ! \
            x264enc ! \
            video/x-h264,profile=main ! \
            h264parse ! \
            mp4mux ! \
            filesink location={}",
            path.to_string_lossy()
        );

        let pipeline = gstreamer::parse::launch(&pipeline_str)
            .map_err(|e| VideoError::OpenSinkError(e.to_string()))?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(|_| VideoError::OpenSinkError("failed to downcast pipeline".to_string()))?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or_else(|| VideoError::OpenSinkError("appsrc not found".to_string()))?
            .dynamic_cast::<gstreamer_app::AppSrc>()
            .map_err(|_| VideoError::OpenSinkError("failed to downcast appsrc".to_string()))?;

        appsrc.set_format(gstreamer::Format::Time);

        let framerate = gstreamer::Fraction::approximate_f64(fps)
            .unwrap_or_else(|| gstreamer::Fraction::new(fps.round() as i32, 1));

        let caps = gstreamer::Caps::builder("video/x-raw")
            .field("format", "RGB")
            .field("width", size.width as i32)
            .field("height", size.height as i32)
            .field("framerate", framerate)
            .build();

        appsrc.set_caps(Some(&caps));
        appsrc.set_is_live(true);
        appsrc.set_property("block", false);

        pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|e| VideoError::OpenSinkError(e.to_string()))?;

        let bus = pipeline
            .bus()
            .ok_or_else(|| VideoError::OpenSinkError("no bus on pipeline".to_string()))?;

        // handle the bus messages until EOS so mp4mux can finalize the file
        let handle = std::thread::spawn(move || {
            for msg in bus.iter_timed(gstreamer::ClockTime::NONE) {
                match msg.view() {
                    gstreamer::MessageView::Eos(..) => {
                        log::debug!("gstreamer received EOS");
                        break;
                    }
                    gstreamer::MessageView::Error(err) => {
                        log::error!(
                            "Error from {:?}: {} ({:?})",
                            msg.src().map(|s| s.path_string()),
                            err.error(),
                            err.debug()
                        );
                        break;
                    }
                    _ => {}
                }
            }
        });

        Ok(Self {
            pipeline,
            appsrc,
            size,
            fps,
            counter: 0,
            handle: Some(handle),
        })
    }
}

impl FrameSink for VideoSink {
    fn write_frame(&mut self, frame: &Image<u8, 3>) -> Result<(), VideoError> {
        if frame.size() != self.size {
            return Err(VideoError::WriteFrameError(format!(
                "frame size {} does not match sink size {}",
                frame.size(),
                self.size
            )));
        }

        let mut buffer = gstreamer::Buffer::from_mut_slice(frame.as_slice().to_vec());

        let nanos_per_frame = 1e9 / self.fps;
        let pts =
            gstreamer::ClockTime::from_nseconds((self.counter as f64 * nanos_per_frame) as u64);
        let duration = gstreamer::ClockTime::from_nseconds(nanos_per_frame as u64);

        let buffer_ref = buffer
            .get_mut()
            .ok_or_else(|| VideoError::WriteFrameError("failed to map buffer".to_string()))?;
        buffer_ref.set_pts(Some(pts));
        buffer_ref.set_duration(Some(duration));

        self.counter += 1;

        self.appsrc
            .push_buffer(buffer)
            .map_err(|e| VideoError::WriteFrameError(e.to_string()))?;

        Ok(())
    }

    fn close(&mut self) -> Result<(), VideoError> {
        if self.handle.is_none() {
            return Ok(());
        }

        self.appsrc
            .end_of_stream()
            .map_err(|e| VideoError::CloseError(e.to_string()))?;

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                return Err(VideoError::CloseError(
                    "failed to join the bus thread".to_string(),
                ));
            }
        }

        self.pipeline
            .set_state(gstreamer::State::Null)
            .map_err(|e| VideoError::CloseError(e.to_string()))?;

        Ok(())
    }
}

impl Drop for VideoSink {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = FrameSink::close(self);
        }
    }
}

/// A [`VideoIo`] backed by the GStreamer source and sink above.
#[derive(Debug, Default, Clone, Copy)]
pub struct GstVideoIo;

impl VideoIo for GstVideoIo {
    fn open_source(&self, path: &Path) -> Result<Box<dyn FrameSource>, VideoError> {
        Ok(Box::new(VideoSource::open(path)?))
    }

    fn open_sink(
        &self,
        path: &Path,
        fps: f64,
        size: ImageSize,
    ) -> Result<Box<dyn FrameSink>, VideoError> {
        Ok(Box::new(VideoSink::open(path, fps, size)?))
    }
}
