use std::path::{Path, PathBuf};

use unwarp_image::{Image, ImageError};
use unwarp_imgproc::interpolation::{remap, remap_dyn, InterpolationMode};
use unwarp_io::error::IoError;
use unwarp_io::functional::ImageCodec;
use unwarp_io::video::{VideoError, VideoIo};

use crate::cache::MapCache;
use crate::config::BatchConfig;
use crate::progress::CancelToken;

/// Fixed literal prefix added to corrected image filenames.
pub const IMAGE_OUTPUT_PREFIX: &str = "undistorted_";

/// An error while processing a single item.
///
/// Item errors are recorded in the item's status and never abort the
/// batch.
#[derive(thiserror::Error, Debug)]
pub enum ItemError {
    /// A pixel buffer error.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// An image decode/encode error.
    #[error(transparent)]
    Io(#[from] IoError),

    /// A video open/read/write error.
    #[error(transparent)]
    Video(#[from] VideoError),
}

/// Shared, read-only context for processing items.
pub struct ItemContext<'a> {
    /// The validated batch parameters.
    pub config: &'a BatchConfig,
    /// The per-batch undistortion map cache.
    pub cache: &'a MapCache,
    /// The image decode/encode collaborator.
    pub image_codec: &'a dyn ImageCodec,
    /// The video source/sink collaborator.
    pub video_io: &'a dyn VideoIo,
}

/// Destination path for a corrected image: the original filename with the
/// [`IMAGE_OUTPUT_PREFIX`] in the destination directory.
pub fn output_path_for_image(src: &Path, dest_dir: &Path) -> PathBuf {
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest_dir.join(format!("{IMAGE_OUTPUT_PREFIX}{name}"))
}

/// Destination path for a corrected video: the original filename in the
/// destination directory.
pub fn output_path_for_video(src: &Path, dest_dir: &Path) -> PathBuf {
    match src.file_name() {
        Some(name) => dest_dir.join(name),
        None => dest_dir.to_path_buf(),
    }
}

/// Correct one still image.
///
/// Decodes through the collaborator, builds or reuses the map for the
/// image's resolution, resamples, and encodes to the prefixed destination
/// name. The source buffer is owned by this call end to end.
pub fn process_image(ctx: &ItemContext, src: &Path, dest_dir: &Path) -> Result<(), ItemError> {
    let image = ctx.image_codec.decode(src)?;

    let map = ctx
        .cache
        .get_or_build(image.size(), &ctx.config.intrinsic, &ctx.config.distortion);

    let corrected = remap_dyn(&image, &map, InterpolationMode::Bilinear)?;

    let out_path = output_path_for_image(src, dest_dir);
    ctx.image_codec.encode(&out_path, &corrected)?;

    Ok(())
}

/// Correct one video, streaming frame by frame.
///
/// One map is built for the stream resolution and reused for every frame.
/// Progress is emitted after each written frame as `written / total`; when
/// the container does not report a frame count the fraction stays 0.0
/// until completion. Cancellation is checked between frames so a request
/// takes effect within one frame's processing time.
///
/// # Returns
///
/// `Ok(true)` when the stream was fully processed, `Ok(false)` when
/// processing stopped early due to cancellation.
pub fn process_video(
    ctx: &ItemContext,
    src: &Path,
    dest_dir: &Path,
    mut on_progress: impl FnMut(f64),
    cancel: &CancelToken,
) -> Result<bool, ItemError> {
    let mut source = ctx.video_io.open_source(src)?;
    let info = source.info();

    let map = ctx
        .cache
        .get_or_build(info.size, &ctx.config.intrinsic, &ctx.config.distortion);

    let out_path = output_path_for_video(src, dest_dir);
    let mut sink = ctx.video_io.open_sink(&out_path, info.fps, info.size)?;

    let mut written: u64 = 0;

    loop {
        if cancel.is_cancelled() {
            source.close()?;
            sink.close()?;
            return Ok(false);
        }

        let Some(frame) = source.read_frame()? else {
            break;
        };

        let mut corrected = Image::from_size_val(info.size, 0u8)?;
        remap(&frame, &mut corrected, &map, InterpolationMode::Bilinear)?;
        sink.write_frame(&corrected)?;

        written += 1;
        let fraction = match info.frame_count {
            Some(total) if total > 0 => (written as f64 / total as f64).min(1.0),
            // indeterminate length: report 0 until completion
            _ => 0.0,
        };
        on_progress(fraction);
    }

    source.close()?;
    sink.close()?;
    on_progress(1.0);

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockImageCodec, MockVideoIo};
    use unwarp_image::ImageSize;

    fn test_config() -> BatchConfig {
        BatchConfig {
            intrinsic: unwarp_imgproc::calibration::CameraIntrinsic {
                fx: 100.0,
                fy: 100.0,
                cx: 4.0,
                cy: 4.0,
            },
            distortion: unwarp_imgproc::calibration::distortion::PolynomialDistortion::from_coeffs(
                &[0.0; 5],
            ),
            concurrency: 1,
        }
    }

    #[test]
    fn image_output_name_is_prefixed() {
        let out = output_path_for_image(Path::new("/in/photo.png"), Path::new("/out"));
        assert_eq!(out, PathBuf::from("/out/undistorted_photo.png"));
    }

    #[test]
    fn video_output_name_is_preserved() {
        let out = output_path_for_video(Path::new("/in/clip.mp4"), Path::new("/out"));
        assert_eq!(out, PathBuf::from("/out/clip.mp4"));
    }

    #[test]
    fn process_image_writes_prefixed_output() -> Result<(), ItemError> {
        let config = test_config();
        let cache = MapCache::new();
        let codec = MockImageCodec::with_gray_image(
            "photo.png",
            ImageSize {
                width: 8,
                height: 8,
            },
        );
        let video_io = MockVideoIo::default();

        let ctx = ItemContext {
            config: &config,
            cache: &cache,
            image_codec: &codec,
            video_io: &video_io,
        };

        process_image(&ctx, Path::new("photo.png"), Path::new("/out"))?;

        let encoded = codec.encoded();
        assert_eq!(encoded.len(), 1);
        assert_eq!(encoded[0].0, PathBuf::from("/out/undistorted_photo.png"));
        assert_eq!(
            encoded[0].1.size(),
            ImageSize {
                width: 8,
                height: 8
            }
        );
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn process_image_decode_failure_propagates() {
        let config = test_config();
        let cache = MapCache::new();
        let codec = MockImageCodec::failing();
        let video_io = MockVideoIo::default();

        let ctx = ItemContext {
            config: &config,
            cache: &cache,
            image_codec: &codec,
            video_io: &video_io,
        };

        let res = process_image(&ctx, Path::new("broken.png"), Path::new("/out"));
        assert!(res.is_err());
        // no map is built and nothing is written for an unreadable source
        assert!(cache.is_empty());
        assert!(codec.encoded().is_empty());
    }

    #[test]
    fn process_video_streams_all_frames() -> Result<(), ItemError> {
        let config = test_config();
        let cache = MapCache::new();
        let codec = MockImageCodec::failing();
        let video_io = MockVideoIo::with_frames(10);

        let ctx = ItemContext {
            config: &config,
            cache: &cache,
            image_codec: &codec,
            video_io: &video_io,
        };

        let mut fractions = Vec::new();
        let completed = process_video(
            &ctx,
            Path::new("clip.mp4"),
            Path::new("/out"),
            |f| fractions.push(f),
            &CancelToken::new(),
        )?;

        assert!(completed);
        assert_eq!(video_io.frames_written(), 10);
        // one fraction per frame plus the final completion
        assert_eq!(fractions.len(), 11);
        assert!((fractions[0] - 0.1).abs() < 1e-9);
        assert_eq!(*fractions.last().unwrap(), 1.0);
        assert_eq!(cache.len(), 1);
        Ok(())
    }

    #[test]
    fn process_video_unknown_length_reports_indeterminate() -> Result<(), ItemError> {
        let config = test_config();
        let cache = MapCache::new();
        let codec = MockImageCodec::failing();
        let video_io = MockVideoIo::with_frames(3).without_frame_count();

        let ctx = ItemContext {
            config: &config,
            cache: &cache,
            image_codec: &codec,
            video_io: &video_io,
        };

        let mut fractions = Vec::new();
        process_video(
            &ctx,
            Path::new("clip.mp4"),
            Path::new("/out"),
            |f| fractions.push(f),
            &CancelToken::new(),
        )?;

        assert_eq!(fractions, vec![0.0, 0.0, 0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn process_video_stops_on_cancellation() -> Result<(), ItemError> {
        let config = test_config();
        let cache = MapCache::new();
        let codec = MockImageCodec::failing();
        let cancel = CancelToken::new();
        // the source trips the token after 3 frames, simulating a request
        // arriving mid-stream
        let video_io = MockVideoIo::with_frames(100).cancelling_after(3, cancel.clone());

        let ctx = ItemContext {
            config: &config,
            cache: &cache,
            image_codec: &codec,
            video_io: &video_io,
        };

        let completed = process_video(
            &ctx,
            Path::new("clip.mp4"),
            Path::new("/out"),
            |_| {},
            &cancel,
        )?;

        assert!(!completed);
        // observed within one frame of the request
        assert!(video_io.frames_written() <= 4);
        Ok(())
    }

    #[test]
    fn process_video_open_failure_propagates() {
        let config = test_config();
        let cache = MapCache::new();
        let codec = MockImageCodec::failing();
        let video_io = MockVideoIo::failing_open();

        let ctx = ItemContext {
            config: &config,
            cache: &cache,
            image_codec: &codec,
            video_io: &video_io,
        };

        let res = process_video(
            &ctx,
            Path::new("clip.mp4"),
            Path::new("/out"),
            |_| {},
            &CancelToken::new(),
        );
        assert!(res.is_err());
    }
}
