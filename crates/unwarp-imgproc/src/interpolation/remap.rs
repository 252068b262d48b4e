use crate::parallel;
use crate::undistort::UndistortionMap;

use super::interpolate::interpolate_pixel;
use super::InterpolationMode;
use unwarp_image::{DynImage, Image, ImageDtype, ImageError};

/// Resample an image through an undistortion map.
///
/// The output always has the map's dimensions, regardless of the source
/// size. For each destination pixel the map's source coordinate is read;
/// coordinates inside `[0, w-1] x [0, h-1]` are interpolated per channel
/// preserving the pixel type, while out-of-bounds coordinates are filled
/// with the border value 0 across all channels.
///
/// # Arguments
///
/// * `src` - The input image container with shape (height, width, C).
/// * `dst` - The output image container with shape (map height, map width, C).
/// * `map` - The undistortion map carrying one source coordinate per output pixel.
/// * `interpolation` - The interpolation mode to use.
///
/// # Errors
///
/// The output image must have the same size as the map.
pub fn remap<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    map: &UndistortionMap,
    interpolation: InterpolationMode,
) -> Result<(), ImageError>
where
    T: ImageDtype,
{
    if dst.size() != map.size() {
        return Err(ImageError::InvalidImageSize(
            dst.width(),
            dst.height(),
            map.size().width,
            map.size().height,
        ));
    }

    // degenerate dimensions have no pixels to sample or write
    if src.width() == 0 || src.height() == 0 || dst.width() == 0 || dst.height() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let max_x = (src.width() - 1) as f32;
    let max_y = (src.height() - 1) as f32;

    parallel::par_iter_rows_resample(dst, map.map_x(), map.map_y(), |&x, &y, dst_pixel| {
        if x >= 0.0 && x <= max_x && y >= 0.0 && y <= max_y {
            let pixel = interpolate_pixel(src, x, y, interpolation);
            for (d, p) in dst_pixel.iter_mut().zip(pixel.iter()) {
                *d = T::from_f32(*p);
            }
        } else {
            // border policy: constant fill, consistent across channels
            for d in dst_pixel.iter_mut() {
                *d = T::from_f32(0.0);
            }
        }
    });

    Ok(())
}

/// Resample a dynamically typed image through an undistortion map.
///
/// Preserves the source bit depth and channel count; the returned image is
/// the same [`DynImage`] variant as the input with the map's dimensions.
pub fn remap_dyn(
    src: &DynImage,
    map: &UndistortionMap,
    interpolation: InterpolationMode,
) -> Result<DynImage, ImageError> {
    Ok(match src {
        DynImage::Mono8(src) => {
            let mut dst = Image::from_size_val(map.size(), 0u8)?;
            remap(src, &mut dst, map, interpolation)?;
            DynImage::Mono8(dst)
        }
        DynImage::Rgb8(src) => {
            let mut dst = Image::from_size_val(map.size(), 0u8)?;
            remap(src, &mut dst, map, interpolation)?;
            DynImage::Rgb8(dst)
        }
        DynImage::Mono16(src) => {
            let mut dst = Image::from_size_val(map.size(), 0u16)?;
            remap(src, &mut dst, map, interpolation)?;
            DynImage::Mono16(dst)
        }
        DynImage::Rgb16(src) => {
            let mut dst = Image::from_size_val(map.size(), 0u16)?;
            remap(src, &mut dst, map, interpolation)?;
            DynImage::Rgb16(dst)
        }
    })
}
