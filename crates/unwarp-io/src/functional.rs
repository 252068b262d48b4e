use std::path::Path;

use unwarp_image::{DynImage, Image, ImageSize};

use crate::error::IoError;

/// The image decode/encode collaborator consumed by the batch pipeline.
///
/// Implementations must be shareable across worker threads.
pub trait ImageCodec: Send + Sync {
    /// Decode an image file into a [`DynImage`].
    fn decode(&self, path: &Path) -> Result<DynImage, IoError>;

    /// Encode a [`DynImage`] to a file; the format is chosen from the
    /// destination extension.
    fn encode(&self, path: &Path, image: &DynImage) -> Result<(), IoError>;
}

/// Filesystem-backed [`ImageCodec`] using [`read_image_any`] and
/// [`write_image_any`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageCodec;

impl ImageCodec for FsImageCodec {
    fn decode(&self, path: &Path) -> Result<DynImage, IoError> {
        read_image_any(path)
    }

    fn encode(&self, path: &Path, image: &DynImage) -> Result<(), IoError> {
        write_image_any(path, image)
    }
}

/// Reads an image from the given file path.
///
/// The method tries to read from any image format supported by the image
/// crate; the decoded bit depth and channel count are preserved where the
/// pipeline supports them (8/16-bit, mono/RGB), and alpha channels are
/// dropped.
///
/// # Arguments
///
/// * `file_path` - The path to a valid image file.
///
/// # Returns
///
/// An image containing the decoded pixel data.
pub fn read_image_any(file_path: impl AsRef<Path>) -> Result<DynImage, IoError> {
    let file_path = file_path.as_ref().to_owned();

    // verify the file exists
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path));
    }

    // open the file and map it to memory
    let file = std::fs::File::open(file_path)?;
    let mmap = unsafe { memmap2::Mmap::map(&file)? };

    // decode the data directly from memory
    let img = image::ImageReader::new(std::io::Cursor::new(&mmap))
        .with_guessed_format()?
        .decode()?;

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let image = match img.color() {
        image::ColorType::L8 => DynImage::Mono8(Image::new(size, img.into_luma8().into_raw())?),
        image::ColorType::La8 => DynImage::Mono8(Image::new(size, img.to_luma8().into_raw())?),
        image::ColorType::L16 => DynImage::Mono16(Image::new(size, img.into_luma16().into_raw())?),
        image::ColorType::La16 => DynImage::Mono16(Image::new(size, img.to_luma16().into_raw())?),
        image::ColorType::Rgb16 => DynImage::Rgb16(Image::new(size, img.into_rgb16().into_raw())?),
        image::ColorType::Rgba16 => DynImage::Rgb16(Image::new(size, img.to_rgb16().into_raw())?),
        // everything else flattens to 8-bit RGB
        _ => DynImage::Rgb8(Image::new(size, img.into_rgb8().into_raw())?),
    };

    Ok(image)
}

/// Writes an image to the given file path.
///
/// The encoder is selected from the destination extension, so the output
/// keeps the source container format when the pipeline carries the name
/// through unchanged (apart from the prefix).
///
/// # Arguments
///
/// * `file_path` - The destination path.
/// * `image` - The image to encode.
pub fn write_image_any(file_path: impl AsRef<Path>, image: &DynImage) -> Result<(), IoError> {
    let file_path = file_path.as_ref();

    let encode_failed = || IoError::ImageEncodeError(file_path.display().to_string());

    let dyn_img = match image {
        DynImage::Mono8(img) => image::DynamicImage::ImageLuma8(
            image::GrayImage::from_raw(
                img.width() as u32,
                img.height() as u32,
                img.as_slice().to_vec(),
            )
            .ok_or_else(encode_failed)?,
        ),
        DynImage::Rgb8(img) => image::DynamicImage::ImageRgb8(
            image::RgbImage::from_raw(
                img.width() as u32,
                img.height() as u32,
                img.as_slice().to_vec(),
            )
            .ok_or_else(encode_failed)?,
        ),
        DynImage::Mono16(img) => image::DynamicImage::ImageLuma16(
            image::ImageBuffer::from_raw(
                img.width() as u32,
                img.height() as u32,
                img.as_slice().to_vec(),
            )
            .ok_or_else(encode_failed)?,
        ),
        DynImage::Rgb16(img) => image::DynamicImage::ImageRgb16(
            image::ImageBuffer::from_raw(
                img.width() as u32,
                img.height() as u32,
                img.as_slice().to_vec(),
            )
            .ok_or_else(encode_failed)?,
        ),
    };

    dyn_img
        .save(file_path)
        .map_err(|e| IoError::ImageEncodeError(format!("{}: {e}", file_path.display())))?;

    Ok(())
}
