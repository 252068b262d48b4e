use crate::image::{Image, ImageSize};

/// An image whose bit depth and channel count are only known at runtime.
///
/// Decoded files arrive in whichever shape the codec produced; this enum
/// carries them through the pipeline without forcing a conversion, so the
/// corrected output preserves the source depth and channel count.
#[derive(Clone, Debug, PartialEq)]
pub enum DynImage {
    /// 8-bit grayscale image
    Mono8(Image<u8, 1>),
    /// 8-bit RGB image
    Rgb8(Image<u8, 3>),
    /// 16-bit grayscale image
    Mono16(Image<u16, 1>),
    /// 16-bit RGB image
    Rgb16(Image<u16, 3>),
}

impl DynImage {
    /// The size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        match self {
            Self::Mono8(img) => img.size(),
            Self::Rgb8(img) => img.size(),
            Self::Mono16(img) => img.size(),
            Self::Rgb16(img) => img.size(),
        }
    }

    /// The number of channels of the image.
    pub fn num_channels(&self) -> usize {
        match self {
            Self::Mono8(_) | Self::Mono16(_) => 1,
            Self::Rgb8(_) | Self::Rgb16(_) => 3,
        }
    }

    /// The number of bits per sample.
    pub fn bit_depth(&self) -> usize {
        match self {
            Self::Mono8(_) | Self::Rgb8(_) => 8,
            Self::Mono16(_) | Self::Rgb16(_) => 16,
        }
    }
}
