#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for image containers.
pub mod error;

/// Image container and pixel type traits.
pub mod image;

/// Dynamically typed images of runtime-known depth and channel count.
pub mod dynamic;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageDtype, ImageSize};

pub use crate::dynamic::DynImage;
