//! Pixel interpolation methods for the resampling stage.
//!
//! # Interpolation Modes
//!
//! - **Nearest**: Fastest, uses nearest pixel value (no interpolation)
//! - **Bilinear**: Smooth linear interpolation between adjacent pixels

mod bilinear;
mod nearest;

pub(crate) mod interpolate;
mod remap;

pub use interpolate::InterpolationMode;
pub use remap::{remap, remap_dyn};
