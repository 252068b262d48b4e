#![doc = include_str!("../../../README.md")]

#[doc(inline)]
pub use unwarp_image as image;

#[doc(inline)]
pub use unwarp_imgproc as imgproc;

#[doc(inline)]
pub use unwarp_io as io;

#[doc(inline)]
pub use unwarp_batch as batch;
