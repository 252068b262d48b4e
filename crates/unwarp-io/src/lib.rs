#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
pub mod error;

/// Supported file extension classification.
pub mod formats;

/// High-level image reading and writing functions.
///
/// Provides the image decode/encode collaborator consumed by the batch
/// pipeline, with automatic format detection.
pub mod functional;

/// Video source/sink collaborator traits.
///
/// The batch pipeline consumes video through these abstract capabilities;
/// concrete backends plug in behind them.
pub mod video;

/// GStreamer video I/O (feature-gated).
///
/// File-based frame source and sink implementations using GStreamer.
/// Requires the `gstreamer` feature flag and system GStreamer libraries.
#[cfg(feature = "gstreamer")]
pub mod gstreamer;
