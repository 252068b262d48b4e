#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Undistortion map caching.
pub mod cache;

/// Batch configuration parsing and validation.
pub mod config;

/// Error types for the batch module.
pub mod error;

/// Batch job and per-item status model.
pub mod job;

/// Per-item processing pipeline.
pub mod pipeline;

/// Progress reporting and cooperative cancellation.
pub mod progress;

/// The batch orchestrator.
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

pub use crate::error::BatchError;
pub use crate::job::{BatchJob, BatchSummary, ItemKind, ItemStatus};
pub use crate::orchestrator::BatchRunner;
pub use crate::progress::{CancelToken, ProgressSnapshot};
