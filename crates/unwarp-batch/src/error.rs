use std::path::PathBuf;

/// An error type for failures that abort the whole batch request.
///
/// Item-scoped failures (unreadable sources, codec errors) never surface
/// here; they are recorded per item in
/// [`ItemStatus::Failed`](crate::job::ItemStatus) and the batch continues.
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    /// Malformed coefficient or matrix input, rejected before any
    /// processing starts.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The destination directory cannot be written to.
    #[error("Destination is not writable: {path}")]
    DestinationUnwritable {
        /// The destination directory.
        path: PathBuf,
        /// The underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
}
