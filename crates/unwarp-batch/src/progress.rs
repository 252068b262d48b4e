use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A point-in-time view of batch progress.
///
/// Produced by the orchestrator thread only; workers report through the
/// event channel and never touch shared counters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    /// The item the snapshot refers to.
    pub item_index: usize,
    /// Fraction complete within the current item, 0.0 to 1.0. Stays 0.0
    /// for streams of unknown length until completion.
    pub item_fraction: f64,
    /// Number of items settled so far (done or failed).
    pub items_done: usize,
    /// Total number of items in the batch.
    pub total_items: usize,
}

/// Cooperative cancellation token.
///
/// Checked between items and between frames within a video, so a cancel
/// request takes effect within roughly one frame's processing time.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
