use std::collections::VecDeque;
use std::path::Path;
use std::sync::{mpsc, Arc, Mutex};

use unwarp_io::functional::ImageCodec;
use unwarp_io::video::VideoIo;

use crate::cache::MapCache;
use crate::config::BatchConfig;
use crate::error::BatchError;
use crate::job::{expand_inputs, BatchJob, BatchSummary, ItemKind, ItemStatus, WorkItem};
use crate::pipeline::{process_image, process_video, ItemContext};
use crate::progress::{CancelToken, ProgressSnapshot};

/// A per-item message from a worker to the orchestrator thread.
///
/// Every message carries the item index, so the orchestrator can keep the
/// one authoritative status table without workers sharing counters.
enum WorkerEvent {
    Started(usize),
    Progress(usize, f64),
    Finished(usize, ItemStatus),
}

/// Runs batches of correction items against pluggable I/O collaborators.
///
/// The runner owns no per-batch state; each [`run`](Self::run) call parses
/// and validates the job, builds a fresh map cache, and drives a worker
/// pool over the expanded items.
pub struct BatchRunner {
    image_codec: Arc<dyn ImageCodec>,
    video_io: Arc<dyn VideoIo>,
}

impl BatchRunner {
    /// Create a runner over the given collaborators.
    pub fn new(image_codec: Arc<dyn ImageCodec>, video_io: Arc<dyn VideoIo>) -> Self {
        Self {
            image_codec,
            video_io,
        }
    }

    /// Run a batch to completion or cancellation.
    ///
    /// Validation (coefficients, matrix, destination writability) happens
    /// before any item is touched. Per-item failures are recorded in the
    /// summary and do not abort the run; `on_progress` fires on item
    /// start, per-frame video progress, and item completion.
    ///
    /// # Errors
    ///
    /// [`BatchError::InvalidConfiguration`] for malformed parameters,
    /// [`BatchError::DestinationUnwritable`] when the destination
    /// directory cannot be written to.
    pub fn run(
        &self,
        job: &BatchJob,
        mut on_progress: impl FnMut(ProgressSnapshot),
        cancel: &CancelToken,
    ) -> Result<BatchSummary, BatchError> {
        let config = BatchConfig::from_job(job)?;
        probe_destination(&job.destination)?;

        let items = expand_inputs(&job.inputs)?;
        let total = items.len();
        if total == 0 {
            log::warn!("no supported inputs found, nothing to do");
            return Ok(BatchSummary { items: Vec::new() });
        }

        log::info!(
            "starting batch of {} item(s) with concurrency {}",
            total,
            config.concurrency
        );

        let cache = MapCache::new();
        let mut statuses = vec![ItemStatus::Pending; total];

        let queue = Mutex::new((0..total).collect::<VecDeque<usize>>());
        let (tx, rx) = mpsc::channel::<WorkerEvent>();
        let workers = config.concurrency.min(total);

        std::thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                let cache = &cache;
                let config = &config;
                let items = &items;
                let image_codec = self.image_codec.as_ref();
                let video_io = self.video_io.as_ref();
                let destination = job.destination.as_path();

                scope.spawn(move || {
                    let ctx = ItemContext {
                        config,
                        cache,
                        image_codec,
                        video_io,
                    };

                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let Some(index) = queue.lock().unwrap().pop_front() else {
                            break;
                        };

                        // send failures mean the orchestrator is gone;
                        // stop quietly
                        if tx.send(WorkerEvent::Started(index)).is_err() {
                            break;
                        }

                        let item = &items[index];
                        let status =
                            run_item(&ctx, item, destination, cancel, |fraction| {
                                let _ = tx.send(WorkerEvent::Progress(index, fraction));
                            });

                        if tx.send(WorkerEvent::Finished(index, status)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);

            // single authoritative status table, updated only here
            let mut items_done = 0usize;
            for event in rx {
                let (index, fraction) = match event {
                    WorkerEvent::Started(index) => {
                        statuses[index] = ItemStatus::Running;
                        (index, 0.0)
                    }
                    WorkerEvent::Progress(index, fraction) => (index, fraction),
                    WorkerEvent::Finished(index, status) => {
                        let fraction = match &status {
                            ItemStatus::Done => 1.0,
                            _ => 0.0,
                        };
                        if matches!(status, ItemStatus::Done | ItemStatus::Failed(_)) {
                            items_done += 1;
                        }
                        statuses[index] = status;
                        (index, fraction)
                    }
                };

                on_progress(ProgressSnapshot {
                    item_index: index,
                    item_fraction: fraction,
                    items_done,
                    total_items: total,
                });
            }
        });

        // anything never dispatched was skipped by cancellation
        for status in &mut statuses {
            if matches!(status, ItemStatus::Pending | ItemStatus::Running) {
                *status = ItemStatus::Cancelled;
            }
        }

        let summary = BatchSummary {
            items: items
                .into_iter()
                .map(|item| item.path)
                .zip(statuses)
                .collect(),
        };

        log::info!(
            "batch finished: {} done, {} failed, {} cancelled",
            summary.done(),
            summary.failed(),
            summary.cancelled()
        );

        Ok(summary)
    }
}

/// Process one item, folding every outcome into its final status.
fn run_item(
    ctx: &ItemContext,
    item: &WorkItem,
    destination: &Path,
    cancel: &CancelToken,
    on_progress: impl FnMut(f64),
) -> ItemStatus {
    let outcome = match item.kind {
        ItemKind::Image => process_image(ctx, &item.path, destination).map(|()| true),
        ItemKind::Video => process_video(ctx, &item.path, destination, on_progress, cancel),
    };

    match outcome {
        Ok(true) => ItemStatus::Done,
        Ok(false) => ItemStatus::Cancelled,
        Err(err) => {
            log::warn!("failed to process {}: {err}", item.path.display());
            ItemStatus::Failed(err.to_string())
        }
    }
}

/// Verify the destination directory accepts writes by creating and
/// removing a marker file.
fn probe_destination(destination: &Path) -> Result<(), BatchError> {
    let unwritable = |source: std::io::Error| BatchError::DestinationUnwritable {
        path: destination.to_path_buf(),
        source,
    };

    let marker = destination.join(".unwarp-write-probe");
    std::fs::write(&marker, b"").map_err(unwritable)?;
    std::fs::remove_file(&marker).map_err(unwritable)?;

    Ok(())
}
