use std::path::{Path, PathBuf};

use unwarp_io::formats;

use crate::config::DEFAULT_CONCURRENCY;
use crate::error::BatchError;

/// A batch of inputs to correct, with the raw configuration attached.
///
/// The job is an explicit value handed to the orchestrator; nothing about
/// the batch lives in ambient state. The coefficient and matrix strings
/// are kept raw here and validated once at batch start.
#[derive(Clone, Debug)]
pub struct BatchJob {
    /// Input locations: image files, video files, or directories of images.
    pub inputs: Vec<PathBuf>,
    /// Destination directory for corrected outputs.
    pub destination: PathBuf,
    /// Comma-separated distortion coefficients `k1,k2,p1,p2,k3`.
    pub dist_coeffs: String,
    /// Comma-separated row-major 3x3 camera matrix (9 values).
    pub camera_matrix: String,
    /// Number of items processed in parallel; 1 is strictly sequential.
    pub concurrency: usize,
}

impl BatchJob {
    /// Create a job with the default (sequential) concurrency.
    pub fn new(
        inputs: Vec<PathBuf>,
        destination: impl Into<PathBuf>,
        dist_coeffs: impl Into<String>,
        camera_matrix: impl Into<String>,
    ) -> Self {
        Self {
            inputs,
            destination: destination.into(),
            dist_coeffs: dist_coeffs.into(),
            camera_matrix: camera_matrix.into(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// The kind of work a batch item represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    /// A single still image.
    Image,
    /// A video file, processed frame by frame.
    Video,
}

/// One unit of work within a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct WorkItem {
    /// The source file.
    pub path: PathBuf,
    /// Whether the file is processed as an image or a video.
    pub kind: ItemKind,
}

/// The lifecycle state of a batch item.
#[derive(Clone, Debug, PartialEq)]
pub enum ItemStatus {
    /// Not yet dispatched.
    Pending,
    /// Currently being processed.
    Running,
    /// Processed successfully.
    Done,
    /// Processing failed; the reason is recorded and the batch continues.
    Failed(String),
    /// Skipped due to user cancellation.
    Cancelled,
}

/// The final per-item outcome of a batch run.
#[derive(Clone, Debug)]
pub struct BatchSummary {
    /// Every item with its final status, in dispatch order.
    pub items: Vec<(PathBuf, ItemStatus)>,
}

impl BatchSummary {
    /// Number of items with the given status predicate.
    fn count(&self, f: impl Fn(&ItemStatus) -> bool) -> usize {
        self.items.iter().filter(|(_, status)| f(status)).count()
    }

    /// Number of successfully processed items.
    pub fn done(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Done))
    }

    /// Number of failed items.
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Failed(_)))
    }

    /// Number of cancelled items.
    pub fn cancelled(&self) -> usize {
        self.count(|s| matches!(s, ItemStatus::Cancelled))
    }
}

/// Expand job inputs into concrete work items.
///
/// Directories expand to their supported image files sorted by name
/// (videos are always given as explicit files); file inputs are classified
/// by extension. Files with unsupported extensions are skipped with a
/// warning rather than failing the batch.
///
/// # Errors
///
/// [`BatchError::InvalidConfiguration`] when a directory input cannot be
/// enumerated.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<WorkItem>, BatchError> {
    let mut items = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut files = std::fs::read_dir(input)
                .map_err(|e| {
                    BatchError::InvalidConfiguration(format!(
                        "cannot read input directory {}: {e}",
                        input.display()
                    ))
                })?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && formats::is_supported_image(path))
                .collect::<Vec<_>>();
            files.sort();

            items.extend(files.into_iter().map(|path| WorkItem {
                path,
                kind: ItemKind::Image,
            }));
        } else if let Some(kind) = classify(input) {
            items.push(WorkItem {
                path: input.clone(),
                kind,
            });
        } else {
            log::warn!("skipping unsupported input: {}", input.display());
        }
    }

    Ok(items)
}

fn classify(path: &Path) -> Option<ItemKind> {
    if formats::is_supported_image(path) {
        Some(ItemKind::Image)
    } else if formats::is_supported_video(path) {
        Some(ItemKind::Video)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_by_extension() {
        assert_eq!(classify(Path::new("a.PNG")), Some(ItemKind::Image));
        assert_eq!(classify(Path::new("b.mkv")), Some(ItemKind::Video));
        assert_eq!(classify(Path::new("c.txt")), None);
    }

    #[test]
    fn expand_directory_filters_and_sorts() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        for name in ["b.png", "a.jpg", "notes.txt", "c.BMP"] {
            std::fs::write(tmp_dir.path().join(name), b"")?;
        }

        let items = expand_inputs(&[tmp_dir.path().to_path_buf()])?;
        let names: Vec<_> = items
            .iter()
            .map(|item| item.path.file_name().unwrap().to_str().unwrap())
            .collect();

        assert_eq!(names, ["a.jpg", "b.png", "c.BMP"]);
        assert!(items.iter().all(|item| item.kind == ItemKind::Image));
        Ok(())
    }

    #[test]
    fn expand_missing_file_is_kept_as_item() {
        // a nonexistent path with a supported extension is classified by
        // name and surfaces later as a per-item decode failure
        let res = expand_inputs(&[PathBuf::from("no/such/file.png")]);
        assert!(res.is_ok());
        assert_eq!(res.unwrap().len(), 1);
    }

    #[test]
    fn summary_counts() {
        let summary = BatchSummary {
            items: vec![
                (PathBuf::from("a.png"), ItemStatus::Done),
                (PathBuf::from("b.png"), ItemStatus::Failed("broken".into())),
                (PathBuf::from("c.png"), ItemStatus::Cancelled),
                (PathBuf::from("d.png"), ItemStatus::Done),
            ],
        };
        assert_eq!(summary.done(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.cancelled(), 1);
    }
}
