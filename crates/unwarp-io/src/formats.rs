use std::path::Path;

/// Image file extensions accepted by the batch pipeline.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["bmp", "jpg", "jpeg", "png", "gif", "tiff"];

/// Video file extensions accepted by the batch pipeline.
pub const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "avi", "mov", "mkv", "flv", "wmv"];

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

/// Whether the path carries a supported image extension (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    has_extension(path, &IMAGE_EXTENSIONS)
}

/// Whether the path carries a supported video extension (case-insensitive).
pub fn is_supported_video(path: &Path) -> bool {
    has_extension(path, &VIDEO_EXTENSIONS)
}
