/// lens distortion module.
pub mod distortion;

/// Represents the intrinsic parameters of a pinhole camera
///
/// # Fields
///
/// * `fx` - The focal length in the x direction
/// * `fy` - The focal length in the y direction
/// * `cx` - The x coordinate of the principal point
/// * `cy` - The y coordinate of the principal point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraIntrinsic {
    /// The focal length in the x direction
    pub fx: f64,
    /// The focal length in the y direction
    pub fy: f64,
    /// The x coordinate of the principal point
    pub cx: f64,
    /// The y coordinate of the principal point
    pub cy: f64,
}

impl CameraIntrinsic {
    /// Build the intrinsic parameters from a row-major 3x3 camera matrix.
    ///
    /// The matrix layout is `[fx, 0, cx, 0, fy, cy, 0, 0, 1]`; only the
    /// focal lengths and the principal point are read.
    pub fn from_matrix3(matrix: &[f64; 9]) -> Self {
        Self {
            fx: matrix[0],
            fy: matrix[4],
            cx: matrix[2],
            cy: matrix[5],
        }
    }
}
