use super::CameraIntrinsic;

/// Maximum number of fixed-point iterations for the inverse distortion solve.
///
/// Tunable: 5-20 iterations converge for physically plausible coefficients.
pub const MAX_ITERATIONS: usize = 10;

/// Convergence threshold for the inverse distortion solve, in normalized
/// coordinates. Tunable together with [`MAX_ITERATIONS`].
pub const CONVERGENCE_EPS: f64 = 1e-6;

/// Represents the polynomial distortion parameters of a camera
///
/// The coefficient order follows the common 5-value convention:
/// radial terms `k1, k2, k3` and tangential terms `p1, p2`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolynomialDistortion {
    /// The first radial distortion coefficient
    pub k1: f64,
    /// The second radial distortion coefficient
    pub k2: f64,
    /// The first tangential distortion coefficient
    pub p1: f64,
    /// The second tangential distortion coefficient
    pub p2: f64,
    /// The third radial distortion coefficient
    pub k3: f64,
}

impl PolynomialDistortion {
    /// Build the distortion parameters from the ordered 5-tuple
    /// `(k1, k2, p1, p2, k3)`.
    pub fn from_coeffs(coeffs: &[f64; 5]) -> Self {
        Self {
            k1: coeffs[0],
            k2: coeffs[1],
            p1: coeffs[2],
            p2: coeffs[3],
            k3: coeffs[4],
        }
    }
}

/// Distort a point using the polynomial distortion model.
///
/// Maps an ideal (pinhole) pixel coordinate to the pixel coordinate where
/// the lens actually imaged it.
///
/// # Arguments
///
/// * `x` - The x coordinate of the ideal point in pixels
/// * `y` - The y coordinate of the ideal point in pixels
/// * `intrinsic` - The intrinsic parameters of the camera
/// * `distortion` - The distortion parameters of the camera
///
/// # Returns
///
/// The pixel coordinates of the distorted point.
pub fn distort_point(
    x: f64,
    y: f64,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
) -> (f64, f64) {
    let (fx, fy, cx, cy) = (intrinsic.fx, intrinsic.fy, intrinsic.cx, intrinsic.cy);
    let (k1, k2, p1, p2, k3) = (
        distortion.k1,
        distortion.k2,
        distortion.p1,
        distortion.p2,
        distortion.k3,
    );

    // normalize the coordinates
    let x = (x - cx) / fx;
    let y = (y - cy) / fy;

    let r2 = x * x + y * y;

    // radial distortion
    let kr = 1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2;

    // tangential distortion
    let xd = x * kr + 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
    let yd = y * kr + p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;

    // denormalize the coordinates
    (fx * xd + cx, fy * yd + cy)
}

/// Undistort a point using the polynomial distortion model.
///
/// Maps an observed (distorted) pixel coordinate back to the pixel
/// coordinate of an ideal pinhole camera with the same intrinsics. The
/// model has no closed-form inverse, so the solve iterates a fixed-point
/// refinement seeded with the distorted coordinate; it stops after
/// [`MAX_ITERATIONS`] or once the update falls below [`CONVERGENCE_EPS`].
///
/// For extreme coefficients the iteration may not converge; the best
/// estimate after the cap is returned, making this an approximate inverse
/// rather than an exact one.
///
/// # Arguments
///
/// * `x` - The x coordinate of the observed point in pixels
/// * `y` - The y coordinate of the observed point in pixels
/// * `intrinsic` - The intrinsic parameters of the camera
/// * `distortion` - The distortion parameters of the camera
///
/// # Returns
///
/// The pixel coordinates of the ideal point.
pub fn undistort_point(
    x: f64,
    y: f64,
    intrinsic: &CameraIntrinsic,
    distortion: &PolynomialDistortion,
) -> (f64, f64) {
    let (fx, fy, cx, cy) = (intrinsic.fx, intrinsic.fy, intrinsic.cx, intrinsic.cy);
    let (k1, k2, p1, p2, k3) = (
        distortion.k1,
        distortion.k2,
        distortion.p1,
        distortion.p2,
        distortion.k3,
    );

    // normalize the observed coordinates
    let xd = (x - cx) / fx;
    let yd = (y - cy) / fy;

    // fixed-point iteration for (x, y) such that distort(x, y) ~ (xd, yd)
    let mut x = xd;
    let mut y = yd;

    for _ in 0..MAX_ITERATIONS {
        let r2 = x * x + y * y;

        let kr = 1.0 + k1 * r2 + k2 * r2 * r2 + k3 * r2 * r2 * r2;
        let dx = 2.0 * p1 * x * y + p2 * (r2 + 2.0 * x * x);
        let dy = p1 * (r2 + 2.0 * y * y) + 2.0 * p2 * x * y;

        let x_new = (xd - dx) / kr;
        let y_new = (yd - dy) / kr;

        let delta = ((x_new - x).abs()).max((y_new - y).abs());
        x = x_new;
        y = y_new;

        if delta < CONVERGENCE_EPS {
            break;
        }
    }

    // denormalize the coordinates
    (fx * x + cx, fy * y + cy)
}
