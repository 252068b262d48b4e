use unwarp_imgproc::calibration::{distortion::PolynomialDistortion, CameraIntrinsic};

use crate::error::BatchError;
use crate::job::BatchJob;

/// Default number of in-flight items; strictly sequential processing.
pub const DEFAULT_CONCURRENCY: usize = 1;

/// Validated batch parameters, parsed once before any processing starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchConfig {
    /// The camera intrinsic parameters.
    pub intrinsic: CameraIntrinsic,
    /// The lens distortion parameters.
    pub distortion: PolynomialDistortion,
    /// Number of items processed in parallel (at least 1).
    pub concurrency: usize,
}

impl BatchConfig {
    /// Parse and validate the raw configuration strings of a job.
    ///
    /// # Errors
    ///
    /// [`BatchError::InvalidConfiguration`] when the coefficient string
    /// does not hold exactly 5 numeric values, the matrix string does not
    /// hold exactly 9, or the focal lengths are not positive.
    pub fn from_job(job: &BatchJob) -> Result<Self, BatchError> {
        let distortion = parse_coefficients(&job.dist_coeffs)?;
        let intrinsic = parse_camera_matrix(&job.camera_matrix)?;

        Ok(Self {
            intrinsic,
            distortion,
            concurrency: job.concurrency.max(1),
        })
    }
}

fn parse_numbers(text: &str) -> Result<Vec<f64>, BatchError> {
    text.split(',')
        .map(str::trim)
        .map(|value| {
            value
                .parse::<f64>()
                .map_err(|_| BatchError::InvalidConfiguration(format!("not a number: {value:?}")))
        })
        .collect()
}

/// Parse the ordered comma-separated 5-tuple `k1,k2,p1,p2,k3`.
pub fn parse_coefficients(text: &str) -> Result<PolynomialDistortion, BatchError> {
    let values = parse_numbers(text)?;

    let coeffs: [f64; 5] = values.try_into().map_err(|values: Vec<f64>| {
        BatchError::InvalidConfiguration(format!(
            "expected 5 distortion coefficients, got {}",
            values.len()
        ))
    })?;

    Ok(PolynomialDistortion::from_coeffs(&coeffs))
}

/// Parse the comma-separated row-major 3x3 camera matrix (9 values).
pub fn parse_camera_matrix(text: &str) -> Result<CameraIntrinsic, BatchError> {
    let values = parse_numbers(text)?;

    let matrix: [f64; 9] = values.try_into().map_err(|values: Vec<f64>| {
        BatchError::InvalidConfiguration(format!(
            "expected 9 camera matrix values, got {}",
            values.len()
        ))
    })?;

    let intrinsic = CameraIntrinsic::from_matrix3(&matrix);

    if intrinsic.fx <= 0.0 || intrinsic.fy <= 0.0 {
        return Err(BatchError::InvalidConfiguration(format!(
            "focal lengths must be positive, got fx={}, fy={}",
            intrinsic.fx, intrinsic.fy
        )));
    }

    Ok(intrinsic)
}
