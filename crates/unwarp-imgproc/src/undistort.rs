use rayon::prelude::*;

use unwarp_image::ImageSize;

use crate::calibration::{
    distortion::{distort_point, PolynomialDistortion},
    CameraIntrinsic,
};

/// A dense per-pixel undistortion lookup map.
///
/// For every destination pixel `(x, y)` the map stores the real-valued
/// source coordinate to sample from, obtained by pushing the destination
/// (ideal) pixel through the forward distortion model. Entries may fall
/// outside the source bounds; the resampler applies the border policy.
///
/// The map is immutable after construction and is shared across all frames
/// or images of the same resolution, which is the key optimization for
/// video work.
#[derive(Clone, Debug, PartialEq)]
pub struct UndistortionMap {
    size: ImageSize,
    map_x: Vec<f32>,
    map_y: Vec<f32>,
}

impl UndistortionMap {
    /// Build the undistortion map for an output resolution.
    ///
    /// This is an O(width * height) one-time cost per distinct resolution.
    /// Building is deterministic and side-effect-free, so results can be
    /// memoized by `(size, intrinsic, distortion)`.
    ///
    /// # Arguments
    ///
    /// * `size` - The output resolution the map covers.
    /// * `intrinsic` - The intrinsic parameters of the camera.
    /// * `distortion` - The distortion parameters of the camera.
    pub fn build(
        size: ImageSize,
        intrinsic: &CameraIntrinsic,
        distortion: &PolynomialDistortion,
    ) -> Self {
        let (cols, rows) = (size.width, size.height);

        let mut map_x = vec![0f32; cols * rows];
        let mut map_y = vec![0f32; cols * rows];

        // zero-width chunks are rejected by the chunking iterators
        if cols == 0 || rows == 0 {
            return Self { size, map_x, map_y };
        }

        map_x
            .par_chunks_exact_mut(cols)
            .zip(map_y.par_chunks_exact_mut(cols))
            .enumerate()
            .for_each(|(y, (row_x, row_y))| {
                for (x, (mx, my)) in row_x.iter_mut().zip(row_y.iter_mut()).enumerate() {
                    let (sx, sy) = distort_point(x as f64, y as f64, intrinsic, distortion);
                    *mx = sx as f32;
                    *my = sy as f32;
                }
            });

        Self { size, map_x, map_y }
    }

    /// The output resolution the map covers.
    #[inline]
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// The x coordinates of the source samples, row-major.
    #[inline]
    pub fn map_x(&self) -> &[f32] {
        &self.map_x
    }

    /// The y coordinates of the source samples, row-major.
    #[inline]
    pub fn map_y(&self) -> &[f32] {
        &self.map_y
    }

    /// The source coordinate for one destination pixel.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> (f32, f32) {
        let idx = y * self.size.width + x;
        (self.map_x[idx], self.map_y[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_params() -> (CameraIntrinsic, PolynomialDistortion) {
        (
            CameraIntrinsic {
                fx: 1000.0,
                fy: 1000.0,
                cx: 500.0,
                cy: 500.0,
            },
            PolynomialDistortion {
                k1: -0.1,
                k2: 0.2,
                p1: -0.001,
                p2: 0.001,
                k3: 0.3,
            },
        )
    }

    #[test]
    fn build_is_deterministic() {
        let (intrinsic, distortion) = test_params();
        let size = ImageSize {
            width: 64,
            height: 48,
        };

        let a = UndistortionMap::build(size, &intrinsic, &distortion);
        let b = UndistortionMap::build(size, &intrinsic, &distortion);

        // bit-identical planes, not just approximately equal
        assert_eq!(a.map_x(), b.map_x());
        assert_eq!(a.map_y(), b.map_y());
    }

    #[test]
    fn zero_distortion_is_identity_map() {
        let (intrinsic, _) = test_params();
        let zero = PolynomialDistortion::from_coeffs(&[0.0; 5]);
        let size = ImageSize {
            width: 8,
            height: 6,
        };

        let map = UndistortionMap::build(size, &intrinsic, &zero);
        for y in 0..size.height {
            for x in 0..size.width {
                let (sx, sy) = map.get(x, y);
                assert_relative_eq!(sx, x as f32, epsilon = 1e-5);
                assert_relative_eq!(sy, y as f32, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn zero_size_map_is_empty() {
        let (intrinsic, distortion) = test_params();

        for size in [
            ImageSize {
                width: 0,
                height: 4,
            },
            ImageSize {
                width: 4,
                height: 0,
            },
        ] {
            let map = UndistortionMap::build(size, &intrinsic, &distortion);
            assert_eq!(map.size(), size);
            assert!(map.map_x().is_empty());
            assert!(map.map_y().is_empty());
        }
    }

    #[test]
    fn principal_point_maps_to_itself() {
        let (intrinsic, distortion) = test_params();
        let size = ImageSize {
            width: 1000,
            height: 1000,
        };

        let map = UndistortionMap::build(size, &intrinsic, &distortion);
        let (sx, sy) = map.get(500, 500);
        assert_relative_eq!(sx, 500.0, epsilon = 1e-4);
        assert_relative_eq!(sy, 500.0, epsilon = 1e-4);
    }
}
