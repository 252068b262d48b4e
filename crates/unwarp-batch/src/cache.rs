use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use unwarp_image::ImageSize;
use unwarp_imgproc::calibration::{distortion::PolynomialDistortion, CameraIntrinsic};
use unwarp_imgproc::undistort::UndistortionMap;

/// Cache key: resolution plus the exact parameter bits.
///
/// Bit-level equality on the f64 parameters is what makes map reuse
/// observably equivalent to rebuilding.
#[derive(PartialEq, Eq, Hash, Debug)]
struct MapKey {
    size: ImageSize,
    intrinsic: [u64; 4],
    distortion: [u64; 5],
}

impl MapKey {
    fn new(size: ImageSize, intrinsic: &CameraIntrinsic, distortion: &PolynomialDistortion) -> Self {
        Self {
            size,
            intrinsic: [
                intrinsic.fx.to_bits(),
                intrinsic.fy.to_bits(),
                intrinsic.cx.to_bits(),
                intrinsic.cy.to_bits(),
            ],
            distortion: [
                distortion.k1.to_bits(),
                distortion.k2.to_bits(),
                distortion.p1.to_bits(),
                distortion.p2.to_bits(),
                distortion.k3.to_bits(),
            ],
        }
    }
}

/// In-memory cache of undistortion maps, one per distinct
/// `(resolution, intrinsic, distortion)` combination.
///
/// Building is synchronized so two items of the same new resolution do not
/// race to build duplicate maps; hits hand out a clone of the shared
/// `Arc`, so reading an existing map takes no lock beyond the brief
/// lookup. The cache lives for one batch and is dropped with it.
#[derive(Debug, Default)]
pub struct MapCache {
    maps: Mutex<HashMap<MapKey, Arc<UndistortionMap>>>,
}

impl MapCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the map for the given combination, building it on first use.
    pub fn get_or_build(
        &self,
        size: ImageSize,
        intrinsic: &CameraIntrinsic,
        distortion: &PolynomialDistortion,
    ) -> Arc<UndistortionMap> {
        let key = MapKey::new(size, intrinsic, distortion);

        // SAFETY: lock poisoning only happens if a builder panicked
        let mut maps = self.maps.lock().unwrap();

        if let Some(map) = maps.get(&key) {
            log::debug!("undistortion map cache hit for {}", size);
            return map.clone();
        }

        log::debug!("building undistortion map for {}", size);
        let map = Arc::new(UndistortionMap::build(size, intrinsic, distortion));
        maps.insert(key, map.clone());
        map
    }

    /// Number of cached maps.
    pub fn len(&self) -> usize {
        self.maps.lock().unwrap().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
