use rayon::prelude::*;

use unwarp_image::{Image, ImageDtype};

/// Apply a function to each destination pixel for grid sampling in parallel.
///
/// Rows of the destination are processed in parallel; for every destination
/// pixel the callback receives the source coordinates from the map planes
/// and the mutable destination sample slice.
pub fn par_iter_rows_resample<T, const C: usize>(
    dst: &mut Image<T, C>,
    map_x: &[f32],
    map_y: &[f32],
    f: impl Fn(&f32, &f32, &mut [T]) + Send + Sync,
) where
    T: ImageDtype,
{
    let cols = dst.cols();
    let dst_slice = dst.as_slice_mut();

    dst_slice
        .par_chunks_exact_mut(C * cols)
        .zip(map_x.par_chunks_exact(cols))
        .zip(map_y.par_chunks_exact(cols))
        .for_each(|((dst_chunk, map_x_chunk), map_y_chunk)| {
            dst_chunk
                .chunks_exact_mut(C)
                .zip(map_x_chunk.iter().zip(map_y_chunk.iter()))
                .for_each(|(dst_pixel, (x, y))| {
                    f(x, y, dst_pixel);
                });
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use unwarp_image::{ImageError, ImageSize};

    #[test]
    fn resample_visits_every_pixel() -> Result<(), ImageError> {
        let mut dst = Image::<f32, 1>::from_size_val(
            ImageSize {
                width: 3,
                height: 2,
            },
            0.0,
        )?;
        let map_x = vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0];
        let map_y = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];

        par_iter_rows_resample(&mut dst, &map_x, &map_y, |x, y, pixel| {
            pixel[0] = x + 10.0 * y;
        });

        assert_eq!(dst.as_slice(), &[0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        Ok(())
    }
}
