use unwarp_image::{Image, ImageDtype};

/// Kernel for bilinear interpolation
///
/// Interpolates over the four surrounding source pixels, independently per
/// channel. The caller guarantees `(u, v)` lies inside the source bounds;
/// indices are still clamped at the last row/column so the kernel never
/// reads past the buffer.
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel values.
pub(crate) fn bilinear_interpolation<T, const C: usize>(
    image: &Image<T, C>,
    u: f32,
    v: f32,
) -> [f32; C]
where
    T: ImageDtype,
{
    let (rows, cols) = (image.rows(), image.cols());

    let iu = u.trunc() as usize;
    let iv = v.trunc() as usize;

    let iu0 = iu.min(cols - 1);
    let iv0 = iv.min(rows - 1);

    let frac_u = u.fract();
    let frac_v = v.fract();

    let frac_uu = 1.0 - frac_u;
    let frac_vv = 1.0 - frac_v;

    let w00 = frac_uu * frac_vv;
    let w01 = frac_u * frac_vv;
    let w10 = frac_uu * frac_v;
    let w11 = frac_u * frac_v;

    let iu1 = if iu0 + 1 < cols { iu0 + 1 } else { iu0 };
    let iv1 = if iv0 + 1 < rows { iv0 + 1 } else { iv0 };

    let base00 = (iv0 * cols + iu0) * C;
    let base01 = (iv0 * cols + iu1) * C;
    let base10 = (iv1 * cols + iu0) * C;
    let base11 = (iv1 * cols + iu1) * C;

    let data = image.as_slice();

    let mut pixel = [0.0; C];
    for k in 0..C {
        pixel[k] = data[base00 + k].into() * w00
            + data[base01 + k].into() * w01
            + data[base10 + k].into() * w10
            + data[base11 + k].into() * w11;
    }

    pixel
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use unwarp_image::{ImageError, ImageSize};

    #[test]
    fn interpolates_between_neighbors() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 2,
                height: 2,
            },
            vec![0.0, 1.0, 2.0, 3.0],
        )?;

        let pixel = bilinear_interpolation(&image, 0.5, 0.5);
        assert_relative_eq!(pixel[0], 1.5, epsilon = 1e-6);

        let pixel = bilinear_interpolation(&image, 1.0, 0.0);
        assert_relative_eq!(pixel[0], 1.0, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn preserves_integer_samples() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![10, 20, 30, 50, 60, 70],
        )?;

        let pixel = bilinear_interpolation(&image, 0.0, 0.0);
        assert_relative_eq!(pixel[0], 10.0, epsilon = 1e-6);
        assert_relative_eq!(pixel[1], 20.0, epsilon = 1e-6);
        assert_relative_eq!(pixel[2], 30.0, epsilon = 1e-6);
        Ok(())
    }
}
