use luma_image::{saturate_u8, ImageError, PixelBuffer};

use super::Kernel;
use crate::parallel;

/// Convolve every channel of an image with a square kernel.
///
/// Near the borders the neighborhood is clamped to the image and the sum is
/// renormalized by the total weight of the in-bounds taps. When that weight is zero,
/// as for derivative kernels, the raw sum is kept.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `kernel` - The convolution kernel.
///
/// # Returns
///
/// A new image with the same size and colorspace.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, ImageSize, PixelBuffer};
/// use luma_imgproc::filter::{convolve, Kernel};
///
/// let image = PixelBuffer::from_size_val(
///     ImageSize { width: 4, height: 4 },
///     Colorspace::Greyscale,
///     100,
/// );
///
/// let blurred = convolve(&image, &Kernel::box_blur(1)).unwrap();
/// assert!(blurred.as_slice().iter().all(|&v| v == 100));
/// ```
pub fn convolve(src: &PixelBuffer, kernel: &Kernel) -> Result<PixelBuffer, ImageError> {
    let mut dst = PixelBuffer::from_size_val(src.size(), src.colorspace(), 0);

    let (cols, rows) = (src.cols(), src.rows());
    let channels = src.num_channels();
    let radius = kernel.radius();
    let src_data = src.as_slice();
    let row_stride = dst.row_stride();

    parallel::par_iter_rows_indexed(dst.as_slice_mut(), row_stride, |y, dst_row| {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius).min(rows - 1);

        for x in 0..cols {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius).min(cols - 1);

            for c in 0..channels {
                let mut sum = 0.0f32;
                let mut weight_sum = 0.0f32;
                for sy in y0..=y1 {
                    let ky = sy + radius - y;
                    let row_offset = sy * cols;
                    for sx in x0..=x1 {
                        let w = kernel.weight(sx + radius - x, ky);
                        sum += w * src_data[(row_offset + sx) * channels + c] as f32;
                        weight_sum += w;
                    }
                }

                let value = if weight_sum.abs() > f32::EPSILON {
                    sum / weight_sum
                } else {
                    sum
                };
                dst_row[x * channels + c] = saturate_u8(value);
            }
        }
    });

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use luma_image::{Colorspace, ImageError, ImageSize, PixelBuffer};

    use crate::filter::Kernel;

    #[test]
    fn test_convolve_border_renormalization() -> Result<(), ImageError> {
        let size = ImageSize {
            width: 3,
            height: 3,
        };
        let mut data = Vec::new();
        for value in [128u8, 0, 255] {
            for _ in 0..3 {
                data.extend_from_slice(&[value, value, value, 255]);
            }
        }
        let image = PixelBuffer::new(size, Colorspace::Rgba, data)?;

        let kernel = Kernel::new(vec![
            vec![0.0, 0.2, 0.0],
            vec![0.2, 0.2, 0.2],
            vec![0.0, 0.2, 0.0],
        ])?;
        let convolved = super::convolve(&image, &kernel)?;

        #[rustfmt::skip]
        let expected = [
            85, 96, 85,
            96, 77, 96,
            170, 191, 170,
        ];
        for (pixel, &value) in convolved.as_slice().chunks_exact(4).zip(expected.iter()) {
            assert_eq!(pixel, &[value, value, value, 255]);
        }

        Ok(())
    }

    #[test]
    fn test_convolve_identity() -> Result<(), ImageError> {
        let image = PixelBuffer::new(
            ImageSize {
                width: 3,
                height: 2,
            },
            Colorspace::Greyscale,
            vec![1, 2, 3, 4, 5, 6],
        )?;
        let identity = Kernel::new(vec![vec![1.0]])?;
        assert_eq!(super::convolve(&image, &identity)?, image);

        // a full derivative window sums to zero and keeps the raw response
        let derivative = Kernel::new(vec![
            vec![0.0, 0.0, 0.0],
            vec![-1.0, 0.0, 1.0],
            vec![0.0, 0.0, 0.0],
        ])?;
        let response = super::convolve(&image, &derivative)?;
        assert_eq!(response.as_slice(), &[2, 2, 2, 5, 2, 5]);

        Ok(())
    }
}
