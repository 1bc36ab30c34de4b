use luma_image::ImageError;

/// Create a box blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn box_blur_kernel_1d(kernel_size: usize) -> Vec<f32> {
    vec![1.0 / kernel_size as f32; kernel_size]
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Vec<f32> {
    let mut kernel = Vec::with_capacity(kernel_size);

    let mean = (kernel_size - 1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    for i in 0..kernel_size {
        let x = i as f32 - mean;
        kernel.push((-(x * x) / (2.0 * sigma_sq)).exp());
    }

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);
    kernel
}

/// Radii of the successive box blurs whose composition approximates a gaussian.
///
/// # Arguments
///
/// * `sigma` - The sigma of the gaussian to approximate.
/// * `passes` - The number of box blurs.
///
/// # Returns
///
/// One radius per pass.
pub fn box_blur_radii_for_gaussian(sigma: f32, passes: usize) -> Vec<usize> {
    let n = passes as f32;
    let variance = 12.0 * sigma * sigma;

    let ideal = (variance / n + 1.0).sqrt();
    let mut lower = ideal.floor() as i64;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let lower = lower.max(1);
    let upper = lower + 2;

    let l = lower as f32;
    let m = ((variance - n * l * l - 4.0 * n * l - 3.0 * n) / (-4.0 * l - 4.0)).round();
    let m = m.max(0.0) as usize;

    (0..passes)
        .map(|i| {
            let size = if i < m { lower } else { upper };
            ((size - 1) / 2) as usize
        })
        .collect()
}

/// A square, odd-sized 2D convolution kernel stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Create a kernel from its rows.
    ///
    /// # Errors
    ///
    /// If the kernel is empty, not square or has an even size.
    ///
    /// # Examples
    ///
    /// ```
    /// use luma_imgproc::filter::Kernel;
    ///
    /// let kernel = Kernel::new(vec![
    ///     vec![0.0, 1.0, 0.0],
    ///     vec![1.0, 1.0, 1.0],
    ///     vec![0.0, 1.0, 0.0],
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(kernel.size(), 3);
    /// assert_eq!(kernel.radius(), 1);
    /// ```
    pub fn new(rows: Vec<Vec<f32>>) -> Result<Self, ImageError> {
        let size = rows.len();
        if size == 0 {
            return Err(ImageError::InvalidKernel("kernel is empty".to_string()));
        }
        if size % 2 == 0 {
            return Err(ImageError::InvalidKernel(format!(
                "kernel size {size} is not odd"
            )));
        }
        if let Some(row) = rows.iter().find(|row| row.len() != size) {
            return Err(ImageError::InvalidKernel(format!(
                "kernel is not square, row of {} in a {size} row kernel",
                row.len()
            )));
        }

        Ok(Self {
            size,
            weights: rows.into_iter().flatten().collect(),
        })
    }

    /// Build a kernel as the outer product of a vertical and a horizontal 1D kernel.
    fn outer(kernel_y: &[f32], kernel_x: &[f32]) -> Self {
        let weights = kernel_y
            .iter()
            .flat_map(|ky| kernel_x.iter().map(move |kx| ky * kx))
            .collect();
        Self {
            size: kernel_x.len(),
            weights,
        }
    }

    /// Normalized `(2 * radius + 1)²` gaussian kernel.
    pub fn gaussian(radius: usize, sigma: f32) -> Self {
        let kernel_1d = gaussian_kernel_1d(2 * radius + 1, sigma);
        Self::outer(&kernel_1d, &kernel_1d)
    }

    /// Normalized `(2 * radius + 1)²` mean kernel.
    pub fn box_blur(radius: usize) -> Self {
        let kernel_1d = box_blur_kernel_1d(2 * radius + 1);
        Self::outer(&kernel_1d, &kernel_1d)
    }

    /// 3x3 sharpening kernel with center `1 + 4s` and cross arms `-s`.
    pub fn sharpen(strength: f32) -> Self {
        let s = strength;
        #[rustfmt::skip]
        let weights = vec![
            0.0, -s, 0.0,
            -s, 1.0 + 4.0 * s, -s,
            0.0, -s, 0.0,
        ];
        Self { size: 3, weights }
    }

    /// Side length of the kernel.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the center to the edge of the kernel.
    pub fn radius(&self) -> usize {
        self.size / 2
    }

    /// Weights in row-major order.
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at row `ky` and column `kx`.
    #[inline]
    pub fn weight(&self, kx: usize, ky: usize) -> f32 {
        self.weights[ky * self.size + kx]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaussian_kernel_1d() {
        let kernel = gaussian_kernel_1d(5, 0.5);

        let expected = [
            0.00026386508,
            0.10645077,
            0.78657067,
            0.10645077,
            0.00026386508,
        ];

        for (k, e) in kernel.iter().zip(expected.iter()) {
            assert_relative_eq!(k, e, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_kernel_validation() {
        assert!(matches!(
            Kernel::new(vec![]),
            Err(ImageError::InvalidKernel(_))
        ));
        assert!(matches!(
            Kernel::new(vec![vec![1.0, 1.0], vec![1.0, 1.0]]),
            Err(ImageError::InvalidKernel(_))
        ));
        assert!(matches!(
            Kernel::new(vec![vec![1.0; 3], vec![1.0; 2], vec![1.0; 3]]),
            Err(ImageError::InvalidKernel(_))
        ));
        assert!(Kernel::new(vec![vec![1.0]]).is_ok());
    }

    #[test]
    fn test_kernel_constructors() {
        let gaussian = Kernel::gaussian(2, 1.0);
        assert_eq!(gaussian.size(), 5);
        assert_relative_eq!(gaussian.weights().iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        assert!(gaussian.weight(2, 2) > gaussian.weight(1, 2));
        assert_eq!(gaussian.weight(1, 2), gaussian.weight(2, 1));

        let mean = Kernel::box_blur(1);
        assert_eq!(mean.size(), 3);
        mean.weights()
            .iter()
            .for_each(|&w| assert_relative_eq!(w, 1.0 / 9.0, epsilon = 1e-6));

        let sharpen = Kernel::sharpen(0.5);
        assert_eq!(sharpen.weight(1, 1), 3.0);
        assert_eq!(sharpen.weight(0, 1), -0.5);
        assert_eq!(sharpen.weight(0, 0), 0.0);
        assert_relative_eq!(sharpen.weights().iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_box_blur_radii_for_gaussian() {
        let radii = box_blur_radii_for_gaussian(2.0, 3);
        assert_eq!(radii.len(), 3);
        // composed variance of the boxes stays close to sigma²
        let variance: f32 = radii
            .iter()
            .map(|&r| {
                let w = (2 * r + 1) as f32;
                (w * w - 1.0) / 12.0
            })
            .sum();
        assert!((variance - 4.0).abs() < 1.5, "{variance}");
    }
}
