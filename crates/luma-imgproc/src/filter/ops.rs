use luma_image::{ImageError, PixelBuffer};

use super::{convolve, kernels, Kernel};

/// Options of [`gaussian_blur`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaussianBlurOptions {
    /// Radius of the kernel, 0 disables the blur.
    pub radius: usize,
    /// Standard deviation, `radius / 2` floored at 0.5 when unset.
    pub sigma: Option<f32>,
    /// Approximate the gaussian with three successive box blurs.
    pub approximate: bool,
}

impl Default for GaussianBlurOptions {
    fn default() -> Self {
        Self {
            radius: 2,
            sigma: None,
            approximate: false,
        }
    }
}

impl GaussianBlurOptions {
    /// Blur of the given radius with the default sigma.
    pub fn with_radius(radius: usize) -> Self {
        Self {
            radius,
            ..Default::default()
        }
    }

    /// Standard deviation actually used for the kernel.
    pub fn resolved_sigma(&self) -> f32 {
        self.sigma
            .unwrap_or_else(|| (self.radius as f32 / 2.0).max(0.5))
    }
}

/// Options of [`sharpen`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SharpenOptions {
    /// Weight of the cross arms of the sharpening kernel.
    pub strength: f32,
}

impl Default for SharpenOptions {
    fn default() -> Self {
        Self { strength: 1.0 }
    }
}

/// Blur an image using a box blur filter
///
/// # Arguments
///
/// * `src` - The input image.
/// * `radius` - The radius of the box, 0 returns a copy.
pub fn box_blur(src: &PixelBuffer, radius: usize) -> Result<PixelBuffer, ImageError> {
    if radius == 0 {
        return Ok(src.clone());
    }
    convolve(src, &Kernel::box_blur(radius))
}

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The input image.
/// * `options` - Radius, sigma and whether to approximate with box blurs.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, ImageSize, PixelBuffer};
/// use luma_imgproc::filter::{gaussian_blur, GaussianBlurOptions};
///
/// let image = PixelBuffer::from_size_val(
///     ImageSize { width: 5, height: 5 },
///     Colorspace::Rgb,
///     42,
/// );
///
/// let blurred = gaussian_blur(&image, &GaussianBlurOptions::with_radius(1)).unwrap();
/// assert_eq!(blurred, image);
/// ```
pub fn gaussian_blur(
    src: &PixelBuffer,
    options: &GaussianBlurOptions,
) -> Result<PixelBuffer, ImageError> {
    if options.radius == 0 {
        return Ok(src.clone());
    }

    let sigma = options.resolved_sigma();
    if sigma <= 0.0 || !sigma.is_finite() {
        return Err(ImageError::InvalidKernel(format!(
            "gaussian sigma must be positive, got {sigma}"
        )));
    }

    if options.approximate {
        let mut blurred = src.clone();
        for radius in kernels::box_blur_radii_for_gaussian(sigma, 3) {
            blurred = box_blur(&blurred, radius)?;
        }
        return Ok(blurred);
    }

    convolve(src, &Kernel::gaussian(options.radius, sigma))
}

/// Sharpen an image with a 3x3 unsharp cross kernel.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `options` - The strength of the kernel, 0 returns a copy.
pub fn sharpen(src: &PixelBuffer, options: &SharpenOptions) -> Result<PixelBuffer, ImageError> {
    if options.strength == 0.0 {
        return Ok(src.clone());
    }
    convolve(src, &Kernel::sharpen(options.strength))
}
