use luma_image::{ImageError, PixelBuffer};

use crate::edges::{sobel, SobelOptions};

/// Options of [`sharpness`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SharpnessOptions {
    /// Radius of the gaussian blur applied before the gradient.
    pub radius: usize,
    /// Magnitudes strictly above this value count as edges.
    pub threshold: f32,
}

impl Default for SharpnessOptions {
    fn default() -> Self {
        Self {
            radius: 1,
            threshold: 20.0,
        }
    }
}

/// Distribution of the edge magnitudes of an image.
///
/// All fields are zero when the image has no edges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sharpness {
    /// Fraction of the pixels that are edges, in [0, 1].
    pub percent_edges: f64,
    /// First quartile of the edge magnitudes.
    pub lower_quartile: f64,
    /// Median of the edge magnitudes.
    pub median: f64,
    /// Third quartile of the edge magnitudes.
    pub upper_quartile: f64,
    /// Mean of the lowest twentieth of the edge magnitudes.
    pub lower_ventile_average: f64,
    /// Mean of the edge magnitudes.
    pub average: f64,
    /// Mean of the highest twentieth of the edge magnitudes.
    pub upper_ventile_average: f64,
}

fn mean(values: &[u8]) -> f64 {
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// `edges` must be sorted in ascending order.
fn summarize(edges: &[u8], total: usize) -> Sharpness {
    let n = edges.len();
    if n == 0 || total == 0 {
        return Sharpness::default();
    }

    let at = |q: f64| edges[((n as f64 * q) as usize).min(n - 1)] as f64;
    let ventile = (n / 20).max(1);

    Sharpness {
        percent_edges: n as f64 / total as f64,
        lower_quartile: at(0.25),
        median: at(0.5),
        upper_quartile: at(0.75),
        lower_ventile_average: mean(&edges[..ventile]),
        average: mean(edges),
        upper_ventile_average: mean(&edges[n - ventile..]),
    }
}

/// Score how sharp an image is from the distribution of its Sobel magnitudes.
///
/// Only pixels whose magnitude is strictly above the threshold take part in the
/// statistics, so flat areas do not dilute the score of the detailed ones.
///
/// # Arguments
///
/// * `src` - The input image in any colorspace.
/// * `options` - The blur radius and the edge threshold.
///
/// # Returns
///
/// The statistics of the edge magnitudes.
pub fn sharpness(src: &PixelBuffer, options: &SharpnessOptions) -> Result<Sharpness, ImageError> {
    let edges = sobel(
        src,
        &SobelOptions {
            radius: options.radius,
            ..Default::default()
        },
    )?;

    let mut values: Vec<u8> = edges
        .magnitudes()
        .as_slice()
        .iter()
        .copied()
        .filter(|&v| v as f32 > options.threshold)
        .collect();
    values.sort_unstable();

    Ok(summarize(&values, edges.size().area()))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use luma_image::{Colorspace, ImageError, ImageSize, PixelBuffer};

    use super::*;

    #[test]
    fn test_summarize() {
        let edges: Vec<u8> = (21..=60).collect();
        let stats = summarize(&edges, 100);
        assert_relative_eq!(stats.percent_edges, 0.4);
        assert_relative_eq!(stats.lower_quartile, 31.0);
        assert_relative_eq!(stats.median, 41.0);
        assert_relative_eq!(stats.upper_quartile, 51.0);
        assert_relative_eq!(stats.lower_ventile_average, 21.5);
        assert_relative_eq!(stats.average, 40.5);
        assert_relative_eq!(stats.upper_ventile_average, 59.5);

        // fewer than twenty values still average one
        let stats = summarize(&[30, 90], 4);
        assert_relative_eq!(stats.lower_ventile_average, 30.0);
        assert_relative_eq!(stats.upper_ventile_average, 90.0);
        assert_relative_eq!(stats.median, 90.0);
    }

    #[test]
    fn test_sharpness_flat() -> Result<(), ImageError> {
        let image = PixelBuffer::from_size_val(
            ImageSize {
                width: 16,
                height: 16,
            },
            Colorspace::Rgb,
            77,
        );
        assert_eq!(sharpness(&image, &SharpnessOptions::default())?, Sharpness::default());
        Ok(())
    }

    #[test]
    fn test_sharpness_step() -> Result<(), ImageError> {
        let data = (0..100).map(|i| if i % 10 < 5 { 0 } else { 10 }).collect();
        let image = PixelBuffer::new(
            ImageSize {
                width: 10,
                height: 10,
            },
            Colorspace::Greyscale,
            data,
        )?;

        // columns 4 and 5 of the eight interior rows carry 4 * 10
        let stats = sharpness(
            &image,
            &SharpnessOptions {
                radius: 0,
                threshold: 20.0,
            },
        )?;
        assert_relative_eq!(stats.percent_edges, 0.16);
        assert_relative_eq!(stats.median, 40.0);
        assert_relative_eq!(stats.average, 40.0);

        let stats = sharpness(
            &image,
            &SharpnessOptions {
                radius: 0,
                threshold: 40.0,
            },
        )?;
        assert_eq!(stats, Sharpness::default());
        Ok(())
    }
}
