use luma_image::{Colorspace, ImageError, PixelBuffer};
use rayon::prelude::*;

use crate::color::convert;

/// Options of [`histograms`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistogramOptions {
    /// Number of buckets of every histogram, in 1..=256.
    pub buckets: usize,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        Self { buckets: 8 }
    }
}

/// Hue, saturation and lightness distributions of an image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Histograms {
    /// Sum of the perceived saturation of the pixels of every hue bucket, rounded.
    pub hue: Vec<u64>,
    /// Number of pixels per perceived saturation bucket.
    pub saturation: Vec<u64>,
    /// Number of pixels per lightness bucket.
    pub lightness: Vec<u64>,
}

#[derive(Clone)]
struct Partial {
    hue: Vec<f64>,
    saturation: Vec<u64>,
    lightness: Vec<u64>,
}

impl Partial {
    fn new(buckets: usize) -> Self {
        Self {
            hue: vec![0.0; buckets],
            saturation: vec![0; buckets],
            lightness: vec![0; buckets],
        }
    }

    fn merge(mut self, other: Partial) -> Self {
        self.hue.iter_mut().zip(other.hue).for_each(|(a, b)| *a += b);
        self.saturation
            .iter_mut()
            .zip(other.saturation)
            .for_each(|(a, b)| *a += b);
        self.lightness
            .iter_mut()
            .zip(other.lightness)
            .for_each(|(a, b)| *a += b);
        self
    }
}

/// Compute hue, saturation and lightness histograms of an image.
///
/// The image is converted to HSL. The perceived saturation of a pixel is
/// `sqrt(S / 256 * (1 - |L / 256 - 0.5|))`; it weights the pixel in the hue histogram
/// and selects its saturation bucket.
///
/// # Arguments
///
/// * `src` - The input image in any colorspace.
/// * `options` - The number of buckets.
///
/// # Errors
///
/// Returns an error if the number of buckets is invalid.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, ImageSize, PixelBuffer};
/// use luma_imgproc::histogram::{histograms, HistogramOptions};
///
/// let image = PixelBuffer::new(
///     ImageSize { width: 1, height: 1 },
///     Colorspace::Rgb,
///     vec![128, 128, 128],
/// )
/// .unwrap();
///
/// let hist = histograms(&image, &HistogramOptions { buckets: 4 }).unwrap();
/// assert_eq!(hist.hue, vec![0, 0, 0, 0]);
/// assert_eq!(hist.saturation, vec![1, 0, 0, 0]);
/// assert_eq!(hist.lightness, vec![0, 0, 1, 0]);
/// ```
pub fn histograms(src: &PixelBuffer, options: &HistogramOptions) -> Result<Histograms, ImageError> {
    let buckets = options.buckets;
    if buckets == 0 || buckets > 256 {
        return Err(ImageError::InvalidHistogramBins(buckets));
    }

    let hsl = convert(src, Colorspace::Hsl)?;
    let bucket_size = 256.0 / buckets as f64;
    let bucket = |value: f64| ((value / bucket_size).floor() as usize).min(buckets - 1);

    let totals = hsl
        .as_slice()
        .par_chunks(3 * 4096)
        .fold(
            || Partial::new(buckets),
            |mut local, chunk| {
                for pixel in chunk.chunks_exact(3) {
                    let (hue, saturation, lightness) =
                        (pixel[0] as f64, pixel[1] as f64, pixel[2] as f64);

                    let lightness_distance_to_half = (lightness / 256.0 - 0.5).abs();
                    let true_saturation =
                        (saturation / 256.0 * (1.0 - lightness_distance_to_half)).sqrt();

                    local.hue[bucket(hue)] += true_saturation;
                    local.saturation[bucket(true_saturation * 256.0)] += 1;
                    local.lightness[bucket(lightness)] += 1;
                }
                local
            },
        )
        .reduce(|| Partial::new(buckets), Partial::merge);

    Ok(Histograms {
        hue: totals.hue.iter().map(|h| h.round() as u64).collect(),
        saturation: totals.saturation,
        lightness: totals.lightness,
    })
}
