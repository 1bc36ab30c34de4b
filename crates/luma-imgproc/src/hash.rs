use luma_image::{Colorspace, ImageError, ImageSize, PixelBuffer};

use crate::color::convert;
use crate::resize::bilinear;

/// Perceptual hashing algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum HashMethod {
    /// DCT based perceptual hash.
    #[default]
    PHash,
}

/// Options of [`hash`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HashOptions {
    /// Hashing algorithm.
    pub method: HashMethod,
    /// Side of the coefficient block, the hash has `hash_size²` bits.
    pub hash_size: usize,
}

impl Default for HashOptions {
    fn default() -> Self {
        Self {
            method: HashMethod::PHash,
            hash_size: 8,
        }
    }
}

/// Lowest `count` DCT-II frequencies of every row of a `cols` wide matrix.
fn dct_rows(data: &[f64], cols: usize, count: usize) -> Vec<f64> {
    let n = cols as f64;
    data.chunks_exact(cols)
        .flat_map(|row| {
            (0..count).map(move |k| {
                row.iter()
                    .enumerate()
                    .map(|(i, v)| {
                        v * (std::f64::consts::PI / n * (i as f64 + 0.5) * k as f64).cos()
                    })
                    .sum::<f64>()
            })
        })
        .collect()
}

fn transpose(data: &[f64], cols: usize) -> Vec<f64> {
    let rows = data.len() / cols;
    (0..cols)
        .flat_map(|c| (0..rows).map(move |r| data[r * cols + c]))
        .collect()
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Compute the perceptual hash of an image.
///
/// The image is converted to greyscale, resampled to `4n x 4n` and transformed with
/// a 2D DCT-II. Each of the `n x n` lowest frequency coefficients contributes a `1`
/// when it exceeds the median of those coefficients, the DC term excluded.
///
/// # Arguments
///
/// * `src` - The input image in any colorspace.
/// * `options` - The hashing algorithm and size.
///
/// # Returns
///
/// A string of `n²` `'0'` and `'1'` characters.
///
/// # Errors
///
/// `InvalidOptions` if the hash size is below 2.
pub fn hash(src: &PixelBuffer, options: &HashOptions) -> Result<String, ImageError> {
    let n = options.hash_size;
    if n < 2 {
        return Err(ImageError::InvalidOptions(format!(
            "hash size must be at least 2, got {n}"
        )));
    }

    match options.method {
        HashMethod::PHash => {}
    }

    let side = 4 * n;
    let grey = convert(src, Colorspace::Greyscale)?;
    let small = bilinear(
        &grey,
        ImageSize {
            width: side,
            height: side,
        },
    )?;

    let samples: Vec<f64> = small.as_slice().iter().map(|&v| v as f64).collect();
    // rows first, then the columns of the transposed result
    let rows = dct_rows(&samples, side, n);
    let coefficients = transpose(&dct_rows(&transpose(&rows, n), side, n), n);

    let mut ac = coefficients[1..].to_vec();
    let threshold = median(&mut ac);

    Ok(coefficients
        .iter()
        .map(|&c| if c > threshold { '1' } else { '0' })
        .collect())
}

/// Count the positions at which two hashes differ.
///
/// # Errors
///
/// `InvalidOptions` if the hashes have different lengths.
///
/// # Example
///
/// ```
/// use luma_imgproc::hash::hamming_distance;
///
/// assert_eq!(hamming_distance("1011", "1001").unwrap(), 1);
/// ```
pub fn hamming_distance(a: &str, b: &str) -> Result<usize, ImageError> {
    if a.len() != b.len() {
        return Err(ImageError::InvalidOptions(format!(
            "cannot compare hashes of length {} and {}",
            a.len(),
            b.len()
        )));
    }
    Ok(a.bytes().zip(b.bytes()).filter(|(x, y)| x != y).count())
}
