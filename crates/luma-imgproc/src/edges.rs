use std::collections::VecDeque;

use luma_image::{Colorspace, ImageError, ImageSize, PixelBuffer};
use rayon::prelude::*;

use crate::color::convert;
use crate::filter::{gaussian_blur, GaussianBlurOptions};

/// Gradient magnitudes together with the gradient direction of every pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeMap {
    magnitudes: PixelBuffer,
    angles: Vec<f32>,
}

impl EdgeMap {
    /// Create an edge map from a greyscale magnitude image and one angle per pixel.
    ///
    /// # Errors
    ///
    /// `UnsupportedConversion` if the magnitudes are not greyscale, `InvalidChannelShape`
    /// if the number of angles does not match the number of pixels.
    pub fn new(magnitudes: PixelBuffer, angles: Vec<f32>) -> Result<Self, ImageError> {
        if magnitudes.colorspace() != Colorspace::Greyscale {
            return Err(ImageError::UnsupportedConversion(format!(
                "edge magnitudes must be greyscale, got {}",
                magnitudes.colorspace()
            )));
        }
        if angles.len() != magnitudes.size().area() {
            return Err(ImageError::InvalidChannelShape(
                angles.len(),
                magnitudes.size().area(),
            ));
        }
        Ok(Self { magnitudes, angles })
    }

    /// Greyscale magnitude image.
    pub fn magnitudes(&self) -> &PixelBuffer {
        &self.magnitudes
    }

    /// Gradient direction in degrees within [0, 180), row-major.
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    /// Size of the map.
    pub fn size(&self) -> ImageSize {
        self.magnitudes.size()
    }

    /// Split the map into its magnitude image and angles.
    pub fn into_parts(self) -> (PixelBuffer, Vec<f32>) {
        (self.magnitudes, self.angles)
    }
}

/// Options of [`sobel`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SobelOptions {
    /// Radius of the gaussian pre-blur, 0 disables it.
    pub radius: usize,
    /// Sigma of the gaussian pre-blur.
    pub blur_sigma: f32,
}

impl Default for SobelOptions {
    fn default() -> Self {
        Self {
            radius: 1,
            blur_sigma: 2.0,
        }
    }
}

/// Hysteresis thresholds of [`canny`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CannyThresholds {
    /// Values below are never edges.
    pub low: f32,
    /// Values at or above are always edges.
    pub high: f32,
}

/// Options of [`canny`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CannyOptions {
    /// Radius of the gaussian pre-blur, 0 disables it.
    pub radius: usize,
    /// Sigma of the gaussian pre-blur.
    pub blur_sigma: f32,
    /// Hysteresis thresholds, picked by [`auto_threshold`] when unset.
    pub thresholds: Option<CannyThresholds>,
}

impl Default for CannyOptions {
    fn default() -> Self {
        let sobel = SobelOptions::default();
        Self {
            radius: sobel.radius,
            blur_sigma: sobel.blur_sigma,
            thresholds: None,
        }
    }
}

impl CannyOptions {
    fn sobel_options(&self) -> SobelOptions {
        SobelOptions {
            radius: self.radius,
            blur_sigma: self.blur_sigma,
        }
    }
}

/// Fold an angle in degrees into [0, 180).
fn fold_angle(degrees: f32) -> f32 {
    let folded = degrees.rem_euclid(180.0);
    if folded >= 180.0 {
        0.0
    } else {
        folded
    }
}

/// Offsets of the two neighbors lying along a direction quantized to 45°.
fn neighbors_along(angle: f32) -> [(isize, isize); 2] {
    let angle = fold_angle(angle);
    if !(22.5..157.5).contains(&angle) {
        // west / east
        [(-1, 0), (1, 0)]
    } else if angle < 67.5 {
        // north west / south east
        [(-1, -1), (1, 1)]
    } else if angle < 112.5 {
        // north / south
        [(0, -1), (0, 1)]
    } else {
        // north east / south west
        [(1, -1), (-1, 1)]
    }
}

fn offset(x: usize, y: usize, (dx, dy): (isize, isize)) -> (usize, usize) {
    (x.wrapping_add_signed(dx), y.wrapping_add_signed(dy))
}

/// Compute the Sobel gradient magnitude and direction of an image.
///
/// The image is converted to greyscale and optionally blurred first. Border pixels
/// carry a magnitude of 0 and an angle of 0.
///
/// # Arguments
///
/// * `src` - The input image in any colorspace.
/// * `options` - The pre-blur radius and sigma.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, ImageSize, PixelBuffer};
/// use luma_imgproc::edges::{sobel, SobelOptions};
///
/// let image = PixelBuffer::from_size_val(
///     ImageSize { width: 8, height: 8 },
///     Colorspace::Rgb,
///     128,
/// );
///
/// let edges = sobel(&image, &SobelOptions::default()).unwrap();
/// assert!(edges.magnitudes().as_slice().iter().all(|&v| v == 0));
/// ```
pub fn sobel(src: &PixelBuffer, options: &SobelOptions) -> Result<EdgeMap, ImageError> {
    let grey = convert(src, Colorspace::Greyscale)?;
    let grey = gaussian_blur(
        &grey,
        &GaussianBlurOptions {
            radius: options.radius,
            sigma: Some(options.blur_sigma),
            approximate: false,
        },
    )?;

    let (cols, rows) = (grey.cols(), grey.rows());
    let mut magnitudes = PixelBuffer::from_size_val(grey.size(), Colorspace::Greyscale, 0);
    let mut angles = vec![0.0f32; grey.size().area()];
    if cols == 0 {
        return EdgeMap::new(magnitudes, angles);
    }

    let data = grey.as_slice();
    let px = |x: usize, y: usize| data[y * cols + x] as f32;

    magnitudes
        .as_slice_mut()
        .par_chunks_exact_mut(cols)
        .zip(angles.par_chunks_exact_mut(cols))
        .enumerate()
        .for_each(|(y, (mag_row, angle_row))| {
            if y == 0 || y + 1 >= rows {
                return;
            }
            for x in 1..cols.saturating_sub(1) {
                let gx = (px(x + 1, y - 1) + 2.0 * px(x + 1, y) + px(x + 1, y + 1))
                    - (px(x - 1, y - 1) + 2.0 * px(x - 1, y) + px(x - 1, y + 1));
                let gy = (px(x - 1, y + 1) + 2.0 * px(x, y + 1) + px(x + 1, y + 1))
                    - (px(x - 1, y - 1) + 2.0 * px(x, y - 1) + px(x + 1, y - 1));

                mag_row[x] = (gx * gx + gy * gy).sqrt().round().min(255.0) as u8;
                angle_row[x] = fold_angle(gy.atan2(gx).to_degrees());
            }
        });

    EdgeMap::new(magnitudes, angles)
}

/// Keep only the local maxima of the magnitudes along the gradient direction.
///
/// Interior pixels keep their value when it is at least as large as both neighbors
/// along the quantized direction, every other pixel becomes 0.
pub fn non_maximal_suppression(edges: &EdgeMap) -> EdgeMap {
    let src = edges.magnitudes();
    let (cols, rows) = (src.cols(), src.rows());
    let data = src.as_slice();
    let mut dst = PixelBuffer::from_size_val(src.size(), Colorspace::Greyscale, 0);

    crate::parallel::par_iter_rows_indexed(dst.as_slice_mut(), cols, |y, dst_row| {
        for (x, out) in dst_row.iter_mut().enumerate() {
            if src.is_border(x, y) {
                continue;
            }
            let index = y * cols + x;
            let value = data[index];
            let is_maxima = neighbors_along(edges.angles[index]).iter().all(|&d| {
                let (nx, ny) = offset(x, y, d);
                nx >= cols || ny >= rows || data[ny * cols + nx] <= value
            });
            if is_maxima {
                *out = value;
            }
        }
    });

    EdgeMap {
        magnitudes: dst,
        angles: edges.angles.clone(),
    }
}

/// Resolve magnitudes into binary edges with two thresholds.
///
/// Values at or above `high` become 255 and values below `low` become 0. Every pixel
/// in between starts a breadth-first walk along the edge direction, perpendicular to
/// the gradient, through unresolved pixels of at least `low`. The whole walked
/// component becomes 255 when it reaches a strong pixel, or a pixel already resolved
/// to 255, and 0 otherwise. Every pixel is resolved exactly once.
pub fn hysteresis(edges: &EdgeMap, thresholds: &CannyThresholds) -> EdgeMap {
    let src = edges.magnitudes();
    let (cols, rows) = (src.cols(), src.rows());
    let data = src.as_slice();

    let mut dst = PixelBuffer::from_size_val(src.size(), Colorspace::Greyscale, 0);
    let mut resolved = vec![false; data.len()];
    let mut visited = vec![false; data.len()];
    let mut component = Vec::new();
    let mut queue = VecDeque::new();

    for y in 0..rows {
        for x in 0..cols {
            let index = y * cols + x;
            if resolved[index] {
                continue;
            }
            resolved[index] = true;

            let value = data[index] as f32;
            if src.is_border(x, y) || value < thresholds.low {
                continue;
            }
            if value >= thresholds.high {
                dst.as_slice_mut()[index] = 255;
                continue;
            }

            component.clear();
            queue.clear();
            queue.push_back((x, y));
            visited[index] = true;
            component.push(index);
            let mut found_strong = false;

            while let Some((lx, ly)) = queue.pop_front() {
                let location = ly * cols + lx;
                if data[location] as f32 >= thresholds.high {
                    found_strong = true;
                    break;
                }

                let edge_angle = (edges.angles[location] + 90.0) % 180.0;
                for d in neighbors_along(edge_angle) {
                    let (nx, ny) = offset(lx, ly, d);
                    if nx >= cols || ny >= rows {
                        continue;
                    }
                    let neighbor = ny * cols + nx;
                    if visited[neighbor] {
                        continue;
                    }
                    if resolved[neighbor] {
                        found_strong |= dst.as_slice()[neighbor] == 255;
                        continue;
                    }
                    if src.is_border(nx, ny) || (data[neighbor] as f32) < thresholds.low {
                        resolved[neighbor] = true;
                        continue;
                    }
                    visited[neighbor] = true;
                    component.push(neighbor);
                    queue.push_back((nx, ny));
                }

                if found_strong {
                    break;
                }
            }

            let out = if found_strong { 255 } else { 0 };
            for &member in &component {
                dst.as_slice_mut()[member] = out;
                resolved[member] = true;
            }
        }
    }

    EdgeMap {
        magnitudes: dst,
        angles: edges.angles.clone(),
    }
}

/// Pick hysteresis thresholds from the magnitude histogram.
///
/// Candidates 20 through 239 split the 256-bin histogram in two and the first
/// candidate with the strictly largest between-class variance wins; 100 is used when
/// no split has pixels on both sides. The thresholds are `(chosen / 2, chosen)`.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, ImageSize, PixelBuffer};
/// use luma_imgproc::edges::auto_threshold;
///
/// let flat = PixelBuffer::from_size_val(
///     ImageSize { width: 4, height: 4 },
///     Colorspace::Greyscale,
///     0,
/// );
///
/// let thresholds = auto_threshold(&flat);
/// assert_eq!((thresholds.low, thresholds.high), (50.0, 100.0));
/// ```
pub fn auto_threshold(magnitudes: &PixelBuffer) -> CannyThresholds {
    let mut buckets = [0u64; 256];
    magnitudes
        .as_slice()
        .iter()
        .for_each(|&v| buckets[v as usize] += 1);

    let total = magnitudes.as_slice().len() as f64;
    let (left, right) = buckets.split_at(20);
    let weighted = |bins: &[u64], start: usize| -> f64 {
        bins.iter()
            .enumerate()
            .map(|(i, &n)| (n * (i + start) as u64) as f64)
            .sum()
    };

    let mut left_sum = weighted(left, 0);
    let mut right_sum = weighted(right, 20);
    let mut left_count = left.iter().sum::<u64>() as f64;
    let mut right_count = right.iter().sum::<u64>() as f64;

    let mut variance = f64::NEG_INFINITY;
    let mut threshold = 100usize;
    for (i, &bucket) in buckets.iter().enumerate().take(240).skip(20) {
        let bucket = bucket as f64;
        left_sum += bucket * i as f64;
        right_sum -= bucket * i as f64;
        left_count += bucket;
        right_count -= bucket;

        let left_mean = left_sum / left_count;
        let right_mean = right_sum / right_count;
        let bucket_variance =
            (left_mean - right_mean).powi(2) * (left_count / total) * (right_count / total);

        // NaN when a side is empty, which never compares greater
        if bucket_variance > variance {
            variance = bucket_variance;
            threshold = i;
        }
    }

    CannyThresholds {
        low: threshold as f32 / 2.0,
        high: threshold as f32,
    }
}

/// Run non-maximal suppression and hysteresis over an existing edge map.
///
/// Thresholds are picked with [`auto_threshold`] on the unsuppressed magnitudes when
/// none are given.
pub fn canny_edges(edges: &EdgeMap, thresholds: Option<CannyThresholds>) -> EdgeMap {
    let thresholds = thresholds.unwrap_or_else(|| {
        let picked = auto_threshold(edges.magnitudes());
        log::debug!("canny: auto thresholds {picked:?}");
        picked
    });

    let suppressed = non_maximal_suppression(edges);
    hysteresis(&suppressed, &thresholds)
}

/// Detect edges with the Canny algorithm.
///
/// # Arguments
///
/// * `src` - The input image in any colorspace.
/// * `options` - The Sobel pre-blur and the hysteresis thresholds.
///
/// # Returns
///
/// An edge map whose magnitudes are 0 or 255, with the Sobel angles.
pub fn canny(src: &PixelBuffer, options: &CannyOptions) -> Result<EdgeMap, ImageError> {
    let edges = sobel(src, &options.sobel_options())?;
    Ok(canny_edges(&edges, options.thresholds))
}
