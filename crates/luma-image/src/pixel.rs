use crate::colorspace::Colorspace;

/// A transient view of one sample group of a [`crate::PixelBuffer`].
///
/// Values are widened to `f32` so per-pixel functions can compose without
/// intermediate rounding; they are rounded and saturated only when written back.
#[derive(Clone, Debug, PartialEq)]
pub struct Pixel {
    /// Column of the pixel.
    pub x: usize,
    /// Row of the pixel.
    pub y: usize,
    /// Offset of the first sample in the flat buffer.
    pub index: usize,
    /// Colorspace of `values`.
    pub colorspace: Colorspace,
    /// Channel values.
    pub values: Vec<f32>,
}

impl Pixel {
    /// Create a pixel view with explicit values.
    pub fn new(x: usize, y: usize, index: usize, colorspace: Colorspace, values: Vec<f32>) -> Self {
        Self {
            x,
            y,
            index,
            colorspace,
            values,
        }
    }

    /// Create a pixel view from raw 8-bit samples.
    pub fn from_samples(
        x: usize,
        y: usize,
        index: usize,
        colorspace: Colorspace,
        samples: &[u8],
    ) -> Self {
        Self::new(
            x,
            y,
            index,
            colorspace,
            samples.iter().map(|&v| v as f32).collect(),
        )
    }

    /// Create a detached pixel view, handy for evaluating per-pixel functions directly.
    ///
    /// # Examples
    ///
    /// ```
    /// use luma_image::{Colorspace, Pixel};
    ///
    /// let pixel = Pixel::with_values(Colorspace::YCbCr, vec![100.0, 1.0, 2.0]);
    /// assert_eq!(pixel.values[0], 100.0);
    /// ```
    pub fn with_values(colorspace: Colorspace, values: Vec<f32>) -> Self {
        Self::new(0, 0, 0, colorspace, values)
    }
}
