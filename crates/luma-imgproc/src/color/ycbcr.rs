use super::gray::luma_from_rgb;

/// Convert an RGB pixel to YCbCr using the JPEG full-range equations.
///
/// * Y: The luma channel in the range [0, 255].
/// * Cb: The blue-difference chroma centered on 128.
/// * Cr: The red-difference chroma centered on 128.
///
/// # Example
///
/// ```
/// use luma_imgproc::color::ycbcr_from_rgb;
///
/// let ycbcr = ycbcr_from_rgb([255.0, 255.0, 255.0]);
/// assert!((ycbcr[0] - 255.0).abs() < 1e-3);
/// assert!((ycbcr[1] - 128.0).abs() < 1e-3);
/// assert!((ycbcr[2] - 128.0).abs() < 1e-3);
/// ```
pub fn ycbcr_from_rgb(rgb: [f32; 3]) -> [f32; 3] {
    let [r, g, b] = rgb;
    [
        luma_from_rgb(rgb),
        128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b,
        128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b,
    ]
}

/// Convert a YCbCr pixel back to RGB.
pub fn rgb_from_ycbcr(ycbcr: [f32; 3]) -> [f32; 3] {
    let y = ycbcr[0];
    let cb = ycbcr[1] - 128.0;
    let cr = ycbcr[2] - 128.0;
    [
        y + 1.402 * cr,
        y - 0.344136 * cb - 0.714136 * cr,
        y + 1.772 * cb,
    ]
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    #[test]
    fn ycbcr_roundtrip() {
        for rgb in [[255.0, 0.0, 0.0], [12.0, 34.0, 56.0], [128.0, 128.0, 128.0]] {
            let back = super::rgb_from_ycbcr(super::ycbcr_from_rgb(rgb));
            for (a, b) in rgb.iter().zip(back.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-2);
            }
        }
    }
}
