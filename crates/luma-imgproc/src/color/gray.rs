/// Define the RGB weights for the grayscale conversion.
const RW: f32 = 0.299;
const GW: f32 = 0.587;
const BW: f32 = 0.114;

/// Compute the Rec.601 luma of an RGB triplet:
///
/// Y = 0.299 * R + 0.587 * G + 0.114 * B
pub fn luma_from_rgb(rgb: [f32; 3]) -> f32 {
    RW * rgb[0] + GW * rgb[1] + BW * rgb[2]
}

/// Convert an RGB pixel in the range [0, 255] to a single grayscale value.
///
/// # Example
///
/// ```
/// use luma_imgproc::color::gray_from_rgb;
///
/// assert_eq!(gray_from_rgb([255.0, 255.0, 255.0]).round(), 255.0);
/// ```
pub fn gray_from_rgb(rgb: [f32; 3]) -> f32 {
    luma_from_rgb(rgb)
}
