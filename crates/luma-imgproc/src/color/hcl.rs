use super::gray::luma_from_rgb;
use super::hsl::{hue_degrees, hue_sector};

/// Convert an RGB pixel to HCL (hue, chroma, luma).
///
/// The output channels are:
///
/// * H: The hue in the range [0, 255] (0-360 degrees).
/// * C: The chroma `max(R, G, B) - min(R, G, B)` in the range [0, 255].
/// * L: The Rec.601 luma in the range [0, 255].
pub fn hcl_from_rgb(rgb: [f32; 3]) -> [f32; 3] {
    let max = rgb[0].max(rgb[1]).max(rgb[2]);
    let min = rgb[0].min(rgb[1]).min(rgb[2]);
    [
        hue_degrees(rgb) * 255.0 / 360.0,
        max - min,
        luma_from_rgb(rgb),
    ]
}

/// Convert an HCL pixel, encoded as produced by [`hcl_from_rgb`], back to RGB.
pub fn rgb_from_hcl(hcl: [f32; 3]) -> [f32; 3] {
    let h = hcl[0] * 360.0 / 255.0;
    let (r1, g1, b1) = hue_sector(h, hcl[1]);
    let m = hcl[2] - luma_from_rgb([r1, g1, b1]);
    [r1 + m, g1 + m, b1 + m]
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    #[test]
    fn hcl_roundtrip() {
        for rgb in [[200.0, 40.0, 90.0], [10.0, 250.0, 20.0], [77.0, 77.0, 77.0]] {
            let hcl = super::hcl_from_rgb(rgb);
            let back = super::rgb_from_hcl(hcl);
            for (a, b) in rgb.iter().zip(back.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn hcl_grey_has_no_chroma() {
        let hcl = super::hcl_from_rgb([90.0, 90.0, 90.0]);
        assert_eq!(hcl[1], 0.0);
        assert_abs_diff_eq!(hcl[2], 90.0, epsilon = 1e-3);
    }
}
