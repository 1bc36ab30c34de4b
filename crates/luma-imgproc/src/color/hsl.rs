/// Compute the hue of an RGB pixel in degrees [0, 360) together with its max and min.
fn hue_max_min(rgb: [f32; 3]) -> (f32, f32, f32) {
    let [r, g, b] = rgb;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta) % 6.0)
    } else if max == g {
        60.0 * (((b - r) / delta) + 2.0)
    } else {
        60.0 * (((r - g) / delta) + 4.0)
    };

    // ensure h is in the range [0, 360)
    let h = if h < 0.0 { h + 360.0 } else { h };

    (h, max, min)
}

/// Hue of an RGB pixel in degrees in the range [0, 360).
///
/// Achromatic pixels have hue 0.
pub fn hue_degrees(rgb: [f32; 3]) -> f32 {
    hue_max_min(rgb).0
}

/// Convert an RGB pixel to HSL.
///
/// The input channels are in the range [0, 255]. The output channels are:
///
/// * H: The hue channel in the range [0, 255] (0-360 degrees).
/// * S: The saturation channel in the range [0, 255].
/// * L: The lightness channel in the range [0, 255].
///
/// # Example
///
/// ```
/// use luma_imgproc::color::hsl_from_rgb;
///
/// let hsl = hsl_from_rgb([0.0, 0.0, 255.0]);
/// assert_eq!(hsl, [170.0, 255.0, 127.5]);
/// ```
pub fn hsl_from_rgb(rgb: [f32; 3]) -> [f32; 3] {
    let normalized = [rgb[0] / 255., rgb[1] / 255., rgb[2] / 255.];
    let (h, max, min) = hue_max_min(normalized);
    let delta = max - min;

    let l = (max + min) / 2.0;
    let s = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * l - 1.0).abs())
    };

    [h * 255.0 / 360.0, s.min(1.0) * 255.0, l * 255.0]
}

/// Convert an HSL pixel, encoded as produced by [`hsl_from_rgb`], back to RGB.
pub fn rgb_from_hsl(hsl: [f32; 3]) -> [f32; 3] {
    let h = hsl[0] * 360.0 / 255.0;
    let s = hsl[1] / 255.0;
    let l = hsl[2] / 255.0;

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let (r1, g1, b1) = hue_sector(h, c);
    let m = l - c / 2.0;

    [(r1 + m) * 255.0, (g1 + m) * 255.0, (b1 + m) * 255.0]
}

/// Place a chroma value on the RGB cube face selected by the hue in degrees.
pub(crate) fn hue_sector(h: f32, c: f32) -> (f32, f32, f32) {
    let hp = (h.rem_euclid(360.0)) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());

    match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    fn assert_close(a: [f32; 3], b: [f32; 3], epsilon: f32) {
        for (a, b) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = epsilon);
        }
    }

    #[test]
    fn hsl_from_rgb_primaries() {
        assert_close(super::hsl_from_rgb([255.0, 0.0, 0.0]), [0.0, 255.0, 127.5], 1e-4);
        assert_close(super::hsl_from_rgb([0.0, 255.0, 0.0]), [85.0, 255.0, 127.5], 1e-4);
        assert_close(super::hsl_from_rgb([128.0, 128.0, 128.0]), [0.0, 0.0, 128.0], 1e-4);
    }

    #[test]
    fn hsl_roundtrip() {
        for rgb in [
            [12.0, 200.0, 97.0],
            [250.0, 240.0, 10.0],
            [90.0, 30.0, 160.0],
            [1.0, 2.0, 3.0],
        ] {
            assert_close(super::rgb_from_hsl(super::hsl_from_rgb(rgb)), rgb, 1e-3);
        }
    }
}
