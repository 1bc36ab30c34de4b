/// D65 reference white.
const WHITE: [f32; 3] = [0.95047, 1.0, 1.08883];

/// Chromaticity of the D65 white point, used for black in xyY.
const WHITE_XY: [f32; 2] = [0.3127, 0.3290];

fn linearize(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn delinearize(c: f32) -> f32 {
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Unscaled XYZ tristimulus values of an sRGB pixel in the range [0, 255].
fn tristimulus_from_rgb(rgb: [f32; 3]) -> [f32; 3] {
    let r = linearize(rgb[0] / 255.0);
    let g = linearize(rgb[1] / 255.0);
    let b = linearize(rgb[2] / 255.0);
    [
        0.4124564 * r + 0.3575761 * g + 0.1804375 * b,
        0.2126729 * r + 0.7151522 * g + 0.0721750 * b,
        0.0193339 * r + 0.1191920 * g + 0.9503041 * b,
    ]
}

fn rgb_from_tristimulus(xyz: [f32; 3]) -> [f32; 3] {
    let [x, y, z] = xyz;
    let r = 3.2404542 * x - 1.5371385 * y - 0.4985314 * z;
    let g = -0.9692660 * x + 1.8760108 * y + 0.0415560 * z;
    let b = 0.0556434 * x - 0.2040259 * y + 1.0572252 * z;
    [
        delinearize(r.max(0.0)) * 255.0,
        delinearize(g.max(0.0)) * 255.0,
        delinearize(b.max(0.0)) * 255.0,
    ]
}

/// Convert an sRGB pixel to XYZ.
///
/// Each of X, Y and Z is divided by the matching component of the D65 white
/// and scaled to [0, 255], so white maps to `[255, 255, 255]`.
pub fn xyz_from_rgb(rgb: [f32; 3]) -> [f32; 3] {
    let t = tristimulus_from_rgb(rgb);
    [
        t[0] / WHITE[0] * 255.0,
        t[1] / WHITE[1] * 255.0,
        t[2] / WHITE[2] * 255.0,
    ]
}

/// Convert an XYZ pixel, encoded as produced by [`xyz_from_rgb`], back to sRGB.
pub fn rgb_from_xyz(xyz: [f32; 3]) -> [f32; 3] {
    rgb_from_tristimulus([
        xyz[0] / 255.0 * WHITE[0],
        xyz[1] / 255.0 * WHITE[1],
        xyz[2] / 255.0 * WHITE[2],
    ])
}

/// Convert an sRGB pixel to xyY with every channel scaled to [0, 255].
///
/// Black has no chromaticity and is assigned the D65 white point.
pub fn xyy_from_rgb(rgb: [f32; 3]) -> [f32; 3] {
    let t = tristimulus_from_rgb(rgb);
    let sum = t[0] + t[1] + t[2];
    let (x, y) = if sum <= f32::EPSILON {
        (WHITE_XY[0], WHITE_XY[1])
    } else {
        (t[0] / sum, t[1] / sum)
    };
    [x * 255.0, y * 255.0, t[1] * 255.0]
}

/// Convert an xyY pixel, encoded as produced by [`xyy_from_rgb`], back to sRGB.
pub fn rgb_from_xyy(xyy: [f32; 3]) -> [f32; 3] {
    let x = xyy[0] / 255.0;
    let y = xyy[1] / 255.0;
    let luminance = xyy[2] / 255.0;
    if y <= f32::EPSILON {
        return [0.0; 3];
    }
    rgb_from_tristimulus([
        x * luminance / y,
        luminance,
        (1.0 - x - y) * luminance / y,
    ])
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    #[test]
    fn xyz_white_is_reference() {
        for v in super::xyz_from_rgb([255.0, 255.0, 255.0]) {
            assert_abs_diff_eq!(v, 255.0, epsilon = 0.05);
        }
    }

    #[test]
    fn xyy_black_is_white_point() {
        let xyy = super::xyy_from_rgb([0.0, 0.0, 0.0]);
        assert_eq!(xyy[0].round(), 80.0);
        assert_eq!(xyy[1].round(), 84.0);
        assert_eq!(xyy[2], 0.0);
    }

    #[test]
    fn xyz_roundtrip() {
        for rgb in [[200.0, 40.0, 90.0], [10.0, 250.0, 20.0], [128.0, 128.0, 128.0]] {
            let back = super::rgb_from_xyz(super::xyz_from_rgb(rgb));
            for (a, b) in rgb.iter().zip(back.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 0.5);
            }
            let back = super::rgb_from_xyy(super::xyy_from_rgb(rgb));
            for (a, b) in rgb.iter().zip(back.iter()) {
                assert_abs_diff_eq!(a, b, epsilon = 0.5);
            }
        }
    }
}
