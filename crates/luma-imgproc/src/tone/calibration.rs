use luma_image::{Colorspace, ImageError, PixelBuffer};

use super::{map_pixels, MapPixelFn};
use crate::color::convert;

/// Degrees of hue rotation for a hue shift of 1.0.
const HUE_SHIFT_DEGREES: f32 = 30.0;

/// Hue distance at which a primary stops influencing a color.
const INFLUENCE_DEGREES: f32 = 120.0;

/// Per-primary hue and saturation shifts.
///
/// A hue shift of 1.0 rotates the hue of the primary by 30°, a saturation shift
/// scales its saturation by `1 + shift`. Colors between two primaries blend both
/// shifts linearly.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalibrationOptions {
    /// Hue shift of reds.
    pub red_hue_shift: f32,
    /// Saturation shift of reds.
    pub red_saturation_shift: f32,
    /// Hue shift of greens.
    pub green_hue_shift: f32,
    /// Saturation shift of greens.
    pub green_saturation_shift: f32,
    /// Hue shift of blues.
    pub blue_hue_shift: f32,
    /// Saturation shift of blues.
    pub blue_saturation_shift: f32,
}

impl CalibrationOptions {
    /// Whether the options leave every color untouched.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    fn primaries(&self) -> [(f32, f32, f32); 3] {
        [
            (0.0, self.red_hue_shift, self.red_saturation_shift),
            (120.0, self.green_hue_shift, self.green_saturation_shift),
            (240.0, self.blue_hue_shift, self.blue_saturation_shift),
        ]
    }
}

fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

/// Build the per-pixel calibration function for HSL pixels.
///
/// Each primary influences a hue with weight `max(0, 1 - distance / 120°)`; pixels
/// in other colorspaces pass through unchanged.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, Pixel};
/// use luma_imgproc::tone::{calibrate, CalibrationOptions};
///
/// let f = calibrate(&CalibrationOptions {
///     red_saturation_shift: -0.5,
///     ..Default::default()
/// });
///
/// let red = Pixel::with_values(Colorspace::Hsl, vec![0.0, 200.0, 128.0]);
/// assert_eq!(f(&red), vec![0.0, 100.0, 128.0]);
/// ```
pub fn calibrate(options: &CalibrationOptions) -> MapPixelFn {
    let primaries = options.primaries();
    Box::new(move |pixel| {
        let mut values = pixel.values.clone();
        if pixel.colorspace != Colorspace::Hsl {
            return values;
        }

        let hue = values[0] * 360.0 / 255.0;
        let (hue_shift, saturation_shift) = primaries.iter().fold(
            (0.0, 0.0),
            |(hue_acc, sat_acc), &(primary, hue_shift, sat_shift)| {
                let influence = (1.0 - hue_distance(hue, primary) / INFLUENCE_DEGREES).max(0.0);
                (
                    hue_acc + influence * hue_shift * HUE_SHIFT_DEGREES,
                    sat_acc + influence * sat_shift,
                )
            },
        );

        values[0] = (hue + hue_shift).rem_euclid(360.0) * 255.0 / 360.0;
        values[1] *= 1.0 + saturation_shift;
        values
    })
}

/// Apply per-primary calibration to an image.
///
/// The image is converted to HSL, calibrated and converted back to its colorspace.
pub fn apply_calibration(
    src: &PixelBuffer,
    options: &CalibrationOptions,
) -> Result<PixelBuffer, ImageError> {
    if options.is_identity() {
        return Ok(src.clone());
    }
    log::debug!("calibrate: {options:?}");

    let hsl = convert(src, Colorspace::Hsl)?;
    let calibrated = map_pixels(&hsl, &[calibrate(options)])?;
    convert(&calibrated, src.colorspace())
}
