use luma_image::{saturate_u8, Colorspace, ImageError, PixelBuffer};

use super::{
    gray_from_rgb, hcl_from_rgb, hsl_from_rgb, rgb_from_hcl, rgb_from_hsl, rgb_from_xyy,
    rgb_from_xyz, rgb_from_ycbcr, xyy_from_rgb, xyz_from_rgb, ycbcr_from_rgb,
};
use crate::parallel;

/// Opaque alpha assigned when a colorspace without alpha is converted to RGBA.
const OPAQUE: f32 = 255.0;

/// Decode one pixel of `colorspace` into RGB plus alpha.
fn to_rgba(colorspace: Colorspace, values: &[f32]) -> [f32; 4] {
    let triplet = || [values[0], values[1], values[2]];
    let rgb = match colorspace {
        Colorspace::Rgb | Colorspace::Rgba => triplet(),
        Colorspace::Greyscale => [values[0]; 3],
        Colorspace::Hsl => rgb_from_hsl(triplet()),
        Colorspace::Hcl => rgb_from_hcl(triplet()),
        Colorspace::YCbCr => rgb_from_ycbcr(triplet()),
        Colorspace::Xyz => rgb_from_xyz(triplet()),
        Colorspace::Xyy => rgb_from_xyy(triplet()),
    };
    let alpha = if colorspace == Colorspace::Rgba {
        values[3]
    } else {
        OPAQUE
    };
    [rgb[0], rgb[1], rgb[2], alpha]
}

/// Encode RGB plus alpha into `out`, which has the channel count of `colorspace`.
fn from_rgba(colorspace: Colorspace, rgba: [f32; 4], out: &mut [f32]) {
    let rgb = [rgba[0], rgba[1], rgba[2]];
    let encoded = match colorspace {
        Colorspace::Greyscale => {
            out[0] = gray_from_rgb(rgb);
            return;
        }
        Colorspace::Rgba => {
            out.copy_from_slice(&rgba);
            return;
        }
        Colorspace::Rgb => rgb,
        Colorspace::Hsl => hsl_from_rgb(rgb),
        Colorspace::Hcl => hcl_from_rgb(rgb),
        Colorspace::YCbCr => ycbcr_from_rgb(rgb),
        Colorspace::Xyz => xyz_from_rgb(rgb),
        Colorspace::Xyy => xyy_from_rgb(rgb),
    };
    out.copy_from_slice(&encoded);
}

/// Convert unrounded pixel values from one colorspace to another.
///
/// RGB is the pivot for every pair; the HSL, HCL and YCbCr legs are closed-form.
///
/// # Example
///
/// ```
/// use luma_image::Colorspace;
/// use luma_imgproc::color::convert_values;
///
/// let grey = convert_values(&[255.0, 255.0, 255.0], Colorspace::Rgb, Colorspace::Greyscale);
/// assert_eq!(grey.len(), 1);
/// assert!((grey[0] - 255.0).abs() < 1e-3);
/// ```
pub fn convert_values(values: &[f32], from: Colorspace, to: Colorspace) -> Vec<f32> {
    if from == to {
        return values.to_vec();
    }
    let mut out = vec![0.0; to.num_channels()];
    from_rgba(to, to_rgba(from, values), &mut out);
    out
}

/// Convert an image to another colorspace.
///
/// Converting to the current colorspace returns a copy. Every output channel is
/// rounded to the nearest integer and saturated to [0, 255].
///
/// # Arguments
///
/// * `src` - The input image.
/// * `target` - The colorspace of the output image.
///
/// # Returns
///
/// A new image in the target colorspace with the same size.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, ImageSize, PixelBuffer};
/// use luma_imgproc::color::convert;
///
/// let image = PixelBuffer::new(
///     ImageSize { width: 1, height: 1 },
///     Colorspace::Rgb,
///     vec![255, 0, 0],
/// )
/// .unwrap();
///
/// let grey = convert(&image, Colorspace::Greyscale).unwrap();
/// assert_eq!(grey.as_slice(), &[76]);
/// ```
pub fn convert(src: &PixelBuffer, target: Colorspace) -> Result<PixelBuffer, ImageError> {
    let from = src.colorspace();
    if from == target {
        return Ok(src.clone());
    }

    let mut dst = PixelBuffer::from_size_val(src.size(), target, 0);
    parallel::par_iter_rows(src, &mut dst, |src_pixel, dst_pixel| {
        let mut values = [0.0f32; 4];
        src_pixel
            .iter()
            .zip(values.iter_mut())
            .for_each(|(&s, v)| *v = s as f32);

        let mut out = [0.0f32; 4];
        let out = &mut out[..dst_pixel.len()];
        from_rgba(target, to_rgba(from, &values), out);

        dst_pixel
            .iter_mut()
            .zip(out.iter())
            .for_each(|(d, &v)| *d = saturate_u8(v));
    });

    Ok(dst)
}
