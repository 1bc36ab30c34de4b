//! Tone mapping
//!
//! Per-pixel functions composed over an image, plus the tone and calibration
//! adjustments built from them.

mod calibration;
pub use calibration::*;

mod curve;
pub use curve::ToneCurve;

use luma_image::{saturate_u8, Colorspace, ImageError, Pixel, PixelBuffer};
use rayon::prelude::*;

use crate::color::convert;

/// A pure function from a pixel view to its new channel values.
pub type MapPixelFn = Box<dyn Fn(&Pixel) -> Vec<f32> + Send + Sync>;

/// Apply a single per-pixel function to an image.
///
/// # Errors
///
/// `InvalidChannelShape` if the function returns a different number of channels.
pub fn map_pixel<F>(src: &PixelBuffer, f: F) -> Result<PixelBuffer, ImageError>
where
    F: Fn(&Pixel) -> Vec<f32> + Send + Sync,
{
    map_with(src, |pixel| pixel.values = f(pixel))
}

/// Apply per-pixel functions to an image, left to right.
///
/// Every function sees the unrounded output of the previous one; values are
/// rounded and saturated only when written to the new image.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `fns` - The functions to compose.
///
/// # Errors
///
/// `InvalidChannelShape` if a function returns a different number of channels.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, ImageSize, Pixel, PixelBuffer};
/// use luma_imgproc::tone::{map_pixels, MapPixelFn};
///
/// let image = PixelBuffer::new(
///     ImageSize { width: 1, height: 1 },
///     Colorspace::Greyscale,
///     vec![10],
/// )
/// .unwrap();
///
/// let fns: Vec<MapPixelFn> = vec![
///     Box::new(|p: &Pixel| vec![p.values[0] / 2.0]),
///     Box::new(|p: &Pixel| vec![p.values[0] + 2.0]),
/// ];
///
/// let mapped = map_pixels(&image, &fns).unwrap();
/// assert_eq!(mapped.as_slice(), &[7]);
/// ```
pub fn map_pixels(src: &PixelBuffer, fns: &[MapPixelFn]) -> Result<PixelBuffer, ImageError> {
    map_with(src, |pixel| {
        for f in fns {
            pixel.values = f(pixel);
        }
    })
}

fn map_with<F>(src: &PixelBuffer, f: F) -> Result<PixelBuffer, ImageError>
where
    F: Fn(&mut Pixel) + Send + Sync,
{
    let mut dst = PixelBuffer::from_size_val(src.size(), src.colorspace(), 0);
    let (cols, channels) = (src.cols(), src.num_channels());
    let row_stride = src.row_stride();
    if row_stride == 0 {
        return Ok(dst);
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(row_stride)
        .zip(src.as_slice().par_chunks_exact(row_stride))
        .enumerate()
        .try_for_each(|(y, (dst_row, src_row))| {
            for (x, (dst_pixel, samples)) in dst_row
                .chunks_exact_mut(channels)
                .zip(src_row.chunks_exact(channels))
                .enumerate()
            {
                let index = (y * cols + x) * channels;
                let mut pixel = Pixel::from_samples(x, y, index, src.colorspace(), samples);
                f(&mut pixel);

                if pixel.values.len() != channels {
                    return Err(ImageError::InvalidChannelShape(
                        pixel.values.len(),
                        channels,
                    ));
                }
                dst_pixel
                    .iter_mut()
                    .zip(&pixel.values)
                    .for_each(|(d, &v)| *d = saturate_u8(v));
            }
            Ok(())
        })?;

    Ok(dst)
}

/// Scale the distance of the luma channel from mid-grey.
///
/// `Y' = 128 + (Y - 128) * (1 + amount)` on YCbCr pixels; other colorspaces pass
/// through unchanged.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, Pixel};
/// use luma_imgproc::tone::contrast;
///
/// let f = contrast(1.0);
/// let pixel = Pixel::with_values(Colorspace::YCbCr, vec![100.0, 1.0, 2.0]);
/// assert_eq!(f(&pixel), vec![72.0, 1.0, 2.0]);
/// ```
pub fn contrast(amount: f32) -> MapPixelFn {
    Box::new(move |pixel| {
        let mut values = pixel.values.clone();
        if pixel.colorspace == Colorspace::YCbCr {
            values[0] = 128.0 + (values[0] - 128.0) * (1.0 + amount);
        }
        values
    })
}

/// Map the luma channel of YCbCr pixels through a tone curve.
pub fn curves(curve: ToneCurve) -> MapPixelFn {
    Box::new(move |pixel| {
        let mut values = pixel.values.clone();
        if pixel.colorspace == Colorspace::YCbCr {
            values[0] = curve.evaluate(values[0]);
        }
        values
    })
}

/// Scale the chroma channels of YCbCr pixels around neutral by `1 + amount`.
pub fn saturation(amount: f32) -> MapPixelFn {
    Box::new(move |pixel| {
        let mut values = pixel.values.clone();
        if pixel.colorspace == Colorspace::YCbCr {
            for chroma in &mut values[1..3] {
                *chroma = 128.0 + (*chroma - 128.0) * (1.0 + amount);
            }
        }
        values
    })
}

/// Tone adjustments, each applied only when set.
///
/// The zone offsets shift the luma curve at 0, 64, 128, 192 and 255.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToneOptions {
    /// Contrast amount, typically between -0.5 and 2.
    pub contrast: Option<f32>,
    /// Luma curve.
    pub curve: Option<ToneCurve>,
    /// Saturation amount, typically between -1 and 2.
    pub saturation: Option<f32>,
    /// Offset of the brightest values.
    pub whites: f32,
    /// Offset around 192.
    pub highlights: f32,
    /// Offset around 128.
    pub midtones: f32,
    /// Offset around 64.
    pub shadows: f32,
    /// Offset of the darkest values.
    pub blacks: f32,
}

impl ToneOptions {
    /// Luma curve described by the zone offsets, `None` when every offset is zero.
    ///
    /// # Errors
    ///
    /// Never for finite offsets, since the control points are clamped to [0, 255].
    pub fn zone_curve(&self) -> Result<Option<ToneCurve>, ImageError> {
        let offsets = [
            (0.0, self.blacks),
            (64.0, self.shadows),
            (128.0, self.midtones),
            (192.0, self.highlights),
            (255.0, self.whites),
        ];
        if offsets.iter().all(|(_, offset)| *offset == 0.0) {
            return Ok(None);
        }

        let points = offsets
            .iter()
            .map(|&(x, offset): &(f32, f32)| [x, num_traits::clamp(x + offset, 0.0, 255.0)])
            .collect();
        ToneCurve::new(points).map(Some)
    }

    fn map_fns(&self) -> Result<Vec<MapPixelFn>, ImageError> {
        let mut fns = Vec::new();
        if let Some(amount) = self.contrast {
            fns.push(contrast(amount));
        }
        if let Some(curve) = self.curve.as_ref().filter(|c| !c.is_identity()) {
            fns.push(curves(curve.clone()));
        }
        if let Some(curve) = self.zone_curve()? {
            fns.push(curves(curve));
        }
        if let Some(amount) = self.saturation {
            fns.push(saturation(amount));
        }
        Ok(fns)
    }
}

/// Apply tone adjustments to an image.
///
/// The image is converted to YCbCr, contrast, curve, zones and saturation are
/// applied in that order, and the result is converted back to the source colorspace.
pub fn tone(src: &PixelBuffer, options: &ToneOptions) -> Result<PixelBuffer, ImageError> {
    let fns = options.map_fns()?;
    if fns.is_empty() {
        return Ok(src.clone());
    }
    log::debug!("tone: applying {} adjustments", fns.len());

    let ycbcr = convert(src, Colorspace::YCbCr)?;
    let mapped = map_pixels(&ycbcr, &fns)?;
    convert(&mapped, src.colorspace())
}
