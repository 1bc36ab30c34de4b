use luma_image::{saturate_u8, ImageError, ImageSize, PixelBuffer};

use crate::crop::crop;
pub use crate::crop::Subselect;
use crate::parallel;

/// How a requested width and height are reconciled with the source aspect ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ResizeFit {
    /// Same as `Exact`.
    Auto,
    /// Fit inside the requested box, preserving the aspect ratio.
    Contain,
    /// Cover the requested box, preserving the aspect ratio.
    Cover,
    /// Use the requested dimensions, deriving a missing one from the aspect ratio.
    #[default]
    Exact,
    /// Crop a centered region with the requested aspect ratio.
    Crop,
}

/// Resampling algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ResizeMethod {
    /// Pick the closest source pixel.
    NearestNeighbor,
    /// Blend the four surrounding pixels, box-filtering large reductions.
    #[default]
    Bilinear,
    /// Integer block average, shrink only.
    Box,
}

/// Requested output geometry of a resize.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResizeOptions {
    /// Target width in pixels.
    pub width: Option<usize>,
    /// Target height in pixels.
    pub height: Option<usize>,
    /// Aspect ratio policy.
    pub fit: ResizeFit,
    /// Resampling algorithm.
    pub method: ResizeMethod,
    /// Region of the source to resample, the full image when unset.
    pub subselect: Option<Subselect>,
}

impl ResizeOptions {
    /// Whether the fit policy reconciles both a width and a height.
    pub fn needs_both_dimensions(&self) -> bool {
        !matches!(self.fit, ResizeFit::Exact | ResizeFit::Auto)
    }

    /// Check the option combination without looking at an image.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` when none of width, height and subselect is given, when a
    /// dimension is zero, or when a fit other than `Exact` or `Auto` lacks a dimension.
    pub fn validate(&self) -> Result<(), ImageError> {
        if self.width.is_none() && self.height.is_none() && self.subselect.is_none() {
            return Err(ImageError::InvalidOptions(
                "must specify a width, height, or subselect".to_string(),
            ));
        }
        if self.width == Some(0) || self.height == Some(0) {
            return Err(ImageError::InvalidOptions(
                "width and height must be positive".to_string(),
            ));
        }
        if self.needs_both_dimensions() && (self.width.is_none() || self.height.is_none()) {
            return Err(ImageError::InvalidOptions(format!(
                "must specify width and height with {:?} fit",
                self.fit
            )));
        }
        Ok(())
    }
}

/// Fully resolved resize geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResolvedGeometry {
    /// Output width in pixels.
    pub width: usize,
    /// Output height in pixels.
    pub height: usize,
    /// Region of the source that is resampled.
    pub subselect: Subselect,
}

impl ResolvedGeometry {
    /// Output size.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width,
            height: self.height,
        }
    }
}

fn derived(value: f64) -> usize {
    (value.round() as usize).max(1)
}

/// Resolve the output size and source region of a resize.
///
/// Missing dimensions are derived from the aspect ratio of the resampled region,
/// rounded to the nearest pixel and never below 1.
///
/// # Arguments
///
/// * `source` - The size of the input image.
/// * `options` - The requested geometry.
///
/// # Example
///
/// ```
/// use luma_image::ImageSize;
/// use luma_imgproc::resize::{resolve_geometry, ResizeFit, ResizeOptions};
///
/// let options = ResizeOptions {
///     width: Some(100),
///     height: Some(100),
///     fit: ResizeFit::Contain,
///     ..Default::default()
/// };
///
/// let geometry = resolve_geometry(ImageSize { width: 400, height: 200 }, &options).unwrap();
/// assert_eq!((geometry.width, geometry.height), (100, 50));
/// ```
pub fn resolve_geometry(
    source: ImageSize,
    options: &ResizeOptions,
) -> Result<ResolvedGeometry, ImageError> {
    options.validate()?;

    let mut subselect = match options.subselect {
        Some(subselect) => {
            subselect.validate(source)?;
            subselect
        }
        None => Subselect::full(source),
    };

    let region = subselect.size();
    let aspect_ratio = region.aspect_ratio();

    let (width, height) = match (options.fit, options.width, options.height) {
        (ResizeFit::Auto | ResizeFit::Exact, Some(w), Some(h)) => (w, h),
        (ResizeFit::Auto | ResizeFit::Exact, Some(w), None) => {
            (w, derived(w as f64 / aspect_ratio))
        }
        (ResizeFit::Auto | ResizeFit::Exact, None, Some(h)) => {
            (derived(h as f64 * aspect_ratio), h)
        }
        (ResizeFit::Auto | ResizeFit::Exact, None, None) => (region.width, region.height),
        (fit, Some(w), Some(h)) => {
            let target_aspect_ratio = w as f64 / h as f64;
            let wider = aspect_ratio > target_aspect_ratio;
            match fit {
                ResizeFit::Contain if wider => (w, derived(w as f64 / aspect_ratio)),
                ResizeFit::Contain => (derived(h as f64 * aspect_ratio), h),
                ResizeFit::Cover if wider => (derived(h as f64 * aspect_ratio), h),
                ResizeFit::Cover => (w, derived(w as f64 / aspect_ratio)),
                _ if options.subselect.is_some() => (region.width, region.height),
                _ => {
                    subselect = centered_crop(source, target_aspect_ratio);
                    (w, h)
                }
            }
        }
        _ => return Err(ImageError::MissingDimension),
    };

    Ok(ResolvedGeometry {
        width,
        height,
        subselect,
    })
}

/// Largest centered region of `source` with the given aspect ratio.
fn centered_crop(source: ImageSize, target_aspect_ratio: f64) -> Subselect {
    let (src_w, src_h) = (source.width as f64, source.height as f64);

    let (crop_w, crop_h) = if source.aspect_ratio() > target_aspect_ratio {
        (src_h * target_aspect_ratio, src_h)
    } else {
        (src_w, src_w / target_aspect_ratio)
    };

    let height_margin = (src_h - crop_h) / 2.0;
    let width_margin = (src_w - crop_w) / 2.0;

    Subselect {
        top: height_margin.floor() as usize,
        bottom: source.height - height_margin.ceil() as usize,
        left: width_margin.floor() as usize,
        right: source.width - width_margin.ceil() as usize,
    }
}

fn check_sizes(src: &PixelBuffer, new_size: ImageSize) -> Result<(), ImageError> {
    if new_size.width == 0 || new_size.height == 0 {
        return Err(ImageError::MissingDimension);
    }
    if src.width() == 0 || src.height() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            new_size.width,
            new_size.height,
        ));
    }
    Ok(())
}

/// Resize an image by picking the closest source pixel.
///
/// The source coordinate of output `(x, y)` is `floor(x * src_w / dst_w)`,
/// `floor(y * src_h / dst_h)`.
///
/// # Errors
///
/// `MissingDimension` if a target dimension is zero.
pub fn nearest_neighbor(src: &PixelBuffer, new_size: ImageSize) -> Result<PixelBuffer, ImageError> {
    check_sizes(src, new_size)?;

    let channels = src.num_channels();
    let (src_w, src_h) = (src.width(), src.height());
    let mut dst = PixelBuffer::from_size_val(new_size, src.colorspace(), 0);
    let row_stride = dst.row_stride();

    parallel::par_iter_rows_indexed(dst.as_slice_mut(), row_stride, |y, dst_row| {
        let src_y = y * src_h / new_size.height;
        dst_row
            .chunks_exact_mut(channels)
            .enumerate()
            .for_each(|(x, dst_pixel)| {
                let src_x = x * src_w / new_size.width;
                let offset = (src_y * src_w + src_x) * channels;
                dst_pixel.copy_from_slice(&src.as_slice()[offset..offset + channels]);
            });
    });

    Ok(dst)
}

/// Bilinear resampling without the box pre-pass.
fn bilinear_direct(src: &PixelBuffer, new_size: ImageSize) -> PixelBuffer {
    let channels = src.num_channels();
    let (src_w, src_h) = (src.width(), src.height());
    let scale_x = src_w as f64 / new_size.width as f64;
    let scale_y = src_h as f64 / new_size.height as f64;

    let mut dst = PixelBuffer::from_size_val(new_size, src.colorspace(), 0);
    let row_stride = dst.row_stride();
    let src_data = src.as_slice();

    parallel::par_iter_rows_indexed(dst.as_slice_mut(), row_stride, |y, dst_row| {
        let src_y = y as f64 * scale_y;
        let y0 = src_y.floor() as usize;
        let dy = src_y - y0 as f64;

        for (x, dst_pixel) in dst_row.chunks_exact_mut(channels).enumerate() {
            let src_x = x as f64 * scale_x;
            let x0 = src_x.floor() as usize;
            let dx = src_x - x0 as f64;

            let taps = [
                (x0, y0, (1.0 - dx) * (1.0 - dy)),
                (x0 + 1, y0, dx * (1.0 - dy)),
                (x0, y0 + 1, (1.0 - dx) * dy),
                (x0 + 1, y0 + 1, dx * dy),
            ];

            // neighbors outside the source are dropped and the rest renormalized
            let total_weight: f64 = taps
                .iter()
                .filter(|(tx, ty, _)| *tx < src_w && *ty < src_h)
                .map(|(_, _, w)| w)
                .sum();

            for (c, out) in dst_pixel.iter_mut().enumerate() {
                let value: f64 = taps
                    .iter()
                    .filter(|(tx, ty, _)| *tx < src_w && *ty < src_h)
                    .map(|(tx, ty, w)| src_data[(ty * src_w + tx) * channels + c] as f64 * w)
                    .sum();
                *out = saturate_u8((value / total_weight) as f32);
            }
        }
    });

    dst
}

/// Resize an image with bilinear interpolation.
///
/// Reductions of 2x or more on either axis go through a box pass: with
/// `fx = max(floor(sx), 1)` and `fy = max(floor(sy), 1)`, exact integer factors are
/// handed to [`box_resize`] directly, otherwise the image is first resampled to
/// `(width * fx, height * fy)` and then box-shrunk to the target.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `new_size` - The output size.
///
/// # Errors
///
/// `MissingDimension` if a target dimension is zero.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, ImageSize, PixelBuffer};
/// use luma_imgproc::resize::bilinear;
///
/// let image = PixelBuffer::new(
///     ImageSize { width: 2, height: 1 },
///     Colorspace::Greyscale,
///     vec![0, 100],
/// )
/// .unwrap();
///
/// let resized = bilinear(&image, ImageSize { width: 4, height: 1 }).unwrap();
/// assert_eq!(resized.as_slice(), &[0, 50, 100, 100]);
/// ```
pub fn bilinear(src: &PixelBuffer, new_size: ImageSize) -> Result<PixelBuffer, ImageError> {
    check_sizes(src, new_size)?;

    let scale_x = src.width() as f64 / new_size.width as f64;
    let scale_y = src.height() as f64 / new_size.height as f64;

    if scale_x >= 2.0 || scale_y >= 2.0 {
        let factor_x = (scale_x.floor() as usize).max(1);
        let factor_y = (scale_y.floor() as usize).max(1);

        if src.width() == new_size.width * factor_x && src.height() == new_size.height * factor_y {
            log::debug!("bilinear: exact {factor_x}x{factor_y} reduction, using box");
            return box_resize(src, new_size);
        }

        let intermediate = ImageSize {
            width: new_size.width * factor_x,
            height: new_size.height * factor_y,
        };
        log::debug!("bilinear: cascading through {intermediate} with a {factor_x}x{factor_y} box");
        return box_resize(&bilinear_direct(src, intermediate), new_size);
    }

    Ok(bilinear_direct(src, new_size))
}

/// Shrink an image by averaging integer blocks of pixels.
///
/// Each output sample is the truncated integer mean of its `fx * fy` source block.
///
/// # Errors
///
/// `InvalidScaleFactor` if a scale factor is below 1 or not an integer,
/// `MissingDimension` if a target dimension is zero.
pub fn box_resize(src: &PixelBuffer, new_size: ImageSize) -> Result<PixelBuffer, ImageError> {
    check_sizes(src, new_size)?;

    let (src_w, src_h) = (src.width(), src.height());
    if src_w < new_size.width
        || src_h < new_size.height
        || src_w % new_size.width != 0
        || src_h % new_size.height != 0
    {
        return Err(ImageError::InvalidScaleFactor(
            src_w as f64 / new_size.width as f64,
            src_h as f64 / new_size.height as f64,
        ));
    }

    let factor_x = src_w / new_size.width;
    let factor_y = src_h / new_size.height;
    let block = (factor_x * factor_y) as u32;
    let channels = src.num_channels();
    let src_data = src.as_slice();

    let mut dst = PixelBuffer::from_size_val(new_size, src.colorspace(), 0);
    let row_stride = dst.row_stride();

    parallel::par_iter_rows_indexed(dst.as_slice_mut(), row_stride, |y, dst_row| {
        let y0 = y * factor_y;
        for (x, dst_pixel) in dst_row.chunks_exact_mut(channels).enumerate() {
            let x0 = x * factor_x;
            for (c, out) in dst_pixel.iter_mut().enumerate() {
                let mut sum = 0u32;
                for sy in y0..y0 + factor_y {
                    for sx in x0..x0 + factor_x {
                        sum += src_data[(sy * src_w + sx) * channels + c] as u32;
                    }
                }
                *out = (sum / block) as u8;
            }
        }
    });

    Ok(dst)
}

/// Resize an image according to the requested geometry.
///
/// The geometry is resolved first, the source is cropped to the resolved region
/// when it does not cover the whole image, and the configured method resamples
/// the region to the output size.
///
/// # Example
///
/// ```
/// use luma_image::{Colorspace, ImageSize, PixelBuffer};
/// use luma_imgproc::resize::{resize, ResizeFit, ResizeOptions};
///
/// let image = PixelBuffer::from_size_val(
///     ImageSize { width: 300, height: 200 },
///     Colorspace::Rgb,
///     0,
/// );
///
/// let options = ResizeOptions {
///     width: Some(100),
///     height: Some(100),
///     fit: ResizeFit::Crop,
///     ..Default::default()
/// };
///
/// let resized = resize(&image, &options).unwrap();
/// assert_eq!(resized.size(), ImageSize { width: 100, height: 100 });
/// ```
pub fn resize(src: &PixelBuffer, options: &ResizeOptions) -> Result<PixelBuffer, ImageError> {
    let geometry = resolve_geometry(src.size(), options)?;
    log::debug!(
        "resize: {} -> {} with {:?} over {:?}",
        src.size(),
        geometry.size(),
        options.method,
        geometry.subselect
    );

    let cropped;
    let region = if geometry.subselect.is_full(src.size()) {
        src
    } else {
        cropped = crop(src, &geometry.subselect)?;
        &cropped
    };

    if region.size() == geometry.size() {
        return Ok(region.clone());
    }

    match options.method {
        ResizeMethod::NearestNeighbor => nearest_neighbor(region, geometry.size()),
        ResizeMethod::Bilinear => bilinear(region, geometry.size()),
        ResizeMethod::Box => box_resize(region, geometry.size()),
    }
}
