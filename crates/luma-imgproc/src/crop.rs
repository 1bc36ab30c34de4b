use luma_image::{ImageError, ImageSize, PixelBuffer};

use crate::parallel;

/// A rectangular region of an image in pixel coordinates.
///
/// `top` and `left` are inclusive, `bottom` and `right` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subselect {
    /// First row of the region.
    pub top: usize,
    /// Row past the last row of the region.
    pub bottom: usize,
    /// First column of the region.
    pub left: usize,
    /// Column past the last column of the region.
    pub right: usize,
}

impl Subselect {
    /// The region covering a whole image of the given size.
    pub fn full(size: ImageSize) -> Self {
        Self {
            top: 0,
            bottom: size.height,
            left: 0,
            right: size.width,
        }
    }

    /// Width of the region.
    pub fn width(&self) -> usize {
        self.right.saturating_sub(self.left)
    }

    /// Height of the region.
    pub fn height(&self) -> usize {
        self.bottom.saturating_sub(self.top)
    }

    /// Size of the region.
    pub fn size(&self) -> ImageSize {
        ImageSize {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Whether the region covers the whole image of the given size.
    pub fn is_full(&self, size: ImageSize) -> bool {
        *self == Self::full(size)
    }

    /// Check that the region is non-empty and lies inside an image of the given size.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` naming the violated bound.
    pub fn validate(&self, size: ImageSize) -> Result<(), ImageError> {
        if self.bottom <= self.top || self.right <= self.left {
            return Err(ImageError::InvalidOptions(format!(
                "subselect {self:?} is empty, bottom must exceed top and right must exceed left"
            )));
        }
        if self.bottom > size.height || self.right > size.width {
            return Err(ImageError::InvalidOptions(format!(
                "subselect {self:?} exceeds the image bounds {size}"
            )));
        }
        Ok(())
    }
}

/// Crop an image to a specified region.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `region` - The region to keep.
///
/// # Returns
///
/// A new image holding a copy of the region.
///
/// # Examples
///
/// ```rust
/// use luma_image::{Colorspace, ImageSize, PixelBuffer};
/// use luma_imgproc::crop::{crop, Subselect};
///
/// let image = PixelBuffer::new(ImageSize { width: 4, height: 4 }, Colorspace::Greyscale, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// let region = Subselect { top: 1, bottom: 3, left: 1, right: 3 };
/// let cropped = crop(&image, &region).unwrap();
///
/// assert_eq!(cropped.as_slice(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop(src: &PixelBuffer, region: &Subselect) -> Result<PixelBuffer, ImageError> {
    region.validate(src.size())?;

    let channels = src.num_channels();
    let src_stride = src.row_stride();
    let mut dst = PixelBuffer::from_size_val(region.size(), src.colorspace(), 0);
    let dst_stride = dst.row_stride();

    parallel::par_iter_rows_indexed(dst.as_slice_mut(), dst_stride, |i, dst_row| {
        // get the slice at the top left corner
        let offset = (region.top + i) * src_stride + region.left * channels;
        dst_row.copy_from_slice(&src.as_slice()[offset..offset + dst_stride]);
    });

    Ok(dst)
}

#[cfg(test)]
mod tests {
    use luma_image::{Colorspace, ImageError, ImageSize, PixelBuffer};

    use super::Subselect;

    #[test]
    fn test_crop() -> Result<(), ImageError> {
        let image_size = ImageSize {
            width: 2,
            height: 3,
        };

        #[rustfmt::skip]
        let image = PixelBuffer::new(
            image_size,
            Colorspace::Rgb,
            vec![
                0u8, 1, 2, 3, 4, 5,
                6u8, 7, 8, 9, 10, 11,
                12u8, 13, 14, 15, 16, 17,
            ],
        )?;

        let region = Subselect {
            top: 1,
            bottom: 3,
            left: 1,
            right: 2,
        };
        let cropped = super::crop(&image, &region)?;

        assert_eq!(cropped.size(), region.size());
        assert_eq!(cropped.as_slice(), &[9u8, 10, 11, 15, 16, 17]);

        Ok(())
    }

    #[test]
    fn test_crop_invalid_region() {
        let image = PixelBuffer::from_size_val(
            ImageSize {
                width: 4,
                height: 4,
            },
            Colorspace::Greyscale,
            0,
        );

        for region in [
            Subselect {
                top: 2,
                bottom: 2,
                left: 0,
                right: 4,
            },
            Subselect {
                top: 0,
                bottom: 4,
                left: 3,
                right: 1,
            },
            Subselect {
                top: 0,
                bottom: 5,
                left: 0,
                right: 4,
            },
        ] {
            assert!(matches!(
                super::crop(&image, &region),
                Err(ImageError::InvalidOptions(_))
            ));
        }
    }
}
