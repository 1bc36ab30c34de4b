use crate::colorspace::Colorspace;
use crate::error::ImageError;
use crate::pixel::Pixel;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use luma_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Total number of pixels.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Round a floating point sample to the nearest integer and saturate it to a byte.
///
/// # Examples
///
/// ```
/// use luma_image::saturate_u8;
///
/// assert_eq!(saturate_u8(127.5), 128);
/// assert_eq!(saturate_u8(-3.0), 0);
/// assert_eq!(saturate_u8(300.0), 255);
/// ```
pub fn saturate_u8(x: f32) -> u8 {
    if x.is_nan() {
        return 0;
    }
    num_traits::clamp(x.round(), 0.0, 255.0) as u8
}

/// Canonical raster: 8-bit samples, row-major, channel-interleaved.
///
/// The number of channels is given by the [`Colorspace`] tag. Transforms never
/// mutate their input buffer; they allocate and return a new one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    size: ImageSize,
    colorspace: Colorspace,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a new pixel buffer from raw samples.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `colorspace` - The colorspace of the samples.
    /// * `data` - The samples of the image.
    ///
    /// # Errors
    ///
    /// If the length of the data does not match `width * height * channels`.
    ///
    /// # Examples
    ///
    /// ```
    /// use luma_image::{Colorspace, ImageSize, PixelBuffer};
    ///
    /// let image = PixelBuffer::new(
    ///     ImageSize {
    ///         width: 10,
    ///         height: 20,
    ///     },
    ///     Colorspace::Rgb,
    ///     vec![0u8; 10 * 20 * 3],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(image.width(), 10);
    /// assert_eq!(image.height(), 20);
    /// assert_eq!(image.num_channels(), 3);
    /// ```
    pub fn new(size: ImageSize, colorspace: Colorspace, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = size.area() * colorspace.num_channels();
        if data.len() != expected {
            return Err(ImageError::InvalidChannelShape(data.len(), expected));
        }

        Ok(Self {
            size,
            colorspace,
            data,
        })
    }

    /// Create a new pixel buffer with every sample set to `val`.
    pub fn from_size_val(size: ImageSize, colorspace: Colorspace, val: u8) -> Self {
        Self {
            size,
            colorspace,
            data: vec![val; size.area() * colorspace.num_channels()],
        }
    }

    /// Create a new pixel buffer filled with one pixel value.
    ///
    /// # Errors
    ///
    /// If the number of values does not match the colorspace channels.
    pub fn from_size_pixel(
        size: ImageSize,
        colorspace: Colorspace,
        values: &[u8],
    ) -> Result<Self, ImageError> {
        if values.len() != colorspace.num_channels() {
            return Err(ImageError::InvalidChannelShape(
                values.len(),
                colorspace.num_channels(),
            ));
        }
        let data = values
            .iter()
            .copied()
            .cycle()
            .take(size.area() * values.len())
            .collect();
        Self::new(size, colorspace, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        self.colorspace.num_channels()
    }

    /// Get the colorspace tag of the samples.
    pub fn colorspace(&self) -> Colorspace {
        self.colorspace
    }

    /// Number of samples in one row.
    pub fn row_stride(&self) -> usize {
        self.size.width * self.num_channels()
    }

    /// Get the samples as a flat slice.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get the samples as a flat mutable slice.
    pub fn as_slice_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consume the buffer and return its samples.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Offset of the first sample of the pixel at `(x, y)`.
    pub fn index_for(&self, x: usize, y: usize) -> usize {
        (y * self.size.width + x) * self.num_channels()
    }

    /// Whether `(x, y)` lies on the outermost ring of pixels.
    pub fn is_border(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 >= self.size.width || y + 1 >= self.size.height
    }

    /// Get the samples of the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// If the coordinate lies outside the image.
    pub fn get_pixel(&self, x: usize, y: usize) -> Result<&[u8], ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }
        let index = self.index_for(x, y);
        Ok(&self.data[index..index + self.num_channels()])
    }

    /// Build a view of the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// If the coordinate lies outside the image.
    pub fn pixel(&self, x: usize, y: usize) -> Result<Pixel, ImageError> {
        let values = self.get_pixel(x, y)?;
        Ok(Pixel::from_samples(
            x,
            y,
            self.index_for(x, y),
            self.colorspace,
            values,
        ))
    }

    /// Iterate over views of every pixel in raster order.
    ///
    /// # Examples
    ///
    /// ```
    /// use luma_image::{Colorspace, ImageSize, PixelBuffer};
    ///
    /// let image = PixelBuffer::new(
    ///     ImageSize { width: 2, height: 1 },
    ///     Colorspace::Greyscale,
    ///     vec![10, 20],
    /// )
    /// .unwrap();
    ///
    /// let values: Vec<f32> = image.pixels().map(|p| p.values[0]).collect();
    /// assert_eq!(values, vec![10.0, 20.0]);
    /// ```
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        let channels = self.num_channels();
        let width = self.width();
        self.data
            .chunks_exact(channels)
            .enumerate()
            .map(move |(i, samples)| {
                Pixel::from_samples(
                    i % width,
                    i / width,
                    i * channels,
                    self.colorspace,
                    samples,
                )
            })
    }
}
