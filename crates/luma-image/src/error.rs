/// An error type for the image and image processing modules.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the data length does not match the image size and channels.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must share a size do not.
    #[error("Invalid image size ({0}x{1}), expected ({2}x{3})")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when a pixel coordinate lies outside the image.
    #[error("Pixel index ({0}, {1}) out of bounds ({2}x{3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the options of an operation conflict or are insufficient.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Error when a colorspace or format tag is not recognized.
    #[error("Unsupported conversion: {0}")]
    UnsupportedConversion(String),

    /// Error when a box resize is requested with an upscale or non-integer factor.
    #[error("Invalid scale factor ({0}, {1}), box resize requires integer shrink factors")]
    InvalidScaleFactor(f64, f64),

    /// Error when a resize is invoked without a resolved width and height.
    #[error("Missing width or height")]
    MissingDimension,

    /// Error when a convolution kernel is malformed.
    #[error("Invalid kernel: {0}")]
    InvalidKernel(String),

    /// Error when the number of histogram bins is invalid.
    #[error("Invalid number of histogram bins: {0}")]
    InvalidHistogramBins(usize),
}
