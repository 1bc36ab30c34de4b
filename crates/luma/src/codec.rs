//! Codec interface boundary
//!
//! Bitstream decoding and encoding live outside of this crate. Callers register
//! implementations of [`ImageDecoder`] per [`SourceFormat`] and hand an
//! [`ImageEncoder`] to [`crate::materialize_bytes`].

use std::fmt;

use luma_image::{ImageError, PixelBuffer};

use crate::error::PipelineError;
use crate::metadata::RawMetadata;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const TIFF_LE_MAGIC: &[u8] = b"II*\0";
const TIFF_BE_MAGIC: &[u8] = b"MM\0*";

/// Container format of encoded source bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SourceFormat {
    /// JPEG/JFIF.
    Jpeg,
    /// TIFF, including TIFF based raw files.
    Tiff,
    /// PNG.
    Png,
}

impl SourceFormat {
    /// Detect the format from the leading signature bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use luma::SourceFormat;
    ///
    /// assert_eq!(SourceFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(SourceFormat::Jpeg));
    /// assert_eq!(SourceFormat::sniff(b"MM\0*\0\0\0\x08"), Some(SourceFormat::Tiff));
    /// assert_eq!(SourceFormat::sniff(b"GIF89a"), None);
    /// ```
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(JPEG_MAGIC) {
            Some(SourceFormat::Jpeg)
        } else if bytes.starts_with(PNG_MAGIC) {
            Some(SourceFormat::Png)
        } else if bytes.starts_with(TIFF_LE_MAGIC) || bytes.starts_with(TIFF_BE_MAGIC) {
            Some(SourceFormat::Tiff)
        } else {
            None
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SourceFormat::Jpeg => "jpeg",
            SourceFormat::Tiff => "tiff",
            SourceFormat::Png => "png",
        };
        f.write_str(name)
    }
}

/// Output container format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ImageFormat {
    /// JPEG, lossy.
    #[default]
    Jpeg,
    /// PNG, lossless.
    Png,
}

/// Output format and its encoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatOptions {
    /// Container format.
    pub format: ImageFormat,
    /// Encoder quality in 1..=100, only meaningful for lossy formats.
    pub quality: Option<u8>,
}

impl FormatOptions {
    /// Default quality of JPEG output.
    pub const DEFAULT_JPEG_QUALITY: u8 = 90;

    /// JPEG output with the given quality.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` if the quality is outside 1..=100.
    pub fn jpeg(quality: u8) -> Result<Self, ImageError> {
        if !(1..=100).contains(&quality) {
            return Err(ImageError::InvalidOptions(format!(
                "jpeg quality must be in 1..=100, got {quality}"
            )));
        }
        Ok(Self {
            format: ImageFormat::Jpeg,
            quality: Some(quality),
        })
    }

    /// PNG output.
    pub fn png() -> Self {
        Self {
            format: ImageFormat::Png,
            quality: None,
        }
    }

    /// Default options of a format.
    pub fn for_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => Self {
                format,
                quality: Some(Self::DEFAULT_JPEG_QUALITY),
            },
            ImageFormat::Png => Self::png(),
        }
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::for_format(ImageFormat::Jpeg)
    }
}

/// Decodes one container format into a [`PixelBuffer`].
pub trait ImageDecoder: Send + Sync {
    /// Decode the pixels of an encoded image.
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, PipelineError>;

    /// Extract the raw metadata tags without decoding the pixels.
    ///
    /// The default implementation reports no tags.
    fn metadata(&self, bytes: &[u8]) -> Result<RawMetadata, PipelineError> {
        let _ = bytes;
        Ok(RawMetadata::default())
    }
}

/// Encodes a [`PixelBuffer`] into an output container format.
pub trait ImageEncoder: Send + Sync {
    /// Encode the image with the given format options.
    fn encode(&self, image: &PixelBuffer, options: &FormatOptions) -> Result<Vec<u8>, PipelineError>;
}

/// One optional decoder per [`SourceFormat`].
#[derive(Default)]
pub struct Decoders {
    jpeg: Option<Box<dyn ImageDecoder>>,
    tiff: Option<Box<dyn ImageDecoder>>,
    png: Option<Box<dyn ImageDecoder>>,
}

impl Decoders {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the decoder of a format, replacing the previous one.
    ///
    /// # Arguments
    ///
    /// * `format` - The format handled by the decoder.
    /// * `decoder` - The decoder implementation.
    pub fn with_decoder(mut self, format: SourceFormat, decoder: impl ImageDecoder + 'static) -> Self {
        let slot = match format {
            SourceFormat::Jpeg => &mut self.jpeg,
            SourceFormat::Tiff => &mut self.tiff,
            SourceFormat::Png => &mut self.png,
        };
        *slot = Some(Box::new(decoder));
        self
    }

    /// Get the decoder of a format, if any.
    pub fn get(&self, format: SourceFormat) -> Option<&dyn ImageDecoder> {
        match format {
            SourceFormat::Jpeg => self.jpeg.as_deref(),
            SourceFormat::Tiff => self.tiff.as_deref(),
            SourceFormat::Png => self.png.as_deref(),
        }
    }

    /// Sniff the format of the bytes and pick its decoder.
    ///
    /// # Errors
    ///
    /// `UnsupportedFormat` if the signature is unknown, `MissingDecoder` if no
    /// decoder is registered for the format.
    pub fn resolve(&self, bytes: &[u8]) -> Result<(SourceFormat, &dyn ImageDecoder), PipelineError> {
        let format = SourceFormat::sniff(bytes).ok_or(PipelineError::UnsupportedFormat)?;
        let decoder = self
            .get(format)
            .ok_or(PipelineError::MissingDecoder(format))?;
        Ok((format, decoder))
    }

    /// Decode bytes with the decoder of their sniffed format.
    pub fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, PipelineError> {
        let (format, decoder) = self.resolve(bytes)?;
        log::debug!("decoding {} bytes as {format}", bytes.len());
        decoder.decode(bytes)
    }
}
