//! Declarative pipeline
//!
//! An [`ImageConfig`] describes the desired output and analyses. Nothing runs until
//! the configuration is materialized against a pixel buffer.

use std::time::Instant;

use luma_image::{Colorspace, ImageError, PixelBuffer};
use luma_imgproc::{
    color,
    edges::{self, CannyOptions, CannyThresholds, SobelOptions},
    filter::{self, SharpenOptions},
    hash::{self, HashOptions},
    histogram::{self, HistogramOptions, Histograms},
    resize::{self, ResizeFit, ResizeOptions},
    sharpness::{self, Sharpness, SharpnessOptions},
    tone::{self, CalibrationOptions, ToneOptions},
};

use crate::codec::{Decoders, FormatOptions, ImageEncoder, ImageFormat};
use crate::error::PipelineError;
use crate::metadata::{normalize_metadata, ImageMetadata};

/// Edge detection algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EdgeMethod {
    /// Gradient magnitude image.
    #[default]
    Sobel,
    /// Thin binary edges.
    Canny,
}

/// Options of the edge stage.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeOptions {
    /// Edge detection algorithm.
    pub method: EdgeMethod,
    /// Radius of the gaussian pre-blur.
    pub radius: usize,
    /// Sigma of the gaussian pre-blur.
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds, picked automatically when unset.
    pub thresholds: Option<CannyThresholds>,
}

impl Default for EdgeOptions {
    fn default() -> Self {
        Self {
            method: EdgeMethod::Sobel,
            radius: 1,
            blur_sigma: 2.0,
            thresholds: None,
        }
    }
}

impl EdgeOptions {
    /// Default options of an edge method.
    pub fn with_method(method: EdgeMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }
}

/// Analyses to compute on the output image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisOptions {
    /// Perceptual hash.
    pub hash: Option<HashOptions>,
    /// Sharpness score.
    pub sharpness: Option<SharpnessOptions>,
    /// Color histograms.
    pub histograms: Option<HistogramOptions>,
}

/// Results of the requested analyses.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Analysis {
    /// Perceptual hash as a string of `'0'` and `'1'`.
    pub hash: Option<String>,
    /// Sharpness score.
    pub sharpness: Option<Sharpness>,
    /// Color histograms.
    pub histograms: Option<Histograms>,
}

/// Immutable description of an output image, built with [`ImageConfig::builder`].
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageConfig {
    format: FormatOptions,
    resize: Option<ResizeOptions>,
    calibrate: Option<CalibrationOptions>,
    tone: Option<ToneOptions>,
    greyscale: bool,
    sharpen: Option<SharpenOptions>,
    edges: Option<EdgeOptions>,
    analyze: Option<AnalysisOptions>,
}

impl ImageConfig {
    /// Start a configuration with JPEG output and no transforms.
    ///
    /// # Example
    ///
    /// ```
    /// use luma::{EdgeMethod, EdgeOptions, ImageConfig, ImageFormat};
    /// use luma::imgproc::resize::ResizeOptions;
    ///
    /// let config = ImageConfig::builder()
    ///     .with_format(ImageFormat::Png)
    ///     .with_resize(ResizeOptions {
    ///         width: Some(200),
    ///         ..Default::default()
    ///     })
    ///     .unwrap()
    ///     .with_edges(EdgeOptions::with_method(EdgeMethod::Canny))
    ///     .build();
    ///
    /// assert_eq!(config.format().quality, None);
    /// assert!(config.edges().is_some());
    /// ```
    pub fn builder() -> ImageConfigBuilder {
        ImageConfigBuilder::new()
    }

    /// Output format.
    pub fn format(&self) -> &FormatOptions {
        &self.format
    }

    /// Resize stage.
    pub fn resize(&self) -> Option<&ResizeOptions> {
        self.resize.as_ref()
    }

    /// Color calibration stage.
    pub fn calibrate(&self) -> Option<&CalibrationOptions> {
        self.calibrate.as_ref()
    }

    /// Tone stage.
    pub fn tone(&self) -> Option<&ToneOptions> {
        self.tone.as_ref()
    }

    /// Whether the output is converted to greyscale.
    pub fn greyscale(&self) -> bool {
        self.greyscale
    }

    /// Sharpen stage.
    pub fn sharpen(&self) -> Option<&SharpenOptions> {
        self.sharpen.as_ref()
    }

    /// Edge stage.
    pub fn edges(&self) -> Option<&EdgeOptions> {
        self.edges.as_ref()
    }

    /// Requested analyses.
    pub fn analyze(&self) -> Option<&AnalysisOptions> {
        self.analyze.as_ref()
    }
}

/// A builder for creating an [`ImageConfig`].
#[derive(Clone, Debug, Default)]
pub struct ImageConfigBuilder {
    config: ImageConfig,
}

impl ImageConfigBuilder {
    /// Creates a new builder with JPEG output and no transforms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output format with its default options.
    ///
    /// # Arguments
    ///
    /// * `format` - The output container format, JPEG defaults to quality 90.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.config.format = FormatOptions::for_format(format);
        self
    }

    /// Sets the output format options.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` if a quality is outside 1..=100.
    pub fn with_format_options(mut self, options: FormatOptions) -> Result<Self, ImageError> {
        if let Some(quality) = options.quality {
            if !(1..=100).contains(&quality) {
                return Err(ImageError::InvalidOptions(format!(
                    "quality must be in 1..=100, got {quality}"
                )));
            }
        }
        self.config.format = options;
        Ok(self)
    }

    /// Sets the resize stage.
    ///
    /// # Errors
    ///
    /// `InvalidOptions` when none of width, height and subselect is given, or when a
    /// fit other than `Exact` lacks a dimension. Unlike [`resize::resolve_geometry`],
    /// the builder also requires both dimensions for `Auto`.
    pub fn with_resize(mut self, options: ResizeOptions) -> Result<Self, ImageError> {
        options.validate()?;
        if options.fit != ResizeFit::Exact && (options.width.is_none() || options.height.is_none())
        {
            return Err(ImageError::InvalidOptions(format!(
                "must specify width and height with {:?} fit",
                options.fit
            )));
        }
        self.config.resize = Some(options);
        Ok(self)
    }

    /// Sets the color calibration stage.
    pub fn with_calibration(mut self, options: CalibrationOptions) -> Self {
        self.config.calibrate = Some(options);
        self
    }

    /// Sets the tone stage.
    pub fn with_tone(mut self, options: ToneOptions) -> Self {
        self.config.tone = Some(options);
        self
    }

    /// Converts the output to greyscale.
    pub fn greyscale(mut self) -> Self {
        self.config.greyscale = true;
        self
    }

    /// Sets the sharpen stage.
    pub fn with_sharpen(mut self, options: SharpenOptions) -> Self {
        self.config.sharpen = Some(options);
        self
    }

    /// Sets the edge stage.
    pub fn with_edges(mut self, options: EdgeOptions) -> Self {
        self.config.edges = Some(options);
        self
    }

    /// Sets the analyses computed on the output image.
    pub fn with_analysis(mut self, options: AnalysisOptions) -> Self {
        self.config.analyze = Some(options);
        self
    }

    /// Create the [`ImageConfig`].
    pub fn build(self) -> ImageConfig {
        self.config
    }
}

/// Output of [`materialize`].
#[derive(Clone, Debug, PartialEq)]
pub struct Materialized {
    /// The transformed image.
    pub image: PixelBuffer,
    /// Size of the transformed image, plus the source orientation and dates when known.
    pub metadata: ImageMetadata,
    /// Results of the requested analyses.
    pub analysis: Analysis,
}

fn stage<T>(name: &str, f: impl FnOnce() -> Result<T, ImageError>) -> Result<T, ImageError> {
    log::debug!("materialize: {name}");
    let start = Instant::now();
    let out = f()?;
    log::trace!("materialize: {name} took {:?}", start.elapsed());
    Ok(out)
}

fn detect_edges(image: &PixelBuffer, options: &EdgeOptions) -> Result<PixelBuffer, ImageError> {
    let edge_map = match options.method {
        EdgeMethod::Sobel => edges::sobel(
            image,
            &SobelOptions {
                radius: options.radius,
                blur_sigma: options.blur_sigma,
            },
        )?,
        EdgeMethod::Canny => edges::canny(
            image,
            &CannyOptions {
                radius: options.radius,
                blur_sigma: options.blur_sigma,
                thresholds: options.thresholds,
            },
        )?,
    };
    Ok(edge_map.into_parts().0)
}

fn analyze(image: &PixelBuffer, options: &AnalysisOptions) -> Result<Analysis, ImageError> {
    let hash = options
        .hash
        .as_ref()
        .map(|opts| stage("hash", || hash::hash(image, opts)))
        .transpose()?;
    let sharpness = options
        .sharpness
        .as_ref()
        .map(|opts| stage("sharpness", || sharpness::sharpness(image, opts)))
        .transpose()?;
    let histograms = options
        .histograms
        .as_ref()
        .map(|opts| stage("histograms", || histogram::histograms(image, opts)))
        .transpose()?;

    Ok(Analysis {
        hash,
        sharpness,
        histograms,
    })
}

/// Run the configured transforms and analyses on a pixel buffer.
///
/// The stages run in a fixed order: resize, calibrate, tone, greyscale, sharpen and
/// edges. The analyses then run on the output image.
///
/// # Arguments
///
/// * `config` - The output description.
/// * `image` - The decoded source image.
///
/// # Returns
///
/// The output image, its metadata and the analysis results.
pub fn materialize(config: &ImageConfig, image: &PixelBuffer) -> Result<Materialized, PipelineError> {
    let start = Instant::now();
    let mut image = image.clone();

    if let Some(options) = config.resize() {
        image = stage("resize", || resize::resize(&image, options))?;
    }
    if let Some(options) = config.calibrate() {
        image = stage("calibrate", || tone::apply_calibration(&image, options))?;
    }
    if let Some(options) = config.tone() {
        image = stage("tone", || tone::tone(&image, options))?;
    }
    if config.greyscale() {
        image = stage("greyscale", || color::convert(&image, Colorspace::Greyscale))?;
    }
    if let Some(options) = config.sharpen() {
        image = stage("sharpen", || filter::sharpen(&image, options))?;
    }
    if let Some(options) = config.edges() {
        image = stage("edges", || detect_edges(&image, options))?;
    }

    let analysis = match config.analyze() {
        Some(options) => analyze(&image, options)?,
        None => Analysis::default(),
    };
    log::trace!("materialize: total {:?}", start.elapsed());

    Ok(Materialized {
        metadata: ImageMetadata::from_size(image.width(), image.height()),
        image,
        analysis,
    })
}

/// Decode, materialize and encode an image.
///
/// The decoder is picked by sniffing the bytes. The orientation and dates reported
/// by the decoder metadata are carried over to the output metadata.
///
/// # Arguments
///
/// * `config` - The output description, its format is handed to the encoder.
/// * `bytes` - The encoded source image.
/// * `decoders` - The registered decoders.
/// * `encoder` - The encoder of the output format.
///
/// # Returns
///
/// The encoded output image and the materialized record.
pub fn materialize_bytes(
    config: &ImageConfig,
    bytes: &[u8],
    decoders: &Decoders,
    encoder: &dyn ImageEncoder,
) -> Result<(Vec<u8>, Materialized), PipelineError> {
    let (format, decoder) = decoders.resolve(bytes)?;
    log::debug!("materialize: decoding {} bytes as {format}", bytes.len());

    let source = normalize_metadata(decoder.metadata(bytes)?);
    let image = decoder.decode(bytes)?;

    let mut materialized = materialize(config, &image)?;
    materialized.metadata.orientation = source.orientation;
    materialized.metadata.created_at = source.created_at;
    materialized.metadata.modified_at = source.modified_at;

    let encoded = encoder.encode(&materialized.image, config.format())?;
    Ok((encoded, materialized))
}

#[cfg(test)]
mod tests {
    use luma_image::{Colorspace, ImageError, ImageSize, PixelBuffer};
    use super::*;

    fn gradient(width: usize, height: usize) -> Result<PixelBuffer, ImageError> {
        let data = (0..width * height)
            .flat_map(|i| {
                let (x, y) = (i % width, i / width);
                [(x * 255 / width) as u8, (y * 255 / height) as u8, 128]
            })
            .collect();
        PixelBuffer::new(ImageSize { width, height }, Colorspace::Rgb, data)
    }

    #[test]
    fn test_builder_defaults() {
        let config = ImageConfig::builder().build();
        assert_eq!(config.format(), &FormatOptions::default());
        assert_eq!(config.format().quality, Some(90));
        assert!(config.resize().is_none());
        assert!(!config.greyscale());

        let edges = EdgeOptions::default();
        assert_eq!((edges.radius, edges.blur_sigma), (1, 2.0));
    }

    #[test]
    fn test_builder_validation() {
        assert!(matches!(
            ImageConfig::builder().with_resize(ResizeOptions::default()),
            Err(ImageError::InvalidOptions(_))
        ));
        assert!(ImageConfig::builder()
            .with_resize(ResizeOptions {
                width: Some(10),
                fit: ResizeFit::Cover,
                ..Default::default()
            })
            .is_err());
        assert!(ImageConfig::builder()
            .with_resize(ResizeOptions {
                height: Some(10),
                fit: ResizeFit::Auto,
                ..Default::default()
            })
            .is_err());
        assert!(ImageConfig::builder()
            .with_format_options(FormatOptions {
                format: ImageFormat::Jpeg,
                quality: Some(0),
            })
            .is_err());
    }

    #[test]
    fn test_materialize_without_stages() -> Result<(), PipelineError> {
        let image = gradient(8, 4)?;
        let out = materialize(&ImageConfig::builder().build(), &image)?;
        assert_eq!(out.image, image);
        assert_eq!(out.metadata, ImageMetadata::from_size(8, 4));
        assert_eq!(out.analysis, Analysis::default());
        Ok(())
    }

    #[test]
    fn test_materialize_order() -> Result<(), PipelineError> {
        let image = gradient(40, 20)?;
        let config = ImageConfig::builder()
            .with_resize(ResizeOptions {
                width: Some(20),
                ..Default::default()
            })?
            .greyscale()
            .with_sharpen(SharpenOptions::default())
            .with_edges(EdgeOptions::with_method(EdgeMethod::Canny))
            .with_analysis(AnalysisOptions {
                hash: Some(HashOptions::default()),
                histograms: Some(HistogramOptions::default()),
                ..Default::default()
            })
            .build();

        let out = materialize(&config, &image)?;
        assert_eq!(out.image.size(), ImageSize { width: 20, height: 10 });
        assert_eq!(out.image.colorspace(), Colorspace::Greyscale);
        assert!(out.image.as_slice().iter().all(|&v| v == 0 || v == 255));
        assert_eq!(out.metadata.aspect_ratio, 2.0);

        assert_eq!(out.analysis.hash.as_ref().map(String::len), Some(64));
        assert!(out.analysis.sharpness.is_none());
        let histograms = out.analysis.histograms.unwrap();
        assert_eq!(histograms.lightness.iter().sum::<u64>(), 200);
        Ok(())
    }
}
