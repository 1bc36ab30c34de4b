use luma::image::{Colorspace, ImageSize, PixelBuffer};
use luma::imgproc::{
    hash::HashOptions,
    resize::{ResizeFit, ResizeOptions},
    sharpness::SharpnessOptions,
    tone::ToneOptions,
};
use luma::{
    materialize_bytes, AnalysisOptions, Decoders, FormatOptions, ImageConfig, ImageDecoder,
    ImageEncoder, ImageFormat, PipelineError, RawMetadata, SourceFormat,
};

const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

fn setup_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Decodes `header | width | height | rgb samples`, one byte per dimension.
struct RawRgbDecoder {
    orientation: Option<u16>,
}

impl ImageDecoder for RawRgbDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<PixelBuffer, PipelineError> {
        let body = bytes
            .get(JPEG_HEADER.len()..)
            .ok_or_else(|| PipelineError::Codec("truncated header".to_string()))?;
        let (dims, data) = body.split_at(2);
        let size = ImageSize {
            width: dims[0] as usize,
            height: dims[1] as usize,
        };
        Ok(PixelBuffer::new(size, Colorspace::Rgb, data.to_vec())?)
    }

    fn metadata(&self, bytes: &[u8]) -> Result<RawMetadata, PipelineError> {
        Ok(RawMetadata {
            orientation: self.orientation,
            image_width: Some(bytes[4] as usize),
            image_height: Some(bytes[5] as usize),
            create_date: Some("2014:04:01 09:23:43".to_string()),
            ..Default::default()
        })
    }
}

/// Writes the quality, the channel count and the raw samples.
struct DumpEncoder;

impl ImageEncoder for DumpEncoder {
    fn encode(&self, image: &PixelBuffer, options: &FormatOptions) -> Result<Vec<u8>, PipelineError> {
        let mut out = vec![options.quality.unwrap_or(0), image.num_channels() as u8];
        out.extend_from_slice(image.as_slice());
        Ok(out)
    }
}

fn encoded_source(width: u8, height: u8) -> Vec<u8> {
    let mut bytes = JPEG_HEADER.to_vec();
    bytes.extend_from_slice(&[width, height]);
    for y in 0..height {
        for x in 0..width {
            bytes.extend_from_slice(&[x.wrapping_mul(8), y.wrapping_mul(8), 100]);
        }
    }
    bytes
}

#[test]
fn test_materialize_bytes() -> Result<(), PipelineError> {
    setup_test_logging();

    let decoders = Decoders::new().with_decoder(
        SourceFormat::Jpeg,
        RawRgbDecoder {
            orientation: Some(6),
        },
    );
    let config = ImageConfig::builder()
        .with_resize(ResizeOptions {
            width: Some(16),
            height: Some(16),
            fit: ResizeFit::Crop,
            ..Default::default()
        })?
        .with_tone(ToneOptions {
            contrast: Some(0.2),
            ..Default::default()
        })
        .greyscale()
        .with_analysis(AnalysisOptions {
            hash: Some(HashOptions::default()),
            sharpness: Some(SharpnessOptions::default()),
            histograms: None,
        })
        .build();

    let (encoded, materialized) =
        materialize_bytes(&config, &encoded_source(32, 24), &decoders, &DumpEncoder)?;

    assert_eq!(materialized.image.size(), ImageSize { width: 16, height: 16 });
    assert_eq!(materialized.image.colorspace(), Colorspace::Greyscale);
    assert_eq!(materialized.metadata.width, 16);
    assert_eq!(materialized.metadata.aspect_ratio, 1.0);
    assert_eq!(materialized.metadata.orientation.map(|o| o.get()), Some(6));
    assert_eq!(
        materialized.metadata.created_at.map(|d| d.to_rfc3339()),
        Some("2014-04-01T09:23:43+00:00".to_string())
    );
    assert_eq!(materialized.metadata.modified_at, None);

    assert_eq!(encoded[0], 90);
    assert_eq!(encoded[1], 1);
    assert_eq!(&encoded[2..], materialized.image.as_slice());

    assert!(materialized.analysis.hash.is_some());
    assert!(materialized.analysis.sharpness.is_some());
    assert!(materialized.analysis.histograms.is_none());
    Ok(())
}

#[test]
fn test_materialize_bytes_png_output() -> Result<(), PipelineError> {
    setup_test_logging();

    let decoders = Decoders::new().with_decoder(SourceFormat::Jpeg, RawRgbDecoder { orientation: None });
    let config = ImageConfig::builder().with_format(ImageFormat::Png).build();

    let source = encoded_source(4, 2);
    let (encoded, materialized) = materialize_bytes(&config, &source, &decoders, &DumpEncoder)?;
    assert_eq!(encoded[0], 0);
    assert_eq!(encoded[1], 3);
    assert_eq!(&encoded[2..], &source[6..]);
    assert_eq!(materialized.metadata.orientation, None);
    Ok(())
}

#[test]
fn test_materialize_bytes_errors() {
    setup_test_logging();

    let config = ImageConfig::builder().build();
    let empty = Decoders::new();

    assert!(matches!(
        materialize_bytes(&config, &encoded_source(2, 2), &empty, &DumpEncoder),
        Err(PipelineError::MissingDecoder(SourceFormat::Jpeg))
    ));
    assert!(matches!(
        materialize_bytes(&config, b"GIF89a", &empty, &DumpEncoder),
        Err(PipelineError::UnsupportedFormat)
    ));

    let decoders = Decoders::new().with_decoder(SourceFormat::Jpeg, RawRgbDecoder { orientation: None });
    let mut truncated = encoded_source(4, 4);
    truncated.pop();
    assert!(matches!(
        materialize_bytes(&config, &truncated, &decoders, &DumpEncoder),
        Err(PipelineError::Image(_))
    ));
}

#[cfg(feature = "serde")]
#[test]
fn test_config_serde() -> Result<(), Box<dyn std::error::Error>> {
    let config = ImageConfig::builder()
        .with_resize(ResizeOptions {
            width: Some(100),
            ..Default::default()
        })?
        .greyscale()
        .build();

    let json = serde_json::to_string(&config)?;
    let back: ImageConfig = serde_json::from_str(&json)?;
    assert_eq!(back, config);
    Ok(())
}
