use luma_image::ImageError;

use crate::codec::SourceFormat;

/// An error type for the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Error raised by a transform or an analysis.
    #[error("Failed to process the image. {0}")]
    Image(#[from] ImageError),

    /// The source bytes do not start with a known signature.
    #[error("Unrecognizable file type")]
    UnsupportedFormat,

    /// No decoder is registered for the sniffed format.
    #[error("No decoder registered for {0}")]
    MissingDecoder(SourceFormat),

    /// Error reported by a decoder or an encoder.
    #[error("Codec error. {0}")]
    Codec(String),
}
