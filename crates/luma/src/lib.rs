#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use luma_image as image;

#[doc(inline)]
pub use luma_imgproc as imgproc;

/// codec interface boundary module.
pub mod codec;

/// error types of the pipeline.
pub mod error;

/// image metadata normalization module.
pub mod metadata;

/// declarative pipeline module.
pub mod pipeline;

pub use codec::{Decoders, FormatOptions, ImageDecoder, ImageEncoder, ImageFormat, SourceFormat};
pub use error::PipelineError;
pub use metadata::{normalize_metadata, parse_date, ImageMetadata, RawMetadata};
pub use pipeline::{
    materialize, materialize_bytes, Analysis, AnalysisOptions, EdgeMethod, EdgeOptions,
    ImageConfig, ImageConfigBuilder, Materialized,
};
