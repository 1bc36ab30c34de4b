#![deny(missing_docs)]
//! Pixel buffer types and colorspace tags for the luma image engine.

/// Canonical in-memory raster representation.
pub mod image;

/// Colorspace tags and their channel layouts.
pub mod colorspace;

/// Transient per-pixel views.
pub mod pixel;

/// Error types for the image module.
pub mod error;

pub use crate::colorspace::Colorspace;
pub use crate::error::ImageError;
pub use crate::image::{saturate_u8, ImageSize, PixelBuffer};
pub use crate::pixel::Pixel;
