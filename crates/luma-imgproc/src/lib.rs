#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// color transformations module.
pub mod color;

/// image cropping module.
pub mod crop;

/// edge detection module.
pub mod edges;

/// image filtering module.
pub mod filter;

/// perceptual hash module.
pub mod hash;

/// compute image histogram module.
pub mod histogram;

/// module containing parallization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;

/// block segmentation module.
pub mod segment;

/// image sharpness analysis module.
pub mod sharpness;

/// tone mapping and color calibration module.
pub mod tone;
