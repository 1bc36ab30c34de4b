//! Filter operations
//!
//! This module provides convolution based filters for image processing.

/// Filter kernels
pub mod kernels;
pub use kernels::Kernel;

/// Generic convolution
mod convolution;
pub use convolution::*;

/// Filter operations
mod ops;
pub use ops::*;
