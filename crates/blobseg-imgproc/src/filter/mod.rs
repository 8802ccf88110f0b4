//! Filter operations
//!
//! Gaussian smoothing and sobel gradients over single channel `f32` images.
//! All the filters use zero padding at the image borders.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;
