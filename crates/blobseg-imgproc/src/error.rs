use blobseg_image::{ImageError, ImageSize};

use crate::parallel::ParallelError;
use crate::threshold::ThresholdClass;

/// An error type for the image processing operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImgprocError {
    /// Error coming from the image container.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// The input image has zero width or height.
    #[error("Empty image: {0}")]
    EmptyImage(ImageSize),

    /// The kernel size is zero or even.
    #[error("Invalid kernel size {0}, must be odd and positive")]
    InvalidKernelSize(usize),

    /// The kernel weights do not match the declared kernel size.
    #[error("Kernel has {0} weights, expected {1}")]
    InvalidKernelLength(usize, usize),

    /// The gaussian sigma is not a positive finite number.
    #[error("Invalid sigma {0}, must be positive and finite")]
    InvalidSigma(f32),

    /// One of the isodata classes is empty, so its mean is undefined.
    #[error("Degenerate threshold {threshold}: the {class} class is empty")]
    DegenerateThreshold {
        /// Threshold that produced the empty partition.
        threshold: f64,
        /// The class that has no pixels.
        class: ThresholdClass,
    },

    /// The isodata iteration did not meet the tolerance.
    #[error("Threshold did not converge after {iterations} iterations (last delta {delta})")]
    NonConvergence {
        /// Number of iterations performed.
        iterations: usize,
        /// Absolute difference between the last two thresholds.
        delta: f64,
    },

    /// The labeler input contains a value other than 0 or 255.
    #[error("Pixel ({x}, {y}) has value {value}, expected 0 or 255")]
    OutOfRangeLabelInput {
        /// Column of the offending pixel.
        x: usize,
        /// Row of the offending pixel.
        y: usize,
        /// The offending value.
        value: u8,
    },

    /// Error coming from the parallel execution.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
