#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the image processing operations.
pub mod error;

/// image filtering module.
pub mod filter;

/// connected component labeling module.
pub mod label;

/// module containing parallization utilities.
pub mod parallel;

/// operations to threshold images.
pub mod threshold;

mod utils;

pub use error::ImgprocError;
