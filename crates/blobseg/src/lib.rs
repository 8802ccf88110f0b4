#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use blobseg_image as image;

#[doc(inline)]
pub use blobseg_imgproc as imgproc;

/// The configurable smoothing, edges, threshold and labeling chain.
pub mod pipeline;

pub use pipeline::{Pipeline, PipelineConfig, PipelineError, Segmentation};
