use std::time::Instant;

use serde::{Deserialize, Serialize};

use blobseg_image::{Image, ImageError};
use blobseg_imgproc::filter::{self, kernels};
use blobseg_imgproc::label::{self, ComponentStats, Connectivity};
use blobseg_imgproc::parallel::ExecutionStrategy;
use blobseg_imgproc::threshold::{self, IsodataCriteria, IsodataResult};
use blobseg_imgproc::ImgprocError;

/// An error type for the pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// A processing stage failed.
    #[error(transparent)]
    Imgproc(#[from] ImgprocError),

    /// The configuration could not be parsed.
    #[error("Invalid pipeline configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<ImageError> for PipelineError {
    fn from(err: ImageError) -> Self {
        PipelineError::Imgproc(err.into())
    }
}

/// Parameters of the segmentation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Side of the gaussian kernel, odd.
    pub kernel_size: usize,
    /// Sigma of the gaussian kernel.
    pub sigma: f32,
    /// Stopping criteria of the isodata threshold.
    pub isodata: IsodataCriteria,
    /// Adjacency of the labeled components.
    pub connectivity: Connectivity,
    /// Row distribution of the filtering stages.
    pub strategy: ExecutionStrategy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            kernel_size: 5,
            sigma: 1.0,
            isodata: IsodataCriteria::default(),
            connectivity: Connectivity::Eight,
            strategy: ExecutionStrategy::Serial,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from JSON. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Serialize the configuration to pretty printed JSON.
    pub fn to_json(&self) -> Result<String, PipelineError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the smoothing parameters before any image is processed.
    pub fn validate(&self) -> Result<(), ImgprocError> {
        kernels::gaussian_kernel_2d(self.kernel_size, self.sigma)?;
        Ok(())
    }
}

/// Every intermediate image of a pipeline run.
#[derive(Debug, Clone)]
pub struct Segmentation {
    /// Output of the gaussian smoothing.
    pub smoothed: Image<f32, 1>,
    /// Sobel gradient magnitude of `smoothed`.
    pub gradient: Image<f32, 1>,
    /// Isodata binarization of `gradient`, values in `{0, 255}`.
    pub binary: Image<u8, 1>,
    /// Component labels of `binary`, 0 is background.
    pub labels: Image<u32, 1>,
    /// The threshold search result.
    pub threshold: IsodataResult,
    /// The number of labeled components.
    pub num_components: u32,
}

impl Segmentation {
    /// Area and bounding box of every component, ordered by label.
    pub fn components(&self) -> Vec<ComponentStats> {
        label::component_stats(&self.labels)
    }
}

/// Smooth, take the gradient magnitude, binarize and label an image.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline, validating the configuration.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all the stages on `image`.
    ///
    /// Each stage writes a freshly allocated image; the first failing stage
    /// aborts the run.
    pub fn run(&self, image: &Image<f32, 1>) -> Result<Segmentation, PipelineError> {
        let now = Instant::now();
        let mut smoothed = Image::from_size_val(image.size(), 0.0f32)?;
        filter::gaussian_blur(
            image,
            &mut smoothed,
            self.config.kernel_size,
            self.config.sigma,
            self.config.strategy,
        )?;
        log::debug!("gaussian blur: {:?}", now.elapsed());

        self.segment_smoothed(smoothed)
    }

    /// Run the pipeline without the smoothing stage.
    ///
    /// `Segmentation::smoothed` is then a copy of `image`.
    pub fn run_without_smoothing(
        &self,
        image: &Image<f32, 1>,
    ) -> Result<Segmentation, PipelineError> {
        self.segment_smoothed(image.clone())
    }

    fn segment_smoothed(&self, smoothed: Image<f32, 1>) -> Result<Segmentation, PipelineError> {
        let now = Instant::now();
        let mut gradient = Image::from_size_val(smoothed.size(), 0.0f32)?;
        filter::sobel_magnitude(&smoothed, &mut gradient, self.config.strategy)?;
        log::debug!("sobel magnitude: {:?}", now.elapsed());

        let now = Instant::now();
        let mut binary = Image::from_size_val(gradient.size(), 0u8)?;
        let threshold = threshold::threshold_isodata(&gradient, &mut binary, &self.config.isodata)?;
        log::debug!(
            "isodata threshold {} after {} iterations: {:?}",
            threshold.threshold,
            threshold.num_iterations,
            now.elapsed()
        );

        let now = Instant::now();
        let mut labels = Image::from_size_val(binary.size(), 0u32)?;
        let num_components =
            label::label_connected_components(&binary, &mut labels, self.config.connectivity)?;
        log::debug!(
            "labeled {} components: {:?}",
            num_components,
            now.elapsed()
        );

        Ok(Segmentation {
            smoothed,
            gradient,
            binary,
            labels,
            threshold,
            num_components,
        })
    }
}

/// Segment an image with the default configuration.
pub fn segment(image: &Image<f32, 1>) -> Result<Segmentation, PipelineError> {
    Pipeline::new(PipelineConfig::default())?.run(image)
}
