use blobseg_image::Image;

use crate::error::ImgprocError;
use crate::parallel::{self, ExecutionStrategy};
use crate::utils::{ensure_non_empty, ensure_same_size};

/// The two classes of the isodata partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdClass {
    /// Pixels with intensity `<=` the threshold.
    Lower,
    /// Pixels with intensity `>` the threshold.
    Upper,
}

impl std::fmt::Display for ThresholdClass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ThresholdClass::Lower => write!(f, "lower"),
            ThresholdClass::Upper => write!(f, "upper"),
        }
    }
}

/// Structure to define the isodata stopping criteria.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IsodataCriteria {
    /// Absolute tolerance between two consecutive thresholds.
    pub tolerance: f64,
    /// Maximum number of iterations before giving up.
    pub max_iterations: usize,
}

impl Default for IsodataCriteria {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            max_iterations: 1000,
        }
    }
}

/// Result of the isodata threshold search.
#[derive(Debug, Clone, PartialEq)]
pub struct IsodataResult {
    /// The converged threshold.
    pub threshold: f64,
    /// The number of iterations performed until convergence.
    pub num_iterations: usize,
    /// Every threshold visited, starting with the image mean.
    pub history: Vec<f64>,
}

/// Apply a binary threshold to an image.
///
/// Pixels `>= threshold` are set to `max_value`, the others to zero.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output mask.
/// * `threshold` - The threshold value.
/// * `max_value` - The value assigned to the pixels at or above the threshold.
/// * `strategy` - How to distribute the output rows.
///
/// # Examples
///
/// ```
/// use blobseg_image::{Image, ImageSize};
/// use blobseg_imgproc::parallel::ExecutionStrategy;
/// use blobseg_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 150.0, 255, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold_binary<T>(
    src: &Image<T, 1>,
    dst: &mut Image<u8, 1>,
    threshold: f64,
    max_value: u8,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError>
where
    T: Copy + Into<f64> + Send + Sync,
{
    ensure_same_size(src, dst)?;

    let cols = src.cols();
    let src_data = src.as_slice();

    parallel::for_each_row(dst.as_slice_mut(), cols, strategy, |r, dst_row| {
        let src_row = &src_data[r * cols..(r + 1) * cols];
        src_row
            .iter()
            .zip(dst_row.iter_mut())
            .for_each(|(&src_pixel, dst_pixel)| {
                *dst_pixel = if src_pixel.into() >= threshold {
                    max_value
                } else {
                    0
                };
            });
    })?;

    Ok(())
}

/// One isodata step: the midpoint of the two class means around `threshold`.
fn isodata_step(data: &[f32], threshold: f64) -> Result<f64, ImgprocError> {
    let mut lower_sum = 0.0f64;
    let mut lower_count = 0usize;
    let mut upper_sum = 0.0f64;
    let mut upper_count = 0usize;

    for &pixel in data {
        let pixel = pixel as f64;
        if pixel > threshold {
            upper_sum += pixel;
            upper_count += 1;
        } else {
            lower_sum += pixel;
            lower_count += 1;
        }
    }

    if lower_count == 0 {
        return Err(ImgprocError::DegenerateThreshold {
            threshold,
            class: ThresholdClass::Lower,
        });
    }
    if upper_count == 0 {
        return Err(ImgprocError::DegenerateThreshold {
            threshold,
            class: ThresholdClass::Upper,
        });
    }

    let lower_mean = lower_sum / lower_count as f64;
    let upper_mean = upper_sum / upper_count as f64;

    Ok((lower_mean + upper_mean) / 2.0)
}

/// Compute a global threshold with the iterative isodata method.
///
/// Starting from the mean intensity, the pixels are split into a lower
/// (`<= T`) and an upper (`> T`) class and the next threshold is the mean of
/// the two class means. The iteration stops once two consecutive thresholds
/// differ by at most `criteria.tolerance`; the first step always runs.
///
/// # Errors
///
/// * [`ImgprocError::EmptyImage`] if the image has no pixels.
/// * [`ImgprocError::DegenerateThreshold`] if a class becomes empty, e.g. for
///   a constant image.
/// * [`ImgprocError::NonConvergence`] if `criteria.max_iterations` steps do
///   not meet the tolerance.
pub fn isodata_threshold(
    src: &Image<f32, 1>,
    criteria: &IsodataCriteria,
) -> Result<IsodataResult, ImgprocError> {
    ensure_non_empty(src)?;

    let data = src.as_slice();
    let mean = data.iter().map(|&v| v as f64).sum::<f64>() / data.len() as f64;

    let mut history = vec![mean];
    let mut current = mean;
    let mut delta = f64::INFINITY;

    for i in 1..=criteria.max_iterations {
        let next = isodata_step(data, current)?;
        delta = (next - current).abs();
        history.push(next);
        log::debug!("isodata iteration {}: threshold {} delta {}", i, next, delta);

        if delta <= criteria.tolerance {
            log::debug!("isodata converged in {} iterations at {}", i, next);
            return Ok(IsodataResult {
                threshold: next,
                num_iterations: i,
                history,
            });
        }
        current = next;
    }

    Err(ImgprocError::NonConvergence {
        iterations: criteria.max_iterations,
        delta,
    })
}

/// Binarize an image with the isodata threshold.
///
/// Pixels `>=` the converged threshold become 255 and the others 0. Note that
/// the iteration itself puts pixels equal to the threshold in the lower class.
///
/// # Arguments
///
/// * `src` - The input intensity image.
/// * `dst` - The output mask with values in `{0, 255}`.
/// * `criteria` - The stopping criteria.
///
/// # Returns
///
/// The threshold search result.
///
/// # Examples
///
/// ```
/// use blobseg_image::{Image, ImageSize};
/// use blobseg_imgproc::threshold::{threshold_isodata, IsodataCriteria};
///
/// let image = Image::<f32, 1>::new(
///     ImageSize { width: 2, height: 2 },
///     vec![0.0, 255.0, 255.0, 0.0],
/// ).unwrap();
/// let mut mask = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// let result = threshold_isodata(&image, &mut mask, &IsodataCriteria::default()).unwrap();
/// assert_eq!(result.threshold, 127.5);
/// assert_eq!(mask.as_slice(), &[0, 255, 255, 0]);
/// ```
pub fn threshold_isodata(
    src: &Image<f32, 1>,
    dst: &mut Image<u8, 1>,
    criteria: &IsodataCriteria,
) -> Result<IsodataResult, ImgprocError> {
    ensure_same_size(src, dst)?;
    let result = isodata_threshold(src, criteria)?;
    threshold_binary(src, dst, result.threshold, 255, ExecutionStrategy::Serial)?;
    Ok(result)
}
