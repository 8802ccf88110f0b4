use crate::error::ImgprocError;

/// A 3x3 kernel stored as `[row][col]`.
pub type Kernel3 = [[f32; 3]; 3];

/// Horizontal sobel kernel.
pub const SOBEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];

/// Vertical sobel kernel.
pub const SOBEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Check that a kernel size is odd and positive.
pub fn validate_kernel_size(kernel_size: usize) -> Result<(), ImgprocError> {
    if kernel_size == 0 || kernel_size % 2 == 0 {
        return Err(ImgprocError::InvalidKernelSize(kernel_size));
    }
    Ok(())
}

fn validate_gaussian(kernel_size: usize, sigma: f32) -> Result<(), ImgprocError> {
    validate_kernel_size(kernel_size)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ImgprocError::InvalidSigma(sigma));
    }
    Ok(())
}

/// Create a gaussian blur kernel.
///
/// # Arguments
///
/// * `kernel_size` - The size of the kernel, odd.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// A vector of the kernel, normalized to sum 1.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f32) -> Result<Vec<f32>, ImgprocError> {
    validate_gaussian(kernel_size, sigma)?;

    let mean = (kernel_size - 1) as f32 / 2.0;
    let sigma_sq = sigma * sigma;

    // compute the kernel
    let mut kernel = (0..kernel_size)
        .map(|i| {
            let x = i as f32 - mean;
            (-(x * x) / (2.0 * sigma_sq)).exp()
        })
        .collect::<Vec<_>>();

    // normalize the kernel
    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);

    Ok(kernel)
}

/// Create a square gaussian kernel.
///
/// The weight at offset `(x, y)` from the center is
/// `1 / (2πσ²) · exp(-(x² + y²) / (2σ²))`. The kernel is renormalized to
/// sum 1 afterwards to account for the truncated tails.
///
/// # Arguments
///
/// * `kernel_size` - The side of the kernel, odd.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// # Returns
///
/// The row-major `kernel_size * kernel_size` weights.
///
/// # Examples
///
/// ```
/// use blobseg_imgproc::filter::kernels::gaussian_kernel_2d;
///
/// let kernel = gaussian_kernel_2d(5, 1.0).unwrap();
/// assert_eq!(kernel.len(), 25);
/// assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
/// ```
pub fn gaussian_kernel_2d(kernel_size: usize, sigma: f32) -> Result<Vec<f32>, ImgprocError> {
    validate_gaussian(kernel_size, sigma)?;

    let half = (kernel_size / 2) as f32;
    let sigma_sq = sigma * sigma;
    let scale = 1.0 / (2.0 * std::f32::consts::PI * sigma_sq);

    let mut kernel = Vec::with_capacity(kernel_size * kernel_size);
    for row in 0..kernel_size {
        let y = row as f32 - half;
        for col in 0..kernel_size {
            let x = col as f32 - half;
            kernel.push(scale * (-(x * x + y * y) / (2.0 * sigma_sq)).exp());
        }
    }

    let norm = kernel.iter().sum::<f32>();
    kernel.iter_mut().for_each(|k| *k /= norm);

    Ok(kernel)
}

/// The horizontal and vertical 3x3 sobel kernels.
pub fn sobel_kernel3() -> (Kernel3, Kernel3) {
    (SOBEL_X, SOBEL_Y)
}
