use blobseg_image::Image;

use super::kernels::{self, Kernel3};
use crate::error::ImgprocError;
use crate::parallel::{self, ExecutionStrategy};
use crate::utils::{ensure_non_empty, ensure_same_size};

/// Correlate an image with a square kernel using zero padding.
///
/// The image is conceptually padded with `kernel_size / 2` zero pixels on every
/// side, so the output keeps the input size and border pixels are biased
/// towards zero.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dst` - The destination image with shape (H, W).
/// * `kernel` - The row-major kernel weights.
/// * `kernel_size` - The side of the kernel, odd.
/// * `strategy` - How to distribute the output rows.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn filter2d(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    kernel: &[f32],
    kernel_size: usize,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    kernels::validate_kernel_size(kernel_size)?;
    if kernel.len() != kernel_size * kernel_size {
        return Err(ImgprocError::InvalidKernelLength(
            kernel.len(),
            kernel_size * kernel_size,
        ));
    }
    ensure_non_empty(src)?;
    ensure_same_size(src, dst)?;

    let (rows, cols) = (src.rows(), src.cols());
    let half = kernel_size / 2;
    let src_data = src.as_slice();

    parallel::for_each_row(dst.as_slice_mut(), cols, strategy, |r, dst_row| {
        for (c, dst_pixel) in dst_row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (ky, kernel_row) in kernel.chunks_exact(kernel_size).enumerate() {
                // rows outside the image read the zero padding
                let y = r + ky;
                if y < half || y - half >= rows {
                    continue;
                }
                let src_row = &src_data[(y - half) * cols..(y - half + 1) * cols];
                for (kx, &weight) in kernel_row.iter().enumerate() {
                    let x = c + kx;
                    if x < half || x - half >= cols {
                        continue;
                    }
                    sum += src_row[x - half] * weight;
                }
            }
            *dst_pixel = sum;
        }
    })?;

    Ok(())
}

/// Blur an image using a gaussian blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dst` - The destination image with shape (H, W).
/// * `kernel_size` - The side of the square kernel, odd.
/// * `sigma` - The sigma of the gaussian kernel.
/// * `strategy` - How to distribute the output rows.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Examples
///
/// ```
/// use blobseg_image::{Image, ImageSize};
/// use blobseg_imgproc::filter::gaussian_blur;
/// use blobseg_imgproc::parallel::ExecutionStrategy;
///
/// let size = ImageSize { width: 4, height: 3 };
/// let src = Image::<f32, 1>::from_size_val(size, 1.0).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val(size, 0.0).unwrap();
///
/// gaussian_blur(&src, &mut dst, 3, 1.0, ExecutionStrategy::Serial).unwrap();
/// assert_eq!(dst.size(), size);
/// ```
pub fn gaussian_blur(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    kernel_size: usize,
    sigma: f32,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    let kernel = kernels::gaussian_kernel_2d(kernel_size, sigma)?;
    filter2d(src, dst, &kernel, kernel_size, strategy)
}

/// Correlate the 3x3 neighbourhood of `(r, c)` with both kernels, zero padded.
#[inline]
fn kernel3_at(
    src_data: &[f32],
    rows: usize,
    cols: usize,
    r: usize,
    c: usize,
    kernel_x: &Kernel3,
    kernel_y: &Kernel3,
) -> (f32, f32) {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    for dy in 0..3 {
        let y = r + dy;
        if y == 0 || y > rows {
            continue;
        }
        let row = &src_data[(y - 1) * cols..y * cols];
        for dx in 0..3 {
            let x = c + dx;
            if x == 0 || x > cols {
                continue;
            }
            let val = row[x - 1];
            sum_x += val * kernel_x[dy][dx];
            sum_y += val * kernel_y[dy][dx];
        }
    }
    (sum_x, sum_y)
}

/// Compute the gradient magnitude of an image with the sobel operator.
///
/// Each output pixel is `sqrt(gx² + gy²)` where `gx` and `gy` are the
/// responses of the 3x3 sobel kernels over the zero padded neighbourhood.
/// No thresholding or non maximum suppression is applied.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dst` - The destination image with shape (H, W), values >= 0.
/// * `strategy` - How to distribute the output rows.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn sobel_magnitude(
    src: &Image<f32, 1>,
    dst: &mut Image<f32, 1>,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    ensure_non_empty(src)?;
    ensure_same_size(src, dst)?;

    let (sobel_x, sobel_y) = kernels::sobel_kernel3();
    let (rows, cols) = (src.rows(), src.cols());
    let src_data = src.as_slice();

    parallel::for_each_row(dst.as_slice_mut(), cols, strategy, |r, dst_row| {
        for (c, dst_pixel) in dst_row.iter_mut().enumerate() {
            let (gx, gy) = kernel3_at(src_data, rows, cols, r, c, &sobel_x, &sobel_y);
            *dst_pixel = (gx * gx + gy * gy).sqrt();
        }
    })?;

    Ok(())
}

/// Compute the first order image derivative in both x and y using a Sobel operator.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W).
/// * `dx` - The horizontal derivative with shape (H, W).
/// * `dy` - The vertical derivative with shape (H, W).
/// * `strategy` - How to distribute the output rows.
pub fn spatial_gradient(
    src: &Image<f32, 1>,
    dx: &mut Image<f32, 1>,
    dy: &mut Image<f32, 1>,
    strategy: ExecutionStrategy,
) -> Result<(), ImgprocError> {
    ensure_non_empty(src)?;
    ensure_same_size(src, dx)?;
    ensure_same_size(src, dy)?;

    let (sobel_x, sobel_y) = kernels::sobel_kernel3();
    let (rows, cols) = (src.rows(), src.cols());
    let src_data = src.as_slice();

    parallel::for_each_row(dx.as_slice_mut(), cols, strategy, |r, dx_row| {
        for (c, dx_pixel) in dx_row.iter_mut().enumerate() {
            *dx_pixel = kernel3_at(src_data, rows, cols, r, c, &sobel_x, &sobel_y).0;
        }
    })?;

    parallel::for_each_row(dy.as_slice_mut(), cols, strategy, |r, dy_row| {
        for (c, dy_pixel) in dy_row.iter_mut().enumerate() {
            *dy_pixel = kernel3_at(src_data, rows, cols, r, c, &sobel_x, &sobel_y).1;
        }
    })?;

    Ok(())
}
