use blobseg_image::{Image, ImageError};

use crate::error::ImgprocError;

/// Fails when the image has no rows or no columns.
pub(crate) fn ensure_non_empty<T, const C: usize>(
    image: &Image<T, C>,
) -> Result<(), ImgprocError> {
    if image.is_empty() {
        return Err(ImgprocError::EmptyImage(image.size()));
    }
    Ok(())
}

/// Fails when `src` and `dst` differ in size.
pub(crate) fn ensure_same_size<T, U, const C1: usize, const C2: usize>(
    src: &Image<T, C1>,
    dst: &Image<U, C2>,
) -> Result<(), ImgprocError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        )
        .into());
    }
    Ok(())
}
