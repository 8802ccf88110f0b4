use crate::error::ImageError;

/// Image size in pixels
///
/// A struct to represent the size of an image in pixels.
///
/// # Examples
///
/// ```
/// use blobseg_image::ImageSize;
///
/// let image_size = ImageSize {
///   width: 10,
///   height: 20,
/// };
///
/// assert_eq!(image_size.width, 10);
/// assert_eq!(image_size.height, 20);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
}

impl ImageSize {
    /// Number of pixels covered by the size.
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "ImageSize {{ width: {}, height: {} }}",
            self.width, self.height
        )
    }
}

impl From<[usize; 2]> for ImageSize {
    fn from(size: [usize; 2]) -> Self {
        ImageSize {
            width: size[0],
            height: size[1],
        }
    }
}

/// Represents an image with pixel data.
///
/// The pixels are stored row-major with interleaved channels, i.e. the
/// value at `[row, col, ch]` lives at `(row * width + col) * CHANNELS + ch`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T, const CHANNELS: usize> {
    size: ImageSize,
    data: Vec<T>,
}

impl<T, const CHANNELS: usize> Image<T, CHANNELS> {
    /// Create a new image from pixel data.
    ///
    /// # Arguments
    ///
    /// * `size` - The size of the image in pixels.
    /// * `data` - The pixel data of the image.
    ///
    /// # Errors
    ///
    /// If the length of the pixel data does not match the image size, an error is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use blobseg_image::{Image, ImageSize};
    ///
    /// let image = Image::<u8, 1>::new(
    ///    ImageSize {
    ///       width: 10,
    ///       height: 20,
    ///    },
    ///    vec![0u8; 10 * 20],
    /// ).unwrap();
    ///
    /// assert_eq!(image.size().width, 10);
    /// assert_eq!(image.size().height, 20);
    /// assert_eq!(image.num_channels(), 1);
    /// ```
    pub fn new(size: ImageSize, data: Vec<T>) -> Result<Self, ImageError> {
        // check if the data length matches the image size
        if data.len() != size.area() * CHANNELS {
            return Err(ImageError::InvalidChannelShape(
                data.len(),
                size.area() * CHANNELS,
            ));
        }

        Ok(Self { size, data })
    }

    /// Create a new image with the given size filled with `val`.
    ///
    /// # Examples
    ///
    /// ```
    /// use blobseg_image::{Image, ImageSize};
    ///
    /// let image = Image::<f32, 1>::from_size_val(
    ///   ImageSize {
    ///     width: 10,
    ///     height: 20,
    ///   }, 0.0).unwrap();
    ///
    /// assert!(image.as_slice().iter().all(|&v| v == 0.0));
    /// ```
    pub fn from_size_val(size: ImageSize, val: T) -> Result<Self, ImageError>
    where
        T: Clone,
    {
        let data = vec![val; size.area() * CHANNELS];
        Image::new(size, data)
    }

    /// Get the size of the image in pixels.
    pub fn size(&self) -> ImageSize {
        self.size
    }

    /// Get the number of columns of the image.
    pub fn cols(&self) -> usize {
        self.width()
    }

    /// Get the number of rows of the image.
    pub fn rows(&self) -> usize {
        self.height()
    }

    /// Get the width of the image in pixels.
    pub fn width(&self) -> usize {
        self.size.width
    }

    /// Get the height of the image in pixels.
    pub fn height(&self) -> usize {
        self.size.height
    }

    /// Get the number of channels in the image.
    pub fn num_channels(&self) -> usize {
        CHANNELS
    }

    /// Whether the image has no pixels, i.e. zero rows or zero columns.
    pub fn is_empty(&self) -> bool {
        self.size.area() == 0
    }

    /// The raw row-major pixel buffer.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// The raw row-major pixel buffer, mutable.
    pub fn as_slice_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its pixel buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    #[inline]
    fn offset(&self, index: [usize; 3]) -> Option<usize> {
        let [row, col, ch] = index;
        if row >= self.height() || col >= self.width() || ch >= CHANNELS {
            return None;
        }
        Some((row * self.width() + col) * CHANNELS + ch)
    }

    /// Get a reference to the value at `[row, col, channel]`.
    ///
    /// Returns `None` when the index is out of bounds.
    pub fn get(&self, index: [usize; 3]) -> Option<&T> {
        self.offset(index).map(|i| &self.data[i])
    }

    /// Get a mutable reference to the value at `[row, col, channel]`.
    pub fn get_mut(&mut self, index: [usize; 3]) -> Option<&mut T> {
        self.offset(index).map(move |i| &mut self.data[i])
    }

    /// Get the pixel value at column `x`, row `y` and channel `ch`.
    ///
    /// # Errors
    ///
    /// Returns an error when the coordinates or the channel are out of bounds.
    pub fn get_pixel(&self, x: usize, y: usize, ch: usize) -> Result<&T, ImageError> {
        if x >= self.width() || y >= self.height() {
            return Err(ImageError::PixelIndexOutOfBounds(
                x,
                y,
                self.width(),
                self.height(),
            ));
        }

        if ch >= CHANNELS {
            return Err(ImageError::ChannelIndexOutOfBounds(ch, CHANNELS));
        }

        Ok(&self.data[(y * self.width() + x) * CHANNELS + ch])
    }

    /// Cast the pixel data of the image to a different type.
    ///
    /// # Errors
    ///
    /// Fails when a value is not representable in the target type.
    pub fn cast<U>(&self) -> Result<Image<U, CHANNELS>, ImageError>
    where
        U: num_traits::NumCast,
        T: num_traits::NumCast + Copy,
    {
        let casted_data = self
            .data
            .iter()
            .map(|&x| {
                <U as num_traits::NumCast>::from(x)
                    .ok_or_else(|| ImageError::CastError(type_name::<U>()))
            })
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size, casted_data)
    }

    /// Cast the pixel data to a different type and scale it.
    ///
    /// # Examples
    ///
    /// ```
    /// use blobseg_image::{Image, ImageSize};
    ///
    /// let image_u8 = Image::<u8, 1>::new(
    ///   ImageSize { width: 2, height: 1 },
    ///   vec![0u8, 255],
    /// ).unwrap();
    ///
    /// let image_f32 = image_u8.cast_and_scale::<f32>(1. / 255.0).unwrap();
    ///
    /// assert_eq!(image_f32.get([0, 1, 0]), Some(&1.0f32));
    /// ```
    pub fn cast_and_scale<U>(&self, scale: U) -> Result<Image<U, CHANNELS>, ImageError>
    where
        U: num_traits::NumCast + std::ops::Mul<Output = U> + Copy,
        T: num_traits::NumCast + Copy,
    {
        let casted_data = self
            .data
            .iter()
            .map(|&x| {
                let xu = <U as num_traits::NumCast>::from(x)
                    .ok_or_else(|| ImageError::CastError(type_name::<U>()))?;
                Ok(xu * scale)
            })
            .collect::<Result<Vec<U>, ImageError>>()?;

        Image::new(self.size, casted_data)
    }
}

fn type_name<U>() -> String {
    std::any::type_name::<U>().to_string()
}

#[cfg(test)]
mod tests {
    use crate::image::{Image, ImageError, ImageSize};

    #[test]
    fn image_size() {
        let image_size = ImageSize {
            width: 10,
            height: 20,
        };
        assert_eq!(image_size.width, 10);
        assert_eq!(image_size.height, 20);
        assert_eq!(image_size.area(), 200);
    }

    #[test]
    fn image_smoke() -> Result<(), ImageError> {
        let image = Image::<u8, 3>::new(
            ImageSize {
                width: 10,
                height: 20,
            },
            vec![0u8; 10 * 20 * 3],
        )?;
        assert_eq!(image.size().width, 10);
        assert_eq!(image.size().height, 20);
        assert_eq!(image.num_channels(), 3);
        assert!(!image.is_empty());

        Ok(())
    }

    #[test]
    fn image_wrong_length() {
        let res = Image::<f32, 1>::new(
            ImageSize {
                width: 3,
                height: 2,
            },
            vec![0.0; 5],
        );
        assert_eq!(res, Err(ImageError::InvalidChannelShape(5, 6)));
    }

    #[test]
    fn image_empty() -> Result<(), ImageError> {
        let image = Image::<f32, 1>::new(
            ImageSize {
                width: 0,
                height: 4,
            },
            vec![],
        )?;
        assert!(image.is_empty());

        Ok(())
    }

    #[test]
    fn image_get_row_major() -> Result<(), ImageError> {
        let mut image = Image::<u32, 1>::new(
            ImageSize {
                width: 3,
                height: 2,
            },
            vec![0, 1, 2, 3, 4, 5],
        )?;
        assert_eq!(image.get([1, 0, 0]), Some(&3));
        assert_eq!(image.get([0, 2, 0]), Some(&2));
        assert_eq!(image.get([2, 0, 0]), None);
        assert_eq!(image.get([0, 3, 0]), None);

        if let Some(v) = image.get_mut([1, 2, 0]) {
            *v = 42;
        }
        assert_eq!(image.get_pixel(2, 1, 0)?, &42);
        assert_eq!(
            image.get_pixel(3, 1, 0),
            Err(ImageError::PixelIndexOutOfBounds(3, 1, 3, 2))
        );
        assert_eq!(
            image.get_pixel(0, 0, 1),
            Err(ImageError::ChannelIndexOutOfBounds(1, 1))
        );

        Ok(())
    }

    #[test]
    fn image_cast() -> Result<(), ImageError> {
        let data = vec![0, 1, 2, 3, 4, 5];
        let image_u8 = Image::<u8, 3>::new(
            ImageSize {
                height: 2,
                width: 1,
            },
            data,
        )?;
        assert_eq!(image_u8.get([1, 0, 2]), Some(&5u8));

        let image_i32: Image<i32, 3> = image_u8.cast()?;
        assert_eq!(image_i32.get([1, 0, 2]), Some(&5i32));

        let image_f32 = Image::<f32, 1>::new(
            ImageSize {
                height: 1,
                width: 1,
            },
            vec![-1.0],
        )?;
        assert!(matches!(
            image_f32.cast::<u8>(),
            Err(ImageError::CastError(_))
        ));

        Ok(())
    }

    #[test]
    fn image_cast_and_scale() -> Result<(), ImageError> {
        let image = Image::<u8, 1>::new(
            ImageSize {
                height: 2,
                width: 1,
            },
            vec![0u8, 255],
        )?;

        let image_f64 = image.cast_and_scale::<f64>(1. / 255.0)?;

        assert_eq!(image_f64.as_slice(), &[0.0, 1.0]);

        Ok(())
    }
}
