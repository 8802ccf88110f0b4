use std::collections::VecDeque;

use blobseg_image::Image;

use crate::error::ImgprocError;
use crate::utils::{ensure_non_empty, ensure_same_size};

/// Value of the foreground pixels in a binary mask.
pub const FOREGROUND: u8 = 255;

/// Value of the background pixels in a binary mask.
pub const BACKGROUND: u8 = 0;

/// Pixel adjacency used to grow the components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    /// Only the pixels sharing an edge are adjacent.
    Four,
    /// Pixels sharing an edge or a corner are adjacent.
    #[default]
    Eight,
}

const OFFSETS_FOUR: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

const OFFSETS_EIGHT: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

impl Connectivity {
    /// The `(row, col)` offsets of the neighbours of a pixel.
    pub fn offsets(&self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &OFFSETS_FOUR,
            Connectivity::Eight => &OFFSETS_EIGHT,
        }
    }
}

/// Label the connected foreground regions of a binary mask.
///
/// The mask is scanned in row-major order; every foreground pixel that is not
/// labeled yet seeds a new label (1, 2, ...) which is then flood filled in
/// breadth-first order. Background pixels keep the label 0.
///
/// # Arguments
///
/// * `src` - The binary mask, every value must be 0 or 255.
/// * `dst` - The output labels with the same size as `src`. Previous contents
///   are overwritten.
/// * `connectivity` - The pixel adjacency.
///
/// # Returns
///
/// The number of components, which is also the largest label.
///
/// # Errors
///
/// [`ImgprocError::OutOfRangeLabelInput`] if `src` contains a value other
/// than 0 or 255. `dst` is left untouched in that case.
///
/// # Examples
///
/// ```
/// use blobseg_image::{Image, ImageSize};
/// use blobseg_imgproc::label::{label_connected_components, Connectivity};
///
/// #[rustfmt::skip]
/// let mask = Image::<u8, 1>::new(
///     ImageSize { width: 4, height: 2 },
///     vec![
///         255, 0, 0, 255,
///         0, 255, 0, 255,
///     ],
/// ).unwrap();
/// let mut labels = Image::<u32, 1>::from_size_val(mask.size(), 0).unwrap();
///
/// let num = label_connected_components(&mask, &mut labels, Connectivity::Eight).unwrap();
/// assert_eq!(num, 2);
/// assert_eq!(labels.as_slice(), &[1, 0, 0, 2, 0, 1, 0, 2]);
/// ```
pub fn label_connected_components(
    src: &Image<u8, 1>,
    dst: &mut Image<u32, 1>,
    connectivity: Connectivity,
) -> Result<u32, ImgprocError> {
    ensure_non_empty(src)?;
    ensure_same_size(src, dst)?;

    let (rows, cols) = (src.rows(), src.cols());
    let pixels = src.as_slice();

    if let Some((idx, &value)) = pixels
        .iter()
        .enumerate()
        .find(|(_, &v)| v != BACKGROUND && v != FOREGROUND)
    {
        return Err(ImgprocError::OutOfRangeLabelInput {
            x: idx % cols,
            y: idx / cols,
            value,
        });
    }

    let labels = dst.as_slice_mut();
    labels.fill(0);

    let mut queue = VecDeque::new();
    let mut num_labels = 0u32;

    for seed in 0..pixels.len() {
        if pixels[seed] != FOREGROUND || labels[seed] != 0 {
            continue;
        }

        num_labels += 1;
        labels[seed] = num_labels;
        queue.push_back((seed / cols, seed % cols));

        while let Some((r, c)) = queue.pop_front() {
            for &(dr, dc) in connectivity.offsets() {
                let (Some(nr), Some(nc)) = (r.checked_add_signed(dr), c.checked_add_signed(dc))
                else {
                    continue;
                };
                if nr >= rows || nc >= cols {
                    continue;
                }
                let idx = nr * cols + nc;
                if pixels[idx] == FOREGROUND && labels[idx] == 0 {
                    labels[idx] = num_labels;
                    queue.push_back((nr, nc));
                }
            }
        }
    }

    log::debug!("labeled {} connected components", num_labels);

    Ok(num_labels)
}

/// Inclusive pixel bounds of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    /// Leftmost column.
    pub x_min: usize,
    /// Topmost row.
    pub y_min: usize,
    /// Rightmost column.
    pub x_max: usize,
    /// Bottom row.
    pub y_max: usize,
}

impl BoundingBox {
    fn expand_to_contain(&mut self, x: usize, y: usize) {
        self.x_min = self.x_min.min(x);
        self.y_min = self.y_min.min(y);
        self.x_max = self.x_max.max(x);
        self.y_max = self.y_max.max(y);
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.x_max - self.x_min + 1
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.y_max - self.y_min + 1
    }
}

/// Summary of one labeled component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentStats {
    /// The component label, >= 1.
    pub label: u32,
    /// Number of pixels carrying the label.
    pub area: usize,
    /// Bounds of the component.
    pub bbox: BoundingBox,
}

/// Compute the area and bounding box of every component of a label image.
///
/// The result is ordered by label. Labels that do not occur are skipped, so
/// for the output of [`label_connected_components`] entry `i` has label `i + 1`.
pub fn component_stats(labels: &Image<u32, 1>) -> Vec<ComponentStats> {
    let cols = labels.cols();
    let mut stats: Vec<Option<ComponentStats>> = Vec::new();

    for (idx, &label) in labels.as_slice().iter().enumerate() {
        if label == 0 {
            continue;
        }
        let (x, y) = (idx % cols, idx / cols);
        let slot = label as usize - 1;
        if stats.len() <= slot {
            stats.resize(slot + 1, None);
        }
        match &mut stats[slot] {
            Some(entry) => {
                entry.area += 1;
                entry.bbox.expand_to_contain(x, y);
            }
            empty => {
                *empty = Some(ComponentStats {
                    label,
                    area: 1,
                    bbox: BoundingBox {
                        x_min: x,
                        y_min: y,
                        x_max: x,
                        y_max: y,
                    },
                });
            }
        }
    }

    stats.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blobseg_image::{ImageError, ImageSize};

    fn mask(width: usize, height: usize, data: Vec<u8>) -> Result<Image<u8, 1>, ImageError> {
        Image::new(ImageSize { width, height }, data)
    }

    fn run(
        src: &Image<u8, 1>,
        connectivity: Connectivity,
    ) -> Result<(u32, Image<u32, 1>), ImgprocError> {
        let mut labels = Image::<u32, 1>::from_size_val(src.size(), 0)?;
        let num = label_connected_components(src, &mut labels, connectivity)?;
        Ok((num, labels))
    }

    #[test]
    fn two_diagonal_blocks() -> Result<(), ImgprocError> {
        #[rustfmt::skip]
        let src = mask(5, 5, vec![
            255, 255, 0, 0, 0,
            255, 255, 0, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 0, 255, 255,
            0, 0, 0, 255, 255,
        ])?;

        let (num, labels) = run(&src, Connectivity::Eight)?;

        assert_eq!(num, 2);
        #[rustfmt::skip]
        assert_eq!(labels.as_slice(), &[
            1, 1, 0, 0, 0,
            1, 1, 0, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 0, 2, 2,
            0, 0, 0, 2, 2,
        ]);
        let count = |l: u32| labels.as_slice().iter().filter(|&&v| v == l).count();
        assert_eq!(count(0), 17);
        assert_eq!(count(1), 4);
        assert_eq!(count(2), 4);

        Ok(())
    }

    #[test]
    fn single_pixel_component() -> Result<(), ImgprocError> {
        let mut data = vec![0u8; 9];
        data[4] = 255;
        let src = mask(3, 3, data)?;

        let (num, labels) = run(&src, Connectivity::Eight)?;

        assert_eq!(num, 1);
        assert_eq!(labels.as_slice(), &[0, 0, 0, 0, 1, 0, 0, 0, 0]);

        Ok(())
    }

    #[test]
    fn diagonal_adjacency() -> Result<(), ImgprocError> {
        #[rustfmt::skip]
        let src = mask(3, 3, vec![
            255, 0, 0,
            0, 255, 0,
            0, 0, 255,
        ])?;

        let (num, labels) = run(&src, Connectivity::Eight)?;
        assert_eq!(num, 1);
        assert_eq!(labels.as_slice(), &[1, 0, 0, 0, 1, 0, 0, 0, 1]);

        let (num, labels) = run(&src, Connectivity::Four)?;
        assert_eq!(num, 3);
        assert_eq!(labels.as_slice(), &[1, 0, 0, 0, 2, 0, 0, 0, 3]);

        Ok(())
    }

    #[test]
    fn labels_follow_first_encounter() -> Result<(), ImgprocError> {
        // the U shape is found first at its top-left arm and absorbs the right
        // arm before the scan gets there; the lone pixel comes second
        #[rustfmt::skip]
        let src = mask(6, 4, vec![
            255, 0, 0, 255, 0, 0,
            255, 0, 0, 255, 0, 255,
            255, 255, 255, 255, 0, 0,
            0, 0, 0, 0, 0, 0,
        ])?;

        let (num, labels) = run(&src, Connectivity::Eight)?;

        assert_eq!(num, 2);
        #[rustfmt::skip]
        assert_eq!(labels.as_slice(), &[
            1, 0, 0, 1, 0, 0,
            1, 0, 0, 1, 0, 2,
            1, 1, 1, 1, 0, 0,
            0, 0, 0, 0, 0, 0,
        ]);

        Ok(())
    }

    #[test]
    fn deterministic() -> Result<(), ImgprocError> {
        let data = (0..20 * 15)
            .map(|i: usize| if (i * 7 + i / 20) % 5 < 2 { 255 } else { 0 })
            .collect();
        let src = mask(20, 15, data)?;

        let (num_a, labels_a) = run(&src, Connectivity::Eight)?;
        let (num_b, labels_b) = run(&src, Connectivity::Eight)?;

        assert_eq!(num_a, num_b);
        assert_eq!(labels_a, labels_b);

        Ok(())
    }

    #[test]
    fn stale_labels_are_cleared() -> Result<(), ImgprocError> {
        let src = mask(3, 1, vec![0, 255, 0])?;
        let mut labels = Image::<u32, 1>::from_size_val(src.size(), 9)?;

        let num = label_connected_components(&src, &mut labels, Connectivity::Eight)?;

        assert_eq!(num, 1);
        assert_eq!(labels.as_slice(), &[0, 1, 0]);

        Ok(())
    }

    #[test]
    fn large_component_does_not_recurse() -> Result<(), ImgprocError> {
        let src = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 600,
                height: 500,
            },
            FOREGROUND,
        )?;

        let (num, labels) = run(&src, Connectivity::Eight)?;

        assert_eq!(num, 1);
        assert!(labels.as_slice().iter().all(|&l| l == 1));

        Ok(())
    }

    #[test]
    fn all_background() -> Result<(), ImgprocError> {
        let src = mask(4, 4, vec![0; 16])?;
        let (num, labels) = run(&src, Connectivity::Eight)?;
        assert_eq!(num, 0);
        assert!(labels.as_slice().iter().all(|&l| l == 0));
        assert!(component_stats(&labels).is_empty());
        Ok(())
    }

    #[test]
    fn out_of_range_input() -> Result<(), ImgprocError> {
        let src = mask(3, 2, vec![0, 255, 0, 0, 128, 255])?;
        let mut labels = Image::<u32, 1>::from_size_val(src.size(), 5)?;

        assert_eq!(
            label_connected_components(&src, &mut labels, Connectivity::Eight),
            Err(ImgprocError::OutOfRangeLabelInput {
                x: 1,
                y: 1,
                value: 128
            })
        );
        assert!(labels.as_slice().iter().all(|&l| l == 5));

        Ok(())
    }

    #[test]
    fn size_mismatch() -> Result<(), ImgprocError> {
        let src = mask(3, 2, vec![0; 6])?;
        let mut labels = Image::<u32, 1>::from_size_val([2, 3].into(), 0)?;

        assert_eq!(
            label_connected_components(&src, &mut labels, Connectivity::Eight),
            Err(ImgprocError::Image(ImageError::InvalidImageSize(3, 2, 2, 3)))
        );

        Ok(())
    }

    #[test]
    fn stats_of_two_blocks() -> Result<(), ImgprocError> {
        #[rustfmt::skip]
        let src = mask(5, 4, vec![
            255, 255, 0, 0, 0,
            255, 0, 0, 0, 255,
            0, 0, 0, 0, 255,
            0, 0, 0, 255, 255,
        ])?;

        let (_, labels) = run(&src, Connectivity::Eight)?;
        let stats = component_stats(&labels);

        assert_eq!(
            stats,
            vec![
                ComponentStats {
                    label: 1,
                    area: 3,
                    bbox: BoundingBox {
                        x_min: 0,
                        y_min: 0,
                        x_max: 1,
                        y_max: 1
                    },
                },
                ComponentStats {
                    label: 2,
                    area: 4,
                    bbox: BoundingBox {
                        x_min: 3,
                        y_min: 1,
                        x_max: 4,
                        y_max: 3
                    },
                },
            ]
        );
        assert_eq!(stats[1].bbox.width(), 2);
        assert_eq!(stats[1].bbox.height(), 3);

        Ok(())
    }
}
