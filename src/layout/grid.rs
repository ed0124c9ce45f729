use image::{DynamicImage, GenericImageView};
use serde::Serialize;
use std::fmt;

/// Rectangular sub-area of a source image, in pixel coordinates.
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Region {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Crop this region out of `image`.
    pub fn crop(&self, image: &DynamicImage) -> DynamicImage {
        image.crop_imm(self.left, self.top, self.width(), self.height())
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Compute a `rows` x `cols` grid over a `width` x `height` image, row-major.
///
/// Every cell is `width / cols` by `height / rows` (integer division). The
/// remainder strip on the right and bottom edges belongs to no region.
/// Zero `rows` or `cols` panics on division.
pub fn grid_regions(width: u32, height: u32, rows: u32, cols: u32) -> Vec<Region> {
    let patch_width = width / cols;
    let patch_height = height / rows;

    let mut regions = Vec::with_capacity(rows as usize * cols as usize);
    for i in 0..rows {
        for j in 0..cols {
            regions.push(Region {
                left: j * patch_width,
                top: i * patch_height,
                right: (j + 1) * patch_width,
                bottom: (i + 1) * patch_height,
            });
        }
    }

    regions
}

/// Split `image` into grid cells, returning each region with its cropped pixels.
pub fn split_image(image: &DynamicImage, rows: u32, cols: u32) -> Vec<(Region, DynamicImage)> {
    let (width, height) = image.dimensions();

    grid_regions(width, height, rows, cols)
        .into_iter()
        .map(|region| {
            let patch = region.crop(image);
            (region, patch)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_chart_grid_drops_bottom_strip() {
        let regions = grid_regions(100, 50, 4, 2);
        assert_eq!(regions.len(), 8);

        for region in &regions {
            assert_eq!(region.width(), 50);
            assert_eq!(region.height(), 12);
        }

        let last = regions.last().unwrap();
        assert_eq!(last.right, 100);
        assert_eq!(last.bottom, 48);
    }

    #[test]
    fn test_row_major_order() {
        let regions = grid_regions(30, 20, 2, 3);
        let origins: Vec<(u32, u32)> = regions.iter().map(|r| (r.left, r.top)).collect();
        assert_eq!(
            origins,
            vec![(0, 0), (10, 0), (20, 0), (0, 10), (10, 10), (20, 10)]
        );
    }

    #[test]
    fn test_regions_stay_in_bounds() {
        for (w, h, rows, cols) in [(7, 5, 2, 3), (1, 1, 1, 1), (99, 41, 4, 2), (13, 64, 5, 5)] {
            let regions = grid_regions(w, h, rows, cols);
            assert_eq!(regions.len(), (rows * cols) as usize);
            for region in &regions {
                assert!(region.right <= (w / cols) * cols);
                assert!(region.bottom <= (h / rows) * rows);
                assert_eq!(region.width(), w / cols);
                assert_eq!(region.height(), h / rows);
            }
        }
    }

    #[test]
    fn test_split_image_crops_pixels() {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(2, 1, Rgb([255, 0, 0]));
        let image = DynamicImage::ImageRgb8(img);

        let patches = split_image(&image, 2, 2);
        assert_eq!(patches.len(), 4);

        let (region, patch) = &patches[3];
        let expected = Region {
            left: 2,
            top: 1,
            right: 4,
            bottom: 2,
        };
        assert_eq!(*region, expected);
        assert_eq!(patch.dimensions(), (2, 1));
        assert_eq!(patch.to_rgb8().get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    #[should_panic]
    fn test_zero_columns_panics() {
        grid_regions(10, 10, 1, 0);
    }
}
