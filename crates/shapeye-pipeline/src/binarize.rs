//! Region extraction and binarization.
//!
//! Cuts the region of interest out of the frame, converts it to grayscale
//! and applies a single global threshold. There is no adaptive step:
//! robustness against lighting changes is left to whoever positions the
//! camera.

use image::{GrayImage, Luma};

use crate::types::{Frame, Mask, Rect};

/// Foreground level in a [`Mask`].
pub const FOREGROUND: u8 = 255;

/// Background level in a [`Mask`].
pub const BACKGROUND: u8 = 0;

/// Copy the region of interest out of the frame.
///
/// `roi` must lie inside the frame; callers get that guarantee from
/// [`RegionController`](crate::RegionController).
#[must_use = "returns the cropped region"]
pub fn crop(frame: &Frame, roi: Rect) -> Frame {
    image::imageops::crop_imm(frame, roi.x, roi.y, roi.width, roi.height).to_image()
}

/// Convert a region to a binary mask.
///
/// Pixels whose grayscale intensity is at least `threshold` become
/// [`FOREGROUND`], the rest [`BACKGROUND`].
#[must_use = "returns the binary mask"]
pub fn binarize(region: &Frame, threshold: u8) -> Mask {
    let gray: GrayImage = image::imageops::grayscale(region);
    threshold_mask(&gray, threshold)
}

/// Apply a fixed threshold to an already grayscale image.
#[must_use = "returns the binary mask"]
pub fn threshold_mask(gray: &GrayImage, threshold: u8) -> Mask {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y).0[0] >= threshold {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

#[cfg(test)]
mod tests {
    use image::Rgb;

    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        let gray = GrayImage::from_fn(3, 1, |x, _| Luma([[126, 127, 128][x as usize]]));
        let mask = threshold_mask(&gray, 127);
        assert_eq!(mask.get_pixel(0, 0).0[0], BACKGROUND);
        assert_eq!(mask.get_pixel(1, 0).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(2, 0).0[0], FOREGROUND);
    }

    #[test]
    fn mask_is_strictly_binary() {
        let gray = GrayImage::from_fn(16, 16, |x, y| Luma([u8::try_from(x * 16 + y).unwrap_or(0)]));
        let mask = threshold_mask(&gray, 100);
        assert!(
            mask.pixels()
                .all(|p| p.0[0] == FOREGROUND || p.0[0] == BACKGROUND)
        );
    }

    #[test]
    fn white_background_is_foreground_and_saturated_blue_is_not() {
        let region = Frame::from_fn(4, 4, |x, _| {
            if x < 2 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 255])
            }
        });
        let mask = binarize(&region, 127);
        assert_eq!(mask.get_pixel(0, 0).0[0], FOREGROUND);
        assert_eq!(mask.get_pixel(3, 3).0[0], BACKGROUND);
    }

    #[test]
    fn crop_copies_the_region() {
        let frame = Frame::from_fn(20, 10, |x, y| {
            Rgb([
                u8::try_from(x).unwrap_or(0),
                u8::try_from(y).unwrap_or(0),
                0,
            ])
        });
        let region = crop(&frame, Rect::new(5, 3, 4, 2));
        assert_eq!(region.dimensions(), (4, 2));
        assert_eq!(region.get_pixel(0, 0), &Rgb([5, 3, 0]));
        assert_eq!(region.get_pixel(3, 1), &Rgb([8, 4, 0]));
    }

    #[test]
    fn binarize_is_deterministic() {
        let region = Frame::from_fn(8, 8, |x, y| Rgb([(x * 30) as u8, (y * 30) as u8, 90]));
        assert_eq!(binarize(&region, 127), binarize(&region, 127));
    }
}
