//! Morphological skeletonization.
//!
//! Each round erodes the working mask with the 3x3 cross, dilates the
//! result back, and keeps the pixels the round trip lost: the ridge of
//! the current ink. The ridges of all rounds together form the
//! skeleton. A one-pixel-wide curve vanishes in its first erosion, so it
//! comes back whole.

use image::GrayImage;

use crate::morphology::{dilate_cross, erode_cross, is_blank};
use crate::threshold::INK;

/// Upper bound on erosion rounds. Every round removes at least one
/// pixel, so no raster needs more rounds than half its longer side; this
/// only guards against a mask that stops shrinking.
const MAX_ROUNDS: usize = 4096;

/// Reduce ink regions to one-pixel-wide centerlines.
///
/// The result has the same dimensions as the input and never more ink
/// pixels. Terminates when the eroding mask is empty, when an erosion
/// removes nothing (a mask that touches the raster on every side can
/// stop shrinking), or after a fixed round cap.
#[must_use = "returns the skeleton mask"]
pub fn skeletonize(mask: &GrayImage) -> GrayImage {
    let (width, height) = mask.dimensions();
    let mut skeleton = GrayImage::new(width, height);
    let mut current = mask.clone();

    for _ in 0..MAX_ROUNDS {
        if is_blank(&current) {
            break;
        }

        let eroded = erode_cross(&current);
        let opened = dilate_cross(&eroded);

        for ((out, cur), open) in skeleton.pixels_mut().zip(current.pixels()).zip(opened.pixels()) {
            if cur.0[0] != 0 && open.0[0] == 0 {
                out.0[0] = INK;
            }
        }

        if eroded == current {
            // Nothing eroded: the rest of the mask is its own ridge.
            for (out, cur) in skeleton.pixels_mut().zip(current.pixels()) {
                if cur.0[0] != 0 {
                    out.0[0] = INK;
                }
            }
            break;
        }
        current = eroded;
    }

    tracing::trace!(width, height, "skeletonized");
    skeleton
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::ink_count;

    fn rect(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let inside = (x0..x0 + w).contains(&x) && (y0..y0 + h).contains(&y);
            image::Luma([if inside { INK } else { 0 }])
        })
    }

    #[test]
    fn empty_mask_gives_empty_skeleton() {
        let out = skeletonize(&GrayImage::new(16, 16));
        assert!(is_blank(&out));
        assert_eq!(out.dimensions(), (16, 16));
    }

    #[test]
    fn thin_line_passes_through() {
        let line = rect(120, 20, 10, 10, 100, 1);
        assert_eq!(skeletonize(&line), line);
    }

    #[test]
    fn thick_bar_thins_to_its_middle_row() {
        let bar = rect(60, 20, 10, 8, 40, 3);
        let skeleton = skeletonize(&bar);
        assert!(ink_count(&skeleton) <= ink_count(&bar));
        // The middle row survives, the outer rows are stripped apart from
        // the corner pixels the cross cannot reach.
        for x in 11..49 {
            assert_eq!(skeleton.get_pixel(x, 9).0[0], INK, "x={x}");
            assert_eq!(skeleton.get_pixel(x, 8).0[0], 0, "x={x}");
            assert_eq!(skeleton.get_pixel(x, 10).0[0], 0, "x={x}");
        }
    }

    #[test]
    fn never_adds_ink() {
        for mask in [
            rect(40, 40, 5, 5, 30, 30),
            rect(40, 40, 0, 0, 40, 40),
            rect(40, 40, 3, 10, 20, 7),
        ] {
            let skeleton = skeletonize(&mask);
            assert!(ink_count(&skeleton) <= ink_count(&mask));
            for (s, m) in skeleton.pixels().zip(mask.pixels()) {
                assert!(s.0[0] == 0 || m.0[0] != 0, "skeleton pixel outside input");
            }
        }
    }

    #[test]
    fn full_mask_terminates() {
        let full = rect(10, 10, 0, 0, 10, 10);
        let skeleton = skeletonize(&full);
        assert_eq!(skeleton.dimensions(), (10, 10));
        assert!(!is_blank(&skeleton));
    }

    #[test]
    fn output_is_binary() {
        let skeleton = skeletonize(&rect(30, 30, 4, 4, 20, 12));
        assert!(skeleton.pixels().all(|p| p.0[0] == 0 || p.0[0] == INK));
    }
}
