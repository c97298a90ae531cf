//! Contrast-limited adaptive histogram equalization (CLAHE).
//!
//! The raster is split into a `grid x grid` array of tiles. Each tile
//! gets its own equalization lookup table built from a clipped
//! histogram: counts above `clip_limit * (tile_area / 256)` are cut and
//! redistributed evenly over all bins, which caps how much any one
//! intensity can be stretched. Each output pixel is bilinearly
//! interpolated between the lookup tables of the four nearest tile
//! centers so tile seams do not show.

use image::GrayImage;

const BINS: usize = 256;

/// Equalize contrast locally.
///
/// `grid` is the number of tiles along each axis (0 is treated as 1,
/// and it never exceeds the raster side). A non-positive `clip_limit`
/// disables clipping, giving plain per-tile equalization.
#[must_use = "returns the equalized image"]
pub fn equalize_local(image: &GrayImage, clip_limit: f32, grid: u32) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = grid.clamp(1, width);
    let tiles_y = grid.clamp(1, height);

    let luts: Vec<Vec<[u8; BINS]>> = (0..tiles_y)
        .map(|ty| {
            (0..tiles_x)
                .map(|tx| {
                    let (x0, x1) = tile_span(tx, tiles_x, width);
                    let (y0, y1) = tile_span(ty, tiles_y, height);
                    tile_lut(image, x0..x1, y0..y1, clip_limit)
                })
                .collect()
        })
        .collect();

    GrayImage::from_fn(width, height, |x, y| {
        let value = usize::from(image.get_pixel(x, y).0[0]);
        let (tx0, tx1, fx) = neighbour_tiles(x, tiles_x, width);
        let (ty0, ty1, fy) = neighbour_tiles(y, tiles_y, height);

        let lookup = |tx: usize, ty: usize| f32::from(luts[ty][tx][value]);
        let top = lookup(tx0, ty0).mul_add(1.0 - fx, lookup(tx1, ty0) * fx);
        let bottom = lookup(tx0, ty1).mul_add(1.0 - fx, lookup(tx1, ty1) * fx);
        let mixed = top.mul_add(1.0 - fy, bottom * fy);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let out = mixed.round().clamp(0.0, 255.0) as u8;
        image::Luma([out])
    })
}

/// Pixel range `[start, end)` covered by tile `index` of `count` along
/// an axis of `len` pixels.
#[allow(clippy::cast_possible_truncation)]
const fn tile_span(index: u32, count: u32, len: u32) -> (u32, u32) {
    let start = (index as u64 * len as u64 / count as u64) as u32;
    let end = ((index as u64 + 1) * len as u64 / count as u64) as u32;
    (start, end)
}

/// The two tiles whose centers bracket coordinate `pos`, and the
/// interpolation weight of the second.
fn neighbour_tiles(pos: u32, count: u32, len: u32) -> (usize, usize, f32) {
    #[allow(clippy::cast_precision_loss)]
    let tile_len = len as f32 / count as f32;
    #[allow(clippy::cast_precision_loss)]
    let t = (pos as f32 + 0.5) / tile_len - 0.5;

    #[allow(clippy::cast_precision_loss)]
    let last = (count - 1) as f32;
    if t <= 0.0 {
        return (0, 0, 0.0);
    }
    if t >= last {
        let i = count as usize - 1;
        return (i, i, 0.0);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lo = t.floor() as usize;
    #[allow(clippy::cast_precision_loss)]
    let frac = t - lo as f32;
    (lo, lo + 1, frac)
}

/// Clipped-histogram equalization lookup table for one tile.
fn tile_lut(
    image: &GrayImage,
    xs: std::ops::Range<u32>,
    ys: std::ops::Range<u32>,
    clip_limit: f32,
) -> [u8; BINS] {
    let mut hist = [0u32; BINS];
    let mut area = 0u32;
    for y in ys {
        for x in xs.clone() {
            hist[usize::from(image.get_pixel(x, y).0[0])] += 1;
            area += 1;
        }
    }

    let mut lut = [0u8; BINS];
    if area == 0 {
        for (i, v) in lut.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let identity = i as u8;
            *v = identity;
        }
        return lut;
    }

    if clip_limit > 0.0 {
        clip_histogram(&mut hist, area, clip_limit);
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = 255.0 / area as f32;
    let mut cumulative = 0u32;
    for (bin, v) in hist.iter().zip(lut.iter_mut()) {
        cumulative += bin;
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let mapped = (cumulative as f32 * scale).round().clamp(0.0, 255.0) as u8;
        *v = mapped;
    }
    lut
}

/// Cut every bin at the clip level and spread the excess evenly.
///
/// The total count is preserved, so the last cumulative value is still
/// the tile area.
fn clip_histogram(hist: &mut [u32; BINS], area: u32, clip_limit: f32) {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > limit {
            excess += *bin - limit;
            *bin = limit;
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    let bins = BINS as u32;
    let share = excess / bins;
    let remainder = (excess % bins) as usize;
    for (i, bin) in hist.iter_mut().enumerate() {
        *bin += share + u32::from(i < remainder);
    }
}
