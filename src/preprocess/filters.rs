//! Small separable filters used by preprocessing and reconstruction.

use crate::image::ImageF32;

/// Normalised 5-tap Gaussian `[1, 4, 6, 4, 1] / 16`.
pub const GAUSSIAN_5TAP: [f32; 5] = [0.0625, 0.25, 0.375, 0.25, 0.0625];

/// Separable Gaussian blur with clamped borders.
pub fn gaussian_blur(src: &ImageF32) -> ImageF32 {
    let mut horiz = ImageF32::new(src.w, src.h);
    convolve_rows(src, &mut horiz, &GAUSSIAN_5TAP);
    let mut out = ImageF32::new(src.w, src.h);
    convolve_cols(&horiz, &mut out, &GAUSSIAN_5TAP);
    out
}

fn convolve_rows(src: &ImageF32, dst: &mut ImageF32, taps: &[f32]) {
    let radius = taps.len() / 2;
    let max_x = src.w.saturating_sub(1) as isize;
    for y in 0..src.h {
        let src_row = src.row(y);
        let dst_row = dst.row_mut(y);
        for (x, out) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &tap) in taps.iter().enumerate() {
                let sx = (x as isize + k as isize - radius as isize).clamp(0, max_x);
                acc += tap * src_row[sx as usize];
            }
            *out = acc;
        }
    }
}

fn convolve_cols(src: &ImageF32, dst: &mut ImageF32, taps: &[f32]) {
    let radius = taps.len() / 2;
    let max_y = src.h.saturating_sub(1) as isize;
    for y in 0..src.h {
        let dst_row = dst.row_mut(y);
        for (k, &tap) in taps.iter().enumerate() {
            let sy = (y as isize + k as isize - radius as isize).clamp(0, max_y);
            let src_row = src.row(sy as usize);
            for (out, &v) in dst_row.iter_mut().zip(src_row) {
                *out += tap * v;
            }
        }
    }
}

/// Local mean over a `(2*radius+1)` square window via row prefix sums.
///
/// This is the adaptive reference used by thresholding; a single global
/// mean would misclassify under uneven scan illumination.
pub fn box_mean(src: &ImageF32, radius: usize) -> ImageF32 {
    let mut out = ImageF32::new(src.w, src.h);
    if src.w == 0 || src.h == 0 {
        return out;
    }
    // integral image with a zero top row / left column
    let iw = src.w + 1;
    let mut integral = vec![0.0f64; iw * (src.h + 1)];
    for y in 0..src.h {
        let row = src.row(y);
        let mut run = 0.0f64;
        for x in 0..src.w {
            run += row[x] as f64;
            integral[(y + 1) * iw + x + 1] = integral[y * iw + x + 1] + run;
        }
    }
    for y in 0..src.h {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(src.h);
        let dst_row = out.row_mut(y);
        for (x, out_px) in dst_row.iter_mut().enumerate() {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(src.w);
            let sum = integral[y1 * iw + x1] - integral[y0 * iw + x1] - integral[y1 * iw + x0]
                + integral[y0 * iw + x0];
            let area = ((y1 - y0) * (x1 - x0)) as f64;
            *out_px = (sum / area) as f32;
        }
    }
    out
}

/// 1-D Gaussian taps for the given sigma, normalised to unit sum.
///
/// Kernel radius is `ceil(3 * sigma)`; a sigma at or below zero returns the
/// identity kernel.
pub fn gaussian_taps(sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (3.0 * sigma).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (-radius..=radius)
        .map(|i| (-(i * i) as f32 / denom).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    for t in &mut taps {
        *t /= sum;
    }
    taps
}
