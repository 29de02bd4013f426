//! Image preprocessing: turn a rendered page into a clean two-level image.
//!
//! Steps, in order:
//!
//! 1. grayscale;
//! 2. 2× Lanczos upscale when the longer side is below [`UPSCALE_BELOW_PX`];
//! 3. 3×3 median filter to remove speckle;
//! 4. Otsu threshold from the 256-bin histogram (128 if Otsu finds none);
//! 5. pixel → 255 above the threshold, 0 otherwise.

use crate::pipeline::render::Page;
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::filter::median_filter;
use tracing::debug;

/// Pages whose longer side is below this are upscaled 2× before thresholding.
pub const UPSCALE_BELOW_PX: u32 = 2000;

/// Threshold used when Otsu's method yields no split.
pub const FALLBACK_THRESHOLD: u8 = 128;

/// A binarized page: every pixel is 0 or 255.
#[derive(Debug, Clone)]
pub struct PreprocessedPage {
    /// 0-based page index in the source document.
    pub index: usize,
    pub image: GrayImage,
    /// Threshold that produced this image.
    pub threshold: u8,
}

/// Run the full preprocessing chain on one page.
pub fn binarize(page: &Page) -> PreprocessedPage {
    let gray = page.image.to_luma8();
    let (w, h) = gray.dimensions();

    let scaled = if w.max(h) < UPSCALE_BELOW_PX {
        imageops::resize(&gray, w * 2, h * 2, FilterType::Lanczos3)
    } else {
        gray
    };

    let smoothed = median_filter(&scaled, 1, 1);
    let hist = histogram(&smoothed);
    let threshold = otsu_threshold(&hist).unwrap_or(FALLBACK_THRESHOLD);

    debug!(
        "Page {}: {}x{} → {}x{} px, threshold {}",
        page.index + 1,
        w,
        h,
        smoothed.width(),
        smoothed.height(),
        threshold
    );

    PreprocessedPage {
        index: page.index,
        image: apply_threshold(&smoothed, threshold),
        threshold,
    }
}

/// 256-bin intensity histogram.
pub fn histogram(image: &GrayImage) -> [u64; 256] {
    let mut hist = [0u64; 256];
    for Luma([v]) in image.pixels() {
        hist[*v as usize] += 1;
    }
    hist
}

/// Otsu's threshold: the `t` maximizing between-class variance
/// `wB · wF · (meanB − meanF)²`, where background is intensities `≤ t`.
///
/// The first maximizing `t` wins. Returns `None` when no split has positive
/// variance (empty or single-intensity histograms).
pub fn otsu_threshold(hist: &[u64; 256]) -> Option<u8> {
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return None;
    }
    let sum_all: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &c)| i as f64 * c as f64)
        .sum();

    let mut weight_b: u64 = 0;
    let mut sum_b = 0.0f64;
    let mut best_variance = 0.0f64;
    let mut best: Option<u8> = None;

    for t in 0..255usize {
        weight_b += hist[t];
        if weight_b == 0 {
            continue;
        }
        let weight_f = total - weight_b;
        if weight_f == 0 {
            break;
        }
        sum_b += t as f64 * hist[t] as f64;

        let mean_b = sum_b / weight_b as f64;
        let mean_f = (sum_all - sum_b) / weight_f as f64;
        let diff = mean_b - mean_f;
        let between = weight_b as f64 * weight_f as f64 * diff * diff;

        if !between.is_finite() {
            return None;
        }
        if between > best_variance {
            best_variance = between;
            best = Some(t as u8);
        }
    }

    best
}

/// Two-level image: `> threshold` → 255, else 0.
pub fn apply_threshold(image: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = image.clone();
    for Luma([v]) in out.pixels_mut() {
        *v = if *v > threshold { 255 } else { 0 };
    }
    out
}
