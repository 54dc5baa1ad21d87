//! Normalized cross-correlation template matching.
//!
//! Equivalent of OpenCV's `matchTemplate` with `TM_CCOEFF_NORMED`: both
//! patches are mean-centered, the correlation is normalized by their
//! magnitudes, and the best score over all placements wins. Matching runs
//! on grayscale since the agent icons differ by shape, not palette.

use image::{GrayImage, RgbImage};

/// Best placement of a template inside an image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateMatch {
    /// Zero-mean normalized correlation in [-1, 1].
    pub score: f64,
    /// Top-left corner of the best placement (x, y).
    pub location: (u32, u32),
}

fn to_gray(image: &RgbImage) -> GrayImage {
    image::imageops::grayscale(image)
}

/// Zero-mean NCC of a template placed at (ox, oy) inside `image`.
fn ncc_at(image: &GrayImage, template: &GrayImage, ox: u32, oy: u32) -> f64 {
    let (tw, th) = template.dimensions();
    let n = (tw * th) as f64;

    let mut sum_i = 0.0;
    let mut sum_t = 0.0;
    for ty in 0..th {
        for tx in 0..tw {
            sum_i += image.get_pixel(ox + tx, oy + ty)[0] as f64;
            sum_t += template.get_pixel(tx, ty)[0] as f64;
        }
    }
    let mean_i = sum_i / n;
    let mean_t = sum_t / n;

    let mut cross = 0.0;
    let mut norm_i = 0.0;
    let mut norm_t = 0.0;
    for ty in 0..th {
        for tx in 0..tw {
            let di = image.get_pixel(ox + tx, oy + ty)[0] as f64 - mean_i;
            let dt = template.get_pixel(tx, ty)[0] as f64 - mean_t;
            cross += di * dt;
            norm_i += di * di;
            norm_t += dt * dt;
        }
    }

    let denom = (norm_i * norm_t).sqrt();
    if denom == 0.0 {
        // Flat patch against a flat patch is a perfect (if useless) match.
        return if norm_i == norm_t { 1.0 } else { 0.0 };
    }
    cross / denom
}

/// Slides `template` over `image` and returns the best-scoring placement.
/// When the template is larger than the image in either dimension, the two
/// are swapped so the call still yields a usable similarity (the source
/// crops and reference sprites differ by a few pixels in size).
pub fn match_template(image: &RgbImage, template: &RgbImage) -> TemplateMatch {
    let (iw, ih) = image.dimensions();
    let (tw, th) = template.dimensions();
    if tw > iw || th > ih {
        return match_template(template, image);
    }

    let image = to_gray(image);
    let template = to_gray(template);

    let mut best = TemplateMatch { score: -1.0, location: (0, 0) };
    for oy in 0..=(ih - th) {
        for ox in 0..=(iw - tw) {
            let score = ncc_at(&image, &template, ox, oy);
            if score > best.score {
                best = TemplateMatch { score, location: (ox, oy) };
            }
        }
    }
    best
}

/// Matches `query` against every reference sprite and returns the index of
/// the highest-scoring one. No confidence floor is applied here; ambiguity
/// is resolved downstream by side membership.
pub fn best_match(query: &RgbImage, references: &[RgbImage]) -> usize {
    let mut best_index = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, reference) in references.iter().enumerate() {
        let score = match_template(query, reference).score;
        if score > best_score {
            best_score = score;
            best_index = i;
        }
    }
    best_index
}

/// Like [`best_match`] but also reports every per-reference score, for
/// side-aware disambiguation by the caller.
pub fn match_scores(query: &RgbImage, references: &[RgbImage]) -> Vec<f64> {
    references
        .iter()
        .map(|reference| match_template(query, reference).score)
        .collect()
}
