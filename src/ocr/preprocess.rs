//! Image preprocessing for OCR.

use image::{GrayImage, RgbImage};

/// Converts to grayscale and applies a linear contrast boost, which makes
/// the thin UI glyphs (map label, outcome banner) survive recognition on
/// low-contrast crops.
pub fn enhance_for_ocr(image: &RgbImage) -> GrayImage {
    const ALPHA: f32 = 1.5;

    let gray = image::imageops::grayscale(image);
    let (w, h) = gray.dimensions();
    GrayImage::from_fn(w, h, |x, y| {
        let v = gray.get_pixel(x, y)[0] as f32 * ALPHA;
        image::Luma([v.min(255.0) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_enhance_scales_and_saturates() {
        let img = RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 { Rgb([100, 100, 100]) } else { Rgb([200, 200, 200]) }
        });
        let out = enhance_for_ocr(&img);
        assert_eq!(out.get_pixel(0, 0)[0], 150);
        assert_eq!(out.get_pixel(1, 0)[0], 255);
    }
}
