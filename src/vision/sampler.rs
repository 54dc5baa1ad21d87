//! Region cropping and pixel sampling.
//!
//! Both operations fail gracefully: a region or position outside the image
//! logs a warning and returns a well-defined placeholder (all-zero crop,
//! black pixel). The pipeline is heuristic end to end, so one missed region
//! must not stop a whole match.

use image::{imageops, RgbImage};

use crate::types::{ImageRegion, Position};

/// Crops `region` out of `image`. Out-of-bounds coordinates are clamped;
/// a region fully outside the image yields a 1x1 black placeholder.
pub fn crop(image: &RgbImage, region: ImageRegion) -> RgbImage {
    let (w, h) = image.dimensions();

    let x0 = region.x_start.min(w);
    let y0 = region.y_start.min(h);
    let rw = region.x_end.min(w).saturating_sub(x0);
    let rh = region.y_end.min(h).saturating_sub(y0);

    if rw == 0 || rh == 0 {
        log::warn!(
            "Crop region y={}..{} x={}..{} lies outside {}x{} image, returning placeholder",
            region.y_start, region.y_end, region.x_start, region.x_end, w, h
        );
        return RgbImage::new(1, 1);
    }

    if rw < region.width() || rh < region.height() {
        log::warn!(
            "Crop region y={}..{} x={}..{} clamped to fit {}x{} image",
            region.y_start, region.y_end, region.x_start, region.x_end, w, h
        );
    }

    imageops::crop_imm(image, x0, y0, rw, rh).to_image()
}

/// Samples the pixel at `pos`, returned in (B, G, R) channel order — the
/// order every threshold constant in this pipeline is written in.
/// Out of bounds returns black.
pub fn sample(image: &RgbImage, pos: Position) -> (u8, u8, u8) {
    let (w, h) = image.dimensions();
    if pos.x >= w || pos.y >= h {
        log::warn!("Pixel sample at y={} x={} outside {}x{} image", pos.y, pos.x, w, h);
        return (0, 0, 0);
    }
    let p = image.get_pixel(pos.x, pos.y);
    (p[2], p[1], p[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_image() -> RgbImage {
        RgbImage::from_fn(100, 200, |x, y| image::Rgb([x as u8, y as u8, 7]))
    }

    #[test]
    fn test_crop_in_bounds() {
        let img = gradient_image();
        let cropped = crop(&img, ImageRegion::new(50, 70, 10, 60));
        assert_eq!(cropped.dimensions(), (50, 20));
        // Top-left pixel comes from (10, 50) in the original
        assert_eq!(cropped.get_pixel(0, 0)[0], 10);
        assert_eq!(cropped.get_pixel(0, 0)[1], 50);
    }

    #[test]
    fn test_crop_clamps_to_image() {
        let img = gradient_image();
        let cropped = crop(&img, ImageRegion::new(190, 260, 90, 160));
        assert_eq!(cropped.dimensions(), (10, 10));
    }

    #[test]
    fn test_crop_fully_outside_returns_placeholder() {
        let img = gradient_image();
        let cropped = crop(&img, ImageRegion::new(500, 540, 500, 540));
        assert_eq!(cropped.dimensions(), (1, 1));
        assert_eq!(cropped.get_pixel(0, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_sample_returns_bgr_order() {
        let img = gradient_image();
        let (b, g, r) = sample(&img, Position::new(30, 20));
        assert_eq!((b, g, r), (7, 30, 20));
    }

    #[test]
    fn test_sample_out_of_bounds_is_black() {
        let img = gradient_image();
        assert_eq!(sample(&img, Position::new(1000, 0)), (0, 0, 0));
        assert_eq!(sample(&img, Position::new(0, 1000)), (0, 0, 0));
    }
}
