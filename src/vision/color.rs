//! Team color classification and row-boundary scanning.
//!
//! The post-match UI renders the capturing player's team in green
//! (34, 255, 198 BGR) and the opponent in red (255, 70, 85 BGR), so a
//! single channel threshold separates the two. Dark pixels (all channels
//! low) mean no content at all.

use image::RgbImage;

use crate::types::{Position, Side};
use crate::vision::sampler::sample;

/// Channel threshold separating team green / opponent red from background.
const SIDE_THRESHOLD: u8 = 100;

/// Classifies a BGR pixel as team (green), opponent (red) or unknown.
pub fn classify_side(b: u8, g: u8, r: u8) -> Side {
    let _ = b;
    if g > SIDE_THRESHOLD {
        Side::Team
    } else if r > SIDE_THRESHOLD {
        Side::Opponent
    } else {
        Side::Unknown
    }
}

/// True when all three channels are below the content threshold, i.e. the
/// pixel is background rather than an event row.
pub fn is_dark(b: u8, g: u8, r: u8) -> bool {
    b < SIDE_THRESHOLD && g < SIDE_THRESHOLD && r < SIDE_THRESHOLD
}

/// Scans downward from `start` at a fixed column until `found` accepts the
/// sampled (B, G, R) pixel, returning the accepting row. Gives up after
/// `max_steps` rows — OCR/color noise can otherwise keep the condition
/// from ever triggering.
pub fn scan_down(
    image: &RgbImage,
    start: Position,
    max_steps: u32,
    found: impl Fn(u8, u8, u8) -> bool,
) -> Option<u32> {
    let mut y = start.y;
    for _ in 0..max_steps {
        let (b, g, r) = sample(image, Position::new(y, start.x));
        if found(b, g, r) {
            return Some(y);
        }
        y += 1;
    }
    log::warn!(
        "Row scan from y={} x={} found nothing within {} rows",
        start.y, start.x, max_steps
    );
    None
}
