//! Match image input.
//!
//! Screenshot capture itself lives outside this tool; processing starts
//! from a folder of PNGs. Filenames containing `summary` and `scoreboard`
//! identify those two pages; every other PNG is a per-round timeline image,
//! ordered by the first number in its filename.

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use regex::Regex;
use std::path::Path;

/// All images for one match. Required before any extraction begins.
#[derive(Debug)]
pub struct MatchImages {
    pub summary: RgbImage,
    pub scoreboard: RgbImage,
    /// One per round, in round order.
    pub timelines: Vec<RgbImage>,
}

impl MatchImages {
    pub fn new(summary: RgbImage, scoreboard: RgbImage, timelines: Vec<RgbImage>) -> Result<Self> {
        if timelines.is_empty() {
            return Err(anyhow!("No timeline images: at least one round is required"));
        }
        Ok(Self { summary, scoreboard, timelines })
    }
}

/// Reads a match's screenshots from `dir`. Missing summary, missing
/// scoreboard or an empty timeline set are fatal: each aborts with a
/// message naming the absent image, before any extraction begins.
pub fn read_images_from_folder(dir: &Path) -> Result<MatchImages> {
    if !dir.is_dir() {
        return Err(anyhow!("Image directory {} does not exist", dir.display()));
    }

    let number_re = Regex::new(r"\d+").expect("static regex");

    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read image directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("png"))
        .collect();

    // Timeline order comes from the first number in the filename.
    entries.sort_by_key(|path| {
        let name = path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        number_re
            .find(&name)
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(u64::MAX)
    });

    let mut summary = None;
    let mut scoreboard = None;
    let mut timelines = Vec::new();

    for path in &entries {
        let name = path.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default();
        let image = image::open(path)
            .with_context(|| format!("Failed to decode image {}", path.display()))?
            .to_rgb8();

        if name.contains("scoreboard") {
            scoreboard = Some(image);
            log::info!("Scoreboard image read");
        } else if name.contains("summary") {
            summary = Some(image);
            log::info!("Summary image read");
        } else {
            timelines.push(image);
            log::info!("Round {} image read", timelines.len());
        }
    }

    let summary = summary
        .ok_or_else(|| anyhow!("Missing summary image (no *summary*.png in {})", dir.display()))?;
    let scoreboard = scoreboard.ok_or_else(|| {
        anyhow!("Missing scoreboard image (no *scoreboard*.png in {})", dir.display())
    })?;
    if timelines.is_empty() {
        return Err(anyhow!("No timeline images found in {}", dir.display()));
    }

    MatchImages::new(summary, scoreboard, timelines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_png(dir: &Path, name: &str, fill: u8) {
        let img = RgbImage::from_pixel(4, 4, image::Rgb([fill, 0, 0]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_reads_and_orders_timelines() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "summary.png", 1);
        write_png(dir.path(), "scoreboard.png", 2);
        // Written out of order; numeric sort must fix it.
        write_png(dir.path(), "round_10.png", 10);
        write_png(dir.path(), "round_2.png", 2);
        write_png(dir.path(), "round_1.png", 1);

        let images = read_images_from_folder(dir.path()).unwrap();
        assert_eq!(images.timelines.len(), 3);
        let fills: Vec<u8> = images.timelines.iter().map(|t| t.get_pixel(0, 0)[0]).collect();
        assert_eq!(fills, vec![1, 2, 10]);
    }

    #[test]
    fn test_missing_summary_is_fatal() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "scoreboard.png", 2);
        write_png(dir.path(), "round_1.png", 1);

        let err = read_images_from_folder(dir.path()).unwrap_err();
        assert!(err.to_string().contains("summary"));
    }

    #[test]
    fn test_missing_scoreboard_is_fatal() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "summary.png", 1);
        write_png(dir.path(), "round_1.png", 1);

        let err = read_images_from_folder(dir.path()).unwrap_err();
        assert!(err.to_string().contains("scoreboard"));
    }

    #[test]
    fn test_empty_timelines_is_fatal() {
        let dir = tempdir().unwrap();
        write_png(dir.path(), "summary.png", 1);
        write_png(dir.path(), "scoreboard.png", 2);

        let err = read_images_from_folder(dir.path()).unwrap_err();
        assert!(err.to_string().contains("timeline"));
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        assert!(read_images_from_folder(Path::new("/nonexistent/practistics")).is_err());
    }
}
