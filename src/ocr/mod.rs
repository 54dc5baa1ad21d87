//! Text recognition boundary.
//!
//! The extraction pipeline only sees the [`TextReader`] trait: give it an
//! image region, get back an ordered sequence of strings. The tesseract
//! engine behind it is an implementation detail, and tests substitute a
//! queued fake so no pipeline test ever shells out.

pub mod engine;
pub mod preprocess;

pub use engine::TesseractReader;
pub use preprocess::enhance_for_ocr;

use anyhow::Result;
use image::RgbImage;

/// How recognized text is split into the returned tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tokenize {
    /// One token per recognized line (player rows, stacked values).
    #[default]
    Lines,
    /// One token per recognized word (horizontally separated values such
    /// as the score header).
    Words,
}

/// Recognition options for one read.
#[derive(Clone, Debug)]
pub struct ReadOptions {
    /// Restrict recognition to these characters, e.g. digits for
    /// scoreboard fields.
    pub allowlist: Option<String>,
    /// Drop tokens whose confidence falls below this (0-100).
    pub min_confidence: f32,
    pub tokenize: Tokenize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            allowlist: None,
            min_confidence: 0.0,
            tokenize: Tokenize::Lines,
        }
    }
}

impl ReadOptions {
    /// Digits plus thousands separator, for economy values.
    pub fn economy() -> Self {
        Self {
            allowlist: Some("0123456789,".to_string()),
            ..Self::default()
        }
    }

    pub fn words() -> Self {
        Self {
            tokenize: Tokenize::Words,
            ..Self::default()
        }
    }
}

/// Opaque text recognition service: given an image region, return the
/// recognized strings in reading order. An empty vector is a valid result
/// (an extraction miss, recovered by the caller).
pub trait TextReader {
    fn read_text(&self, image: &RgbImage, options: &ReadOptions) -> Result<Vec<String>>;
}

#[cfg(test)]
pub use fake::QueuedReader;
