//! Pixel-level vision primitives.
//!
//! This module provides:
//! - Region cropping and single-pixel sampling with out-of-bounds safety
//! - Team/opponent color classification and bounded row-boundary scans
//! - Normalized cross-correlation template matching for sprite icons

pub mod color;
pub mod sampler;
pub mod template;

pub use color::{classify_side, is_dark, scan_down};
pub use sampler::{crop, sample};
pub use template::{best_match, match_scores, match_template, TemplateMatch};
