//! Per-round signals read off each timeline screenshot: outcome banner,
//! loadout economy, Operator (AWP) presence, first-blood side, and the
//! planted-spike site on the minimap.

use anyhow::Result;
use image::RgbImage;

use crate::extract::layout;
use crate::ocr::{ReadOptions, TextReader};
use crate::types::{AwpPresence, PlantSite, Side};
use crate::vision::{crop, match_template, sample};

pub struct RoundSignals<'a> {
    reader: &'a dyn TextReader,
    spike: Option<RgbImage>,
    site_confidence: f64,
    awp_team_boundary: usize,
}

impl<'a> RoundSignals<'a> {
    pub fn new(
        reader: &'a dyn TextReader,
        spike: Option<RgbImage>,
        site_confidence: f64,
        awp_team_boundary: usize,
    ) -> Self {
        Self { reader, spike, site_confidence, awp_team_boundary }
    }

    /// "win" unless the banner says LOSS. An unreadable banner counts as
    /// a win, same as the on-screen default layout.
    pub fn outcome(&self, timeline: &RgbImage) -> Result<String> {
        let region = crop(timeline, layout::OUTCOME_REGION);
        let tokens = self.reader.read_text(&region, &ReadOptions::default())?;
        let is_loss = tokens.iter().any(|t| t.to_uppercase().contains("LOSS"));
        Ok(if is_loss { "loss" } else { "win" }.to_string())
    }

    /// Loadout values as displayed, team then opponent. Missing reads
    /// become "0" rather than failing the round.
    pub fn economy(&self, timeline: &RgbImage) -> Result<(String, String)> {
        let region = crop(timeline, layout::ECONOMY_REGION);
        let tokens = self.reader.read_text(&region, &ReadOptions::economy())?;
        let team = tokens.first().cloned().unwrap_or_else(|| "0".to_string());
        let opponent = tokens.get(1).cloned().unwrap_or_else(|| "0".to_string());
        Ok((team, opponent))
    }

    /// Who brought an Operator this round, read from the loadout panel.
    pub fn awp_presence(&self, timeline: &RgbImage) -> Result<AwpPresence> {
        let region = crop(timeline, layout::AWP_REGION);
        let tokens = self.reader.read_text(&region, &ReadOptions::default())?;
        Ok(classify_awp_tokens(&tokens, self.awp_team_boundary))
    }

    /// Which site the spike was planted on, if it was planted and the
    /// reference sprite is available. Needs the map name because site
    /// geometry differs per map.
    pub fn plant_site(&self, timeline: &RgbImage, map_name: &str) -> Option<PlantSite> {
        let spike = self.spike.as_ref()?;
        let minimap = crop(timeline, layout::MINIMAP_REGION);
        let found = match_template(&minimap, spike);

        if found.score <= self.site_confidence {
            return None;
        }
        let (x, y) = found.location;
        Some(locate_site(map_name, x, y))
    }
}

/// Green highlight at the top engagement row means the team drew first
/// blood; anything else is the opponent's.
pub fn first_blood_side(timeline: &RgbImage) -> Side {
    let (_, g, _) = sample(timeline, layout::FIRST_BLOOD_POS);
    if g > 100 { Side::Team } else { Side::Opponent }
}

/// The loadout panel lists team rows before opponent rows, so the token
/// index of each "Operator" hit tells which block it came from.
fn classify_awp_tokens(tokens: &[String], team_boundary: usize) -> AwpPresence {
    let indices: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.as_str() == "Operator")
        .map(|(i, _)| i)
        .collect();

    match indices.as_slice() {
        [] => AwpPresence::None,
        [one] => {
            if *one < team_boundary {
                AwpPresence::Team
            } else {
                AwpPresence::Opponent
            }
        }
        [a, b] => {
            if *a < team_boundary && *b < team_boundary {
                AwpPresence::Team
            } else if *a >= team_boundary && *b >= team_boundary {
                AwpPresence::Opponent
            } else {
                AwpPresence::Both
            }
        }
        _ => AwpPresence::Both,
    }
}

/// Maps the spike's minimap coordinates to a bombsite. Coordinates are
/// relative to the cropped minimap region.
fn locate_site(map_name: &str, x: u32, y: u32) -> PlantSite {
    match map_name {
        "bind" => {
            if x < 250 { PlantSite::B } else { PlantSite::A }
        }
        "ascent" => {
            if y < 250 { PlantSite::B } else { PlantSite::A }
        }
        "haven" => {
            if y < 150 {
                PlantSite::A
            } else if y < 280 {
                PlantSite::B
            } else {
                PlantSite::C
            }
        }
        "lotus" => {
            if x < 150 {
                PlantSite::C
            } else if x < 300 {
                PlantSite::B
            } else {
                PlantSite::A
            }
        }
        "pearl" => {
            if (90..210).contains(&y) {
                if x < 250 { PlantSite::B } else { PlantSite::A }
            } else {
                PlantSite::Unclear
            }
        }
        "fracture" => {
            if (190..290).contains(&y) {
                if x < 250 { PlantSite::B } else { PlantSite::A }
            } else {
                PlantSite::Unclear
            }
        }
        "split" => {
            if y > 250 { PlantSite::B } else { PlantSite::A }
        }
        "sunset" | "breeze" => {
            if x > 250 { PlantSite::A } else { PlantSite::B }
        }
        "icebox" => {
            if y > 200 { PlantSite::A } else { PlantSite::B }
        }
        _ => PlantSite::Unclear,
    }
}
