//! Roster extraction from the first timeline image.
//!
//! The scoreboard block on that screen lists five team rows (green
//! highlight) above five opponent rows (red highlight). Each row carries
//! the agent icon, the player name, and the agent name. Rows are located
//! by scanning down a fixed column until the highlight color appears.

use anyhow::{Context, Result};
use image::RgbImage;

use crate::extract::layout;
use crate::extract::text::normalize_name;
use crate::ocr::{ReadOptions, TextReader};
use crate::prompt::Resolver;
use crate::types::{ImageRegion, Position};
use crate::vision::{crop, scan_down};

/// The ten players of a match in scoreboard order: indices 0-4 are the
/// team, 5-9 the opponent. `sprites` are the agent icons in the same
/// order, used to resolve timeline event rows.
#[derive(Debug)]
pub struct Roster {
    pub players: Vec<String>,
    pub agents: Vec<String>,
    pub sprites: Vec<RgbImage>,
}

pub struct RosterExtractor<'a> {
    reader: &'a dyn TextReader,
    resolver: &'a dyn Resolver,
    known_agents: &'a [String],
    fuzzy_cutoff: f64,
}

impl<'a> RosterExtractor<'a> {
    pub fn new(
        reader: &'a dyn TextReader,
        resolver: &'a dyn Resolver,
        known_agents: &'a [String],
        fuzzy_cutoff: f64,
    ) -> Self {
        Self { reader, resolver, known_agents, fuzzy_cutoff }
    }

    pub fn extract(&self, image: &RgbImage) -> Result<Roster> {
        let mut players = Vec::with_capacity(10);
        let mut agents = Vec::with_capacity(10);

        self.extract_section(
            image,
            layout::TEAM_PLAYER_START_Y,
            |_, g, _| g >= layout::TEAM_PLAYER_MIN_GREEN,
            "team",
            &mut players,
            &mut agents,
        )?;
        self.extract_section(
            image,
            layout::OPPONENT_PLAYER_START_Y,
            |_, _, r| r >= layout::OPPONENT_PLAYER_MIN_RED,
            "opponent",
            &mut players,
            &mut agents,
        )?;

        let sprites = extract_agent_sprites(image)?;
        Ok(Roster { players, agents, sprites })
    }

    fn extract_section(
        &self,
        image: &RgbImage,
        section_start_y: u32,
        row_highlight: impl Fn(u8, u8, u8) -> bool + Copy,
        section: &str,
        players: &mut Vec<String>,
        agents: &mut Vec<String>,
    ) -> Result<()> {
        let mut start_y = section_start_y;

        for slot in 1..=5 {
            let y = scan_down(
                image,
                Position::new(start_y, layout::PLAYER_SCAN_X),
                layout::SCAN_CAP,
                row_highlight,
            )
            .with_context(|| format!("Could not locate {} player row {}", section, slot))?;

            let name_x = layout::PLAYER_SCAN_X + layout::PLAYER_NAME_OFFSET_X;
            let row = crop(
                image,
                ImageRegion::new(
                    y,
                    y + layout::PLAYER_ROW_HEIGHT,
                    name_x,
                    name_x + layout::PLAYER_NAME_WIDTH,
                ),
            );
            let tokens = self.reader.read_text(&row, &ReadOptions::default())?;

            let (player, raw_agent) = match tokens.as_slice() {
                [player, agent, ..] => (player.clone(), agent.clone()),
                [player] => {
                    let agent = self.resolver.resolve(
                        &format!("Please confirm the agent {} is playing:", player),
                        &format!("{} roster row {}", section, slot),
                    )?;
                    (player.clone(), agent)
                }
                [] => {
                    let player = self.resolver.resolve(
                        &format!("Please enter {} player name for position {}:", section, slot),
                        &format!("{} roster row {}", section, slot),
                    )?;
                    let agent = self.resolver.resolve(
                        &format!("Please enter agent for {}:", player),
                        &format!("{} roster row {}", section, slot),
                    )?;
                    (player, agent)
                }
            };

            let agent = normalize_name(
                &raw_agent,
                self.known_agents,
                self.fuzzy_cutoff,
                self.resolver,
                &format!("agent for {}", player),
            )?;
            log::debug!("{} row {} at y={}: {} ({})", section, slot, y, player, agent);

            players.push(player);
            agents.push(agent);
            start_y = y + layout::PLAYER_ROW_ADVANCE;
        }
        Ok(())
    }
}

/// Cuts the ten agent icons out of the scoreboard block, in the same
/// order the roster rows are read. Uses its own column and thresholds:
/// the icon cell lights up a couple of rows away from the name cell.
pub fn extract_agent_sprites(image: &RgbImage) -> Result<Vec<RgbImage>> {
    let mut sprites = Vec::with_capacity(10);

    let mut start_y = layout::TEAM_SPRITE_START_Y;
    for slot in 1..=5 {
        let y = scan_down(
            image,
            Position::new(start_y, layout::SPRITE_SCAN_X),
            layout::SCAN_CAP,
            |_, g, _| g >= layout::TEAM_SPRITE_MIN_GREEN,
        )
        .with_context(|| format!("Could not locate team agent icon {}", slot))?;
        sprites.push(sprite_at(image, y));
        start_y = y + layout::PLAYER_ROW_ADVANCE;
    }

    let mut start_y = layout::OPPONENT_SPRITE_START_Y;
    for slot in 1..=5 {
        let y = scan_down(
            image,
            Position::new(start_y, layout::SPRITE_SCAN_X),
            layout::SCAN_CAP,
            |_, _, r| r >= layout::OPPONENT_SPRITE_MIN_RED,
        )
        .with_context(|| format!("Could not locate opponent agent icon {}", slot))?;
        sprites.push(sprite_at(image, y));
        start_y = y + layout::PLAYER_ROW_ADVANCE;
    }

    Ok(sprites)
}

fn sprite_at(image: &RgbImage, y: u32) -> RgbImage {
    let icon_x = layout::SPRITE_SCAN_X + layout::PLAYER_NAME_OFFSET_X;
    crop(
        image,
        ImageRegion::new(y, y + layout::SPRITE_SIZE, icon_x, icon_x + layout::SPRITE_SIZE),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::QueuedReader;
    use crate::prompt::ScriptedResolver;
    use image::Rgb;

    fn agent_pool() -> Vec<String> {
        ["Jett", "Sova", "Omen", "Sage", "Raze", "Breach", "Cypher", "Viper", "Phoenix", "KAY/O"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Full-size dark frame with the ten highlight rows painted at the
    /// coordinates the extractor scans.
    fn scoreboard_frame() -> RgbImage {
        let mut img = RgbImage::from_pixel(1920, 1080, Rgb([8, 8, 8]));
        for slot in 0..5u32 {
            let team_y = layout::TEAM_PLAYER_START_Y + 2 + slot * layout::PLAYER_ROW_ADVANCE;
            let opp_y = layout::OPPONENT_PLAYER_START_Y + 2 + slot * layout::PLAYER_ROW_ADVANCE;
            for dy in 0..layout::PLAYER_ROW_HEIGHT {
                // Name column highlight
                img.put_pixel(layout::PLAYER_SCAN_X, team_y + dy, Rgb([60, 200, 60]));
                img.put_pixel(layout::PLAYER_SCAN_X, opp_y + dy, Rgb([200, 60, 60]));
                // Icon column highlight
                img.put_pixel(layout::SPRITE_SCAN_X, team_y + dy, Rgb([60, 200, 60]));
                img.put_pixel(layout::SPRITE_SCAN_X, opp_y + dy, Rgb([200, 60, 60]));
            }
        }
        img
    }

    fn roster_reads() -> Vec<Vec<String>> {
        let agents = agent_pool();
        (0..10)
            .map(|i| vec![format!("Player{}", i + 1), agents[i].clone()])
            .collect()
    }

    #[test]
    fn test_full_roster_in_scoreboard_order() {
        let image = scoreboard_frame();
        let reader = QueuedReader::new(roster_reads());
        let resolver = ScriptedResolver::new(Vec::<String>::new());
        let agents = agent_pool();
        let extractor = RosterExtractor::new(&reader, &resolver, &agents, 0.6);

        let roster = extractor.extract(&image).unwrap();
        assert_eq!(roster.players.len(), 10);
        assert_eq!(roster.players[0], "Player1");
        assert_eq!(roster.players[9], "Player10");
        assert_eq!(roster.agents[0], "Jett");
        assert_eq!(roster.agents[9], "KAY/O");
        assert_eq!(roster.sprites.len(), 10);
        assert_eq!(resolver.remaining(), 0);
    }

    #[test]
    fn test_fuzzy_agent_correction_without_prompt() {
        let image = scoreboard_frame();
        let mut reads = roster_reads();
        reads[0][1] = "Jetl".to_string(); // OCR confusion, close enough
        let reader = QueuedReader::new(reads);
        let resolver = ScriptedResolver::new(Vec::<String>::new());
        let agents = agent_pool();
        let extractor = RosterExtractor::new(&reader, &resolver, &agents, 0.6);

        let roster = extractor.extract(&image).unwrap();
        assert_eq!(roster.agents[0], "Jett");
        assert_eq!(resolver.remaining(), 0);
    }

    #[test]
    fn test_single_token_row_asks_for_agent() {
        let image = scoreboard_frame();
        let mut reads = roster_reads();
        reads[3] = vec!["LonelyName".to_string()];
        let reader = QueuedReader::new(reads);
        let resolver = ScriptedResolver::new(["Sage"]);
        let agents = agent_pool();
        let extractor = RosterExtractor::new(&reader, &resolver, &agents, 0.6);

        let roster = extractor.extract(&image).unwrap();
        assert_eq!(roster.players[3], "LonelyName");
        assert_eq!(roster.agents[3], "Sage");
        assert_eq!(resolver.remaining(), 0);
    }

    #[test]
    fn test_empty_row_asks_for_both() {
        let image = scoreboard_frame();
        let mut reads = roster_reads();
        reads[7] = vec![];
        let reader = QueuedReader::new(reads);
        let resolver = ScriptedResolver::new(["TypedName", "Viper"]);
        let agents = agent_pool();
        let extractor = RosterExtractor::new(&reader, &resolver, &agents, 0.6);

        let roster = extractor.extract(&image).unwrap();
        assert_eq!(roster.players[7], "TypedName");
        assert_eq!(roster.agents[7], "Viper");
    }

    #[test]
    fn test_missing_highlight_rows_error_out() {
        let image = RgbImage::from_pixel(1920, 1080, Rgb([8, 8, 8]));
        let reader = QueuedReader::new(Vec::<Vec<String>>::new());
        let resolver = ScriptedResolver::new(Vec::<String>::new());
        let agents = agent_pool();
        let extractor = RosterExtractor::new(&reader, &resolver, &agents, 0.6);

        let err = extractor.extract(&image).unwrap_err();
        assert!(err.to_string().contains("team player row 1"));
    }
}
