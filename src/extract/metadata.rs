//! Match-level metadata from the summary screen: starting side, final
//! score, and map name. Every field has an interactive fallback because
//! the summary screen is the one capture players most often crop badly.

use anyhow::{Context, Result};
use image::RgbImage;

use crate::extract::layout;
use crate::extract::text::normalize_name;
use crate::ocr::{ReadOptions, TextReader};
use crate::prompt::Resolver;
use crate::types::HalfSide;
use crate::vision::crop;

pub const ROUNDS_PER_HALF: usize = 12;

#[derive(Clone, Debug, PartialEq)]
pub struct MatchMetadata {
    /// Lowercased canonical map name, e.g. "ascent".
    pub map_name: String,
    pub team_score: u32,
    pub opponent_score: u32,
    /// "X - Y" as shown on screen.
    pub final_score: String,
    pub total_rounds: u32,
    /// Attack/Defense assignment per regulation round, 24 entries.
    pub sides: Vec<HalfSide>,
}

pub struct MetadataExtractor<'a> {
    reader: &'a dyn TextReader,
    resolver: &'a dyn Resolver,
    known_maps: &'a [String],
    fuzzy_cutoff: f64,
}

impl<'a> MetadataExtractor<'a> {
    pub fn new(
        reader: &'a dyn TextReader,
        resolver: &'a dyn Resolver,
        known_maps: &'a [String],
        fuzzy_cutoff: f64,
    ) -> Self {
        Self { reader, resolver, known_maps, fuzzy_cutoff }
    }

    pub fn extract(&self, summary: &RgbImage) -> Result<MatchMetadata> {
        let sides = self.extract_sides(summary)?;
        let (team_score, opponent_score) = self.extract_score(summary)?;
        let map_name = self.extract_map_name(summary)?;

        Ok(MatchMetadata {
            map_name,
            team_score,
            opponent_score,
            final_score: format!("{} - {}", team_score, opponent_score),
            total_rounds: team_score + opponent_score,
            sides,
        })
    }

    /// The summary lists the first-half role next to the team name; the
    /// second half is the other role. Overtime is not modelled here, so
    /// the assignment covers the 24 regulation rounds.
    fn extract_sides(&self, summary: &RgbImage) -> Result<Vec<HalfSide>> {
        let region = crop(summary, layout::SIDES_REGION);
        let tokens = self.reader.read_text(&region, &ReadOptions::default())?;

        let label = match tokens.first() {
            Some(text) => text.clone(),
            None => self.resolver.resolve(
                "Please enter your team's starting side (attack/defense):",
                "starting side",
            )?,
        };

        let first_half = if label.to_lowercase().contains("def") {
            HalfSide::Defense
        } else {
            HalfSide::Attack
        };
        let second_half = first_half.opposite();

        let mut sides = vec![first_half; ROUNDS_PER_HALF];
        sides.extend(vec![second_half; ROUNDS_PER_HALF]);
        Ok(sides)
    }

    /// Score banner reads like "13 WIN 7". Fewer than three tokens, or
    /// tokens that are not numbers, fall through to manual entry.
    fn extract_score(&self, summary: &RgbImage) -> Result<(u32, u32)> {
        let region = crop(summary, layout::SCORE_REGION);
        let tokens = self.reader.read_text(&region, &ReadOptions::words())?;

        if tokens.len() >= 3 {
            if let (Ok(team), Ok(opponent)) =
                (tokens[0].parse::<u32>(), tokens[2].parse::<u32>())
            {
                return Ok((team, opponent));
            }
            log::warn!("Score banner tokens {:?} are not numeric", &tokens[..3]);
        } else {
            log::warn!("Score banner yielded {} tokens, expected 3", tokens.len());
        }

        let team = self.resolve_score("Please enter your team's score:")?;
        let opponent = self.resolve_score("Please enter opponent's score:")?;
        Ok((team, opponent))
    }

    /// An empty answer (the unattended default) counts as 0 so a garbled
    /// banner degrades instead of killing the run.
    fn resolve_score(&self, prompt: &str) -> Result<u32> {
        let answer = self.resolver.resolve(prompt, "final score")?;
        let answer = answer.trim();
        if answer.is_empty() {
            log::warn!("No score entered, assuming 0");
            return Ok(0);
        }
        answer.parse::<u32>().context("Score must be a number")
    }

    fn extract_map_name(&self, summary: &RgbImage) -> Result<String> {
        let region = crop(summary, layout::MAP_NAME_REGION);
        let tokens = self.reader.read_text(&region, &ReadOptions::default())?;

        let raw = match tokens.first() {
            Some(text) => text.clone(),
            None => self.resolver.resolve("Please enter map name:", "map name")?,
        };

        let canonical = normalize_name(
            &raw,
            self.known_maps,
            self.fuzzy_cutoff,
            self.resolver,
            "map name",
        )?;
        Ok(canonical.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::QueuedReader;
    use crate::prompt::ScriptedResolver;
    use image::Rgb;

    fn summary() -> RgbImage {
        RgbImage::from_pixel(1920, 1080, Rgb([8, 8, 8]))
    }

    fn maps() -> Vec<String> {
        ["Ascent", "Bind", "Haven", "Lotus", "Pearl"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn no_answers() -> ScriptedResolver {
        ScriptedResolver::new(Vec::<String>::new())
    }

    #[test]
    fn test_clean_summary() {
        // Reads in order: sides, score, map
        let reader = QueuedReader::new([
            vec!["DEFENDING"],
            vec!["13", "WIN", "7"],
            vec!["Ascent"],
        ]);
        let resolver = no_answers();
        let known_maps = maps();
        let extractor = MetadataExtractor::new(&reader, &resolver, &known_maps, 0.6);

        let meta = extractor.extract(&summary()).unwrap();
        assert_eq!(meta.map_name, "ascent");
        assert_eq!(meta.team_score, 13);
        assert_eq!(meta.opponent_score, 7);
        assert_eq!(meta.final_score, "13 - 7");
        assert_eq!(meta.total_rounds, 20);
        assert_eq!(meta.sides.len(), 24);
        assert_eq!(meta.sides[0], HalfSide::Defense);
        assert_eq!(meta.sides[11], HalfSide::Defense);
        assert_eq!(meta.sides[12], HalfSide::Attack);
        assert_eq!(meta.sides[23], HalfSide::Attack);
    }

    #[test]
    fn test_attack_start_when_no_def_in_label() {
        let reader = QueuedReader::new([
            vec!["ATTACKING"],
            vec!["5", "LOSS", "13"],
            vec!["Bind"],
        ]);
        let resolver = no_answers();
        let known_maps = maps();
        let extractor = MetadataExtractor::new(&reader, &resolver, &known_maps, 0.6);

        let meta = extractor.extract(&summary()).unwrap();
        assert_eq!(meta.sides[0], HalfSide::Attack);
        assert_eq!(meta.sides[12], HalfSide::Defense);
    }

    #[test]
    fn test_unattended_run_scores_garbled_banner_as_zero() {
        let reader = QueuedReader::new([
            vec!["DEFENDING"],
            vec!["I3", "WIN", "?"], // numerals lost
            vec!["Haven"],
        ]);
        let resolver = crate::prompt::DefaultResolver::new("");
        let known_maps = maps();
        let extractor = MetadataExtractor::new(&reader, &resolver, &known_maps, 0.6);

        let meta = extractor.extract(&summary()).unwrap();
        assert_eq!(meta.team_score, 0);
        assert_eq!(meta.opponent_score, 0);
        assert_eq!(meta.final_score, "0 - 0");
    }

    #[test]
    fn test_short_score_banner_falls_back_to_manual_entry() {
        let reader = QueuedReader::new([
            vec!["DEFENDING"],
            vec!["13"], // lost the other two tokens
            vec!["Haven"],
        ]);
        let resolver = ScriptedResolver::new(["13", "11"]);
        let known_maps = maps();
        let extractor = MetadataExtractor::new(&reader, &resolver, &known_maps, 0.6);

        let meta = extractor.extract(&summary()).unwrap();
        assert_eq!(meta.team_score, 13);
        assert_eq!(meta.opponent_score, 11);
        assert_eq!(meta.total_rounds, 24);
        assert_eq!(resolver.remaining(), 0);
    }

    #[test]
    fn test_garbled_score_tokens_fall_back_to_manual_entry() {
        let reader = QueuedReader::new([
            vec!["DEFENDING"],
            vec!["1E", "WIN", "?"],
            vec!["Lotus"],
        ]);
        let resolver = ScriptedResolver::new(["13", "2"]);
        let known_maps = maps();
        let extractor = MetadataExtractor::new(&reader, &resolver, &known_maps, 0.6);

        let meta = extractor.extract(&summary()).unwrap();
        assert_eq!(meta.final_score, "13 - 2");
    }

    #[test]
    fn test_map_name_fuzzy_corrected() {
        let reader = QueuedReader::new([
            vec!["DEFENDING"],
            vec!["13", "WIN", "7"],
            vec!["Ascenl"], // OCR confusion
        ]);
        let resolver = no_answers();
        let known_maps = maps();
        let extractor = MetadataExtractor::new(&reader, &resolver, &known_maps, 0.6);

        let meta = extractor.extract(&summary()).unwrap();
        assert_eq!(meta.map_name, "ascent");
    }

    #[test]
    fn test_empty_reads_ask_for_everything() {
        let reader = QueuedReader::new([Vec::<String>::new(), vec![], vec![]]);
        let resolver = ScriptedResolver::new(["attack", "12", "14", "Pearl"]);
        let known_maps = maps();
        let extractor = MetadataExtractor::new(&reader, &resolver, &known_maps, 0.6);

        let meta = extractor.extract(&summary()).unwrap();
        assert_eq!(meta.sides[0], HalfSide::Attack);
        assert_eq!(meta.final_score, "12 - 14");
        assert_eq!(meta.map_name, "pearl");
        assert_eq!(resolver.remaining(), 0);
    }
}
