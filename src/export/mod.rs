//! Match export.
//!
//! CSV flattens one row per round; JSON serializes the whole match.
//! Both land next to each other in the output directory under a
//! `data_{map}_{score}_{date}` filename so a folder of exports sorts
//! usefully.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::Match;

/// CSV header row, one column per round field.
const CSV_HEADER: &str = "round_number,outcome,side,team_economy,opponent_economy,\
first_blood,true_first_blood,first_blood_player,first_death_player,site,plant,defuse,\
awp_info,kills_team,kills_opponent";

/// Writes the per-round CSV and returns the path it was written to.
pub fn match_to_csv(match_data: &Match, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let path = output_dir.join(format!("{}.csv", export_stem(match_data)));
    let mut file = File::create(&path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;

    writeln!(file, "{}", CSV_HEADER).context("Failed to write CSV header")?;
    for round in &match_data.rounds {
        let line = format!(
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            round.round_number,
            round.outcome,
            round.side.as_str(),
            csv_field(&round.team_economy),
            csv_field(&round.opponent_economy),
            round.first_blood.as_str(),
            round.true_first_blood,
            csv_field(&round.first_blood_player),
            csv_field(&round.first_death_player),
            round.site.map(|s| s.as_str()).unwrap_or("None"),
            round.plant,
            round.defuse,
            round.awp_info.as_str(),
            round.kills_team,
            round.kills_opponent,
        );
        writeln!(file, "{}", line).context("Failed to write CSV row")?;
    }

    log::info!("Wrote {} rounds to {}", match_data.rounds.len(), path.display());
    Ok(path)
}

/// Writes the full match as pretty-printed JSON and returns the path.
pub fn match_to_json(match_data: &Match, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    let path = output_dir.join(format!("{}.json", export_stem(match_data)));
    let json =
        serde_json::to_string_pretty(match_data).context("Failed to serialize match to JSON")?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write JSON file {}", path.display()))?;

    log::info!("Wrote match {} to {}", match_data.id, path.display());
    Ok(path)
}

/// `data_{map}_{score}_{date}`, with separators the filesystem accepts.
fn export_stem(match_data: &Match) -> String {
    let score = match_data.final_score.replace(' ', "");
    let date = match_data.date.replace('/', "-");
    format!("data_{}_{}_{}", match_data.map_name, score, date)
}

/// Commas and quotes inside OCR'd values would break the row layout.
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
