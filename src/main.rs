//! Practistics
//!
//! Turns a folder of Valorant post-match screenshots (summary, scoreboard
//! and one timeline page per round) into structured match data, exported
//! as CSV and JSON.

mod assemble;
mod capture;
mod config;
mod export;
mod extract;
mod ocr;
mod paths;
mod prompt;
mod reference;
mod types;
mod vision;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;

use crate::capture::MatchImages;
use crate::config::AppConfig;
use crate::ocr::TesseractReader;
use crate::prompt::{ConsoleResolver, DefaultResolver, Resolver};
use crate::reference::ReferenceData;

#[derive(Parser)]
#[command(name = "practistics", version, about = "Valorant match data from post-match screenshots")]
struct Cli {
    /// Folder containing the match screenshots (PNG).
    #[arg(long, value_name = "DIR", required_unless_present = "clear_cache")]
    read: Option<PathBuf>,

    /// Configuration file; defaults are used when absent.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Where to write the CSV/JSON exports (overrides the config).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Skip the reference-list API and use cached/hardcoded lists.
    #[arg(long)]
    offline: bool,

    /// Never prompt; ambiguous values keep their raw OCR reading.
    #[arg(long)]
    assume_defaults: bool,

    /// Delete the cached reference lists and exit.
    #[arg(long)]
    clear_cache: bool,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = AppConfig::load(cli.config.as_deref())?;

    if cli.clear_cache {
        reference::clear_cache(&config, None)?;
        println!("Reference cache cleared.");
        return Ok(());
    }

    paths::ensure_directories().context("Failed to create data directories")?;

    // Checked by the required_unless_present constraint above.
    let read_dir = cli
        .read
        .as_deref()
        .context("--read <DIR> is required to process a match")?;
    let images = capture::read_images_from_folder(read_dir)?;
    log::info!(
        "Loaded summary, scoreboard and {} timeline images from {}",
        images.timelines.len(),
        read_dir.display()
    );

    let reference = ReferenceData::load(&config, cli.offline);
    let reader = TesseractReader::new()?;
    let resolver: Box<dyn Resolver> = if cli.assume_defaults {
        Box::new(DefaultResolver::new(""))
    } else {
        Box::new(ConsoleResolver)
    };

    let assembler = assemble::MatchAssembler::new(&reader, resolver.as_ref(), &reference, &config);
    let match_data = match assembler.assemble(&images) {
        Ok(match_data) => match_data,
        Err(err) => {
            let session = save_error_session(&config, &images, &err);
            match session {
                Ok(id) => log::error!("Processing failed; diagnostics saved under {}", id),
                Err(save_err) => {
                    log::error!("Processing failed and diagnostics could not be saved: {:#}", save_err)
                }
            }
            return Err(err);
        }
    };

    let output_dir = cli.output_dir.unwrap_or_else(|| config.output_dir.clone());
    let csv_path = export::match_to_csv(&match_data, &output_dir)?;
    let json_path = export::match_to_json(&match_data, &output_dir)?;

    let flagged = match_data.rounds.iter().filter(|r| !r.flags.is_empty()).count();
    if flagged > 0 {
        log::warn!("{} of {} rounds carry validation flags", flagged, match_data.rounds.len());
    }
    println!("Match {} exported:", match_data.id);
    println!("  {}", csv_path.display());
    println!("  {}", json_path.display());
    Ok(())
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .format_timestamp_secs()
        .init();
}

/// Writes a failure bundle: the input images plus the error text, under a
/// per-session directory in the error-log folder, so a report can attach
/// exactly what the pipeline saw.
fn save_error_session(
    config: &AppConfig,
    images: &MatchImages,
    err: &anyhow::Error,
) -> Result<String> {
    let session_id = generate_session_id();
    let dir = config.log_dir.join(&session_id);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create error-log directory {}", dir.display()))?;

    std::fs::write(dir.join("error.txt"), format!("{:#}\n", err))
        .context("Failed to write error report")?;
    images
        .summary
        .save(dir.join("summary.png"))
        .context("Failed to save summary image")?;
    images
        .scoreboard
        .save(dir.join("scoreboard.png"))
        .context("Failed to save scoreboard image")?;
    for (i, timeline) in images.timelines.iter().enumerate() {
        timeline
            .save(dir.join(format!("timeline_{}.png", i + 1)))
            .with_context(|| format!("Failed to save timeline image {}", i + 1))?;
    }
    Ok(session_id)
}

/// `E` plus seven digits, drawn from the sub-second clock so concurrent
/// sessions on the same machine stay distinct.
fn generate_session_id() -> String {
    let nanos = Local::now().timestamp_nanos_opt().unwrap_or_default();
    format!("E{:07}", (nanos as u64) % 10_000_000)
}
