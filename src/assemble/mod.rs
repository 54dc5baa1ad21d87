//! Match assembly.
//!
//! Orchestrates the full per-match pipeline: metadata, roster, then one
//! pass per timeline image producing a [`Round`], and finally the
//! assembled [`Match`]. A failing round is logged and replaced with a
//! placeholder so one bad screenshot never loses the rest of the match.

use anyhow::{Context, Result};
use chrono::Local;
use image::RgbImage;

use crate::capture::MatchImages;
use crate::config::AppConfig;
use crate::extract::{
    first_blood_side, EventScanner, MatchMetadata, MetadataExtractor, RawEvent, Roster,
    RosterExtractor, RoundSignals,
};
use crate::ocr::TextReader;
use crate::prompt::Resolver;
use crate::reference::ReferenceData;
use crate::types::{Event, EventKind, HalfSide, Match, Round, RoundFlag, Side};

/// Window in seconds within which a revenge kill on the opening killer
/// still counts as a trade.
const TRADE_WINDOW_SECS: u32 = 10;

pub struct MatchAssembler<'a> {
    reader: &'a dyn TextReader,
    resolver: &'a dyn Resolver,
    reference: &'a ReferenceData,
    config: &'a AppConfig,
}

impl<'a> MatchAssembler<'a> {
    pub fn new(
        reader: &'a dyn TextReader,
        resolver: &'a dyn Resolver,
        reference: &'a ReferenceData,
        config: &'a AppConfig,
    ) -> Self {
        Self { reader, resolver, reference, config }
    }

    pub fn assemble(&self, images: &MatchImages) -> Result<Match> {
        let metadata = MetadataExtractor::new(
            self.reader,
            self.resolver,
            &self.reference.maps,
            self.config.fuzzy_cutoff,
        )
        .extract(&images.summary)
        .context("Failed to extract match metadata from the summary image")?;
        log::info!(
            "Match on {}: {} over {} rounds",
            metadata.map_name, metadata.final_score, images.timelines.len()
        );

        // Roster and sprites come off the first timeline image; every
        // later round is resolved against them.
        let roster = RosterExtractor::new(
            self.reader,
            self.resolver,
            &self.reference.agents,
            self.config.fuzzy_cutoff,
        )
        .extract(&images.timelines[0])
        .context("Failed to extract the player roster")?;

        let spike = self.load_spike_template();
        let signals = RoundSignals::new(
            self.reader,
            spike,
            self.config.site_confidence,
            self.config.awp_team_boundary,
        );
        let scanner = EventScanner::new(self.reader);

        let mut rounds = Vec::with_capacity(images.timelines.len());
        for (i, timeline) in images.timelines.iter().enumerate() {
            let round_number = i as u32 + 1;
            let side = side_for_round(&metadata.sides, i);
            let round = match self.process_round(
                timeline, round_number, side, &roster, &signals, &scanner, &metadata,
            ) {
                Ok(round) => round,
                Err(err) => {
                    log::error!("Round {} failed, emitting placeholder: {:#}", round_number, err);
                    Round::placeholder(round_number, side)
                }
            };
            rounds.push(round);
        }

        let date = Local::now().format("%d/%m/%Y").to_string();
        let id = generate_match_id(&metadata.map_name, &metadata.final_score);

        Ok(Match {
            id,
            map_name: metadata.map_name,
            date,
            players_agents: roster
                .players
                .into_iter()
                .zip(roster.agents)
                .collect(),
            final_score: metadata.final_score,
            rounds,
            total_rounds: metadata.total_rounds,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn process_round(
        &self,
        timeline: &RgbImage,
        round_number: u32,
        side: HalfSide,
        roster: &Roster,
        signals: &RoundSignals,
        scanner: &EventScanner,
        metadata: &MatchMetadata,
    ) -> Result<Round> {
        let outcome = signals.outcome(timeline)?;
        let (team_economy, opponent_economy) = signals.economy(timeline)?;
        let awp_info = signals.awp_presence(timeline)?;
        let first_blood = first_blood_side(timeline);

        let mut raw_events = scanner.scan(timeline, &roster.sprites);
        raw_events.sort_by_key(|e| e.timestamp);

        let has_plant = raw_events.iter().any(|e| e.kind == EventKind::Plant);
        let has_defuse = raw_events.iter().any(|e| e.kind == EventKind::Defuse);
        let site = if has_plant {
            signals.plant_site(timeline, &metadata.map_name)
        } else {
            None
        };

        let events = format_events(&raw_events, &roster.players);
        let (kills_team, kills_opponent) =
            reconcile_kills(&raw_events, side, has_plant, has_defuse);

        let first_kill = events.iter().find(|e| e.event_type == EventKind::Kill);
        let first_blood_player =
            first_kill.map(|e| e.actor.clone()).unwrap_or_default();
        let first_death_player = first_kill
            .and_then(|e| e.target.clone())
            .unwrap_or_default();
        let true_first_blood = is_true_first_blood(&events);

        let mut round = Round {
            round_number,
            events,
            outcome,
            side,
            team_economy,
            opponent_economy,
            first_blood,
            true_first_blood,
            first_blood_player,
            first_death_player,
            site,
            plant: has_plant,
            defuse: has_defuse,
            awp_info,
            kills_team,
            kills_opponent,
            flags: Vec::new(),
        };
        validate_round(&mut round);
        Ok(round)
    }

    fn load_spike_template(&self) -> Option<RgbImage> {
        let path = &self.config.spike_template;
        match image::open(path) {
            Ok(img) => Some(img.to_rgb8()),
            Err(err) => {
                log::warn!(
                    "Spike sprite {} unavailable, skipping plant-site detection: {}",
                    path.display(),
                    err
                );
                None
            }
        }
    }
}

/// Attack/Defense for round index `i`. Regulation rounds come straight
/// from the per-half assignment; overtime alternates every round.
fn side_for_round(sides: &[HalfSide], i: usize) -> HalfSide {
    if let Some(side) = sides.get(i) {
        return *side;
    }
    let last = sides.last().copied().unwrap_or(HalfSide::Attack);
    if (i - sides.len()) % 2 == 0 {
        last.opposite()
    } else {
        last
    }
}

/// Resolves raw sprite indices to player names. Kills keep both actor and
/// target; plants and defuses keep only the actor.
fn format_events(raw_events: &[RawEvent], players: &[String]) -> Vec<Event> {
    raw_events
        .iter()
        .map(|raw| {
            let actor = players.get(raw.killer_index).cloned().unwrap_or_default();
            let target = match raw.kind {
                EventKind::Kill => players.get(raw.victim_index).cloned(),
                EventKind::Plant | EventKind::Defuse => None,
            };
            Event {
                timestamp: raw.timestamp,
                event_type: raw.kind,
                actor,
                target,
                side: raw.side,
            }
        })
        .collect()
}

/// Kill totals per side. Plant and defuse rows are visually identical to
/// kill rows in the raw count, so one is subtracted from the side that
/// performed the objective action: the attacking side plants, the
/// defending side defuses.
fn reconcile_kills(
    raw_events: &[RawEvent],
    side: HalfSide,
    has_plant: bool,
    has_defuse: bool,
) -> (u32, u32) {
    let mut team = 0u32;
    let mut opponent = 0u32;
    for event in raw_events.iter().filter(|e| e.kind == EventKind::Kill) {
        if event.killer_index < 5 {
            team += 1;
        } else {
            opponent += 1;
        }
    }

    if has_plant {
        if side == HalfSide::Attack {
            team = team.saturating_sub(1);
        } else {
            opponent = opponent.saturating_sub(1);
        }
    }
    if has_defuse {
        if side == HalfSide::Defense {
            team = team.saturating_sub(1);
        } else {
            opponent = opponent.saturating_sub(1);
        }
    }
    (team, opponent)
}

/// Whether the round's opening kill held up, i.e. was not immediately
/// traded. Best-effort heuristic over the first three kills:
/// - the opening killer dies to the second kill from the other side, or
/// - the opening killer dies to the third kill within the trade window.
fn is_true_first_blood(events: &[Event]) -> bool {
    let kills: Vec<&Event> = events
        .iter()
        .filter(|e| e.event_type == EventKind::Kill)
        .collect();
    let Some(first) = kills.first() else {
        return true;
    };

    if let Some(second) = kills.get(1) {
        if second.target.as_deref() == Some(first.actor.as_str()) {
            return first.side == second.side;
        }
    }
    if let Some(third) = kills.get(2) {
        if third.target.as_deref() == Some(first.actor.as_str()) {
            return third.timestamp.saturating_sub(first.timestamp) > TRADE_WINDOW_SECS;
        }
    }
    true
}

/// Soft validation: flags inconsistent rounds instead of rejecting them.
pub fn validate_round(round: &mut Round) {
    if round.kills_team + round.kills_opponent > 0 && round.events.is_empty() {
        log::warn!("Round {}: kill totals without any recorded events", round.round_number);
        round.flags.push(RoundFlag::KillsWithoutEvents);
    }
    if round.first_blood != Side::Unknown && round.first_blood_player.is_empty() {
        log::warn!("Round {}: first-blood side known but no player resolved", round.round_number);
        round.flags.push(RoundFlag::FirstBloodUnresolved);
    }
    if round.plant && !round.events.iter().any(|e| e.event_type == EventKind::Plant) {
        log::warn!("Round {}: plant set without a plant event", round.round_number);
        round.flags.push(RoundFlag::PlantWithoutEvent);
    }
    if round.defuse && !round.events.iter().any(|e| e.event_type == EventKind::Defuse) {
        log::warn!("Round {}: defuse set without a defuse event", round.round_number);
        round.flags.push(RoundFlag::DefuseWithoutEvent);
    }
}

/// Stable match id: map name plus an FNV-1a hash of map, score and
/// wall-clock time, so reruns of the same screenshots do not collide.
fn generate_match_id(map_name: &str, final_score: &str) -> String {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let seed = format!("{}_{}_{}", map_name, final_score, stamp);

    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in seed.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    format!("M_{}_{:08x}", map_name, (hash >> 32) as u32 ^ hash as u32)
}
