//! Core data model for an extracted match.
//!
//! Entities are built bottom-up (Event → Round → Match) during assembly and
//! never mutated afterwards; the validation pass only attaches flags.

use serde::{Deserialize, Serialize};

/// A rectangle in image pixel space, `y_start..y_end` by `x_start..x_end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageRegion {
    pub y_start: u32,
    pub y_end: u32,
    pub x_start: u32,
    pub x_end: u32,
}

impl ImageRegion {
    pub const fn new(y_start: u32, y_end: u32, x_start: u32, x_end: u32) -> Self {
        Self { y_start, y_end, x_start, x_end }
    }

    pub fn width(&self) -> u32 {
        self.x_end.saturating_sub(self.x_start)
    }

    pub fn height(&self) -> u32 {
        self.y_end.saturating_sub(self.y_start)
    }
}

/// A single pixel coordinate (row, column).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub y: u32,
    pub x: u32,
}

impl Position {
    pub const fn new(y: u32, x: u32) -> Self {
        Self { y, x }
    }
}

/// Which team an event or pixel belongs to, relative to the capturing player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Team,
    Opponent,
    Unknown,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Team => "team",
            Side::Opponent => "opponent",
            Side::Unknown => "unknown",
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Team => Side::Opponent,
            Side::Opponent => Side::Team,
            Side::Unknown => Side::Unknown,
        }
    }
}

/// Attack/Defense half assignment. Distinct from [`Side`]: this is the
/// objective role for a round, not the relative team perspective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HalfSide {
    Attack,
    Defense,
}

impl HalfSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            HalfSide::Attack => "Attack",
            HalfSide::Defense => "Defense",
        }
    }

    pub fn opposite(self) -> HalfSide {
        match self {
            HalfSide::Attack => HalfSide::Defense,
            HalfSide::Defense => HalfSide::Attack,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Kill,
    Plant,
    Defuse,
}

/// One timeline row: a kill, plant or defuse. `target` is only populated
/// for kills.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Seconds into the round.
    pub timestamp: u32,
    pub event_type: EventKind,
    pub actor: String,
    pub target: Option<String>,
    pub side: Side,
}

/// Operator (AWP-class weapon) presence in a round's buy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AwpPresence {
    None,
    Team,
    Opponent,
    Both,
}

impl AwpPresence {
    pub fn as_str(&self) -> &'static str {
        match self {
            AwpPresence::None => "none",
            AwpPresence::Team => "team",
            AwpPresence::Opponent => "opponent",
            AwpPresence::Both => "both",
        }
    }
}

/// Bombsite where the spike was planted, when the minimap match is confident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantSite {
    A,
    B,
    C,
    Unclear,
}

impl PlantSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantSite::A => "A",
            PlantSite::B => "B",
            PlantSite::C => "C",
            PlantSite::Unclear => "unclear",
        }
    }
}

/// Soft validation findings attached to a round. These never block
/// assembly or export; they mark data a reviewer should double-check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundFlag {
    /// Kill totals are positive but no events were recorded.
    KillsWithoutEvents,
    /// First-blood side is known but no first-blood player was resolved.
    FirstBloodUnresolved,
    /// `plant` is set without a plant-type event in the list.
    PlantWithoutEvent,
    /// `defuse` is set without a defuse-type event in the list.
    DefuseWithoutEvent,
    /// Processing failed; the round carries placeholder values.
    ProcessingFailed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Round {
    /// 1-based round number.
    pub round_number: u32,
    /// Chronologically ordered events.
    pub events: Vec<Event>,
    /// "win" or "loss" from this team's perspective.
    pub outcome: String,
    pub side: HalfSide,
    pub team_economy: String,
    pub opponent_economy: String,
    pub first_blood: Side,
    pub true_first_blood: bool,
    pub first_blood_player: String,
    pub first_death_player: String,
    pub site: Option<PlantSite>,
    pub plant: bool,
    pub defuse: bool,
    pub awp_info: AwpPresence,
    pub kills_team: u32,
    pub kills_opponent: u32,
    /// Validation findings; empty for a clean round.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<RoundFlag>,
}

impl Round {
    /// A placeholder round emitted when per-round processing fails, so one
    /// bad round never loses the rest of the match.
    pub fn placeholder(round_number: u32, side: HalfSide) -> Self {
        Self {
            round_number,
            events: Vec::new(),
            outcome: "win".to_string(),
            side,
            team_economy: "0".to_string(),
            opponent_economy: "0".to_string(),
            first_blood: Side::Unknown,
            true_first_blood: true,
            first_blood_player: String::new(),
            first_death_player: String::new(),
            site: None,
            plant: false,
            defuse: false,
            awp_info: AwpPresence::None,
            kills_team: 0,
            kills_opponent: 0,
            flags: vec![RoundFlag::ProcessingFailed],
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub map_name: String,
    /// DD/MM/YYYY.
    pub date: String,
    /// Player → agent in scoreboard order: 5 team rows then 5 opponent rows.
    pub players_agents: Vec<(String, String)>,
    /// "X - Y".
    pub final_score: String,
    pub rounds: Vec<Round>,
    pub total_rounds: u32,
}
