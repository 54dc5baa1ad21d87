//! Fixed screen coordinates for the 1920x1080 post-match UI.
//!
//! Every region the pipeline reads is listed here rather than scattered
//! through the extraction code. The coordinates are tuned to one UI
//! version and resolution; nothing here adapts to other layouts.

use crate::types::{ImageRegion, Position};

/// Hard cap on any downward row-boundary scan. Color noise can keep a scan
/// condition from ever triggering, so every scan loop is bounded.
pub const SCAN_CAP: u32 = 250;

// Player name/agent rows, read off the first timeline image.
pub const PLAYER_SCAN_X: u32 = 200;
pub const TEAM_PLAYER_START_Y: u32 = 495;
pub const OPPONENT_PLAYER_START_Y: u32 = 726;
/// Green threshold locating a team player row.
pub const TEAM_PLAYER_MIN_GREEN: u8 = 90;
/// Red threshold locating an opponent player row.
pub const OPPONENT_PLAYER_MIN_RED: u8 = 40;
pub const PLAYER_ROW_HEIGHT: u32 = 40;
/// Row-to-row advance: one row plus the 2px divider.
pub const PLAYER_ROW_ADVANCE: u32 = 42;
pub const PLAYER_NAME_OFFSET_X: u32 = 3;
pub const PLAYER_NAME_WIDTH: u32 = 180;

// Agent icon sprites, cropped from the same scoreboard block.
pub const SPRITE_SCAN_X: u32 = 161;
pub const TEAM_SPRITE_START_Y: u32 = 503;
pub const OPPONENT_SPRITE_START_Y: u32 = 724;
pub const TEAM_SPRITE_MIN_GREEN: u8 = 100;
pub const OPPONENT_SPRITE_MIN_RED: u8 = 80;
pub const SPRITE_SIZE: u32 = 40;

/// Summary page: half-side label ("DEFENSE stars" or attack equivalent).
pub const SIDES_REGION: ImageRegion = ImageRegion::new(300, 400, 1300, 1500);
/// Summary page: final score banner ("13  WIN  7").
pub const SCORE_REGION: ImageRegion = ImageRegion::new(70, 170, 700, 1150);
/// Timeline page: map name label.
pub const MAP_NAME_REGION: ImageRegion = ImageRegion::new(125, 145, 120, 210);
/// Timeline page: round outcome banner.
pub const OUTCOME_REGION: ImageRegion = ImageRegion::new(430, 470, 130, 700);
/// Timeline page: team/opponent loadout value column.
pub const ECONOMY_REGION: ImageRegion = ImageRegion::new(425, 480, 1020, 1145);
/// Timeline page: weapon list scanned for "Operator" tokens.
pub const AWP_REGION: ImageRegion = ImageRegion::new(450, 950, 650, 785);
/// Timeline page: minimap, searched for the planted spike icon.
pub const MINIMAP_REGION: ImageRegion = ImageRegion::new(490, 990, 1270, 1770);
/// Timeline page: pixel whose color gives the first-blood side.
pub const FIRST_BLOOD_POS: Position = Position::new(520, 1150);

/// Geometry of the event timeline column. A struct rather than bare
/// constants so scanner tests can run on small synthetic images.
#[derive(Clone, Copy, Debug)]
pub struct TimelineLayout {
    /// Column sampled to detect an event row.
    pub scan_x: u32,
    /// First row of the timeline column.
    pub start_y: u32,
    /// Scanning stops once the cursor passes this row.
    pub end_y: u32,
    /// Height of one event row.
    pub row_height: u32,
    /// Left edge of the killer-side agent icon.
    pub killer_icon_x: u32,
    /// Left edge of the victim-side agent icon.
    pub victim_icon_x: u32,
    /// Icon crops are square with this side length.
    pub icon_size: u32,
    /// Timestamp text column (x_start, x_end).
    pub timestamp_x: (u32, u32),
    /// Event-type text column (x_start, x_end).
    pub event_type_x: (u32, u32),
}

impl Default for TimelineLayout {
    fn default() -> Self {
        Self {
            scan_x: 940,
            start_y: 500,
            end_y: 1060,
            row_height: 36,
            killer_icon_x: 945,
            victim_icon_x: 1231,
            icon_size: 36,
            timestamp_x: (980, 1040),
            event_type_x: (1150, 1230),
        }
    }
}
