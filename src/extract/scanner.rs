//! Round event scanning.
//!
//! Walks a timeline image top to bottom looking for colored event rows,
//! and turns each into a raw event: timestamp, side, kill/plant/defuse,
//! and the killer/victim sprite indices. Rows come out in scan order,
//! which is not necessarily chronological; the assembler re-sorts.

use image::RgbImage;

use crate::extract::layout::TimelineLayout;
use crate::extract::text::normalize_timestamp;
use crate::ocr::{ReadOptions, TextReader};
use crate::types::{EventKind, ImageRegion, Position, Side};
use crate::vision::{best_match, classify_side, crop, is_dark, match_scores, sample};

/// One detected timeline row, before player-name resolution.
#[derive(Clone, Debug, PartialEq)]
pub struct RawEvent {
    pub timestamp: u32,
    pub side: Side,
    pub kind: EventKind,
    /// Index into the 10-sprite set (0-4 team, 5-9 opponent).
    pub killer_index: usize,
    pub victim_index: usize,
}

pub struct EventScanner<'a> {
    reader: &'a dyn TextReader,
    layout: TimelineLayout,
}

impl<'a> EventScanner<'a> {
    pub fn new(reader: &'a dyn TextReader) -> Self {
        Self::with_layout(reader, TimelineLayout::default())
    }

    pub fn with_layout(reader: &'a dyn TextReader, layout: TimelineLayout) -> Self {
        Self { reader, layout }
    }

    /// Scans one round's timeline image. `sprites` is the 10-agent
    /// reference set in scoreboard order.
    ///
    /// An unreadable timestamp skips that row and keeps scanning; one bad
    /// row must not lose the rest of the round.
    pub fn scan(&self, timeline: &RgbImage, sprites: &[RgbImage]) -> Vec<RawEvent> {
        let l = &self.layout;
        let mut events = Vec::new();
        let mut y = l.start_y;

        while y < l.end_y {
            let (b, g, r) = sample(timeline, Position::new(y, l.scan_x));
            if is_dark(b, g, r) {
                y += 1;
                continue;
            }

            let side = classify_side(b, g, r);

            let timestamp_tokens = self.read_region(
                timeline,
                ImageRegion::new(y, y + l.row_height, l.timestamp_x.0, l.timestamp_x.1),
            );
            let Some(raw_timestamp) = timestamp_tokens.first() else {
                log::warn!("Event row at y={} has no readable timestamp, skipping", y);
                y += l.row_height;
                continue;
            };
            // The clock shows "N/A" when the round timer was not captured;
            // genuine reads start with a digit.
            if raw_timestamp.starts_with('N') {
                log::warn!(
                    "Event row at y={} has unreadable timestamp {:?}, skipping",
                    y, raw_timestamp
                );
                y += l.row_height;
                continue;
            }
            let timestamp = normalize_timestamp(raw_timestamp);

            let type_tokens = self.read_region(
                timeline,
                ImageRegion::new(y, y + l.row_height, l.event_type_x.0, l.event_type_x.1),
            );
            let kind = classify_event_kind(&type_tokens);

            let killer_icon = crop(
                timeline,
                ImageRegion::new(y, y + l.icon_size, l.killer_icon_x, l.killer_icon_x + l.icon_size),
            );
            let victim_icon = crop(
                timeline,
                ImageRegion::new(y, y + l.icon_size, l.victim_icon_x, l.victim_icon_x + l.icon_size),
            );

            let killer_index = resolve_sprite(&killer_icon, sprites, side);
            let victim_index = resolve_sprite(&victim_icon, sprites, side.opposite());

            log::debug!(
                "Event at y={}: t={}s side={:?} kind={:?} killer={} victim={}",
                y, timestamp, side, kind, killer_index, victim_index
            );
            events.push(RawEvent { timestamp, side, kind, killer_index, victim_index });

            y += l.row_height;
        }

        events
    }

    fn read_region(&self, timeline: &RgbImage, region: ImageRegion) -> Vec<String> {
        let cropped = crop(timeline, region);
        match self.reader.read_text(&cropped, &ReadOptions::default()) {
            Ok(tokens) => tokens,
            Err(err) => {
                log::warn!("OCR failed on timeline region: {:#}", err);
                Vec::new()
            }
        }
    }
}

/// "Planted"/"Defused" text wins over everything else; a row with neither
/// is a kill.
fn classify_event_kind(tokens: &[String]) -> EventKind {
    if tokens.iter().any(|t| t.contains("Plant")) {
        EventKind::Plant
    } else if tokens.iter().any(|t| t.contains("Defuse")) {
        EventKind::Defuse
    } else {
        EventKind::Kill
    }
}

/// Sprite matching with side-aware disambiguation: prefer the best match
/// among the sprites on the expected side (team 0-4, opponent 5-9), fall
/// back to the overall best when the side is unknown or the set is not
/// the usual ten.
fn resolve_sprite(icon: &RgbImage, sprites: &[RgbImage], expected_side: Side) -> usize {
    if sprites.len() != 10 {
        return best_match(icon, sprites);
    }
    let range = match expected_side {
        Side::Team => 0..5,
        Side::Opponent => 5..10,
        Side::Unknown => return best_match(icon, sprites),
    };
    let scores = match_scores(icon, sprites);
    range
        .map(|i| (i, scores[i]))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::QueuedReader;
    use image::Rgb;

    fn test_layout() -> TimelineLayout {
        TimelineLayout {
            scan_x: 5,
            start_y: 0,
            end_y: 100,
            row_height: 10,
            killer_icon_x: 10,
            victim_icon_x: 30,
            icon_size: 10,
            timestamp_x: (50, 60),
            event_type_x: (70, 90),
        }
    }

    fn sprite(seed: u32) -> RgbImage {
        RgbImage::from_fn(10, 10, |x, y| {
            let v = ((x * 13 + y * 29 + seed * 71) % 251) as u8;
            Rgb([v, v.wrapping_mul(5), v.wrapping_add(60)])
        })
    }

    fn sprite_set() -> Vec<RgbImage> {
        (0..10).map(sprite).collect()
    }

    /// Dark timeline with one event band at `row_y`, colored for `side`,
    /// killer icon from sprite `killer`, victim icon from sprite `victim`.
    fn timeline_with_band(row_y: u32, team: bool, killer: u32, victim: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(100, 100, Rgb([10, 10, 10]));
        let color = if team { Rgb([34, 255, 198]) } else { Rgb([255, 70, 85]) };
        for y in row_y..row_y + 10 {
            for x in 0..10 {
                img.put_pixel(x, y, color);
            }
        }
        image::imageops::overlay(&mut img, &sprite(killer), 10, row_y as i64);
        image::imageops::overlay(&mut img, &sprite(victim), 30, row_y as i64);
        img
    }

    #[test]
    fn test_clean_kill_row() {
        let timeline = timeline_with_band(40, true, 2, 7);
        // One timestamp read, one event-type read (empty: defaults to kill)
        let reader = QueuedReader::new([vec!["0:45"], vec![]]);
        let scanner = EventScanner::with_layout(&reader, test_layout());

        let events = scanner.scan(&timeline, &sprite_set());
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.timestamp, 45);
        assert_eq!(event.side, Side::Team);
        assert_eq!(event.kind, EventKind::Kill);
        assert_eq!(event.killer_index, 2);
        assert_eq!(event.victim_index, 7);
    }

    #[test]
    fn test_unreadable_timestamp_skips_row_and_continues() {
        let mut timeline = timeline_with_band(20, true, 1, 6);
        // Second band further down
        let second = timeline_with_band(60, false, 7, 3);
        image::imageops::overlay(&mut timeline, &image::imageops::crop_imm(&second, 0, 55, 100, 20).to_image(), 0, 55);

        // First band: empty timestamp (skipped, no type read happens).
        // Second band: readable timestamp, empty type.
        let reader = QueuedReader::new([vec![], vec!["0:30"], vec![]]);
        let scanner = EventScanner::with_layout(&reader, test_layout());

        let events = scanner.scan(&timeline, &sprite_set());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].timestamp, 30);
        assert_eq!(events[0].side, Side::Opponent);
    }

    #[test]
    fn test_na_clock_reading_skips_row() {
        let timeline = timeline_with_band(20, true, 2, 7);
        // Clock rendered "N/A": the row is dropped, no type read happens.
        let reader = QueuedReader::new([vec!["N/A"]]);
        let scanner = EventScanner::with_layout(&reader, test_layout());

        let events = scanner.scan(&timeline, &sprite_set());
        assert!(events.is_empty());
    }

    #[test]
    fn test_planted_text_wins_over_kill() {
        let timeline = timeline_with_band(40, true, 2, 7);
        let reader = QueuedReader::new([vec!["0:12"], vec!["Spike Planted"]]);
        let scanner = EventScanner::with_layout(&reader, test_layout());

        let events = scanner.scan(&timeline, &sprite_set());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Plant);
    }

    #[test]
    fn test_defused_text_classifies_defuse() {
        let timeline = timeline_with_band(40, true, 2, 7);
        let reader = QueuedReader::new([vec!["0:50"], vec!["Spike Defused"]]);
        let scanner = EventScanner::with_layout(&reader, test_layout());

        let events = scanner.scan(&timeline, &sprite_set());
        assert_eq!(events[0].kind, EventKind::Defuse);
    }

    #[test]
    fn test_side_constrains_sprite_choice() {
        // Killer icon drawn from an opponent sprite (7), but the row is
        // team-colored: the killer must resolve within team indices 0-4.
        let timeline = timeline_with_band(40, true, 7, 7);
        let reader = QueuedReader::new([vec!["0:10"], vec![]]);
        let scanner = EventScanner::with_layout(&reader, test_layout());

        let events = scanner.scan(&timeline, &sprite_set());
        assert!(events[0].killer_index < 5);
        // Victim side is the opposite of the event side, so 7 stands.
        assert_eq!(events[0].victim_index, 7);
    }

    #[test]
    fn test_all_dark_image_yields_nothing() {
        let timeline = RgbImage::from_pixel(100, 100, Rgb([10, 10, 10]));
        let reader = QueuedReader::new(Vec::<Vec<String>>::new());
        let scanner = EventScanner::with_layout(&reader, test_layout());
        assert!(scanner.scan(&timeline, &sprite_set()).is_empty());
    }

    #[test]
    fn test_scan_order_is_top_to_bottom_not_chronological() {
        let mut timeline = timeline_with_band(20, true, 1, 6);
        let second = timeline_with_band(60, true, 2, 7);
        image::imageops::overlay(&mut timeline, &image::imageops::crop_imm(&second, 0, 55, 100, 20).to_image(), 0, 55);

        // Upper row has the LATER timestamp
        let reader = QueuedReader::new([vec!["0:50"], vec![], vec!["0:10"], vec![]]);
        let scanner = EventScanner::with_layout(&reader, test_layout());

        let events = scanner.scan(&timeline, &sprite_set());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].timestamp, 50);
        assert_eq!(events[1].timestamp, 10);
    }
}
