//! Normalization of noisy OCR text: round-clock timestamps and
//! agent/map names.

use anyhow::Result;
use edit_distance::edit_distance;

use crate::prompt::Resolver;

/// Characters OCR drops into clock strings in place of digits or
/// separators.
const CLOCK_NOISE: &[char] = &['.', ':', 'T', 'l'];

/// Parses a round-clock string ("0:45", "1:20", "N/A") into seconds.
///
/// The clock never reaches 2:00, so the leading character decides the
/// minute: `0` means seconds only, `1` adds 60. `N` is the UI's
/// not-available sentinel. Anything unparsable degrades to the minute
/// floor rather than failing.
pub fn normalize_timestamp(raw: &str) -> u32 {
    let raw = raw.trim();
    let Some(first) = raw.chars().next() else {
        return 0;
    };

    let digits_after_first = |s: &str| -> Option<u32> {
        let cleaned: String = s
            .chars()
            .skip(1)
            .filter(|c| !CLOCK_NOISE.contains(c))
            .filter(char::is_ascii_digit)
            .collect();
        cleaned.parse().ok()
    };

    match first {
        'N' => 0,
        '0' => digits_after_first(raw).unwrap_or(0),
        '1' => digits_after_first(raw).map(|s| s + 60).unwrap_or(60),
        _ => raw.chars().filter(char::is_ascii_digit).collect::<String>().parse().unwrap_or(0),
    }
}

/// Case-insensitive similarity in [0, 1] based on edit distance.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(&a, &b) as f64 / max_len as f64
}

/// The one agent name OCR can never read correctly: the slash goes
/// missing. Rewritten before any generic matching.
fn fix_known_confusions(raw: &str) -> Option<&'static str> {
    if raw.eq_ignore_ascii_case("kayo") || raw.eq_ignore_ascii_case("kay0") {
        Some("KAY/O")
    } else {
        None
    }
}

/// Normalizes a noisy OCR name against the valid list.
///
/// Exact case-insensitive hits return the canonical spelling. Otherwise
/// the closest valid name wins if its similarity reaches `cutoff`; below
/// that, the resolver is asked rather than silently guessing, because a
/// misattributed agent is worse than pausing for input. The correction is
/// itself checked against the list case-insensitively, then used as-is.
pub fn normalize_name(
    raw: &str,
    valid: &[String],
    cutoff: f64,
    resolver: &dyn Resolver,
    context: &str,
) -> Result<String> {
    let raw = raw.trim();

    if let Some(fixed) = fix_known_confusions(raw) {
        return Ok(fixed.to_string());
    }
    if let Some(exact) = valid.iter().find(|name| name.eq_ignore_ascii_case(raw)) {
        return Ok(exact.clone());
    }

    let best = valid
        .iter()
        .map(|name| (name, similarity(raw, name)))
        .max_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((name, score)) = best {
        if score >= cutoff {
            log::debug!("Fuzzy-matched '{}' to '{}' ({:.2})", raw, name, score);
            return Ok(name.clone());
        }
    }

    let corrected = resolver.resolve(
        &format!("Could not recognize '{raw}'. Please enter the correct name:"),
        context,
    )?;
    if corrected.trim().is_empty() {
        log::warn!("No correction given for '{}', keeping the raw reading", raw);
        return Ok(raw.to_string());
    }
    if let Some(fixed) = fix_known_confusions(&corrected) {
        return Ok(fixed.to_string());
    }
    if let Some(exact) = valid.iter().find(|name| name.eq_ignore_ascii_case(&corrected)) {
        return Ok(exact.clone());
    }
    log::warn!("Manual correction '{}' is not in the valid list, using as-is", corrected);
    Ok(corrected)
}
