//! Timecode parsing and formatting
//!
//! Two textual forms are in use. Metadata rows carry frame-accurate
//! `MM:SS:FF` / `HH:MM:SS:FF` values, while ffmpeg trim arguments use the
//! strict clock form `HH:MM:SS`.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::errors::DomainError;

/// Frame rate of the source recordings
pub const FRAME_RATE: f64 = 30.0;

static CLOCK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d\d):([0-5]\d):([0-5]\d)$").expect("valid clock pattern"));

/// Parse `MM:SS:FF` or `HH:MM:SS:FF` into seconds, rounded to 2 decimals.
pub fn parse_frame_timecode(time_str: &str) -> Result<f64, DomainError> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    let invalid = || {
        DomainError::Format(format!(
            "Incorrect time format: '{}' (valid time formats: MM:SS:FF, HH:MM:SS:FF)",
            time_str
        ))
    };

    let numbers = parts
        .iter()
        .map(|part| part.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<u32>, DomainError>>()?;

    let (hours, minutes, seconds, frames) = match numbers.as_slice() {
        [m, s, f] => (0, *m, *s, *f),
        [h, m, s, f] => (*h, *m, *s, *f),
        _ => return Err(invalid()),
    };

    let total = hours as f64 * 3600.0
        + minutes as f64 * 60.0
        + seconds as f64
        + frames as f64 / FRAME_RATE;
    Ok(round_centis(total))
}

/// Parse the strict `HH:MM:SS` form accepted by the trim command.
pub fn parse_clock_timecode(time_str: &str) -> Result<u32, DomainError> {
    let captures = CLOCK_PATTERN.captures(time_str).ok_or_else(|| {
        DomainError::Format(format!(
            "Incorrect time format: '{}' (valid time format: HH:MM:SS)",
            time_str
        ))
    })?;

    // The pattern guarantees two ASCII digits per group.
    let field = |i: usize| captures[i].parse::<u32>().unwrap_or_default();
    Ok(field(1) * 3600 + field(2) * 60 + field(3))
}

/// Format whole seconds as `HH:MM:SS`.
pub fn format_clock_timecode(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

/// Format seconds as `H:MM:SS`, dropping the fractional part.
pub fn format_card_time(seconds: f64) -> String {
    let total = seconds.max(0.0).trunc() as u64;
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

/// Link markers are written as `MM:SS`; pad them with a zero frame field.
pub fn normalize_link_timestamp(time_str: &str) -> String {
    let trimmed = time_str.trim();
    if trimmed.split(':').count() == 2 {
        format!("{}:00", trimmed)
    } else {
        trimmed.to_string()
    }
}

fn round_centis(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
