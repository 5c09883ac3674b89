//! Card links: timestamps inside a clip that point at another video
//!
//! Each source video carries raw `"<MM:SS> - <targetVideoId>"` lines. Entries
//! that cannot be read as links are skipped; a link whose timecode is
//! malformed is an error.

use crate::domain::errors::DomainError;
use crate::domain::model::VideoTable;
use crate::domain::timecode::{format_card_time, normalize_link_timestamp, parse_frame_timecode};

/// Length of the standard intro prepended during assembly
pub const LEAD_IN_SECONDS: f64 = 4.0;

/// A link entry that passed the structural filters
#[derive(Debug, Clone, PartialEq)]
pub struct LinkEntry<'a> {
    pub timestamp: &'a str,
    pub target_id: u32,
}

/// Split one raw entry into timestamp and positive target id.
/// Returns `None` for entries that are not links.
pub fn parse_link_entry(raw: &str) -> Option<LinkEntry<'_>> {
    let (timestamp, target) = raw.trim().split_once('-')?;
    let target_id = target.trim().parse::<u32>().ok().filter(|id| *id > 0)?;
    Some(LinkEntry {
        timestamp: timestamp.trim(),
        target_id,
    })
}

/// Card labels for the clip spanning `[clip_start, clip_end]` of video `video_id`
pub fn card_links(
    table: &VideoTable,
    video_id: u32,
    clip_start: f64,
    clip_end: f64,
) -> Result<Vec<String>, DomainError> {
    let video = table.video(video_id)?;
    let mut labels = Vec::new();

    for entry in video.links.iter().filter_map(|raw| parse_link_entry(raw)) {
        let link_seconds = parse_frame_timecode(&normalize_link_timestamp(entry.timestamp))?;
        if link_seconds < clip_start || link_seconds > clip_end {
            continue;
        }

        let target = table.video(entry.target_id)?;
        let offset = link_seconds - clip_start + LEAD_IN_SECONDS;
        labels.push(format!(
            "{} - {}. {}",
            format_card_time(offset),
            entry.target_id,
            target.name
        ));
    }

    Ok(labels)
}

/// Newline-joined label block; empty when there are no labels
pub fn join_card_links(labels: &[String]) -> String {
    labels.join("\n")
}

#[cfg(test)]
mod tests;
