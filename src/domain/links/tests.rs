// Unit tests for card link generation

use super::*;
use crate::domain::model::{ClipSpec, SourceVideo};

fn video(id: u32, name: &str, links: &[&str]) -> SourceVideo {
    SourceVideo {
        id,
        name: name.to_string(),
        clips: vec![ClipSpec {
            index: 0,
            start: "00:00:00".to_string(),
            end: "05:00:00".to_string(),
            label: None,
            exercise_link: None,
            short_link: None,
        }],
        links: links.iter().map(|l| l.to_string()).collect(),
        tags: None,
        youtube_link: None,
    }
}

fn table(links: &[&str]) -> VideoTable {
    VideoTable::from_videos(vec![
        video(1, "Full body workout", links),
        video(5, "Hip mobility", &[]),
        video(7, "Core basics", &[]),
    ])
    .unwrap()
}

#[test]
fn test_link_inside_clip_produces_label() {
    let labels = card_links(&table(&["0:20 - 5"]), 1, 10.0, 100.0).unwrap();
    assert_eq!(labels, vec!["0:00:14 - 5. Hip mobility".to_string()]);
}

#[test]
fn test_link_before_or_after_clip_is_dropped() {
    let t = table(&["0:05 - 5", "1:41 - 7"]);
    assert!(card_links(&t, 1, 10.0, 100.0).unwrap().is_empty());
}

#[test]
fn test_clip_bounds_are_inclusive() {
    let t = table(&["0:10 - 5", "1:40 - 7"]);
    let labels = card_links(&t, 1, 10.0, 100.0).unwrap();
    assert_eq!(
        labels,
        vec!["0:00:04 - 5. Hip mobility".to_string(), "0:01:34 - 7. Core basics".to_string()]
    );
}

#[test]
fn test_malformed_entries_are_filtered() {
    let t = table(&["", "0:20 5", "0:20 - five", "0:20 - 0", "0:30 - -3", "0:40 - 7"]);
    let labels = card_links(&t, 1, 10.0, 100.0).unwrap();
    assert_eq!(labels, vec!["0:00:34 - 7. Core basics".to_string()]);
}

#[test]
fn test_malformed_timecode_propagates() {
    let err = card_links(&table(&["ab:cd - 5"]), 1, 10.0, 100.0).unwrap_err();
    assert!(matches!(err, DomainError::Format(_)));
}

#[test]
fn test_missing_target_video_is_not_found() {
    let err = card_links(&table(&["0:20 - 42"]), 1, 10.0, 100.0).unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[test]
fn test_unknown_source_video_is_not_found() {
    assert!(matches!(
        card_links(&table(&[]), 99, 0.0, 10.0),
        Err(DomainError::NotFound(_))
    ));
}

#[test]
fn test_parse_link_entry() {
    assert_eq!(
        parse_link_entry(" 12:05 - 3 "),
        Some(LinkEntry { timestamp: "12:05", target_id: 3 })
    );
    assert_eq!(parse_link_entry("12:05"), None);
    assert_eq!(parse_link_entry("12:05 - 3.5"), None);
}

#[test]
fn test_join_card_links() {
    assert_eq!(join_card_links(&[]), "");
    assert_eq!(
        join_card_links(&["a".to_string(), "b".to_string()]),
        "a\nb"
    );
}
