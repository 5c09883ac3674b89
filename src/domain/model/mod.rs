// Domain models - Metadata rows, source videos and derived clips

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::errors::DomainError;
use crate::domain::links;
use crate::domain::timecode::parse_frame_timecode;

/// Column names of the metadata table
pub mod columns {
    pub const ID: &str = "Id";
    pub const NAME: &str = "Name";
    pub const START: &str = "Start";
    pub const END: &str = "End";
    pub const CLIPS: &str = "Clips";
    pub const LINKS: &str = "Links";
    pub const EXERCISE_LINK: &str = "ExerciseLink";
    pub const SHORT_LINK: &str = "ShortLink";
    pub const TAGS: &str = "Tags";
    pub const YOUTUBE_LINK: &str = "YoutubeLink";

    /// Columns every table must carry
    pub const REQUIRED: &[&str] = &[ID, NAME, START, END];

    /// Newline-delimited columns aligned with `Start`/`End` by clip index
    pub const POSITIONAL: &[&str] = &[CLIPS, EXERCISE_LINK, SHORT_LINK];
}

/// The only container extension the pipeline reads and writes
pub const VIDEO_EXTENSION: &str = "mp4";

/// One metadata row, cells kept as text
pub type RawRow = BTreeMap<String, String>;

/// Untyped metadata table as supplied by a metadata source
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    columns: Vec<String>,
    rows: Vec<RawRow>,
}

impl MetadataTable {
    /// Create a table with an explicit column list
    pub fn new(columns: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { columns, rows }
    }

    /// Create a table whose columns are the union of the row keys, in first-seen order
    pub fn from_rows(rows: Vec<RawRow>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Table-level check: every listed column exists
    pub fn require_columns(&self, required: &[&str]) -> Result<(), DomainError> {
        for column in required {
            if !self.has_column(column) {
                return Err(DomainError::Schema(format!("Column '{}' not found!", column)));
            }
        }
        Ok(())
    }

    /// Table-level check: values of `column` are unique across rows
    pub fn require_unique(&self, column: &str) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        let mut duplicates: Vec<&str> = Vec::new();
        for row in &self.rows {
            if let Some(value) = row.get(column) {
                if !seen.insert(value.as_str()) && !duplicates.contains(&value.as_str()) {
                    duplicates.push(value);
                }
            }
        }

        if duplicates.is_empty() {
            Ok(())
        } else {
            Err(DomainError::DuplicateKey(format!(
                "Duplicates found in '{}': {:?}",
                column, duplicates
            )))
        }
    }
}

/// Row-level check: the field exists on this row
pub fn row_field<'a>(row: &'a RawRow, column: &str) -> Result<&'a str, DomainError> {
    row.get(column)
        .map(String::as_str)
        .ok_or_else(|| DomainError::Schema(format!("Column '{}' not found!", column)))
}

/// Row-level lookup of an optional field; blank cells count as absent
pub fn optional_field<'a>(row: &'a RawRow, column: &str) -> Option<&'a str> {
    row.get(column)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

/// One entry per `\n`-separated line; a blank cell has none
fn split_entries(cell: &str) -> Vec<String> {
    if cell.trim().is_empty() {
        return Vec::new();
    }
    cell.split('\n').map(|line| line.trim().to_string()).collect()
}

fn parse_id(raw: &str) -> Result<u32, DomainError> {
    let trimmed = raw.trim();
    if let Ok(id) = trimmed.parse::<u32>() {
        return Ok(id);
    }
    // Spreadsheet exports sometimes render integer ids as floats ("3.0").
    match trimmed.parse::<f64>() {
        Ok(value) if value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 => {
            Ok(value as u32)
        }
        _ => Err(DomainError::Schema(format!("Invalid video Id: '{}'", raw))),
    }
}

/// Per-clip slice of a source video row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipSpec {
    pub index: usize,
    pub start: String,
    pub end: String,
    pub label: Option<String>,
    pub exercise_link: Option<String>,
    pub short_link: Option<String>,
}

/// One source recording and its clips
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceVideo {
    pub id: u32,
    pub name: String,
    pub clips: Vec<ClipSpec>,
    pub links: Vec<String>,
    pub tags: Option<String>,
    pub youtube_link: Option<String>,
}

impl SourceVideo {
    /// Build a source video from a raw row, aligning the per-clip columns once
    pub fn from_row(row: &RawRow) -> Result<Self, DomainError> {
        let id = parse_id(row_field(row, columns::ID)?)?;
        let name = row_field(row, columns::NAME)?.trim().to_string();
        let starts = split_entries(row_field(row, columns::START)?);
        let ends = split_entries(row_field(row, columns::END)?);

        if starts.len() != ends.len() {
            return Err(DomainError::Schema(format!(
                "Video {}: column '{}' has {} entries, expected {} (from '{}')",
                id,
                columns::END,
                ends.len(),
                starts.len(),
                columns::START
            )));
        }

        let mut positional: HashMap<&str, Vec<String>> = HashMap::new();
        for &column in columns::POSITIONAL {
            if let Some(cell) = row.get(column).filter(|cell| !cell.trim().is_empty()) {
                let entries = split_entries(cell);
                if entries.len() != starts.len() {
                    return Err(DomainError::Schema(format!(
                        "Video {}: column '{}' has {} entries, expected {} (from '{}')",
                        id,
                        column,
                        entries.len(),
                        starts.len(),
                        columns::START
                    )));
                }
                positional.insert(column, entries);
            }
        }

        let pick = |column: &str, index: usize| {
            positional
                .get(column)
                .and_then(|entries| entries.get(index))
                .filter(|value| !value.is_empty())
                .cloned()
        };

        let clips = starts
            .into_iter()
            .zip(ends)
            .enumerate()
            .map(|(index, (start, end))| ClipSpec {
                index,
                start,
                end,
                label: pick(columns::CLIPS, index),
                exercise_link: pick(columns::EXERCISE_LINK, index),
                short_link: pick(columns::SHORT_LINK, index),
            })
            .collect();

        Ok(Self {
            id,
            name,
            clips,
            links: optional_field(row, columns::LINKS)
                .map(split_entries)
                .unwrap_or_default(),
            tags: optional_field(row, columns::TAGS).map(str::to_string),
            youtube_link: optional_field(row, columns::YOUTUBE_LINK).map(str::to_string),
        })
    }

    /// Look up a clip by index
    pub fn clip(&self, index: usize) -> Result<&ClipSpec, DomainError> {
        self.clips.get(index).ok_or_else(|| {
            DomainError::NotFound(format!("Clip #{} not found for Video ID {}!", index, self.id))
        })
    }
}

/// Validated, read-only table of source videos keyed by id
#[derive(Debug, Clone, Default)]
pub struct VideoTable {
    videos: Vec<SourceVideo>,
    index: HashMap<u32, usize>,
}

impl VideoTable {
    /// Validate a raw metadata table and build the typed records
    pub fn from_metadata(table: &MetadataTable) -> Result<Self, DomainError> {
        table.require_columns(columns::REQUIRED)?;
        table.require_unique(columns::ID)?;
        Self::from_videos(
            table
                .rows()
                .iter()
                .map(SourceVideo::from_row)
                .collect::<Result<Vec<_>, _>>()?,
        )
    }

    /// Build a table from already typed records
    pub fn from_videos(videos: Vec<SourceVideo>) -> Result<Self, DomainError> {
        let mut index = HashMap::with_capacity(videos.len());
        for (position, video) in videos.iter().enumerate() {
            if index.insert(video.id, position).is_some() {
                return Err(DomainError::DuplicateKey(format!(
                    "Duplicates found in '{}': [\"{}\"]",
                    columns::ID,
                    video.id
                )));
            }
        }
        Ok(Self { videos, index })
    }

    pub fn videos(&self) -> &[SourceVideo] {
        &self.videos
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Look up a video by id
    pub fn video(&self, video_id: u32) -> Result<&SourceVideo, DomainError> {
        self.index
            .get(&video_id)
            .map(|&position| &self.videos[position])
            .ok_or_else(|| DomainError::NotFound(format!("Video ID {} not found in metadata!", video_id)))
    }

    /// Ids of all videos in table order
    pub fn video_ids(&self) -> Vec<u32> {
        self.videos.iter().map(|video| video.id).collect()
    }

    /// Derive clip records for the given videos, numbering them globally in
    /// video-then-clip order
    pub fn derive_clips(
        &self,
        video_ids: &[u32],
        layout: &OutputLayout,
    ) -> Result<Vec<DerivedClip>, DomainError> {
        let mut derived = Vec::new();
        for &video_id in video_ids {
            let video = self.video(video_id)?;
            if video.clips.is_empty() {
                return Err(DomainError::NotFound(format!(
                    "No clips found for Video ID {}!",
                    video_id
                )));
            }

            for clip in &video.clips {
                let start_seconds = parse_frame_timecode(&clip.start)?;
                let end_seconds = parse_frame_timecode(&clip.end)?;

                derived.push(DerivedClip {
                    id: derived.len(),
                    video_id,
                    clip_index: clip.index,
                    label: clip.label.clone(),
                    start_seconds,
                    end_seconds,
                    raw_output_path: layout.raw_clip_path(video_id, clip.index),
                    final_output_path: layout.final_clip_path(video_id, clip.index),
                });
            }
        }
        Ok(derived)
    }

    /// Card labels for one derived clip
    pub fn card_links_for(&self, clip: &DerivedClip) -> Result<Vec<String>, DomainError> {
        links::card_links(self, clip.video_id, clip.start_seconds, clip.end_seconds)
    }
}

/// Computed per-clip record; rebuilt on every run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedClip {
    pub id: usize,
    pub video_id: u32,
    pub clip_index: usize,
    pub label: Option<String>,
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub raw_output_path: PathBuf,
    pub final_output_path: PathBuf,
}

/// Suffix appended to a file stem when deriving output names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSuffix {
    /// Zero-padded to width 2
    Index(u32),
    /// Used verbatim; empty leaves the name unchanged
    Label(String),
}

impl From<u32> for OutputSuffix {
    fn from(index: u32) -> Self {
        OutputSuffix::Index(index)
    }
}

impl From<&str> for OutputSuffix {
    fn from(label: &str) -> Self {
        OutputSuffix::Label(label.to_string())
    }
}

impl TryFrom<&toml::Value> for OutputSuffix {
    type Error = DomainError;

    fn try_from(value: &toml::Value) -> Result<Self, Self::Error> {
        match value {
            toml::Value::Integer(index) => u32::try_from(*index)
                .map(OutputSuffix::Index)
                .map_err(|_| DomainError::Validation(format!("Invalid suffix index: {}", index))),
            toml::Value::String(label) => Ok(OutputSuffix::Label(label.clone())),
            other => Err(DomainError::Validation(format!(
                "Unsupported suffix type: {} (expected integer or string)",
                other.type_str()
            ))),
        }
    }
}

/// `<dir>/<stem>_<suffix>.<ext>`; an empty label returns the path unchanged
pub fn output_file_path(file: &Path, suffix: &OutputSuffix) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let name = match suffix {
        OutputSuffix::Index(index) => format!("{}_{:02}", stem, index),
        OutputSuffix::Label(label) if label.is_empty() => return file.to_path_buf(),
        OutputSuffix::Label(label) => format!("{}_{}", stem, label),
    };

    match file.extension() {
        Some(ext) => file.with_file_name(format!("{}.{}", name, ext.to_string_lossy())),
        None => file.with_file_name(name),
    }
}

/// Directory layout used to derive artifact paths
#[derive(Debug, Clone, PartialEq)]
pub struct OutputLayout {
    pub temp_dir: PathBuf,
    pub output_dir: PathBuf,
    pub assembled_suffix: OutputSuffix,
}

impl OutputLayout {
    /// `<temp>/<videoId>_<clipIndex:02>.mp4`
    pub fn raw_clip_path(&self, video_id: u32, clip_index: usize) -> PathBuf {
        let base = self
            .temp_dir
            .join(format!("{}.{}", video_id, VIDEO_EXTENSION));
        output_file_path(&base, &OutputSuffix::Index(clip_index as u32))
    }

    /// `<output>/<videoId>_<clipIndex:02>[_<suffix>].mp4`
    pub fn final_clip_path(&self, video_id: u32, clip_index: usize) -> PathBuf {
        let base = self
            .output_dir
            .join(format!("{}_{:02}.{}", video_id, clip_index, VIDEO_EXTENSION));
        output_file_path(&base, &self.assembled_suffix)
    }

    /// Per-clip concat list path inside the temp directory
    pub fn file_list_path(&self, video_id: u32, clip_index: usize) -> PathBuf {
        self.temp_dir
            .join(format!("{}_{:02}_files.txt", video_id, clip_index))
    }
}
