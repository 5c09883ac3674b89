// JSON metadata adapter - Loads the video table from a JSON array of rows

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::*;
use crate::domain::model::{MetadataTable, RawRow};
use crate::ports::*;

/// Reads `[{"Id": 1, "Name": "...", "Start": "...", ...}, ...]`
#[derive(Debug, Clone)]
pub struct JsonMetadataAdapter {
    path: PathBuf,
}

impl JsonMetadataAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse table contents; scalars become text cells, nulls are dropped
    pub fn parse(content: &str) -> Result<MetadataTable, DomainError> {
        let parsed: Vec<serde_json::Map<String, Value>> = serde_json::from_str(content)
            .map_err(|e| DomainError::Schema(format!("Failed to parse metadata JSON: {}", e)))?;

        let rows = parsed
            .into_iter()
            .map(|object| {
                object
                    .into_iter()
                    .filter_map(|(column, value)| cell_text(value).map(|text| (column, text)))
                    .collect::<RawRow>()
            })
            .collect();

        Ok(MetadataTable::from_rows(rows))
    }
}

fn cell_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        // Nested values are kept as their JSON text
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl MetadataSource for JsonMetadataAdapter {
    async fn load(&self) -> Result<MetadataTable, DomainError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::NotFound(format!(
                "Failed to read metadata file {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::VideoTable;

    #[test]
    fn test_parse_rows() {
        let table = JsonMetadataAdapter::parse(
            r#"[
                {"Id": 1, "Name": "Squats", "Start": "00:00:10\n00:01:00", "End": "00:00:50\n00:01:40", "Tags": null},
                {"Id": 2.0, "Name": "Lunges", "Start": "00:00:00", "End": "00:00:30"}
            ]"#,
        )
        .unwrap();

        assert_eq!(table.rows().len(), 2);
        assert!(table.has_column("Start"));
        assert!(!table.has_column("Tags"));
        assert_eq!(table.rows()[0]["Id"], "1");

        let videos = VideoTable::from_metadata(&table).unwrap();
        assert_eq!(videos.video_ids(), vec![1, 2]);
        assert_eq!(videos.video(1).unwrap().clips.len(), 2);
    }

    #[test]
    fn test_parse_rejects_non_table_json() {
        assert!(matches!(
            JsonMetadataAdapter::parse(r#"{"Id": 1}"#),
            Err(DomainError::Schema(_))
        ));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let adapter = JsonMetadataAdapter::new("does/not/exist.json");
        assert!(matches!(adapter.load().await, Err(DomainError::NotFound(_))));
    }
}
