// Local filesystem adapter - artifact presence, deletion and raw file lookup

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use walkdir::WalkDir;

use crate::domain::errors::*;
use crate::ports::*;

static NAME_TOKEN_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ -]").expect("valid token pattern"));

/// Filesystem adapter rooted at the raw recordings directory
#[derive(Debug, Clone)]
pub struct LocalFsAdapter {
    raw_dir: PathBuf,
}

impl LocalFsAdapter {
    /// Create adapter; `raw_dir` holds recordings named `<id> - <title>.mp4`
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
        }
    }

    pub fn raw_dir(&self) -> &Path {
        &self.raw_dir
    }

    /// Numeric id at the start of a raw file name, if any
    pub fn leading_id(file_name: &str) -> Option<u32> {
        NAME_TOKEN_SPLIT
            .split(file_name)
            .next()
            .and_then(|token| token.parse::<u32>().ok())
    }
}

#[async_trait]
impl FsPort for LocalFsAdapter {
    async fn file_exists(&self, path: &Path) -> Result<bool, DomainError> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::Io(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn delete_file(&self, path: &Path) -> Result<bool, DomainError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(DomainError::Io(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn rename_file(&self, from: &Path, to: &Path) -> Result<(), DomainError> {
        tokio::fs::rename(from, to).await.map_err(|e| {
            DomainError::Io(format!(
                "Failed to move {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })
    }

    async fn create_directory(&self, path: &Path) -> Result<(), DomainError> {
        tokio::fs::create_dir_all(path).await.map_err(|e| {
            DomainError::Io(format!("Failed to create directory {}: {}", path.display(), e))
        })
    }
}

#[async_trait]
impl ArtifactCache for LocalFsAdapter {
    async fn has_artifact(&self, path: &Path) -> Result<bool, DomainError> {
        self.file_exists(path).await
    }
}

#[async_trait]
impl RawFileLocator for LocalFsAdapter {
    async fn locate(&self, video_id: u32) -> Result<PathBuf, DomainError> {
        let walker = WalkDir::new(&self.raw_dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| {
                DomainError::Io(format!(
                    "Failed to list {}: {}",
                    self.raw_dir.display(),
                    e
                ))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let id = Self::leading_id(&entry.file_name().to_string_lossy());
            if id == Some(video_id) {
                return Ok(entry.into_path());
            }
        }

        Err(DomainError::NotFound(format!("Video #{} not found.", video_id)))
    }
}
