// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::*;
use crate::domain::model::MetadataTable;

/// Port for loading the metadata table
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Load the raw, unvalidated table
    async fn load(&self) -> Result<MetadataTable, DomainError>;
}

/// Port for resolving a video id to its raw recording
#[async_trait]
pub trait RawFileLocator: Send + Sync {
    /// Path of the raw recording whose file name starts with `video_id`
    async fn locate(&self, video_id: u32) -> Result<PathBuf, DomainError>;
}

/// Captured output of an external command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    /// Standard output, trimmed
    pub stdout: String,
    pub stderr: String,
}

/// Port for running external media tool commands
#[async_trait]
pub trait ProcessPort: Send + Sync {
    /// Run a command string to completion and capture its output
    async fn run(&self, command: &str) -> Result<CommandOutput, DomainError>;
}

/// Port for media duration probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Duration of the media file in seconds
    async fn duration(&self, path: &Path) -> Result<f64, DomainError>;
}

/// Port for the file system operations the pipeline needs
#[async_trait]
pub trait FsPort: Send + Sync {
    /// Check if file exists
    async fn file_exists(&self, path: &Path) -> Result<bool, DomainError>;

    /// Delete file; returns whether a file was removed
    async fn delete_file(&self, path: &Path) -> Result<bool, DomainError>;

    /// Move a file, replacing any file already at `to`
    async fn rename_file(&self, from: &Path, to: &Path) -> Result<(), DomainError>;

    /// Create directory (including parent directories)
    async fn create_directory(&self, path: &Path) -> Result<(), DomainError>;
}

/// Capability answering whether a stage artifact was already produced
#[async_trait]
pub trait ArtifactCache: Send + Sync {
    async fn has_artifact(&self, path: &Path) -> Result<bool, DomainError>;
}
