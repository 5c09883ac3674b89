//! Clip assembler library
//!
//! Turns a metadata table of source recordings into per-clip artifacts: raw
//! cuts, assembled clips with intro and outro segments, background-audio
//! overlays, and the card cross-reference labels for each clip.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use app::{
    BatchReport, ClipReport, CommandBuilder, FailurePolicy, PipelineInteractor, PipelineSettings,
    StageError, StageSelection,
};
pub use domain::errors::DomainError;
pub use domain::model::{DerivedClip, MetadataTable, OutputLayout, OutputSuffix, VideoTable};
pub use error::{AssemblerError, AssemblerResult};
