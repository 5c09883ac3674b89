// Application layer - Command construction and pipeline orchestration

pub mod command_builder;
pub mod container;
pub mod pipeline_interactor;

// Re-export application types
pub use command_builder::{CommandBuilder, FileList};
pub use container::{AppContainer, DefaultAppContainer};
pub use pipeline_interactor::{
    BatchReport, ClipReport, FailurePolicy, PipelineInteractor, PipelineSettings, PipelineStage,
    StageError, StageOutcome, StageRecord, StageSelection,
};
