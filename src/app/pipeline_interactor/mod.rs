// Pipeline interactor - Runs the per-clip stage sequence

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::app::command_builder::{CommandBuilder, FileList, StagingFile};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::TimeRangeValidator;
use crate::domain::timecode::format_clock_timecode;
use crate::ports::*;

/// What to do with the rest of a batch after a clip fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failing clip and return its error
    #[default]
    Abort,
    /// Record the failure and keep going
    Continue,
}

impl FailurePolicy {
    pub fn parse(value: &str) -> Result<Self, DomainError> {
        match value.trim().to_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "continue" => Ok(FailurePolicy::Continue),
            _ => Err(DomainError::Validation(format!(
                "Invalid failure policy: {}. Valid policies: abort, continue",
                value
            ))),
        }
    }
}

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    RawExtraction,
    Assembly,
    AudioOverlay,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::RawExtraction => "raw extraction",
            PipelineStage::Assembly => "assembly",
            PipelineStage::AudioOverlay => "audio overlay",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// External command was executed
    Ran,
    /// Artifact already present
    Skipped,
}

/// Result of one stage for one clip
#[derive(Debug, Clone, PartialEq)]
pub struct StageRecord {
    pub stage: PipelineStage,
    pub outcome: StageOutcome,
    pub output: PathBuf,
}

/// Optional stages requested for a run; raw extraction always runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageSelection {
    pub assemble: bool,
    pub add_audio: bool,
}

impl StageSelection {
    pub fn raw_only() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            assemble: true,
            add_audio: true,
        }
    }
}

/// Completed clip
#[derive(Debug, Clone, PartialEq)]
pub struct ClipReport {
    pub clip_id: usize,
    pub video_id: u32,
    pub clip_index: usize,
    pub stages: Vec<StageRecord>,
}

impl ClipReport {
    /// Artifact of the last stage that ran or was skipped
    pub fn final_artifact(&self) -> Option<&Path> {
        self.stages.last().map(|record| record.output.as_path())
    }

    /// Number of stages that invoked the media tool
    pub fn executed_stages(&self) -> usize {
        self.stages
            .iter()
            .filter(|record| record.outcome == StageOutcome::Ran)
            .count()
    }
}

/// Clip that ended in the failed state
#[derive(Debug, Clone, PartialEq, Error)]
#[error("clip {clip_id} (video {video_id}, clip {clip_index}) failed during {stage}: {source}")]
pub struct StageError {
    pub clip_id: usize,
    pub video_id: u32,
    pub clip_index: usize,
    pub stage: PipelineStage,
    #[source]
    pub source: DomainError,
    /// Stages finished before the failure
    pub completed: Vec<StageRecord>,
}

/// Outcome of a batch run under `FailurePolicy::Continue`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub completed: Vec<ClipReport>,
    pub failed: Vec<StageError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Fixed inputs of the assembly and audio stages
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub layout: OutputLayout,
    pub intro: PathBuf,
    pub call_to_action: PathBuf,
    pub outro: PathBuf,
    pub background_audio: PathBuf,
    pub audio_suffix: OutputSuffix,
    pub fade_out_seconds: f64,
}

/// Interactor running the stage sequence for derived clips
#[derive(Clone)]
pub struct PipelineInteractor {
    builder: CommandBuilder,
    process_port: Arc<dyn ProcessPort>,
    probe_port: Arc<dyn ProbePort>,
    fs_port: Arc<dyn FsPort>,
    cache: Arc<dyn ArtifactCache>,
    locator: Arc<dyn RawFileLocator>,
    settings: Arc<PipelineSettings>,
}

impl PipelineInteractor {
    /// Create new pipeline interactor with injected ports
    pub fn new(
        builder: CommandBuilder,
        process_port: Arc<dyn ProcessPort>,
        probe_port: Arc<dyn ProbePort>,
        fs_port: Arc<dyn FsPort>,
        cache: Arc<dyn ArtifactCache>,
        locator: Arc<dyn RawFileLocator>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            builder,
            process_port,
            probe_port,
            fs_port,
            cache,
            locator,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run the selected stages for one clip, in order, stopping at the first error
    pub async fn run_clip(
        &self,
        clip: &DerivedClip,
        stages: StageSelection,
    ) -> Result<ClipReport, StageError> {
        let mut completed = Vec::new();
        let fail = |stage: PipelineStage, source: DomainError, completed: Vec<StageRecord>| {
            warn!(
                clip_id = clip.id,
                video_id = clip.video_id,
                clip_index = clip.clip_index,
                %stage,
                kind = source.kind(),
                "Stage failed: {}",
                source
            );
            StageError {
                clip_id: clip.id,
                video_id: clip.video_id,
                clip_index: clip.clip_index,
                stage,
                source,
                completed,
            }
        };

        let raw = match self.extract_raw(clip).await {
            Ok(record) => record,
            Err(e) => return Err(fail(PipelineStage::RawExtraction, e, completed)),
        };
        let mut current = raw.output.clone();
        completed.push(raw);

        if stages.assemble {
            match self.assemble(clip).await {
                Ok(record) => {
                    current = record.output.clone();
                    completed.push(record);
                }
                Err(e) => return Err(fail(PipelineStage::Assembly, e, completed)),
            }
        }

        if stages.add_audio {
            match self.overlay_audio(&current).await {
                Ok(record) => completed.push(record),
                Err(e) => return Err(fail(PipelineStage::AudioOverlay, e, completed)),
            }
        }

        Ok(ClipReport {
            clip_id: clip.id,
            video_id: clip.video_id,
            clip_index: clip.clip_index,
            stages: completed,
        })
    }

    /// Run many clips. `jobs > 1` runs up to that many clips at once; reports
    /// are returned in clip id order either way.
    pub async fn run_batch(
        &self,
        clips: Vec<DerivedClip>,
        stages: StageSelection,
        policy: FailurePolicy,
        jobs: usize,
    ) -> Result<BatchReport, StageError> {
        info!(clips = clips.len(), jobs, ?policy, "Starting pipeline batch");
        let mut report = BatchReport::default();

        if jobs <= 1 {
            for clip in &clips {
                match self.run_clip(clip, stages).await {
                    Ok(done) => report.completed.push(done),
                    Err(e) if policy == FailurePolicy::Continue => report.failed.push(e),
                    Err(e) => return Err(e),
                }
            }
        } else {
            let semaphore = Arc::new(Semaphore::new(jobs));
            let mut tasks = JoinSet::new();
            for clip in clips {
                let interactor = self.clone();
                let semaphore = Arc::clone(&semaphore);
                tasks.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    interactor.run_clip(&clip, stages).await
                });
            }

            while let Some(joined) = tasks.join_next().await {
                let result = match joined {
                    Ok(result) => result,
                    Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                    Err(_) => continue,
                };
                match result {
                    Ok(done) => report.completed.push(done),
                    Err(e) if policy == FailurePolicy::Continue => report.failed.push(e),
                    Err(e) => {
                        // Wait for cancelled clips so their partial outputs are gone on return.
                        tasks.shutdown().await;
                        return Err(e);
                    }
                }
            }
        }

        report.completed.sort_by_key(|r| r.clip_id);
        report.failed.sort_by_key(|e| e.clip_id);
        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            "Pipeline batch finished"
        );
        Ok(report)
    }

    async fn extract_raw(&self, clip: &DerivedClip) -> Result<StageRecord, DomainError> {
        let output = clip.raw_output_path.clone();
        if self.cache.has_artifact(&output).await? {
            info!(clip_id = clip.id, path = %output.display(), "Raw clip exists, skipping");
            return Ok(skipped(PipelineStage::RawExtraction, output));
        }

        let source = self.locator.locate(clip.video_id).await?;
        let total = self.probe_port.duration(&source).await?;
        TimeRangeValidator::validate(
            &source.display().to_string(),
            clip.start_seconds,
            clip.end_seconds,
            total,
        )?;

        // Strict trim timecodes are whole seconds; widen outwards.
        let start = format_clock_timecode(clip.start_seconds.floor() as u32);
        let end = format_clock_timecode(clip.end_seconds.ceil() as u32);

        self.ensure_parent(&output).await?;
        let staging = StagingFile::for_target(&output);
        let command = self
            .builder
            .trim_command(&source, staging.path(), &start, &end)
            .await?;
        self.process_port.run(&command).await?;
        staging.commit(self.fs_port.as_ref()).await?;
        info!(clip_id = clip.id, path = %output.display(), %start, %end, "Extracted raw clip");
        Ok(ran(PipelineStage::RawExtraction, output))
    }

    async fn assemble(&self, clip: &DerivedClip) -> Result<StageRecord, DomainError> {
        let output = clip.final_output_path.clone();
        if self.cache.has_artifact(&output).await? {
            info!(clip_id = clip.id, path = %output.display(), "Assembled clip exists, skipping");
            return Ok(skipped(PipelineStage::Assembly, output));
        }

        let sequence = [
            &self.settings.intro,
            &clip.raw_output_path,
            &self.settings.call_to_action,
            &self.settings.outro,
        ];
        let mut entries = Vec::with_capacity(sequence.len());
        for part in sequence {
            self.builder.check_existing_file(part).await?;
            entries.push(std::path::absolute(part)?);
        }

        self.ensure_parent(&output).await?;
        let list_path = self
            .settings
            .layout
            .file_list_path(clip.video_id, clip.clip_index);
        self.ensure_parent(&list_path).await?;
        let list = FileList::create(list_path, &entries)?;
        let staging = StagingFile::for_target(&output);
        let command = self.builder.merge_command(list.path(), staging.path()).await?;
        self.process_port.run(&command).await?;
        drop(list);
        staging.commit(self.fs_port.as_ref()).await?;

        info!(clip_id = clip.id, path = %output.display(), "Assembled clip");
        Ok(ran(PipelineStage::Assembly, output))
    }

    async fn overlay_audio(&self, input: &Path) -> Result<StageRecord, DomainError> {
        let output = output_file_path(input, &self.settings.audio_suffix);
        if output == input {
            return Err(DomainError::Validation(
                "Audio overlay output would overwrite its input; set a non-empty audio suffix"
                    .to_string(),
            ));
        }

        let duration = self.probe_port.duration(input).await?;
        let staging = StagingFile::for_target(&output);
        let command = self
            .builder
            .add_audio_command(
                input,
                &self.settings.background_audio,
                staging.path(),
                self.settings.fade_out_seconds,
                duration,
            )
            .await?;
        self.process_port.run(&command).await?;
        staging.commit(self.fs_port.as_ref()).await?;

        info!(path = %output.display(), "Added background audio");
        Ok(ran(PipelineStage::AudioOverlay, output))
    }

    async fn ensure_parent(&self, path: &Path) -> Result<(), DomainError> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                self.fs_port.create_directory(parent).await
            }
            _ => Ok(()),
        }
    }
}

fn ran(stage: PipelineStage, output: PathBuf) -> StageRecord {
    StageRecord {
        stage,
        outcome: StageOutcome::Ran,
        output,
    }
}

fn skipped(stage: PipelineStage, output: PathBuf) -> StageRecord {
    StageRecord {
        stage,
        outcome: StageOutcome::Skipped,
        output,
    }
}
