use std::sync::Arc;

use crate::adapters::{AssemblerConfig, FFprobeAdapter, LocalFsAdapter, ShellProcessAdapter};
use crate::app::command_builder::CommandBuilder;
use crate::app::pipeline_interactor::PipelineInteractor;
use crate::error::AssemblerResult;
use crate::ports::{ArtifactCache, FsPort, ProbePort, ProcessPort, RawFileLocator};

pub trait AppContainer: Send + Sync {
    fn pipeline_interactor(&self) -> Arc<PipelineInteractor>;
    fn probe_port(&self) -> Arc<dyn ProbePort>;
}

/// Wires the local file system, the process runner and ffprobe from configuration
pub struct DefaultAppContainer {
    pipeline_interactor: Arc<PipelineInteractor>,
    probe_port: Arc<dyn ProbePort>,
}

impl DefaultAppContainer {
    pub fn new(config: &AssemblerConfig) -> AssemblerResult<Self> {
        let fs = Arc::new(LocalFsAdapter::new(&config.paths.raw_dir));
        let process_port: Arc<dyn ProcessPort> =
            Arc::new(ShellProcessAdapter::new().with_timeout(config.timeout()));

        let builder = CommandBuilder::new(Arc::clone(&fs) as Arc<dyn FsPort>)
            .with_tools(&config.tools.ffmpeg, &config.tools.ffprobe);
        let probe_port: Arc<dyn ProbePort> = Arc::new(FFprobeAdapter::new(
            builder.clone(),
            Arc::clone(&process_port),
        ));

        let pipeline_interactor = Arc::new(PipelineInteractor::new(
            builder,
            process_port,
            Arc::clone(&probe_port),
            Arc::clone(&fs) as Arc<dyn FsPort>,
            Arc::clone(&fs) as Arc<dyn ArtifactCache>,
            fs as Arc<dyn RawFileLocator>,
            config.pipeline_settings()?,
        ));

        Ok(Self {
            pipeline_interactor,
            probe_port,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn pipeline_interactor(&self) -> Arc<PipelineInteractor> {
        Arc::clone(&self.pipeline_interactor)
    }

    fn probe_port(&self) -> Arc<dyn ProbePort> {
        Arc::clone(&self.probe_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_from_defaults() {
        let container = DefaultAppContainer::new(&AssemblerConfig::default()).unwrap();
        let interactor = container.pipeline_interactor();
        assert_eq!(interactor.settings().fade_out_seconds, 3.0);
        assert!(interactor
            .settings()
            .layout
            .final_clip_path(3, 1)
            .ends_with("output/final/3_01_final.mp4"));
    }

    #[test]
    fn test_container_rejects_bad_suffix() {
        let mut config = AssemblerConfig::default();
        config.pipeline.audio_suffix = toml::Value::Boolean(true);
        assert!(DefaultAppContainer::new(&config).is_err());
    }
}
