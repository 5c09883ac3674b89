// TOML config adapter - Layered configuration: defaults < file < environment < CLI

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::pipeline_interactor::{FailurePolicy, PipelineSettings};
use crate::domain::model::{OutputLayout, OutputSuffix};
use crate::error::{AssemblerError, AssemblerResult};

/// Files tried, in order, when no config path is given
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["assembler.toml", "config/assembler.toml"];

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "ASSEMBLER_";

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub raw_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub output_dir: PathBuf,
    pub intro: PathBuf,
    pub call_to_action: PathBuf,
    pub outro: PathBuf,
    pub background_audio: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("input/raw"),
            temp_dir: PathBuf::from("output/temp"),
            output_dir: PathBuf::from("output/final"),
            intro: PathBuf::from("input/intro.mp4"),
            call_to_action: PathBuf::from("input/call-to-action-up.mp4"),
            outro: PathBuf::from("input/outro.mp4"),
            background_audio: PathBuf::from("input/background.mp3"),
        }
    }
}

/// Stage naming and batch behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Suffix of assembled outputs; integer or string
    pub assembled_suffix: toml::Value,
    /// Suffix of audio-overlay outputs; integer or string
    pub audio_suffix: toml::Value,
    pub fade_out_seconds: f64,
    /// Concurrent (video, clip) pairs; 0 means one per CPU
    pub jobs: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            assembled_suffix: toml::Value::String("final".to_string()),
            audio_suffix: toml::Value::String("music".to_string()),
            fade_out_seconds: 3.0,
            jobs: 1,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

/// External binaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Per-command limit; unset waits forever
    pub timeout_seconds: Option<u64>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete assembler configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssemblerConfig {
    pub paths: PathsConfig,
    pub pipeline: PipelineConfig,
    pub tools: ToolsConfig,
    pub logging: LoggingConfig,
}

impl AssemblerConfig {
    /// Parse TOML text; `origin` names the source in error messages
    pub fn from_toml_str(content: &str, origin: &str) -> AssemblerResult<Self> {
        toml::from_str(content).map_err(|source| AssemblerError::ConfigParse {
            path: origin.to_string(),
            source,
        })
    }

    /// The file to read: `path` if given, else the first default location
    /// that exists, else `None` for built-in defaults
    pub fn locate(path: Option<&Path>) -> AssemblerResult<Option<PathBuf>> {
        match path {
            Some(explicit) if !explicit.is_file() => Err(AssemblerError::config(format!(
                "Config file does not exist: {}",
                explicit.display()
            ))),
            Some(explicit) => Ok(Some(explicit.to_path_buf())),
            None => Ok(DEFAULT_CONFIG_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file())),
        }
    }

    /// Read and parse one TOML file
    pub fn from_file(path: &Path) -> AssemblerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    /// Load from the located file, or fall back to built-in defaults.
    /// Nothing is logged here; this runs before the subscriber exists.
    pub fn load(path: Option<&Path>) -> AssemblerResult<Self> {
        match Self::locate(path)? {
            Some(file) => Self::from_file(&file),
            None => Ok(Self::default()),
        }
    }

    /// Apply `ASSEMBLER_*` overrides using `lookup` (normally `std::env::var`)
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> AssemblerResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
        let mut applied = 0;

        let mut set_path = |name: &str, target: &mut PathBuf| {
            if let Some(value) = var(name) {
                *target = PathBuf::from(value);
                applied += 1;
            }
        };
        set_path("RAW_DIR", &mut self.paths.raw_dir);
        set_path("TEMP_DIR", &mut self.paths.temp_dir);
        set_path("OUTPUT_DIR", &mut self.paths.output_dir);
        set_path("BACKGROUND_AUDIO", &mut self.paths.background_audio);

        if let Some(value) = var("FFMPEG") {
            self.tools.ffmpeg = value;
            applied += 1;
        }
        if let Some(value) = var("FFPROBE") {
            self.tools.ffprobe = value;
            applied += 1;
        }
        if let Some(value) = var("TIMEOUT_SECONDS") {
            let seconds = value.parse::<u64>().map_err(|e| {
                AssemblerError::config(format!("Invalid {}TIMEOUT_SECONDS: {}", ENV_PREFIX, e))
            })?;
            self.tools.timeout_seconds = Some(seconds);
            applied += 1;
        }
        if let Some(value) = var("JOBS") {
            self.pipeline.jobs = value.parse::<usize>().map_err(|e| {
                AssemblerError::config(format!("Invalid {}JOBS: {}", ENV_PREFIX, e))
            })?;
            applied += 1;
        }
        if let Some(value) = var("FAILURE_POLICY") {
            self.pipeline.failure_policy = FailurePolicy::parse(&value)?;
            applied += 1;
        }
        if let Some(value) = var("LOG_LEVEL") {
            self.logging.level = value;
            applied += 1;
        }

        Ok(applied)
    }

    /// Reject values that would only fail later in the pipeline
    pub fn validate(&self) -> AssemblerResult<()> {
        self.assembled_suffix()?;
        self.audio_suffix()?;

        let fade = self.pipeline.fade_out_seconds;
        if !fade.is_finite() || fade < 0.0 {
            return Err(AssemblerError::config(format!(
                "fade_out_seconds must be non-negative, got {}",
                fade
            )));
        }

        self.logging
            .level
            .parse::<tracing::Level>()
            .map_err(|_| {
                AssemblerError::config(format!(
                    "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                    self.logging.level
                ))
            })?;

        if self.tools.ffmpeg.trim().is_empty() || self.tools.ffprobe.trim().is_empty() {
            return Err(AssemblerError::config("Tool paths cannot be empty"));
        }
        Ok(())
    }

    pub fn assembled_suffix(&self) -> AssemblerResult<OutputSuffix> {
        Ok(OutputSuffix::try_from(&self.pipeline.assembled_suffix)?)
    }

    pub fn audio_suffix(&self) -> AssemblerResult<OutputSuffix> {
        Ok(OutputSuffix::try_from(&self.pipeline.audio_suffix)?)
    }

    /// Directory layout for derived artifact paths
    pub fn layout(&self) -> AssemblerResult<OutputLayout> {
        Ok(OutputLayout {
            temp_dir: self.paths.temp_dir.clone(),
            output_dir: self.paths.output_dir.clone(),
            assembled_suffix: self.assembled_suffix()?,
        })
    }

    /// Stage settings handed to the pipeline interactor
    pub fn pipeline_settings(&self) -> AssemblerResult<PipelineSettings> {
        Ok(PipelineSettings {
            layout: self.layout()?,
            intro: self.paths.intro.clone(),
            call_to_action: self.paths.call_to_action.clone(),
            outro: self.paths.outro.clone(),
            background_audio: self.paths.background_audio.clone(),
            audio_suffix: self.audio_suffix()?,
            fade_out_seconds: self.pipeline.fade_out_seconds,
        })
    }

    /// Worker count with `0` resolved to the number of CPUs
    pub fn effective_jobs(&self) -> usize {
        match self.pipeline.jobs {
            0 => num_cpus::get(),
            jobs => jobs,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.tools.timeout_seconds.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AssemblerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.assembled_suffix().unwrap(), OutputSuffix::Label("final".into()));
        assert_eq!(config.effective_jobs(), 1);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AssemblerConfig::from_toml_str(
            r#"
            [paths]
            raw_dir = "recordings"

            [pipeline]
            assembled_suffix = 2
            failure_policy = "continue"
            jobs = 0

            [tools]
            timeout_seconds = 600
            "#,
            "test.toml",
        )
        .unwrap();

        assert_eq!(config.paths.raw_dir, PathBuf::from("recordings"));
        assert_eq!(config.paths.outro, PathBuf::from("input/outro.mp4"));
        assert_eq!(config.assembled_suffix().unwrap(), OutputSuffix::Index(2));
        assert_eq!(config.pipeline.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.effective_jobs(), num_cpus::get());
        assert_eq!(config.timeout(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = AssemblerConfig::from_toml_str("[paths]\nraw = \"x\"\n", "bad.toml").unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AssemblerConfig::default();
        config.pipeline.audio_suffix = toml::Value::Float(1.5);
        assert!(matches!(config.validate(), Err(AssemblerError::Domain(_))));

        let mut config = AssemblerConfig::default();
        config.pipeline.fade_out_seconds = -1.0;
        assert!(config.validate().is_err());

        let mut config = AssemblerConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ASSEMBLER_RAW_DIR", "/data/raw"),
            ("ASSEMBLER_JOBS", "4"),
            ("ASSEMBLER_FFMPEG", "/usr/local/bin/ffmpeg"),
            ("ASSEMBLER_FAILURE_POLICY", "continue"),
        ]);
        let mut config = AssemblerConfig::default();
        let applied = config
            .apply_env_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(applied, 4);
        assert_eq!(config.paths.raw_dir, PathBuf::from("/data/raw"));
        assert_eq!(config.pipeline.jobs, 4);
        assert_eq!(config.tools.ffmpeg, "/usr/local/bin/ffmpeg");
        assert_eq!(config.pipeline.failure_policy, FailurePolicy::Continue);

        let mut config = AssemblerConfig::default();
        let err = config
            .apply_env_overrides(|name| (name == "ASSEMBLER_JOBS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("ASSEMBLER_JOBS"));
    }

    #[test]
    fn test_load_missing_explicit_file() {
        assert!(AssemblerConfig::load(Some(Path::new("nope/assembler.toml"))).is_err());
        assert!(AssemblerConfig::locate(Some(Path::new("nope/assembler.toml"))).is_err());
    }

    #[test]
    fn test_locate_explicit_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[pipeline]\njobs = 3\n").unwrap();

        assert_eq!(AssemblerConfig::locate(Some(&path)).unwrap(), Some(path.clone()));
        assert_eq!(AssemblerConfig::from_file(&path).unwrap().pipeline.jobs, 3);
    }
}
