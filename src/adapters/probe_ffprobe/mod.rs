//! FFprobe adapter for media duration probing

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::app::command_builder::{parse_duration, CommandBuilder};
use crate::domain::errors::*;
use crate::ports::*;

/// FFprobe-based probe adapter
#[derive(Clone)]
pub struct FFprobeAdapter {
    builder: CommandBuilder,
    process_port: Arc<dyn ProcessPort>,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(builder: CommandBuilder, process_port: Arc<dyn ProcessPort>) -> Self {
        Self {
            builder,
            process_port,
        }
    }
}

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn duration(&self, path: &Path) -> Result<f64, DomainError> {
        let command = self.builder.duration_probe_command(path).await?;
        let output = self.process_port.run(&command).await?;
        parse_duration(&output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalFsAdapter;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct CannedProcess {
        stdout: String,
        commands: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProcessPort for CannedProcess {
        async fn run(&self, command: &str) -> Result<CommandOutput, DomainError> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(CommandOutput {
                stdout: self.stdout.clone(),
                stderr: String::new(),
            })
        }
    }

    fn adapter(stdout: &str) -> (FFprobeAdapter, Arc<CannedProcess>) {
        let process = Arc::new(CannedProcess {
            stdout: stdout.to_string(),
            commands: Mutex::new(Vec::new()),
        });
        let builder = CommandBuilder::new(Arc::new(LocalFsAdapter::new(".")));
        (FFprobeAdapter::new(builder, process.clone()), process)
    }

    #[tokio::test]
    async fn test_duration_parses_probe_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("test.mp4");
        std::fs::write(&input, b"x").unwrap();

        let (probe, process) = adapter("100");
        assert_eq!(probe.duration(&input).await.unwrap(), 100.0);
        assert!(process.commands.lock().unwrap()[0].starts_with("ffprobe -i "));

        let (probe, _) = adapter("");
        assert_eq!(probe.duration(&input).await.unwrap(), 0.0);
    }

    #[tokio::test]
    async fn test_duration_requires_existing_input() {
        let (probe, process) = adapter("100");
        assert!(probe.duration(Path::new("missing.mp4")).await.is_err());
        assert!(process.commands.lock().unwrap().is_empty());
    }
}
