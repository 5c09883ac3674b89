//! ffmpeg / ffprobe command construction
//!
//! Builders check their preconditions and clear stale outputs, then return the
//! command as a plain string. Nothing here spawns a process.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::rules::ExtensionPolicy;
use crate::domain::timecode::parse_clock_timecode;
use crate::ports::FsPort;

/// Default binary names, resolved through `PATH`
pub const DEFAULT_FFMPEG: &str = "ffmpeg";
pub const DEFAULT_FFPROBE: &str = "ffprobe";

/// Parse ffprobe duration output; empty output means zero
pub fn parse_duration(stdout: &str) -> Result<f64, DomainError> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse::<f64>().map_err(|_| {
        DomainError::Execution(format!("Unexpected duration output: '{}'", trimmed))
    })
}

/// Concat-demuxer file list that lives exactly as long as this value
#[derive(Debug)]
pub struct FileList {
    path: PathBuf,
}

impl FileList {
    /// Write `entries` as `file '<path>'` lines joined by CRLF
    pub fn create(path: impl Into<PathBuf>, entries: &[PathBuf]) -> Result<Self, DomainError> {
        let path = path.into();
        std::fs::write(&path, Self::render(entries)).map_err(|e| {
            DomainError::Io(format!("Failed to write file list {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), entries = entries.len(), "Wrote concat file list");
        Ok(Self { path })
    }

    /// Render list contents
    pub fn render(entries: &[PathBuf]) -> String {
        entries
            .iter()
            .map(|entry| {
                let escaped = entry.to_string_lossy().replace('\'', "'\\''");
                format!("file '{}'", escaped)
            })
            .collect::<Vec<_>>()
            .join("\r\n")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileList {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove file list");
            }
        }
    }
}

/// Temporary sibling of a stage output. The media tool writes here and the
/// file is moved onto the real output only once the tool has succeeded;
/// otherwise it is removed on drop.
#[derive(Debug)]
pub struct StagingFile {
    path: PathBuf,
    target: PathBuf,
    committed: bool,
}

impl StagingFile {
    /// `<dir>/<stem>.part.<ext>` next to `target`
    pub fn for_target(target: &Path) -> Self {
        let stem = target
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match target.extension() {
            Some(ext) => format!("{}.part.{}", stem, ext.to_string_lossy()),
            None => format!("{}.part", stem),
        };
        Self {
            path: target.with_file_name(name),
            target: target.to_path_buf(),
            committed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Move the finished file onto the target path
    pub async fn commit(mut self, fs_port: &dyn FsPort) -> Result<PathBuf, DomainError> {
        fs_port.rename_file(&self.path, &self.target).await?;
        self.committed = true;
        Ok(self.target.clone())
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove partial output");
            }
        }
    }
}

/// Builds media tool invocations
#[derive(Clone)]
pub struct CommandBuilder {
    fs_port: Arc<dyn FsPort>,
    ffmpeg: String,
    ffprobe: String,
}

impl CommandBuilder {
    /// Create builder using the default binary names
    pub fn new(fs_port: Arc<dyn FsPort>) -> Self {
        Self {
            fs_port,
            ffmpeg: DEFAULT_FFMPEG.to_string(),
            ffprobe: DEFAULT_FFPROBE.to_string(),
        }
    }

    /// Override the binaries used in generated commands
    pub fn with_tools(mut self, ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self.ffprobe = ffprobe.into();
        self
    }

    /// Fail unless `path` is an existing file
    pub async fn check_existing_file(&self, path: &Path) -> Result<(), DomainError> {
        if self.fs_port.file_exists(path).await? {
            Ok(())
        } else {
            Err(DomainError::Validation(format!(
                "Input file does not exist: {}",
                path.display()
            )))
        }
    }

    /// Remove a stale output; returns whether something was deleted
    pub async fn delete_existing_file(&self, path: &Path) -> Result<bool, DomainError> {
        let deleted = self.fs_port.delete_file(path).await?;
        if deleted {
            debug!(path = %path.display(), "Removed existing output");
        }
        Ok(deleted)
    }

    /// Cut `[start, end]` (strict `HH:MM:SS`, absolute source positions) from
    /// `input` into `output`. Both bounds are input options so `-to` is not
    /// read as a duration.
    pub async fn trim_command(
        &self,
        input: &Path,
        output: &Path,
        start: &str,
        end: &str,
    ) -> Result<String, DomainError> {
        self.check_existing_file(input).await?;
        ExtensionPolicy::check(input)?;
        ExtensionPolicy::check(output)?;
        let start_seconds = parse_clock_timecode(start)?;
        let end_seconds = parse_clock_timecode(end)?;
        if start_seconds > end_seconds {
            return Err(DomainError::Validation(format!(
                "Ending time ({}) is after start time ({})",
                end, start
            )));
        }

        self.delete_existing_file(output).await?;
        Ok(format!(
            "{} -ss {} -to {} -i {} -c copy {}",
            shell_words::quote(&self.ffmpeg),
            start,
            end,
            shell_words::quote(&input.to_string_lossy()),
            shell_words::quote(&output.to_string_lossy())
        ))
    }

    /// Concatenate the files named in `file_list` into `output`
    pub async fn merge_command(&self, file_list: &Path, output: &Path) -> Result<String, DomainError> {
        self.check_existing_file(file_list).await?;
        self.delete_existing_file(output).await?;
        Ok(format!(
            "{} -f concat -safe 0 -i {} -c copy {}",
            shell_words::quote(&self.ffmpeg),
            shell_words::quote(&file_list.to_string_lossy()),
            shell_words::quote(&output.to_string_lossy())
        ))
    }

    /// Lay `audio` under `video`, fading it out over the last `fade_out_seconds`
    pub async fn add_audio_command(
        &self,
        video: &Path,
        audio: &Path,
        output: &Path,
        fade_out_seconds: f64,
        video_duration: f64,
    ) -> Result<String, DomainError> {
        self.check_existing_file(video).await?;
        self.check_existing_file(audio).await?;
        ExtensionPolicy::check(video)?;
        ExtensionPolicy::check(output)?;
        if !fade_out_seconds.is_finite() || fade_out_seconds < 0.0 {
            return Err(DomainError::Validation(format!(
                "Fade-out must be a non-negative number of seconds, got {}",
                fade_out_seconds
            )));
        }
        if !video_duration.is_finite() || video_duration < 0.0 {
            return Err(DomainError::Validation(format!(
                "Video duration must be a non-negative number of seconds, got {}",
                video_duration
            )));
        }

        self.delete_existing_file(output).await?;
        let fade_start = (video_duration - fade_out_seconds).max(0.0);
        Ok(format!(
            "{} -i {} -stream_loop -1 -i {} -filter_complex \"[1:a]afade=t=out:st={:.2}:d={:.2}[a]\" -map 0:v -map \"[a]\" -c:v copy -shortest {}",
            shell_words::quote(&self.ffmpeg),
            shell_words::quote(&video.to_string_lossy()),
            shell_words::quote(&audio.to_string_lossy()),
            fade_start,
            fade_out_seconds,
            shell_words::quote(&output.to_string_lossy())
        ))
    }

    /// ffprobe call printing the container duration in seconds
    pub async fn duration_probe_command(&self, input: &Path) -> Result<String, DomainError> {
        self.check_existing_file(input).await?;
        Ok(format!(
            "{} -i {} -show_entries format=duration -v quiet -of csv=\"p=0\"",
            shell_words::quote(&self.ffprobe),
            shell_words::quote(&input.to_string_lossy())
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalFsAdapter;
    use tempfile::TempDir;

    fn builder(dir: &TempDir) -> CommandBuilder {
        CommandBuilder::new(Arc::new(LocalFsAdapter::new(dir.path().join("raw"))))
    }

    fn touch(path: &Path) {
        std::fs::write(path, b"data").unwrap();
    }

    #[tokio::test]
    async fn test_trim_command() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        touch(&input);

        let cmd = builder(&dir)
            .trim_command(&input, &output, "00:12:56", "00:15:56")
            .await
            .unwrap();
        assert_eq!(
            cmd,
            format!(
                "ffmpeg -ss 00:12:56 -to 00:15:56 -i {} -c copy {}",
                input.display(),
                output.display()
            )
        );
    }

    #[tokio::test]
    async fn test_trim_command_deletes_stale_output() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        touch(&input);
        touch(&output);

        let b = builder(&dir);
        let first = b.trim_command(&input, &output, "00:00:01", "00:00:02").await.unwrap();
        assert!(!output.exists());

        touch(&output);
        let second = b.trim_command(&input, &output, "00:00:01", "00:00:02").await.unwrap();
        assert_eq!(first, second);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_trim_command_preconditions() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        let b = builder(&dir);

        let err = b.trim_command(&input, &output, "00:00:01", "00:00:02").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(err.to_string().contains("Input file does not exist"));

        touch(&input);
        let avi = dir.path().join("out.avi");
        let err = b.trim_command(&input, &avi, "00:00:01", "00:00:02").await.unwrap_err();
        assert!(err.to_string().contains("Unknown extension: 'avi'"));

        let err = b.trim_command(&input, &output, "0:00:01", "00:00:02").await.unwrap_err();
        assert!(matches!(err, DomainError::Format(_)));

        let err = b.trim_command(&input, &output, "00:00:02", "00:00:01").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(err
            .to_string()
            .contains("Ending time (00:00:01) is after start time (00:00:02)"));
    }

    #[tokio::test]
    async fn test_trim_command_quotes_paths_with_spaces() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("1 - Squats.mp4");
        let output = dir.path().join("out.mp4");
        touch(&input);

        let cmd = builder(&dir)
            .trim_command(&input, &output, "00:00:00", "00:00:05")
            .await
            .unwrap();
        let words = shell_words::split(&cmd).unwrap();
        assert_eq!(words[5], "-i");
        assert_eq!(words[6], input.to_string_lossy());
    }

    #[tokio::test]
    async fn test_merge_command() {
        let dir = TempDir::new().unwrap();
        let list = dir.path().join("files.txt");
        let output = dir.path().join("out.mp4");
        let b = builder(&dir);

        assert!(b.merge_command(&list, &output).await.is_err());

        touch(&list);
        touch(&output);
        let cmd = b.merge_command(&list, &output).await.unwrap();
        assert_eq!(
            cmd,
            format!(
                "ffmpeg -f concat -safe 0 -i {} -c copy {}",
                list.display(),
                output.display()
            )
        );
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_add_audio_command() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("clip.mp4");
        let audio = dir.path().join("music.mp3");
        let output = dir.path().join("clip_music.mp4");
        touch(&video);
        touch(&audio);

        let cmd = builder(&dir)
            .with_tools("/opt/ffmpeg", "/opt/ffprobe")
            .add_audio_command(&video, &audio, &output, 3.0, 60.0)
            .await
            .unwrap();
        assert_eq!(
            cmd,
            format!(
                "/opt/ffmpeg -i {} -stream_loop -1 -i {} -filter_complex \"[1:a]afade=t=out:st=57.00:d=3.00[a]\" -map 0:v -map \"[a]\" -c:v copy -shortest {}",
                video.display(),
                audio.display(),
                output.display()
            )
        );

        let err = builder(&dir)
            .add_audio_command(&video, &audio, &output, -1.0, 60.0)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_duration_probe_command() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("test.mp4");
        let b = builder(&dir);
        assert!(b.duration_probe_command(&input).await.is_err());

        touch(&input);
        assert_eq!(
            b.duration_probe_command(&input).await.unwrap(),
            format!(
                "ffprobe -i {} -show_entries format=duration -v quiet -of csv=\"p=0\"",
                input.display()
            )
        );
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("").unwrap(), 0.0);
        assert_eq!(parse_duration(" 100.5\n").unwrap(), 100.5);
        assert!(matches!(parse_duration("N/A"), Err(DomainError::Execution(_))));
    }

    #[tokio::test]
    async fn test_trim_command_survives_apostrophes() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("Don't.mp4");
        let output = dir.path().join("out.mp4");
        touch(&input);

        let cmd = builder(&dir)
            .trim_command(&input, &output, "00:00:00", "00:00:05")
            .await
            .unwrap();
        let words = shell_words::split(&cmd).unwrap();
        assert_eq!(words[6], input.to_string_lossy());
        assert_eq!(words.last().unwrap(), &output.to_string_lossy());
    }

    #[test]
    fn test_staging_file_path() {
        let staging = StagingFile::for_target(Path::new("temp/1_00.mp4"));
        assert_eq!(staging.path(), Path::new("temp").join("1_00.part.mp4"));
        assert_eq!(staging.target(), Path::new("temp/1_00.mp4"));
    }

    #[tokio::test]
    async fn test_staging_file_commit_and_discard() {
        let dir = TempDir::new().unwrap();
        let fs = LocalFsAdapter::new(dir.path());
        let target = dir.path().join("clip.mp4");

        let staging = StagingFile::for_target(&target);
        std::fs::write(staging.path(), b"complete").unwrap();
        let committed = staging.commit(&fs).await.unwrap();
        assert_eq!(committed, target);
        assert_eq!(std::fs::read(&target).unwrap(), b"complete");

        let other = dir.path().join("other.mp4");
        let partial_path = {
            let staging = StagingFile::for_target(&other);
            std::fs::write(staging.path(), b"partial").unwrap();
            staging.path().to_path_buf()
        };
        assert!(!partial_path.exists());
        assert!(!other.exists());
    }

    #[test]
    fn test_file_list_lifecycle() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("files.txt");
        let entries = vec![PathBuf::from("intro.mp4"), PathBuf::from("it's.mp4")];

        {
            let list = FileList::create(&path, &entries).unwrap();
            let contents = std::fs::read_to_string(list.path()).unwrap();
            assert_eq!(contents, "file 'intro.mp4'\r\nfile 'it'\\''s.mp4'");
        }
        assert!(!path.exists());
    }
}
