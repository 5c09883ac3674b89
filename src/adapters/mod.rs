// Adapters - External system implementations

pub mod exec_process;
pub mod fs_local;
pub mod json_metadata;
pub mod probe_ffprobe;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use exec_process::ShellProcessAdapter;
pub use fs_local::LocalFsAdapter;
pub use json_metadata::JsonMetadataAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::AssemblerConfig;
pub use tracing_log::init_tracing;
