//! CLI module for the clip assembler
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::adapters::AssemblerConfig;
use crate::app::FailurePolicy;

pub mod args;
pub mod commands;

/// Clip assembler
///
/// Cuts the clips listed in a metadata table out of their raw recordings,
/// optionally wraps them with intro, call-to-action and outro segments, and
/// lays background audio underneath.
#[derive(Parser, Debug)]
#[command(name = "assembler")]
#[command(about = "Clip assembler - Cut, assemble and score clips from a metadata table")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: assembler.toml or config/assembler.toml)
    #[arg(short, long, global = true, env = "ASSEMBLER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the clip pipeline
    Run(args::RunArgs),
    /// Print the derived clip records as JSON
    Clips(args::ClipsArgs),
    /// Print the card cross-reference labels of each clip
    Cards(args::CardsArgs),
}

impl Cli {
    /// Apply flags on top of file and environment configuration
    pub fn apply_overrides(&self, config: &mut AssemblerConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.json = true;
        }

        if let Commands::Run(run) = &self.command {
            if let Some(jobs) = run.jobs {
                config.pipeline.jobs = jobs;
            }
            if run.continue_on_error {
                config.pipeline.failure_policy = FailurePolicy::Continue;
            }
            if let Some(dir) = &run.raw_dir {
                config.paths.raw_dir = dir.clone();
            }
            if let Some(dir) = &run.temp_dir {
                config.paths.temp_dir = dir.clone();
            }
            if let Some(dir) = &run.output_dir {
                config.paths.output_dir = dir.clone();
            }
        }
    }
}
