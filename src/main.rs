//! Clip assembler CLI
//!
//! # Usage
//!
//! ```bash
//! assembler run --metadata videos.json --videos 3,5 --assemble --audio
//! assembler clips --metadata videos.json --pretty
//! assembler cards --metadata videos.json --videos 5
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use clip_assembler::adapters::{init_tracing, AssemblerConfig};
use clip_assembler::cli::{commands, Cli, Commands};

/// Main entry point for the clip assembler
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_file = AssemblerConfig::locate(cli.config.as_deref())?;
    let mut config = match &config_file {
        Some(file) => AssemblerConfig::from_file(file)?,
        None => AssemblerConfig::default(),
    };
    let env_overrides = config.apply_env_overrides(|name| std::env::var(name).ok())?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    init_tracing(&config.logging)?;
    info!("Starting clip assembler");
    match &config_file {
        Some(file) => info!("Loaded configuration from: {}", file.display()),
        None => info!("No configuration file found, using defaults"),
    }
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    match cli.command {
        Commands::Run(args) => {
            info!("Executing run command");
            commands::run(args, &config).await?;
        }
        Commands::Clips(args) => {
            info!("Executing clips command");
            commands::clips(args, &config).await?;
        }
        Commands::Cards(args) => {
            info!("Executing cards command");
            commands::cards(args, &config).await?;
        }
    }

    Ok(())
}
