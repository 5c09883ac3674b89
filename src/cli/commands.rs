//! Command implementations

use std::io::Write;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{AssemblerConfig, JsonMetadataAdapter};
use crate::app::{AppContainer, DefaultAppContainer, StageSelection};
use crate::cli::args::{CardsArgs, ClipsArgs, RunArgs, SelectionArgs};
use crate::domain::links::join_card_links;
use crate::domain::model::{DerivedClip, VideoTable};
use crate::ports::MetadataSource;

/// Load the table and derive clips for the selected videos
async fn derive_selection(
    selection: &SelectionArgs,
    config: &AssemblerConfig,
) -> Result<(Arc<VideoTable>, Vec<DerivedClip>)> {
    let source = JsonMetadataAdapter::new(&selection.metadata);
    let raw = source
        .load()
        .await
        .with_context(|| format!("Failed to load metadata from {}", selection.metadata.display()))?;
    let table = Arc::new(VideoTable::from_metadata(&raw).context("Invalid metadata table")?);

    let video_ids = if selection.videos.is_empty() {
        table.video_ids()
    } else {
        selection.videos.clone()
    };

    let clips = table.derive_clips(&video_ids, &config.layout()?)?;
    info!(
        videos = video_ids.len(),
        clips = clips.len(),
        "Derived clips from metadata"
    );
    Ok((table, clips))
}

/// Execute the run command
pub async fn run(args: RunArgs, config: &AssemblerConfig) -> Result<()> {
    let (_table, clips) = derive_selection(&args.selection, config).await?;
    let container = DefaultAppContainer::new(config)?;
    let stages = StageSelection {
        assemble: args.assemble,
        add_audio: args.audio,
    };

    let report = container
        .pipeline_interactor()
        .run_batch(
            clips,
            stages,
            config.pipeline.failure_policy,
            config.effective_jobs(),
        )
        .await?;

    let mut stdout = std::io::stdout().lock();
    for clip in &report.completed {
        if let Some(artifact) = clip.final_artifact() {
            writeln!(stdout, "{}", artifact.display())?;
        }
    }

    if !report.is_success() {
        for failure in &report.failed {
            warn!("{}", failure);
        }
        bail!(
            "{} of {} clips failed",
            report.failed.len(),
            report.failed.len() + report.completed.len()
        );
    }

    info!(clips = report.completed.len(), "Run completed successfully");
    Ok(())
}

/// A derived clip with its card labels, as printed by `clips`
#[derive(Serialize)]
struct ClipListing<'a> {
    #[serde(flatten)]
    clip: &'a DerivedClip,
    card_links: Vec<String>,
}

/// Execute the clips command
pub async fn clips(args: ClipsArgs, config: &AssemblerConfig) -> Result<()> {
    let (table, clips) = derive_selection(&args.selection, config).await?;
    let listings = clips
        .iter()
        .map(|clip| {
            Ok(ClipListing {
                clip,
                card_links: table.card_links_for(clip)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&listings)?
    } else {
        serde_json::to_string(&listings)?
    };
    println!("{}", rendered);
    Ok(())
}

/// Execute the cards command
pub async fn cards(args: CardsArgs, config: &AssemblerConfig) -> Result<()> {
    let (table, clips) = derive_selection(&args.selection, config).await?;

    let mut stdout = std::io::stdout().lock();
    for clip in &clips {
        let card_links = table.card_links_for(clip)?;
        if card_links.is_empty() {
            continue;
        }
        let name = table
            .video(clip.video_id)
            .map(|video| video.name.as_str())
            .unwrap_or_default();
        writeln!(
            stdout,
            "[{}] {} - clip {:02}",
            clip.video_id, name, clip.clip_index
        )?;
        writeln!(stdout, "{}", join_card_links(&card_links))?;
        writeln!(stdout)?;
    }
    Ok(())
}
