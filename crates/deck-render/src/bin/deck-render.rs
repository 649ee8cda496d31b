//! Render one page of a deck configuration and print the frame as JSON.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use deck_render::{Configuration, RenderRequest, StateSnapshot};

#[derive(Debug, Parser)]
#[command(
    name = "deck-render",
    about = "Preview a rendered deck page from a configuration and a state snapshot"
)]
struct Args {
    /// Deck configuration (`.toml` or `.json`).
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Entity state snapshot (JSON list or map). Empty when omitted.
    #[arg(long, value_name = "FILE")]
    states: Option<PathBuf>,

    /// Snapshot rendered first, so `changed` shows the diff against it.
    #[arg(long, value_name = "FILE")]
    baseline: Option<PathBuf>,

    /// Page id; defaults to the first page of the configuration.
    #[arg(long)]
    page: Option<String>,

    /// 1-based page number within a paginated page.
    #[arg(long, default_value_t = 1)]
    page_number: usize,

    /// Render as a sub page (adds the back button).
    #[arg(long)]
    sub_page: bool,
}

fn load_snapshot(path: Option<&PathBuf>) -> anyhow::Result<StateSnapshot> {
    let Some(path) = path else {
        return Ok(StateSnapshot::new());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(StateSnapshot::from_json_str(&text)?)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Configuration::load(&args.config)?;
    let page = match args.page {
        Some(page) => page,
        None => config
            .page_ids()
            .next()
            .map(str::to_string)
            .context("configuration has no pages")?,
    };
    let request = RenderRequest {
        page_number: args.page_number,
        is_sub_page: args.sub_page,
    };

    if let Some(baseline) = args.baseline.as_ref() {
        let snapshot = load_snapshot(Some(baseline))?;
        config.render_with(&page, &snapshot, request)?;
    }
    let snapshot = load_snapshot(args.states.as_ref())?;
    let frame = config.render_with(&page, &snapshot, request)?;
    info!(
        page = %page,
        page_number = frame.page_number,
        page_count = frame.page_count,
        changed = frame.changed.len(),
        "rendered"
    );
    println!("{}", serde_json::to_string_pretty(&frame)?);
    Ok(())
}
