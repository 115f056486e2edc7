mod app;
mod color;
mod data;
mod layout;
mod selection;
mod session;
mod util;

use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::data::DEFAULT_MAX_RECORDS;
use crate::layout::{LayoutConfig, LayoutMode};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Global,
    PerCategory,
}

impl From<ModeArg> for LayoutMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Global => LayoutMode::Global,
            ModeArg::PerCategory => LayoutMode::PerCategory,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Posts JSON file to open on startup.
    #[arg(long)]
    input: Option<PathBuf>,
    /// JSON file with layout settings; missing keys keep their defaults.
    #[arg(long)]
    layout_config: Option<PathBuf>,
    /// Overrides the layout mode from the config file.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Only the first N posts of a file are shown.
    #[arg(long, default_value_t = DEFAULT_MAX_RECORDS)]
    max_records: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = match &args.layout_config {
        Some(path) => LayoutConfig::from_file(path)
            .with_context(|| format!("failed to load layout config {}", path.display()))?,
        None => LayoutConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    config.validate().context("invalid layout config")?;
    info!(mode = ?config.mode, max_records = args.max_records, "starting viewer");

    let startup = app::StartupOptions {
        input: args.input,
        max_records: args.max_records,
        config,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 920.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "sentiment-swarm",
        options,
        Box::new(move |cc| Ok(Box::new(app::SwarmApp::new(cc, startup)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
