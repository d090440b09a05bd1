use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use haunted_house::{AppOptions, HauntedHouseApp, SceneConfig};

/// Haunted house with orbiting ghost lights
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML scene configuration; defaults to the built-in scene
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for the grave layout
    #[arg(long)]
    seed: Option<u64>,

    /// Start with the debug panel hidden (H toggles it)
    #[arg(long)]
    no_panel: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .default_filter_or("info,wgpu_core=warn,wgpu_hal=warn,naga=warn"),
    )
    .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display()))?,
        None => SceneConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.graves.seed = seed;
    }

    log::info!(
        "Starting with {} ghosts and {} graves (seed {})",
        config.ghosts.len(),
        config.graves.count,
        config.graves.seed
    );

    let options = AppOptions {
        show_panel: !cli.no_panel,
    };
    HauntedHouseApp::new(config, options).run()?;
    Ok(())
}
