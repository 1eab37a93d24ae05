use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use keybinder::cli::CliArgs;
use keybinder::{KeybindService, KeybinderConfig};

fn exe_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    keybinder::tracing::init(args.verbose);
    let config = match &args.config {
        Some(path) => KeybinderConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => KeybinderConfig::load(),
    };

    let paths = args
        .into_paths(&config, exe_dir().as_deref())
        .map_err(anyhow::Error::msg)?;
    tracing::info!("Baseline archive: {}", paths.baseline_archive.display());
    tracing::info!("Mods directory: {}", paths.mods_dir.display());

    let mut service = KeybindService::new(paths, config);
    let summary = service
        .generate()
        .context("Failed to generate merged keybindings")?;

    tracing::info!(
        "Done: {} keybinds, profile at {}",
        summary.keybinds,
        summary.files.profile.display()
    );
    Ok(())
}
