//! Config subcommands handler

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use actmine::Config;

use super::load_config;

fn target_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path.to_path_buf()),
        None => Config::config_path(),
    }
}

/// Show the effective configuration as TOML.
pub fn handle_show(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}

/// Write a default config file, refusing to overwrite one unless forced.
pub fn handle_init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = target_path(config_path)?;
    if path.exists() && !force {
        bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    match config_path {
        Some(path) => Config::default().save_to(path)?,
        None => {
            Config::default().save()?;
        }
    }

    println!("Wrote default config to {}", path.display());
    Ok(())
}

/// Print where the config file is read from.
pub fn handle_path(config_path: Option<&Path>) -> Result<()> {
    println!("{}", target_path(config_path)?.display());
    Ok(())
}
