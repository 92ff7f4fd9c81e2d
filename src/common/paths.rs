use anyhow::{Context, Result};
use std::path::PathBuf;

/// Directory holding `config.toml`
pub fn reelgen_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("reelgen");

    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory at {}", config_dir.display()))?;

    Ok(config_dir)
}

/// Default scratch space for pipeline runs
pub fn default_work_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("reelgen")
        .join("work")
}

pub fn config_file_path() -> Result<PathBuf> {
    Ok(reelgen_config_dir()?.join("config.toml"))
}
