use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// `$NIGHTBOOK_HOME`, or `~/.nightbook`.
pub fn nightbook_home() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("NIGHTBOOK_HOME").filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set (or set NIGHTBOOK_HOME)")?;
    Ok(PathBuf::from(home).join(".nightbook"))
}

pub fn ensure_nightbook_home() -> Result<PathBuf> {
    let dir = nightbook_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

/// Where records live when neither the flag nor the config names a directory.
pub fn default_data_dir() -> Result<PathBuf> {
    Ok(nightbook_home()?.join("data"))
}
