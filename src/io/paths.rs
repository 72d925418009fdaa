use crate::error::{Result, StemError};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "STEM_SERVER_CONFIG";

pub fn config_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from("dev", "StemSplitter", "stem-splitter-server")
        .ok_or_else(|| StemError::Config("config dir not available".into()))?;
    Ok(PathBuf::from(proj.config_dir()))
}

/// `STEM_SERVER_CONFIG` when set, otherwise `config.json` in the per-user
/// config directory if that file exists.
pub fn default_config_file() -> Option<PathBuf> {
    if let Ok(p) = std::env::var(CONFIG_ENV) {
        return Some(PathBuf::from(p));
    }
    let p = config_dir().ok()?.join("config.json");
    p.is_file().then_some(p)
}
