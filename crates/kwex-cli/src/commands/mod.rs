//! CLI commands.

pub mod config;
pub mod extract;
pub mod inspect;

use std::path::{Path, PathBuf};

use tracing::debug;

use kwex_core::KwexConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kwex")
        .join("config.json")
}

/// Resolve the configuration file: the explicit path, else the default one.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration. An explicit path must exist; the default one may not.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<KwexConfig> {
    if let Some(path) = explicit {
        return Ok(KwexConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(KwexConfig::from_file(&path)?)
    } else {
        Ok(KwexConfig::default())
    }
}
