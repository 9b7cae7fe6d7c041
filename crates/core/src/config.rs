use crate::mode::{DEFAULT_EXPORT_DIR, DEFAULT_IMAGE_EXTENSIONS};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Used by wx-exporter when `--output-dir` is not given.
    pub export_output_dir: String,
    pub export_image_extensions: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_output_dir: DEFAULT_EXPORT_DIR.to_string(),
            export_image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub config_path: PathBuf,
}

pub fn app_paths() -> Result<AppPaths> {
    let proj = ProjectDirs::from("com", "pyrgear", "pyrgear")
        .context("failed to resolve the OS configuration directory")?;
    let config_dir = proj.config_dir().to_path_buf();
    Ok(AppPaths {
        config_path: config_dir.join("config.toml"),
        config_dir,
    })
}

pub fn load_config() -> Result<AppConfig> {
    let paths = app_paths()?;
    load_config_from(&paths.config_path)
}

/// Missing file means defaults; a file that exists must parse.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let config = toml::from_str::<AppConfig>(&raw)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;
    Ok(config)
}

/// Like [`load_config`], but a missing or broken file only costs a warning.
pub fn load_config_or_default() -> AppConfig {
    match app_paths() {
        Ok(paths) => load_config_or_default_from(&paths.config_path),
        Err(err) => {
            tracing::warn!("{err:#}; using default settings");
            AppConfig::default()
        }
    }
}

pub fn load_config_or_default_from(path: &Path) -> AppConfig {
    load_config_from(path).unwrap_or_else(|err| {
        tracing::warn!("{err:#}; using default settings");
        AppConfig::default()
    })
}
