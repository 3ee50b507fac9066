use crate::files::page::DEFAULT_PAGE_SIZE;
use crate::files::persist::DEFAULT_STORAGE_KEY;
use crate::files::upload::{DEFAULT_PROGRESS_INTERVAL, DEFAULT_PROGRESS_STEP};
use crate::files::validation::{DEFAULT_INVALID_MARKER, DESCRIPTION_MAX_LEN};
use crate::files::{
    JsonFileStorage, MemoryStorage, SqliteStorage, Storage, UploadSimulator, ValidationRules,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Where the file snapshot is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// One JSON file per storage key under the data directory.
    Json,
    /// A SQLite database in the data directory.
    Sqlite,
    /// Nothing survives the process.
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Percentage added per progress event.
    pub step: u8,
    pub interval_ms: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_PROGRESS_STEP,
            interval_ms: DEFAULT_PROGRESS_INTERVAL.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults to the platform data directory. `~` is expanded.
    pub data_dir: Option<String>,
    pub backend: Backend,
    pub storage_key: String,
    /// Names must contain, and descriptions must not contain, `42c-<owner>`.
    pub owner: String,
    pub invalid_marker: String,
    pub description_max_len: usize,
    pub page_size: usize,
    pub upload: UploadConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            backend: Backend::Json,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            owner: "demo".to_string(),
            invalid_marker: DEFAULT_INVALID_MARKER.to_string(),
            description_max_len: DESCRIPTION_MAX_LEN,
            page_size: DEFAULT_PAGE_SIZE,
            upload: UploadConfig::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "jsonshelf")
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    /// Loads `path`, or the default location when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        anyhow::ensure!(config.page_size > 0, "page_size must be at least 1");
        Ok(config)
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(PathBuf::from(shellexpand::tilde(dir).to_string()));
        }
        project_dirs()
            .map(|d| d.data_dir().to_path_buf())
            .context("No home directory to place data in; set data_dir")
    }

    pub fn rules(&self) -> ValidationRules {
        ValidationRules::new(&self.owner)
            .with_invalid_marker(self.invalid_marker.clone())
            .with_description_max_len(self.description_max_len)
    }

    pub fn simulator(&self) -> UploadSimulator {
        UploadSimulator::new(
            self.upload.step,
            Duration::from_millis(self.upload.interval_ms),
        )
    }

    pub fn open_storage(&self) -> Result<Arc<dyn Storage>> {
        Ok(match self.backend {
            Backend::Json => {
                let dir = self.data_dir()?;
                let storage = JsonFileStorage::new(&dir.to_string_lossy())
                    .with_context(|| format!("Failed to open data dir {}", dir.display()))?;
                Arc::new(storage)
            }
            Backend::Sqlite => {
                let dir = self.data_dir()?;
                let storage = SqliteStorage::new(&dir)
                    .with_context(|| format!("Failed to open database in {}", dir.display()))?;
                Arc::new(storage)
            }
            Backend::Memory => Arc::new(MemoryStorage::new()),
        })
    }
}
