//! Configuration for locating index data and reading tables.
//!
//! Supports a TOML config file, environment variable overrides, and defaults.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};
use crate::table::ReadOptions;

/// Name of the config file in the home directory.
pub const CONFIG_FILE_NAME: &str = ".planetarypy.toml";

/// Reader configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Where downloaded labels and index tables are archived
    pub data_root: PathBuf,
    /// Convert time columns when reading (default: true)
    pub normalize_times: bool,
    /// Strip padding around values (default: true)
    pub trim_values: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("~/.planetarypy/data"),
            normalize_times: true,
            trim_values: true,
        }
    }
}

/// On-disk layout: the data root lives in a `[data_archive]` table.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data_archive: Option<DataArchive>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reader: Option<ReaderSection>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DataArchive {
    path: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReaderSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    normalize_times: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trim_values: Option<bool>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

fn parse_bool(name: &str, val: &str) -> Result<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(IndexError::Config(format!("Invalid {}: {}", name, val))),
    }
}

impl IndexConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config file location (`~/.planetarypy.toml`).
    pub fn default_path() -> PathBuf {
        expand_home(&Path::new("~").join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| IndexError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(toml_str)
            .map_err(|e| IndexError::Config(format!("Invalid TOML: {}", e)))?;
        let mut config = Self::default();
        if let Some(archive) = file.data_archive {
            config.data_root = archive.path;
        }
        if let Some(reader) = file.reader {
            config.normalize_times = reader.normalize_times.unwrap_or(config.normalize_times);
            config.trim_values = reader.trim_values.unwrap_or(config.trim_values);
        }
        Ok(config)
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> Result<String> {
        let file = ConfigFile {
            data_archive: Some(DataArchive {
                path: self.data_root.clone(),
            }),
            reader: Some(ReaderSection {
                normalize_times: Some(self.normalize_times),
                trim_values: Some(self.trim_values),
            }),
        };
        toml::to_string_pretty(&file)
            .map_err(|e| IndexError::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Saves the configuration to a TOML file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml = self.to_toml()?;
        fs::write(path.as_ref(), toml)
            .map_err(|e| IndexError::Config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Loads the file if it exists, otherwise returns defaults.
    /// Environment overrides are applied either way.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Applies environment variable overrides.
    /// Environment variables are prefixed with `PDS_INDEX_`.
    /// Example: `PDS_INDEX_DATA_ROOT=/path` overrides `data_root`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("PDS_INDEX_DATA_ROOT") {
            self.data_root = PathBuf::from(val);
        }
        if let Ok(val) = env::var("PDS_INDEX_NORMALIZE_TIMES") {
            self.normalize_times = parse_bool("normalize_times", &val)?;
        }
        if let Ok(val) = env::var("PDS_INDEX_TRIM_VALUES") {
            self.trim_values = parse_bool("trim_values", &val)?;
        }
        Ok(())
    }

    /// Stores a new data root in the config file at `path`, keeping the
    /// file's other settings.
    pub fn set_data_root(path: impl AsRef<Path>, data_root: impl Into<PathBuf>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.data_root = data_root.into();
        config.save_to_file(path)?;
        tracing::info!(
            "Saved data root {} into {}",
            config.data_root.display(),
            path.display()
        );
        Ok(config)
    }

    /// Data root with `~` expanded, created if missing.
    pub fn ensure_data_root(&self) -> Result<PathBuf> {
        let root = expand_home(&self.data_root);
        fs::create_dir_all(&root).map_err(|e| {
            IndexError::Config(format!(
                "Failed to create data root {}: {}",
                root.display(),
                e
            ))
        })?;
        Ok(root)
    }

    pub fn read_options(&self) -> ReadOptions {
        ReadOptions {
            normalize_times: self.normalize_times,
            trim_values: self.trim_values,
            ..ReadOptions::default()
        }
    }
}
