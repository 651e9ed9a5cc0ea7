//! Configuration types for palaeo

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::{Catalog, CatalogTables};
use crate::error::{Error, Result};
use crate::pipeline::BackendLogLevel;

const RESOURCES_ENV: &str = "PALAEO_STANZA_RESOURCES";
const PYTHON_ENV: &str = "PALAEO_PYTHON";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PalaeoConfig {
    /// Root of the backend's model store (`<home>/stanza_resources` by default)
    #[serde(default = "default_resources_dir")]
    pub resources_dir: PathBuf,

    /// Python interpreter used to run the backend worker
    #[serde(default = "default_python_cmd")]
    pub python_cmd: String,

    /// Worker script on disk; the embedded script is used when unset
    #[serde(default)]
    pub worker_script: Option<PathBuf>,

    /// Ask the backend to use a GPU when one is present
    #[serde(default = "default_use_gpu")]
    pub use_gpu: bool,

    /// Verbosity passed to the backend while it builds pipelines
    #[serde(default)]
    pub log_level: BackendLogLevel,

    /// Replacement catalog tables
    #[serde(default)]
    pub catalog: Option<CatalogTables>,
}

impl Default for PalaeoConfig {
    fn default() -> Self {
        Self {
            resources_dir: default_resources_dir(),
            python_cmd: default_python_cmd(),
            worker_script: None,
            use_gpu: default_use_gpu(),
            log_level: BackendLogLevel::default(),
            catalog: None,
        }
    }
}

impl PalaeoConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&contents).map_err(|e| {
            Error::ConfigError(format!(
                "Failed to parse TOML in '{}': {}",
                path.display(),
                e
            ))
        })
    }

    /// Load configuration with standard priority:
    /// ./palaeo.toml > <config_dir>/palaeo/config.toml > defaults
    pub fn load() -> Result<Self> {
        let local = PathBuf::from("palaeo.toml");
        if local.is_file() {
            return Self::from_file(local);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user = config_dir.join("palaeo").join("config.toml");
            if user.is_file() {
                return Self::from_file(user);
            }
        }

        Ok(Self::default())
    }

    /// Apply `PALAEO_STANZA_RESOURCES` and `PALAEO_PYTHON` on top of the loaded values.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(dir) = non_empty_env(RESOURCES_ENV) {
            self.resources_dir = PathBuf::from(dir);
        }
        if let Some(python) = non_empty_env(PYTHON_ENV) {
            self.python_cmd = python;
        }
        self
    }

    pub fn with_resources_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.resources_dir = dir.into();
        self
    }

    /// Build the catalog this configuration describes.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog {
            Some(tables) => Catalog::from_tables(tables.clone()),
            None => Catalog::builtin(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn default_resources_dir() -> PathBuf {
    if let Some(from_env) = non_empty_env(RESOURCES_ENV) {
        return PathBuf::from(from_env);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stanza_resources")
}

fn default_python_cmd() -> String {
    "python3".to_string()
}

fn default_use_gpu() -> bool {
    true
}
