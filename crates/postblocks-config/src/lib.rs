use postblocks_engine::{BlockTypeLookup, Registry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod block_types;

pub use block_types::{AttributeSource, BlockTypeConfig};

use block_types::BlockTypesFile;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid include pattern `{pattern}`: {source}")]
    InvalidInclude {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Invalid block type `{name}`: {reason}")]
    InvalidBlockType { name: String, reason: String },
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Block type that governs freeform text and unregistered names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unknown_type_handler: Option<String>,

    /// Glob patterns of further block type files, relative to this file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_types: Vec<BlockTypeConfig>,

    /// Block types read from `include`, in load order.
    #[serde(skip)]
    pub included: Vec<BlockTypeConfig>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let mut config: Config = read_toml(config_path)?;

        let base_dir = config_path.parent().unwrap_or(Path::new("."));
        for pattern in &config.include {
            for path in Self::resolve_include(base_dir, pattern)? {
                log::debug!("including block types from {}", path.display());
                let file: BlockTypesFile = read_toml(&path)?;
                config.included.extend(file.block_types);
            }
        }

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/postblocks");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Build a registry from the included block types, then this file's own.
    /// A type declared in both places takes this file's definition.
    pub fn to_registry(&self) -> Result<Registry, ConfigError> {
        let mut registry = Registry::new();
        for config in self.included.iter().chain(&self.block_types) {
            if registry.register(config.to_block_type()?).is_some() {
                log::debug!("block type `{}` redefined", config.name);
            }
        }

        if let Some(handler) = &self.unknown_type_handler {
            if registry.block_type(handler).is_none() {
                log::warn!(
                    "unknown type handler `{handler}` is not a registered block type; \
                     freeform text and unknown sections will be dropped"
                );
            }
            registry.set_unknown_type_handler(handler.clone());
        }

        Ok(registry)
    }

    fn resolve_include(base_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, ConfigError> {
        let expanded = Self::expand_path(Path::new(pattern)).unwrap_or_else(|| pattern.into());
        let full = if expanded.is_absolute() {
            expanded
        } else {
            base_dir.join(expanded)
        };

        let full = full.to_string_lossy();
        let paths = glob::glob(&full).map_err(|source| ConfigError::InvalidInclude {
            pattern: pattern.to_string(),
            source,
        })?;

        // Unreadable entries are skipped, the same as a pattern matching nothing
        let mut paths: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
        paths.sort();
        if paths.is_empty() {
            log::warn!("include pattern `{pattern}` matched no files");
        }
        Ok(paths)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
        config_path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
        config_path: path.to_path_buf(),
        source,
    })
}
