//! Configuration management for regsync

use crate::error::{Error, Result};
use crate::gzip::CompressionLevel;
use crate::signature::DEFAULT_BLOCK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default gzip level, matching zlib's default
pub const DEFAULT_COMPRESSION_LEVEL: u32 = CompressionLevel::DEFAULT.get();

/// Largest accepted block size (64MB)
pub const MAX_BLOCK_SIZE: usize = 64 * 1024 * 1024;

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Block size for signatures and delta matching (bytes)
    pub block_size: usize,

    /// gzip level for compress and the recompression check (0-9)
    pub compression_level: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

impl Config {
    /// Load configuration from the default config file
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::io("reading config", e))?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::io("creating config dir", e))?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("serializing config: {}", e)))?;
        std::fs::write(path, contents).map_err(|e| Error::io("writing config", e))?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("regsync").join("config.toml"))
            .ok_or_else(|| Error::config("could not determine config directory"))
    }

    /// Reject values the engines cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(Error::config(format!(
                "block size must be between 1 and {} bytes, got {}",
                MAX_BLOCK_SIZE, self.block_size
            )));
        }
        CompressionLevel::new(self.compression_level)?;
        Ok(())
    }

    /// The configured gzip level
    pub fn level(&self) -> Result<CompressionLevel> {
        CompressionLevel::new(self.compression_level)
    }
}
