//! Dataset configuration
//!
//! Accepts the data-config keys used by the HiGlass tabix track (`url`,
//! `chromSizesUrl`) as aliases of the local path keys.

use crate::core::{TilerError, DEFAULT_TILE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_tile_size() -> u64 {
    DEFAULT_TILE_SIZE
}

fn default_threads() -> usize {
    1
}

/// Where a dataset's files live and how tiles are fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataConfig {
    /// Interval file (plain, gzip/BGZF or bzip2)
    #[serde(alias = "url")]
    pub data_path: PathBuf,
    /// Chromosome sizes table
    #[serde(alias = "chromSizesUrl")]
    pub chrom_sizes_path: PathBuf,
    #[serde(default = "default_tile_size")]
    pub tile_size: u64,
    /// Worker threads for batched tile fetches
    #[serde(default = "default_threads")]
    pub threads: usize,
}

impl DataConfig {
    pub fn new<P: Into<PathBuf>, C: Into<PathBuf>>(data_path: P, chrom_sizes_path: C) -> Self {
        Self {
            data_path: data_path.into(),
            chrom_sizes_path: chrom_sizes_path.into(),
            tile_size: DEFAULT_TILE_SIZE,
            threads: default_threads(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, TilerError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TilerError::Config(format!("invalid data config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TilerError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), TilerError> {
        if self.tile_size == 0 {
            return Err(TilerError::Config("tileSize must be positive".to_string()));
        }
        if self.threads == 0 {
            return Err(TilerError::Config("threads must be positive".to_string()));
        }
        Ok(())
    }
}
