//! Configuration handling for the ssrmine CLI
//!
//! Supports loading defaults from ssrmine.toml files with CLI argument
//! overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub compare: CompareConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default number of threads to use
    #[serde(default = "default_threads")]
    pub threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Motif threshold table, `len=minrep` entries separated by commas
    #[serde(default = "default_motifs")]
    pub motifs: String,

    /// Flank width in bases
    #[serde(default = "default_flank_len")]
    pub flank_len: usize,

    /// Minimum total SSR length
    #[serde(default = "default_min_ssr_len")]
    pub min_ssr_len: usize,

    /// Maximum total SSR length
    #[serde(default = "default_max_ssr_len")]
    pub max_ssr_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Flank matching method: exact, ld or nw
    #[serde(default = "default_method")]
    pub method: String,

    /// Levenshtein acceptance threshold (normalized distance)
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Needleman-Wunsch acceptance threshold (identity)
    #[serde(default = "default_min_identity")]
    pub min_identity: f64,

    /// Needleman-Wunsch match score
    #[serde(default = "default_match_score")]
    pub match_score: i32,

    /// Needleman-Wunsch mismatch score
    #[serde(default = "default_mismatch_score")]
    pub mismatch_score: i32,

    /// Needleman-Wunsch gap score
    #[serde(default = "default_gap_score")]
    pub gap_score: i32,

    /// Reduced-key fold for the approximate pre-filter
    #[serde(default = "default_reduce_fold")]
    pub reduce_fold: usize,

    /// Reduced-key substitutions tried by the pre-filter (0, 1 or 2)
    #[serde(default)]
    pub mismatches: u8,
}

// Default value functions
fn default_threads() -> usize {
    num_cpus::get()
}
fn default_motifs() -> String {
    "1=10,2=7,3=6,4=5,5=4,6=4".to_string()
}
fn default_flank_len() -> usize {
    100
}
fn default_min_ssr_len() -> usize {
    10
}
fn default_max_ssr_len() -> usize {
    10_000
}
fn default_method() -> String {
    "ld".to_string()
}
fn default_max_distance() -> f64 {
    0.05
}
fn default_min_identity() -> f64 {
    0.95
}
fn default_match_score() -> i32 {
    1
}
fn default_mismatch_score() -> i32 {
    -1
}
fn default_gap_score() -> i32 {
    -2
}
fn default_reduce_fold() -> usize {
    3
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            threads: default_threads(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            motifs: default_motifs(),
            flank_len: default_flank_len(),
            min_ssr_len: default_min_ssr_len(),
            max_ssr_len: default_max_ssr_len(),
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            method: default_method(),
            max_distance: default_max_distance(),
            min_identity: default_min_identity(),
            match_score: default_match_score(),
            mismatch_score: default_mismatch_score(),
            gap_score: default_gap_score(),
            reduce_fold: default_reduce_fold(),
            mismatches: 0,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            scan: ScanConfig::default(),
            compare: CompareConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                let default_path = PathBuf::from("ssrmine.toml");
                if default_path.exists() {
                    log::info!("Loading configuration from: ssrmine.toml");
                    Self::load_from_file(&default_path)?
                } else {
                    log::debug!("Using default configuration");
                    Self::default()
                }
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write configuration file: {}", path.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan.flank_len, 100);
        assert_eq!(config.compare.method, "ld");
        assert_eq!(config.compare.reduce_fold, 3);
    }

    #[test]
    fn test_config_roundtrip() -> Result<()> {
        let config = Config::default();
        let temp_file = NamedTempFile::new()?;

        config.save_to_file(temp_file.path())?;
        let loaded = Config::load_from_file(temp_file.path())?;

        assert_eq!(config.scan.motifs, loaded.scan.motifs);
        assert_eq!(config.compare.method, loaded.compare.method);
        assert_eq!(config.compare.max_distance, loaded.compare.max_distance);

        Ok(())
    }

    #[test]
    fn test_partial_file_fills_defaults() -> Result<()> {
        let temp_file = NamedTempFile::new()?;
        std::fs::write(temp_file.path(), "[scan]\nflank_len = 150\n")?;

        let loaded = Config::load_from_file(temp_file.path())?;
        assert_eq!(loaded.scan.flank_len, 150);
        assert_eq!(loaded.scan.motifs, "1=10,2=7,3=6,4=5,5=4,6=4");
        assert_eq!(loaded.compare.method, "ld");

        Ok(())
    }
}
