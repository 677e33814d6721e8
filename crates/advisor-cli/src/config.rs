//! Configuration file management for advisor.
//!
//! Provides a TOML-based config file at `~/.config/advisor/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use advisor_core::recommend::DEFAULT_RETRY_BUDGET;
use advisor_core::recommend::command::DEFAULT_TIMEOUT;
use advisor_data::config::{DataConfig, default_data_dir};

/// Environment variable naming the generator command line.
pub const GENERATOR_ENV_VAR: &str = "ADVISOR_GENERATOR";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub data: DataSection,
    pub generator: GeneratorSection,
    pub recommend: RecommendSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Directory holding `courses.json` and `degrees/`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    /// Command line of the plan generator, split on whitespace.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub timeout_secs: u64,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            command: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendSection {
    pub retry_budget: u32,
}

impl Default for RecommendSection {
    fn default() -> Self {
        Self {
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the advisor config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/advisor` or `~/.config/advisor`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("advisor");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("advisor")
}

/// Return the path to the advisor config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file at {}", path.display()))?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;
    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line. `None` defers to the next source.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub generator: Option<String>,
    pub timeout_secs: Option<u64>,
    pub retry_budget: Option<u32>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct AdvisorConfig {
    pub data_config: DataConfig,
    pub generator: Option<String>,
    pub timeout: Duration,
    pub retry_budget: u32,
}

impl AdvisorConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Data directory: `--data-dir` > `ADVISOR_DATA_DIR` > `data.dir` > `default_data_dir()`
    /// - Generator: `--generator` > `ADVISOR_GENERATOR` > `generator.command` > none
    /// - Timeout and retry budget: flag > config file > built-in default
    ///
    /// A missing config file is fine; an unreadable or malformed one is an error.
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let path = config_path();
        let file_config = if path.exists() {
            load_config_from(&path)?
        } else {
            ConfigFile::default()
        };

        let data_dir = if let Some(dir) = &overrides.data_dir {
            dir.clone()
        } else if let Ok(dir) = std::env::var(DataConfig::ENV_VAR) {
            PathBuf::from(dir)
        } else if let Some(dir) = file_config.data.dir {
            dir
        } else {
            default_data_dir()
        };

        let generator = overrides
            .generator
            .clone()
            .or_else(|| std::env::var(GENERATOR_ENV_VAR).ok())
            .or(file_config.generator.command)
            .filter(|c| !c.trim().is_empty());

        let timeout_secs = overrides
            .timeout_secs
            .unwrap_or(file_config.generator.timeout_secs);
        let retry_budget = overrides
            .retry_budget
            .unwrap_or(file_config.recommend.retry_budget);

        Ok(Self {
            data_config: DataConfig::new(data_dir),
            generator,
            timeout: Duration::from_secs(timeout_secs),
            retry_budget,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
