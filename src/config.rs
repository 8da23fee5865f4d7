//! Configuration management for the semantic search server

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::language;
use crate::index::search::DEFAULT_THRESHOLD;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub index: IndexConfig,
    pub search: SearchConfig,
    #[serde(skip)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Directory all index requests are confined to. Defaults to the working directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub extensions: Vec<String>,
    /// Directory names skipped in addition to node_modules, .git, dist and build
    pub exclude_dirs: Vec<String>,
    pub max_files: usize,
    pub max_file_size_mb: u64,
    pub respect_gitignore: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_limit: usize,
    pub default_threshold: f32,
    pub preview_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            index: IndexConfig::default(),
            search: SearchConfig::default(),
            verbose: false,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            extensions: language::default_extensions(),
            exclude_dirs: vec![
                "target".to_string(),
                "__pycache__".to_string(),
                ".venv".to_string(),
            ],
            max_files: 10_000,
            max_file_size_mb: 5,
            respect_gitignore: true,
        }
    }
}

impl IndexConfig {
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb * 1024 * 1024
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            default_threshold: DEFAULT_THRESHOLD,
            preview_chars: 200,
        }
    }
}

/// Get the configuration file path
fn config_path() -> Result<PathBuf> {
    let config_dir = directories::ProjectDirs::from("com", "semantic-code-search", "semantic-search")
        .context("Failed to determine config directory")?
        .config_dir()
        .to_path_buf();

    Ok(config_dir.join("config.toml"))
}

/// Load configuration from file or use defaults
pub fn load_config(custom_path: Option<&str>) -> Result<Config> {
    let path = if let Some(p) = custom_path {
        PathBuf::from(p)
    } else {
        config_path()?
    };

    if path.exists() {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {:?}", path))?;
        Ok(config)
    } else {
        Ok(Config::default())
    }
}

/// Initialize configuration file with defaults
pub fn init_config() -> Result<()> {
    let path = config_path()?;

    if path.exists() {
        println!("Configuration file already exists at {:?}", path);
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let default_config = Config::default();
    let content = toml::to_string_pretty(&default_config)
        .context("Failed to serialize default config")?;

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config to {:?}", path))?;

    println!("Configuration initialized at {:?}", path);
    Ok(())
}

/// Show current configuration
pub fn show_config(config: &Config) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .context("Failed to serialize config")?;
    println!("{}", content);
    Ok(())
}
