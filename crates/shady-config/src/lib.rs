//! Shady Configuration Management
//!
//! Handles loading build settings from `shady.toml` in the project directory
//! or from the user config directory, and default config generation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local configuration file name
pub const PROJECT_CONFIG_FILE: &str = "shady.toml";
/// Per-user configuration directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "shady";
/// Per-user configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Build configuration section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Shader directory, relative to the project directory
    pub shaders_dir: PathBuf,
    /// Shader file extensions, without the dot, matched case-insensitively
    pub extensions: Vec<String>,
    /// Classification pool size
    pub workers: usize,
    /// Number written in `#line` for the first source line
    pub line_offset: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            shaders_dir: PathBuf::from("shaders"),
            extensions: vec!["fsh".to_string(), "vsh".to_string()],
            workers: 4,
            line_offset: 1,
        }
    }
}

impl BuildConfig {
    /// True if `path` has one of the configured shader extensions
    pub fn is_shader(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Backup archive section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub enabled: bool,
    /// Explicit archive directory; falls back to the IDE cache directory
    pub directory: Option<PathBuf>,
    /// Archived copies kept per shader
    pub keep: usize,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
            keep: 5,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,
}

impl Config {
    /// Load configuration for a project.
    ///
    /// Priority: `explicit` path > `<project>/shady.toml` > user config > defaults
    pub fn load(project: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            let config = Self::load_from(path)?;
            log::info!("Loaded configuration from {:?}", path);
            return Ok(config);
        }

        let candidates = [Some(project.join(PROJECT_CONFIG_FILE)), Self::user_config_path()];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                let config = Self::load_from(&path)?;
                log::info!("Loaded configuration from {:?}", path);
                return Ok(config);
            }
        }

        log::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Per-user configuration file (`<config dir>/shady/config.toml`)
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Default configuration as a commented TOML document
    pub fn generate_default_config() -> Result<String, ConfigError> {
        let toml_content =
            toml::to_string_pretty(&Config::default()).map_err(ConfigError::Serialize)?;

        Ok(format!(
            "# Shady shader preprocessor configuration\n\
             #\n\
             # build.shaders_dir is relative to the project directory.\n\
             # Without archive.directory, backups are archived under the IDE cache\n\
             # directory when it is known.\n\
             \n\
             {toml_content}"
        ))
    }

    /// Write the default configuration to `path`
    pub fn save_default(path: &Path) -> Result<(), ConfigError> {
        let content = Self::generate_default_config()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io(parent.to_path_buf(), e))?;
        }
        fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        log::info!("Created default configuration at {:?}", path);
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write a config file
    Io(PathBuf, std::io::Error),
    /// Failed to parse config file
    Parse(PathBuf, toml::de::Error),
    /// Failed to serialize config
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Failed to access {:?}: {}", path, e),
            ConfigError::Parse(path, e) => write!(f, "Failed to parse {:?}: {}", path, e),
            ConfigError::Serialize(e) => write!(f, "Failed to serialize config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}
