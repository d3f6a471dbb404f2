//! Configuration loading and config file resolution
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`ATTRIB_CONFIG`)
//! 3. Platform config directory (`~/.config/attrib/config.toml` on Linux)
//! 4. Built-in defaults (no file)
//!
//! Every section is optional; missing keys fall back to built-in defaults so a
//! partial TOML file is always valid.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "ATTRIB_CONFIG";

/// Environment variable overriding `backend.model`
pub const MODEL_ENV_VAR: &str = "ATTRIB_BACKEND_MODEL";

/// Complete configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Optional TOML file with prompt templates
    pub prompts_file: Option<PathBuf>,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Text generation backend
    pub backend: BackendConfig,
    /// Image captioning command
    pub captioner: CaptionerConfig,
    /// Video frame extraction
    pub frames: FrameConfig,
    /// Structural limits of the metadata pipeline
    pub pipeline: PipelineConfig,
    /// Static dataset locations
    pub datasets: DatasetConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit log lines as JSON instead of human-readable text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Text generation backend (local `ollama` by default)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Executable invoked as `<command> run <model>`
    pub command: String,
    /// Model identifier passed to the backend
    pub model: String,
    /// Upper bound for a single generation call
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            command: "ollama".to_string(),
            model: "gemma2:2b".to_string(),
            timeout_secs: 120,
        }
    }
}

impl BackendConfig {
    /// Generation timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// External captioning command
///
/// The image path is appended as the final argument; stdout is the caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionerConfig {
    pub command: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for CaptionerConfig {
    fn default() -> Self {
        Self {
            command: "attrib-caption".to_string(),
            args: Vec::new(),
            timeout_secs: 60,
        }
    }
}

impl CaptionerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Video frame extraction via ffprobe/ffmpeg
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
    /// Frames sampled per video
    pub count: usize,
    /// Directory receiving extracted frames
    pub cache_dir: PathBuf,
    pub timeout_secs: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            count: 1,
            cache_dir: PathBuf::from(".cache/frames"),
            timeout_secs: 60,
        }
    }
}

impl FrameConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Structural limits of generated metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Hard cap on keywords per asset
    pub max_keywords: usize,
    /// Hard cap on description length (characters)
    pub max_description_len: usize,
    /// Candidates more similar than this to a kept keyword are dropped
    pub similarity_threshold: f64,
    /// Caption tokens used as base keyword terms
    pub max_base_terms: usize,
    /// Last-resort padding terms, used in order
    pub filler_terms: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_keywords: 49,
            max_description_len: 200,
            similarity_threshold: 0.85,
            max_base_terms: 10,
            filler_terms: vec![
                "visual".to_string(),
                "scene".to_string(),
                "detail".to_string(),
                "closeup".to_string(),
                "color".to_string(),
            ],
        }
    }
}

impl PipelineConfig {
    /// Reject limits the pipeline cannot honor
    pub fn validate(&self) -> Result<()> {
        if self.max_keywords == 0 {
            return Err(Error::Config("pipeline.max_keywords must be > 0".to_string()));
        }
        if self.max_description_len == 0 {
            return Err(Error::Config(
                "pipeline.max_description_len must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(Error::Config(format!(
                "pipeline.similarity_threshold must be within 0.0..=1.0, got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

/// Locations of the static lookup tables (built-in tables used when unset)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// JSON array of `{ "name": ..., "terms": [...] }`
    pub taxonomy: Option<PathBuf>,
    /// Directory holding `<topic>.json` arrays of entry names
    pub calendar_dir: Option<PathBuf>,
    /// JSON object `term -> [synonyms]`
    pub synonyms: Option<PathBuf>,
}

/// Resolve which config file to load
///
/// Returns `None` when no candidate exists; callers then use
/// `TomlConfig::default()`.
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|path| path.exists())
}

/// Platform default config file path (`<config_dir>/attrib/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("attrib").join("config.toml"))
}

/// Load and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
    config.pipeline.validate()?;
    debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Load configuration using the resolution order, then apply env overrides
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let mut config = match resolve_config_path(cli_arg, CONFIG_ENV_VAR) {
        Some(path) => {
            info!("Using config file: {}", path.display());
            load_toml_config(&path)?
        }
        None => {
            info!("No config file found, using built-in defaults");
            TomlConfig::default()
        }
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Apply environment variable overrides on top of file values
pub fn apply_env_overrides(config: &mut TomlConfig) {
    if let Ok(model) = std::env::var(MODEL_ENV_VAR) {
        if !model.trim().is_empty() {
            info!("Backend model overridden by {}: {}", MODEL_ENV_VAR, model);
            config.backend.model = model;
        }
    }
}

/// Write config to TOML atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, path)?;
    Ok(())
}
