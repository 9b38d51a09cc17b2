use crate::audio::{AudioSettings, FileFormat, Preset};
use crate::storage::DEFAULT_PREFIX;
use crate::worker::CaptureOptions;
use crate::worker::capture::DEFAULT_QUEUE_DEPTH;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    #[serde(default)]
    pub default_format: FileFormat,

    #[serde(default)]
    pub preset: Preset,

    /// Fully custom capture settings; replaces `preset` when present.
    #[serde(default)]
    pub settings: Option<AudioSettings>,

    /// Length of one timer unit in milliseconds.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

fn default_output_dir() -> PathBuf {
    let data_dir = if let Ok(dir) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(dir)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        PathBuf::from(".")
    };

    data_dir.join("timed-audio")
}

fn default_file_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_queue_depth() -> usize {
    DEFAULT_QUEUE_DEPTH
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_prefix: default_file_prefix(),
            default_format: FileFormat::default(),
            preset: Preset::default(),
            settings: None,
            tick_ms: default_tick_ms(),
            queue_depth: default_queue_depth(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.config/timed-audio/config.json)
    ///
    /// A missing file yields the defaults; nothing is written back.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::info!("Config file not found at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        tracing::info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = if let Ok(dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(dir)
        } else {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            PathBuf::from(home).join(".config")
        };

        Ok(config_dir.join("timed-audio").join("config.json"))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.file_prefix.is_empty() {
            return Err(anyhow::anyhow!("file_prefix cannot be empty"));
        }

        if self.file_prefix.contains(std::path::MAIN_SEPARATOR) {
            return Err(anyhow::anyhow!("file_prefix cannot contain a path separator"));
        }

        if self.tick_ms == 0 {
            return Err(anyhow::anyhow!("tick_ms must be positive"));
        }

        if self.queue_depth == 0 {
            return Err(anyhow::anyhow!("queue_depth must be positive"));
        }

        self.audio_settings()
            .validate()
            .context("Invalid audio settings")
    }

    pub fn audio_settings(&self) -> AudioSettings {
        self.settings
            .unwrap_or_else(|| AudioSettings::from_preset(self.preset))
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            directory: self.output_dir.clone(),
            prefix: self.file_prefix.clone(),
            format: self.default_format,
            settings: self.audio_settings(),
            queue_depth: self.queue_depth,
        }
    }
}
