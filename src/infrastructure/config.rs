use std::path::Path;
use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;

use crate::core::state::DEFAULT_PAGE_SIZE;
use crate::core::trigger::DEFAULT_SCROLL_THRESHOLD_PX;
use crate::utils;

const CONFIG: &str = include_str!("../../.config/config.json5");

/// Paging and trigger settings shared by both feed kinds
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FeedSettings {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold_px: f64,
    #[serde(default)]
    pub scroll_throttle_ms: u64,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_scroll_threshold() -> f64 {
    DEFAULT_SCROLL_THRESHOLD_PX
}

impl FeedSettings {
    pub fn scroll_throttle(&self) -> Duration {
        Duration::from_millis(self.scroll_throttle_ms)
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            scroll_threshold_px: DEFAULT_SCROLL_THRESHOLD_PX,
            scroll_throttle_ms: 0,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct StoreSettings {
    #[serde(default)]
    pub latency_ms: u64,
}

impl StoreSettings {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct SeedSettings {
    #[serde(default)]
    pub comments: usize,
    #[serde(default)]
    pub feedback: usize,
    #[serde(default)]
    pub spread_hours: i64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub seed: SeedSettings,
}

impl Config {
    /// Loads the embedded defaults, then layers any user config file on top
    ///
    /// Unlike most settings files, a missing user file is fine: the demo runs
    /// on defaults alone.
    pub fn new() -> Result<Self, ConfigError> {
        Self::load_from(&utils::get_config_dir())
    }

    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(CONFIG, config::FileFormat::Json5));

        let config_files = [
            ("config.json5", config::FileFormat::Json5),
            ("config.json", config::FileFormat::Json),
            ("config.yaml", config::FileFormat::Yaml),
            ("config.toml", config::FileFormat::Toml),
            ("config.ini", config::FileFormat::Ini),
        ];
        let mut found_config = false;
        for (file, format) in &config_files {
            builder = builder.add_source(
                config::File::from(config_dir.join(file))
                    .format(*format)
                    .required(false),
            );
            if config_dir.join(file).exists() {
                found_config = true
            }
        }
        if !found_config {
            log::info!(
                "No configuration file found in {}, using defaults",
                config_dir.display()
            );
        }

        let cfg: Self = builder.build()?.try_deserialize()?;

        if cfg.feed.page_size == 0 {
            return Err(ConfigError::Message(String::from(
                "feed.page_size must be at least 1",
            )));
        }

        Ok(cfg)
    }

    /// Parses only the embedded defaults
    pub fn embedded() -> Result<Self, ConfigError> {
        json5::from_str(CONFIG)
            .map_err(|e| ConfigError::Message(format!("Failed to load default config: {e}")))
    }
}
