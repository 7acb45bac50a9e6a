use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

use crate::retry::RetryPolicy;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub youtube: YoutubeConfig,
    pub classifier: ClassifierConfig,
    pub renderer: RendererConfig,
    pub web: WebConfig,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeConfig {
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: u32,
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    // Loaded from env
    #[serde(skip)]
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct ClassifierConfig {
    pub base_url: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct RendererConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

fn default_page_size() -> u32 {
    100
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> u32 {
    2
}

fn default_page_delay_ms() -> u64 {
    200
}

fn default_batch_size() -> usize {
    100
}

fn default_batch_delay_ms() -> u64 {
    100
}

impl YoutubeConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            multiplier: self.backoff_multiplier,
        }
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

impl ClassifierConfig {
    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_text =
            std::fs::read_to_string("config.toml").context("Failed to read config.toml")?;
        let mut config = Self::from_toml_str(&config_text)?;

        config.youtube.api_key =
            std::env::var("YOUTUBE_API_KEY").context("YOUTUBE_API_KEY not set")?;

        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config.toml")
    }
}
