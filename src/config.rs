use serde::Deserialize;

use crate::{
    models::{DislikePolicy, Settings, DEFAULT_MAX_HISTORY_ITEMS},
    services::registry::DEFAULT_MAX_OPEN_PROFILES,
};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL; without one, preferences live in process memory
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Expiry for stored preference blobs, in seconds
    #[serde(default)]
    pub preference_ttl_secs: Option<u64>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// History cap for new profiles
    #[serde(default = "default_max_history_items")]
    pub max_history_items: usize,

    /// Personalization flag for new profiles
    #[serde(default = "default_enable_personalization")]
    pub enable_personalization: bool,

    /// Place dislike policy for new profiles (`like_only` or `full`)
    #[serde(default)]
    pub dislike_policy: DislikePolicy,

    /// Base URL of the backend that mirrors place votes
    #[serde(default)]
    pub sync_url: Option<String>,

    /// Profiles kept loaded in memory before idle ones are closed
    #[serde(default = "default_max_open_profiles")]
    pub max_open_profiles: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_max_history_items() -> usize {
    DEFAULT_MAX_HISTORY_ITEMS
}

fn default_enable_personalization() -> bool {
    true
}

fn default_max_open_profiles() -> usize {
    DEFAULT_MAX_OPEN_PROFILES
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config
            .default_settings()
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid config: {}", e))?;
        if config.max_open_profiles == 0 {
            anyhow::bail!("Invalid config: MAX_OPEN_PROFILES must be positive");
        }
        Ok(config)
    }

    /// Settings given to profiles that have never been stored
    pub fn default_settings(&self) -> Settings {
        Settings {
            enable_personalization: self.enable_personalization,
            max_history_items: self.max_history_items,
            dislike_policy: self.dislike_policy,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
