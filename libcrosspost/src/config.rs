//! Configuration management for Crosspost
//!
//! The config file is TOML under the XDG config directory
//! (`~/.config/crosspost/config.toml`), overridable with the
//! `CROSSPOST_CONFIG` environment variable. It holds the upstream API
//! credential, invocation defaults, and per-platform default values that
//! the resolver may substitute when a CLI flag is absent.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::platform::PlatformField;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Upstream API key. May also come from `CROSSPOST_API_KEY`.
    pub key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.crosspost.dev/v1".to_string()
}

/// Invocation defaults plus nested per-platform default tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    pub profile: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub timezone: Option<String>,

    pub x: Option<XDefaults>,
    pub instagram: Option<InstagramDefaults>,
    pub linkedin: Option<LinkedinDefaults>,
    pub facebook: Option<FacebookDefaults>,
    pub tiktok: Option<TiktokDefaults>,
    pub threads: Option<ThreadsDefaults>,
    pub youtube: Option<YoutubeDefaults>,
    pub reddit: Option<RedditDefaults>,
    pub pinterest: Option<PinterestDefaults>,
    pub bluesky: Option<BlueskyDefaults>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct XDefaults {
    pub long_form: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstagramDefaults {
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkedinDefaults {
    pub visibility: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacebookDefaults {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TiktokDefaults {
    pub privacy: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadsDefaults {
    pub reply_control: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YoutubeDefaults {
    pub visibility: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RedditDefaults {
    pub subreddit: Option<String>,
    pub flair: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PinterestDefaults {
    pub board: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlueskyDefaults {
    pub languages: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Persisted default for a platform-specific field, if configured
    pub fn field_default(&self, field: PlatformField) -> Option<&str> {
        let d = &self.defaults;
        let value = match field {
            PlatformField::XLongForm => d.x.as_ref()?.long_form.as_deref(),
            PlatformField::InstagramLocation => d.instagram.as_ref()?.location.as_deref(),
            PlatformField::LinkedinVisibility => d.linkedin.as_ref()?.visibility.as_deref(),
            PlatformField::FacebookPage => d.facebook.as_ref()?.page.as_deref(),
            PlatformField::TiktokPrivacy => d.tiktok.as_ref()?.privacy.as_deref(),
            PlatformField::ThreadsReplyControl => d.threads.as_ref()?.reply_control.as_deref(),
            PlatformField::YoutubeVisibility => d.youtube.as_ref()?.visibility.as_deref(),
            PlatformField::YoutubeTags => d.youtube.as_ref()?.tags.as_deref(),
            PlatformField::RedditSubreddit => d.reddit.as_ref()?.subreddit.as_deref(),
            PlatformField::RedditFlair => d.reddit.as_ref()?.flair.as_deref(),
            PlatformField::PinterestBoard => d.pinterest.as_ref()?.board.as_deref(),
            PlatformField::PinterestLink => d.pinterest.as_ref()?.link.as_deref(),
            PlatformField::BlueskyLanguages => d.bluesky.as_ref()?.languages.as_deref(),
        };
        value
    }
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CROSSPOST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("crosspost").join("config.toml"))
}
