use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    endpoints::Endpoints,
    error::{MoodscopeError, Result},
};

const CONFIG_FILE: &str = "config.toml";

/// Page size sent with every YouTube analysis request.
pub const DEFAULT_MAX_COMMENTS: u32 = 100;

/// Comment total used for chart labels when no video metadata is around.
pub const DEFAULT_FALLBACK_COMMENTS: u64 = 1000;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoints: Endpoints,
    pub youtube: YoutubeConfig,
    pub http: HttpConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    pub max_comments: u32,
    pub fallback_comments: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            max_comments: DEFAULT_MAX_COMMENTS,
            fallback_comments: DEFAULT_FALLBACK_COMMENTS,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout. Unset means requests wait as long as the
    /// server takes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl HttpConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// `<config_dir>/moodscope`, or `/tmp/moodscope` when the platform has no
/// config directory.
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("moodscope")
}

pub fn get_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE)
}

impl AppConfig {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| MoodscopeError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| MoodscopeError::ConfigParse {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
