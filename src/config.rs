use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::model::region::MatchKind;

/// Name of the settings file the extension reads its options from
pub const SETTINGS_FILENAME: &str = "RemoteImagesPreview.json";

/// Default per-buffer ceiling on counted matches
pub const DEFAULT_MAX_URLS: usize = 200;

/// Configuration shared between the event thread and the scan worker.
/// Re-read on every scan, so a reload takes effect on the next event.
pub type SharedConfig = Arc<RwLock<Config>>;

/// Extension configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Underline image references in buffers (default: true).
    /// Matching and caching happen regardless, so hover previews keep
    /// working when this is off.
    #[serde(default = "default_true", alias = "highlight_remote_image_urls")]
    pub highlight_images: bool,

    /// Buffers with more counted matches than this are ignored until they
    /// are closed and reopened
    #[serde(default = "default_max_url_limit")]
    pub max_url_limit: usize,

    /// Recognize inline `data:image/...` literals
    #[serde(default = "default_true")]
    pub match_data_uris: bool,

    /// Recognize image paths relative to the buffer's file
    #[serde(default = "default_true")]
    pub match_relative_paths: bool,

    /// Timeout for fetching a remote image on hover, in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Largest remote image body that will be read, in bytes
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: u64,
}

fn default_true() -> bool {
    true
}

fn default_max_url_limit() -> usize {
    DEFAULT_MAX_URLS
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_max_image_bytes() -> u64 {
    10 * 1024 * 1024
}

impl Default for Config {
    fn default() -> Self {
        Self {
            highlight_images: true,
            max_url_limit: DEFAULT_MAX_URLS,
            match_data_uris: true,
            match_relative_paths: true,
            fetch_timeout_ms: default_fetch_timeout_ms(),
            max_image_bytes: default_max_image_bytes(),
        }
    }
}

impl Config {
    /// Get the default settings file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("remote-images-preview").join(SETTINGS_FILENAME))
    }

    /// Settings from the default settings file, or defaults when there is
    /// no config directory
    pub fn load_or_default() -> Self {
        Self::default_config_path()
            .map(|path| Self::load_or_default_from(&path))
            .unwrap_or_default()
    }

    /// Settings from `path`. A missing file means defaults; an unreadable
    /// or invalid one is reported and replaced by defaults.
    pub fn load_or_default_from(path: &Path) -> Self {
        if !path.is_file() {
            tracing::debug!("No settings file at {}", path.display());
            return Self::default();
        }
        Self::load_from_file(path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring settings file {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Parse and validate a settings file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Config =
            serde_json::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the settings as pretty JSON, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let mut json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        json.push('\n');
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        std::fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "fetch_timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_image_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether matches of `kind` are searched for. Absolute URLs always are.
    pub fn kind_enabled(&self, kind: MatchKind) -> bool {
        match kind {
            MatchKind::AbsoluteUrl => true,
            MatchKind::DataUri => self.match_data_uris,
            MatchKind::RelativePath => self.match_relative_paths,
        }
    }

    /// Wrap into a [`SharedConfig`]
    pub fn shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }

    /// Copy of the current shared configuration
    pub fn snapshot(shared: &SharedConfig) -> Config {
        shared.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// JSON Schema describing the settings file
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(Config)).unwrap_or_default()
    }
}

/// Why a settings file could not be used
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read or written
    Io(String),
    /// The file is not valid settings JSON
    Parse(String),
    Serialize(String),
    /// The settings parsed but hold an unusable value
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (what, msg) = match self {
            Self::Io(msg) => ("settings file I/O failed", msg),
            Self::Parse(msg) => ("malformed settings", msg),
            Self::Serialize(msg) => ("cannot encode settings", msg),
            Self::Invalid(msg) => ("invalid setting", msg),
        };
        write!(f, "{what}: {msg}")
    }
}

impl std::error::Error for ConfigError {}
