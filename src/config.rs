// Configuration loading and parsing (stathub.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Published spreadsheet the league scorekeeper maintains.
const DEFAULT_SHEET_ID: &str = "1-CMiwe8UV0bHE1IR_z8zvg_kE2JfMnsfwB_lBc0rsk0";

const DEFAULT_TTL_SECS: u64 = 60;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

fn default_source_url() -> String {
    format!("https://docs.google.com/spreadsheets/d/{DEFAULT_SHEET_ID}/export?format=csv")
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// stathub.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire stathub.toml file. Every
/// section is optional; missing sections fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    source: SourceSection,
    #[serde(default)]
    cache: CacheSection,
}

#[derive(Debug, Clone, Deserialize)]
struct SourceSection {
    #[serde(default = "default_source_url")]
    url: String,
    #[serde(default = "SourceSection::default_timeout_secs")]
    timeout_secs: u64,
}

impl SourceSection {
    fn default_timeout_secs() -> u64 {
        DEFAULT_TIMEOUT_SECS
    }
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            url: default_source_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CacheSection {
    #[serde(default = "CacheSection::default_ttl_secs")]
    ttl_secs: u64,
}

impl CacheSection {
    fn default_ttl_secs() -> u64 {
        DEFAULT_TTL_SECS
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Public assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the published box-score sheet (CSV export endpoint).
    pub source_url: String,
    /// Hard deadline for a single fetch of the sheet.
    pub fetch_timeout: Duration,
    /// How long a fetched result stays valid before the next load re-fetches.
    pub cache_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            fetch_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load configuration from the given TOML file. A missing file is not an
/// error: the built-in defaults apply. A present-but-unreadable or
/// present-but-invalid file is.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = match std::fs::read_to_string(path) {
        Ok(text) => toml::from_str(&text).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => ConfigFile::default(),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };

    let config = Config {
        source_url: file.source.url,
        fetch_timeout: Duration::from_secs(file.source.timeout_secs),
        cache_ttl: Duration::from_secs(file.cache.ttl_secs),
    };

    validate(&config)?;

    Ok(config)
}

/// Convenience wrapper: loads `stathub.toml` relative to the current
/// working directory, falling back to defaults when the file is absent.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("stathub.toml"))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.source_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "source.url".into(),
            message: "must not be empty".into(),
        });
    }

    if !config.source_url.starts_with("http://") && !config.source_url.starts_with("https://") {
        return Err(ConfigError::ValidationError {
            field: "source.url".into(),
            message: format!("must be an http(s) URL, got `{}`", config.source_url),
        });
    }

    if config.fetch_timeout.is_zero() {
        return Err(ConfigError::ValidationError {
            field: "source.timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.cache_ttl.is_zero() {
        return Err(ConfigError::ValidationError {
            field: "cache.ttl_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
