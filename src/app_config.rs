use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.

/// Group container shared by the podcast app, relative to the home directory
pub const PODCASTS_CONTAINER: &str = "Library/Group Containers/243LU875E5.groups.com.apple.podcasts";

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Root of the TTML cache that batch mode scans
    #[serde(default = "default_ttml_dir")]
    pub ttml_dir: PathBuf,

    /// Podcast library database used for filename metadata
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Where batch mode writes transcripts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Prefix lines with `[HH:MM:SS]`
    #[serde(default)]
    pub include_timestamps: bool,

    /// Leave existing output files alone in batch mode
    #[serde(default = "default_true")]
    pub skip_existing: bool,

    /// Documents converted in parallel in batch mode
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Only cache entries whose identifier starts with this are converted
    #[serde(default = "default_identifier_prefix")]
    pub identifier_prefix: String,

    /// Catalog API settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Catalog API configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FetchConfig {
    /// Bearer token for the catalog API; requested from the token service when empty
    #[serde(default = "String::new")]
    pub bearer_token: String,

    /// Value of the `x-request-timestamp` header for the token service
    #[serde(default = "String::new")]
    pub request_timestamp: String,

    /// Value of the `X-Apple-ActionSignature` header for the token service
    #[serde(default = "String::new")]
    pub action_signature: String,

    /// Value of the `X-Apple-Store-Front` header
    #[serde(default = "default_storefront")]
    pub storefront: String,

    /// Catalog country code
    #[serde(default = "default_country")]
    pub country: String,

    /// Catalog language
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            bearer_token: String::new(),
            request_timestamp: String::new(),
            action_signature: String::new(),
            storefront: default_storefront(),
            country: default_country(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl FetchConfig {
    /// Whether a token can be requested from the token service
    pub fn has_signature(&self) -> bool {
        !self.request_timestamp.is_empty() && !self.action_signature.is_empty()
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn podcasts_container() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(PODCASTS_CONTAINER)
}

fn default_ttml_dir() -> PathBuf {
    podcasts_container().join("Library/Cache/Assets/TTML")
}

fn default_database_path() -> PathBuf {
    podcasts_container().join("Documents/MTLibrary.sqlite")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./transcripts")
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_identifier_prefix() -> String {
    "PodcastContent".to_string()
}

fn default_storefront() -> String {
    "143441-1,42 t:podcasts1".to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load the configuration from `path`, writing a default one if the file is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config file: {:?}", path))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(anyhow!("concurrency must be at least 1"));
        }

        if self.identifier_prefix.is_empty() {
            return Err(anyhow!("identifier_prefix must not be empty"));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(anyhow!("fetch.timeout_secs must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            ttml_dir: default_ttml_dir(),
            database_path: default_database_path(),
            output_dir: default_output_dir(),
            include_timestamps: false,
            skip_existing: true,
            concurrency: default_concurrency(),
            identifier_prefix: default_identifier_prefix(),
            fetch: FetchConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
