//! Configuration loading
//!
//! Settings come from a TOML file, with `LOGO_*` environment variables
//! taking precedence over the file.

use crate::auth::Credentials;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "LOGO_OBJECTS_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "logo-objects.toml";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {1}", path = .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Invalid TOML in {path}: {1}", path = .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

/// Connection settings of the `[logo]` section
#[derive(Clone, Default, Deserialize)]
pub struct LogoSection {
    pub base_url: Option<String>,
    pub client_key: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub firm_no: Option<u32>,
}

impl fmt::Debug for LogoSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hidden = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("LogoSection")
            .field("base_url", &self.base_url)
            .field("client_key", &hidden(&self.client_key))
            .field("username", &self.username)
            .field("password", &hidden(&self.password))
            .field("firm_no", &self.firm_no)
            .finish()
    }
}

/// HTTP behaviour of the `[client]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
    pub insecure_ssl: bool,
    pub page_size: u32,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 1000,
            timeout_secs: 120,
            insecure_ssl: false,
            page_size: 100,
        }
    }
}

/// Raw configuration as read from file and environment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logo: LogoSection,
    #[serde(default)]
    pub client: ClientSection,
}

/// Validated configuration used to build a client
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub base_url: String,
    pub credentials: Credentials,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
    pub insecure_ssl: bool,
    pub page_size: u32,
}

impl Config {
    /// Parse a TOML document
    pub fn from_toml(source: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(origin.to_path_buf(), e))
    }

    /// Load a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_toml(&source, path)
    }

    /// Load from `$LOGO_OBJECTS_CONFIG` or `./logo-objects.toml`, then apply
    /// environment overrides
    ///
    /// A missing default file is not an error; the environment alone may
    /// carry the connection settings.
    pub fn load_default() -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load(path)?
                } else {
                    tracing::debug!("No {} found, using environment only", DEFAULT_CONFIG_FILE);
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Override file values with `LOGO_*` variables from `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LOGO_BASE_URL") {
            self.logo.base_url = Some(v);
        }
        if let Some(v) = lookup("LOGO_CLIENT_KEY") {
            self.logo.client_key = Some(v);
        }
        if let Some(v) = lookup("LOGO_USERNAME") {
            self.logo.username = Some(v);
        }
        if let Some(v) = lookup("LOGO_PASSWORD") {
            self.logo.password = Some(v);
        }
        if let Some(v) = lookup("LOGO_FIRM_NO") {
            let firm_no = v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("LOGO_FIRM_NO", v.clone()))?;
            self.logo.firm_no = Some(firm_no);
        }
        Ok(())
    }

    /// Validate and convert to runtime configuration
    pub fn to_runtime(&self) -> Result<RuntimeConfig, ConfigError> {
        let base_url = required(&self.logo.base_url, "logo.base_url")?;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid("logo.base_url", base_url));
        }

        let credentials = Credentials {
            client_key: required(&self.logo.client_key, "logo.client_key")?,
            username: required(&self.logo.username, "logo.username")?,
            password: required(&self.logo.password, "logo.password")?,
            firm_no: self.logo.firm_no.ok_or(ConfigError::Missing("logo.firm_no"))?,
        };

        Ok(RuntimeConfig {
            base_url,
            credentials,
            max_retries: self.client.max_retries,
            retry_delay_ms: self.client.retry_delay_ms,
            timeout_secs: self.client.timeout_secs,
            insecure_ssl: self.client.insecure_ssl,
            page_size: self.client.page_size,
        })
    }
}

fn required(value: &Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::Missing(name)),
    }
}
