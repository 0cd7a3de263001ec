//! Configuration module
//!
//! TOML file plus environment overrides for the Logo Objects connection.

#[allow(clippy::module_inception)]
pub mod config;

pub use config::{
    ClientSection, Config, ConfigError, LogoSection, RuntimeConfig, CONFIG_PATH_ENV,
    DEFAULT_CONFIG_FILE,
};
