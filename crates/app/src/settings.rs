//! Application settings.
//!
//! Read from an optional `settings.toml` in the working directory, then
//! overridden by `TRACKERS__SECTION__KEY` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Notifications {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for Notifications {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            capacity: default_capacity(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_capacity() -> usize {
    64
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    #[serde(default)]
    pub notifications: Notifications,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("TRACKERS").separator("__"))
            .build()?
            .try_deserialize()
    }
}
