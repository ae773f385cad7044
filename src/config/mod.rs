use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod validator;

use crate::adapters::notifications::DEFAULT_CAPACITY;
use crate::cli::Cli;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "schemaforge.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub registry: RegistrySettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RegistrySettings {
    /// Directory of `.json` / `.yaml` / `.yml` create payloads imported at startup
    #[serde(default)]
    pub seed_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationSettings {
    /// Notifications buffered per SSE subscriber before older ones are dropped
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Settings {
    pub fn new() -> Result<Self, anyhow::Error> {
        Self::from_file(PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Create settings from CLI arguments (includes config file and CLI overrides)
    pub fn new_with_cli(cli: &Cli) -> Result<Self, anyhow::Error> {
        let mut settings = Self::load(cli.config.clone())?;

        // Apply CLI overrides (CLI > env vars > config file)
        settings.apply_cli_overrides(cli);

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_file(path: PathBuf) -> Result<Self, anyhow::Error> {
        let settings = Self::load(path)?;
        settings.validate()?;
        Ok(settings)
    }

    fn load(path: PathBuf) -> Result<Self, anyhow::Error> {
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("notifications.capacity", DEFAULT_CAPACITY as u64)?
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("SCHEMAFORGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(s.try_deserialize()?)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        validator::ConfigValidator::validate(self).map_err(|errors| {
            let error_messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            anyhow::anyhow!(
                "Configuration validation failed:\n{}",
                error_messages.join("\n")
            )
        })
    }

    /// Apply CLI argument overrides to settings
    fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(seed_dir) = &cli.seed_dir {
            self.registry.seed_dir = Some(seed_dir.clone());
        }
    }
}
