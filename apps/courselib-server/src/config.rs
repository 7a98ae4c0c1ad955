//! Application configuration.
//!
//! Layered with figment:
//! 1) compiled defaults -> 2) YAML file (if provided) -> 3) env (`COURSELIB__*`)
//! -> 4) CLI overrides

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use anyhow::{Context, Result};
use courselib_pipeline::{Environment, PipelineConfig};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};

/// Prefix of environment overrides; nested keys are separated by `__`,
/// e.g. `COURSELIB__SERVER__BIND_ADDR`.
pub const ENV_PREFIX: &str = "COURSELIB__";

pub const DEFAULT_PORT: u16 = 8087;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub environment: Environment,
    pub logging: LoggingConfig,
    pub pipeline: PipelineConfig,
    pub docs: DocsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Text,
        }
    }
}

/// Metadata of the published OpenAPI document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub title: String,
    pub version: String,
    pub description: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_url: Option<String>,
    pub license_name: String,
    pub license_url: Option<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            title: "Course Library API".to_owned(),
            version: "v1".to_owned(),
            description: "Through this API you can access authors and their books.".to_owned(),
            contact_name: None,
            contact_email: None,
            contact_url: None,
            license_name: "MIT License".to_owned(),
            license_url: Some("https://opensource.org/licenses/MIT".to_owned()),
        }
    }
}

/// Overrides taken from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    /// -v info, -vv debug, -vvv trace
    pub verbose: u8,
}

impl AppConfig {
    /// Load defaults, then the YAML file at `path`, then `COURSELIB__*`
    /// environment variables.
    ///
    /// # Errors
    /// Fails when `path` is not a file or the merged configuration does not
    /// deserialize.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("invalid configuration")
    }

    pub fn apply_cli_overrides(&mut self, overrides: &CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.bind_addr.set_port(port);
        }
        let level = match overrides.verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        };
        if let Some(level) = level {
            level.clone_into(&mut self.logging.level);
        }
    }

    /// Pretty JSON rendering of the effective configuration.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize configuration")
    }
}
