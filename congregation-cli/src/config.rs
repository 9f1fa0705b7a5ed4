//! Settings for the congregation binary
//!
//! Layered, lowest first: built-in defaults, `congregation.toml`, the
//! environment (a `.env` file is loaded into it), then command-line flags.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//! cors_permissive = false
//! allowed_origins = ["https://congregation.example.org"]
//!
//! [database]
//! url = "postgres://localhost/congregation"
//! name = "congregation"
//!
//! [collections]
//! gallery_image = "photos"
//! ```

use std::collections::HashMap;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use congregation_server::db::CollectionMap;
use congregation_server::http::DEFAULT_PORT;
use congregation_server::models::SchemaKind;
use congregation_server::{ConfigPresence, ServerConfig};
use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "congregation.toml";

const DEFAULT_HOST: &str = "0.0.0.0";

/// Contents of `congregation.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    /// Per-type collection name overrides
    pub collections: HashMap<SchemaKind, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_permissive: Option<bool>,
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub name: Option<String>,
}

impl FileConfig {
    /// Read the config file.
    ///
    /// An explicit path must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                bail!("Config not found at {}", path.display());
            }
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file (invalid TOML)")
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub cors_permissive: bool,
    pub allowed_origins: Vec<String>,
    pub collections: CollectionMap,
    /// Which connection variables the environment carried
    pub presence: ConfigPresence,
}

impl Settings {
    /// Load `.env`, the config file and the process environment.
    pub fn load(config_path: Option<&Path>, overrides: Overrides) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        let file = FileConfig::load(config_path)?;
        Self::resolve(file, |key| std::env::var(key).ok(), overrides)
    }

    /// Merge the layers. Empty environment values count as unset.
    pub fn resolve<F>(file: FileConfig, env: F, overrides: Overrides) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let env_url = env("DATABASE_URL");
        let env_name = env("DATABASE_NAME");
        let presence = ConfigPresence {
            database_url: env_url.is_some(),
            database_name: env_name.is_some(),
        };

        let port = match (overrides.port, env("PORT")) {
            (Some(port), _) => port,
            (None, Some(raw)) => raw
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            (None, None) => file.server.port.unwrap_or(DEFAULT_PORT),
        };

        let host = overrides
            .host
            .or_else(|| env("HOST"))
            .or(file.server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        Ok(Self {
            host,
            port,
            database_url: overrides.database_url.or(env_url).or(file.database.url),
            database_name: overrides.database_name.or(env_name).or(file.database.name),
            cors_permissive: file.server.cors_permissive.unwrap_or(true),
            allowed_origins: file.server.allowed_origins,
            collections: CollectionMap::with_overrides(&file.collections),
            presence,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid host address '{}'", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn server_config(&self) -> Result<ServerConfig> {
        Ok(ServerConfig {
            bind_addr: self.bind_addr()?,
            cors_permissive: self.cors_permissive,
            allowed_origins: self.allowed_origins.clone(),
        })
    }
}
