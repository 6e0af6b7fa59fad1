use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

// Runtime settings. Values come from an optional TOML file named by
// `PORTAL_CONFIG`, then environment variables override individual keys.

pub const DEFAULT_HTTP_PORT: u16 = 3004;
pub const DEFAULT_AUTH_HEADER_PREFIX: &str = "JWT";
pub const DEFAULT_EXPIRATION_SECONDS: u64 = 300;
// Only for local development; startup warns when it is used.
pub const DEV_JWT_SECRET: &str = "portal-dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    pub port: u16,
    // No URL means the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub auth_header_prefix: String,
    pub leeway_seconds: u64,
    pub expiration_seconds: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
            database_url: None,
            jwt: JwtConfig::default(),
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: None,
            auth_header_prefix: DEFAULT_AUTH_HEADER_PREFIX.to_string(),
            leeway_seconds: 0,
            expiration_seconds: DEFAULT_EXPIRATION_SECONDS,
        }
    }
}

impl PortalConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| env::var(name).ok())
    }

    /// Builds the configuration from `lookup`, which stands in for the process
    /// environment. Empty values count as unset.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let mut config = match lookup("PORTAL_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Some(port) = parsed(&lookup, "PORTAL_PORT")? {
            config.port = port;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = Some(url);
        }
        if let Some(secret) = lookup("JWT_SECRET") {
            config.jwt.secret = Some(secret);
        }
        if let Some(prefix) = lookup("JWT_AUTH_HEADER_PREFIX") {
            config.jwt.auth_header_prefix = prefix;
        }
        if let Some(leeway) = parsed(&lookup, "JWT_LEEWAY_SECONDS")? {
            config.jwt.leeway_seconds = leeway;
        }
        if let Some(expiration) = parsed(&lookup, "JWT_EXPIRATION_SECONDS")? {
            config.jwt.expiration_seconds = expiration;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn jwt_secret(&self) -> &str {
        self.jwt.secret.as_deref().unwrap_or(DEV_JWT_SECRET)
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { name, value })
        })
        .transpose()
}
