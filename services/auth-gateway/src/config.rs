//! Configuration types and loading
//!
//! Precedence: env vars > config file > defaults. Non-secret settings may
//! live in the TOML file; the signing secret and the Steam Web API key are
//! only ever read from the environment.
//!
//! Environment surface:
//! - `SECRET_KEY` (required): session token signing secret
//! - `ALGORITHM`: HS256 (default), HS384 or HS512
//! - `ACCESS_TOKEN_EXPIRE_MINUTES`: default token TTL, default 30
//! - `STEAM_API_KEY`: Steam Web API key for profile lookups
//! - `BACKEND_URL`: public base URL used for return-to and realm
//! - `LISTEN_ADDR`: bind address

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use common::Secret;
use serde::Deserialize;
use session::SigningConfig;
use steam_auth::RedirectConfig;
use url::Url;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub steam: SteamConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Externally reachable base URL of this service
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(skip)]
    pub secret_key: Option<Secret<String>>,
    #[serde(skip)]
    pub steam_api_key: Option<Secret<String>>,
}

/// HTTP listener settings
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Steam endpoints and outbound call bounds
#[derive(Debug, Deserialize)]
pub struct SteamConfig {
    #[serde(default = "default_openid_url")]
    pub openid_url: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Session token settings
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,
}

fn default_public_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8000))
}

fn default_max_connections() -> usize {
    1000
}

fn default_openid_url() -> String {
    steam_auth::OPENID_ENDPOINT.into()
}

fn default_api_url() -> String {
    steam_auth::API_BASE_URL.into()
}

fn default_timeout() -> u64 {
    steam_auth::DEFAULT_TIMEOUT_SECS
}

fn default_algorithm() -> String {
    "HS256".into()
}

fn default_ttl_minutes() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_connections: default_max_connections(),
        }
    }
}

impl Default for SteamConfig {
    fn default() -> Self {
        Self {
            openid_url: default_openid_url(),
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

fn parse_url(name: &str, raw: &str) -> common::Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| common::Error::Config(format!("{name} is not a valid URL ({raw}): {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(common::Error::Config(format!(
            "{name} must start with http:// or https://, got: {raw}"
        )));
    }
    Ok(url)
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_owned();
    (!value.is_empty()).then_some(value)
}

impl Config {
    /// Load configuration from an optional TOML file, then overlay the
    /// process environment.
    pub fn load(path: Option<&Path>) -> common::Result<Self> {
        let contents = match path {
            Some(path) => Some(std::fs::read_to_string(path)?),
            None => None,
        };
        Self::from_sources(contents.as_deref(), |key| std::env::var(key).ok())
    }

    /// Build configuration from TOML text and an environment lookup.
    pub fn from_sources(
        toml_text: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> common::Result<Self> {
        let mut config: Config = toml::from_str(toml_text.unwrap_or(""))?;

        if let Some(secret) = env("SECRET_KEY").and_then(non_empty) {
            config.secret_key = Some(Secret::new(secret));
        }
        if let Some(key) = env("STEAM_API_KEY").and_then(non_empty) {
            config.steam_api_key = Some(Secret::new(key));
        }
        if let Some(algorithm) = env("ALGORITHM").and_then(non_empty) {
            config.session.algorithm = algorithm;
        }
        if let Some(minutes) = env("ACCESS_TOKEN_EXPIRE_MINUTES").and_then(non_empty) {
            config.session.ttl_minutes = minutes.parse().map_err(|_| {
                common::Error::Config(format!(
                    "ACCESS_TOKEN_EXPIRE_MINUTES must be a whole number of minutes, got: {minutes}"
                ))
            })?;
        }
        if let Some(base_url) = env("BACKEND_URL").and_then(non_empty) {
            config.public_base_url = base_url;
        }
        if let Some(addr) = env("LISTEN_ADDR").and_then(non_empty) {
            config.server.listen_addr = addr.parse().map_err(|_| {
                common::Error::Config(format!("LISTEN_ADDR is not a socket address: {addr}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if self.secret_key.is_none() {
            return Err(common::Error::MissingEnv("SECRET_KEY"));
        }
        if self.session.ttl_minutes == 0 {
            return Err(common::Error::Config(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be greater than 0".into(),
            ));
        }
        if self.steam.timeout_secs == 0 {
            return Err(common::Error::Config(
                "steam.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.server.max_connections == 0 {
            return Err(common::Error::Config(
                "max_connections must be greater than 0".into(),
            ));
        }
        self.signing_config()?;
        self.redirect_config()?;
        self.steam_api_url()?;
        Ok(())
    }

    pub fn signing_config(&self) -> common::Result<SigningConfig> {
        let secret = self
            .secret_key
            .clone()
            .ok_or(common::Error::MissingEnv("SECRET_KEY"))?;
        let algorithm = session::parse_algorithm(&self.session.algorithm)
            .map_err(|e| common::Error::Config(format!("ALGORITHM: {e}")))?;
        Ok(SigningConfig {
            secret,
            algorithm,
            default_ttl: Duration::from_secs(self.session.ttl_minutes * 60),
        })
    }

    pub fn redirect_config(&self) -> common::Result<RedirectConfig> {
        let openid = parse_url("steam.openid_url", &self.steam.openid_url)?;
        let base = parse_url("BACKEND_URL", &self.public_base_url)?;
        RedirectConfig::from_base_url(openid, &base)
            .map_err(|e| common::Error::Config(e.to_string()))
    }

    pub fn steam_openid_url(&self) -> common::Result<Url> {
        parse_url("steam.openid_url", &self.steam.openid_url)
    }

    pub fn steam_api_url(&self) -> common::Result<Url> {
        parse_url("steam.api_url", &self.steam.api_url)
    }

    pub fn steam_timeout(&self) -> Duration {
        Duration::from_secs(self.steam.timeout_secs)
    }

    /// Resolve the config file from CLI arg or CONFIG_PATH env var.
    ///
    /// Falls back to `steam-auth-gateway.toml` in the working directory when
    /// it exists; otherwise runs on defaults and environment alone.
    pub fn resolve_path(cli_path: Option<&str>) -> Option<PathBuf> {
        if let Some(p) = cli_path {
            return Some(PathBuf::from(p));
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return Some(PathBuf::from(p));
        }
        let fallback = PathBuf::from("steam-auth-gateway.toml");
        fallback.exists().then_some(fallback)
    }
}
