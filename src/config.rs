//! Configuration management for the SharePoint adapter
//!
//! Options mirror the adapter's option array: the site `url` plus either a
//! `username`/`password` pair or a bearer `token`. Upload tuning and the
//! library root have defaults and rarely need to be set.

use config::{Config, Environment, File};
use log::{debug, info};
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Default document library folder the adapter is rooted at
pub const DEFAULT_ROOT: &str = "Shared Documents";

/// Default chunk size and single-shot threshold (10 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Largest chunk size or single-shot threshold accepted (256 MiB); each is
/// buffered in memory while it is sent
pub const MAX_CHUNK_SIZE: usize = 256 * 1024 * 1024;

/// Default per-request timeout handed to the HTTP client
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Adapter configuration
#[derive(Deserialize, Clone)]
pub struct AdapterConfig {
    /// Site endpoint, e.g. `https://tenant.sharepoint.com/sites/team`
    /// Environment: SHAREPOINT_URL
    pub url: String,

    /// Environment: SHAREPOINT_USERNAME / SHAREPOINT_PASSWORD
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,

    /// Bearer token, takes precedence over username/password
    /// Environment: SHAREPOINT_TOKEN
    #[serde(default)]
    pub token: Option<String>,

    /// Library folder every logical path is relative to
    #[serde(default = "default_root")]
    pub root: String,

    /// Bytes per chunk for chunked uploads
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Streams longer than this many bytes use the chunked strategy
    #[serde(default = "default_chunk_size")]
    pub upload_threshold: usize,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_root() -> String {
    DEFAULT_ROOT.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// How requests authenticate against the site
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { username: String, password: String },
    Token(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Credentials::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
        }
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("root", &self.root)
            .field("chunk_size", &self.chunk_size)
            .field("upload_threshold", &self.upload_threshold)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AdapterConfig {
    /// Build a configuration in code, with defaults for everything but the
    /// site and its credentials.
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        let (username, password, token) = match credentials {
            Credentials::Password { username, password } => (Some(username), Some(password), None),
            Credentials::Token(token) => (None, None, Some(token)),
        };
        Self {
            url: url.into(),
            username,
            password,
            token,
            root: default_root(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            upload_threshold: DEFAULT_CHUNK_SIZE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from sharepoint.toml with environment overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_paths = ["sharepoint", "config/sharepoint"];

        for config_path in &config_paths {
            match Config::builder()
                .add_source(File::with_name(config_path))
                .add_source(Environment::with_prefix("SHAREPOINT"))
                .build()
            {
                Ok(settings) => {
                    let config: AdapterConfig = settings.try_deserialize()?;
                    config.validate()?;
                    info!("Loaded configuration from {}.toml", config_path);
                    return Ok(config);
                }
                Err(e) => {
                    debug!("No usable config at {}: {}", config_path, e);
                    continue;
                }
            }
        }

        // No file found: the environment alone has to carry everything
        let settings = Config::builder()
            .add_source(Environment::with_prefix("SHAREPOINT"))
            .build()?;
        let config: AdapterConfig = settings.try_deserialize()?;
        config.validate()?;
        info!("Loaded configuration from environment");
        Ok(config)
    }

    /// Validation for all configuration values
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let url = Url::parse(&self.url).map_err(|e| {
            config::ConfigError::Message(format!("url is not a valid URL ({}): {}", self.url, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(config::ConfigError::Message(
                "url must use http or https".into(),
            ));
        }

        if url.host_str().is_none() {
            return Err(config::ConfigError::Message("url must name a host".into()));
        }

        self.credentials()?;

        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(config::ConfigError::Message(format!(
                "chunk_size must be between 1 and {} bytes",
                MAX_CHUNK_SIZE
            )));
        }

        if self.upload_threshold == 0 || self.upload_threshold > MAX_CHUNK_SIZE {
            return Err(config::ConfigError::Message(format!(
                "upload_threshold must be between 1 and {} bytes",
                MAX_CHUNK_SIZE
            )));
        }

        if self.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Resolve the configured credentials; a token wins over a password.
    pub fn credentials(&self) -> Result<Credentials, config::ConfigError> {
        if let Some(token) = self.token.as_ref().filter(|t| !t.is_empty()) {
            return Ok(Credentials::Token(token.clone()));
        }

        match (&self.username, &self.password) {
            (Some(username), Some(password)) if !username.is_empty() => {
                Ok(Credentials::Password {
                    username: username.clone(),
                    password: password.clone(),
                })
            }
            _ => Err(config::ConfigError::Message(
                "either token or username and password must be configured".into(),
            )),
        }
    }

    /// Get the request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password_config() -> AdapterConfig {
        AdapterConfig::new(
            "https://contoso.sharepoint.com/sites/team",
            Credentials::Password {
                username: "alice@contoso.com".into(),
                password: "secret".into(),
            },
        )
    }

    #[test]
    fn defaults_are_applied() {
        let config = password_config();
        assert_eq!(config.root, "Shared Documents");
        assert_eq!(config.chunk_size, 10 * 1024 * 1024);
        assert_eq!(config.upload_threshold, config.chunk_size);
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn token_takes_precedence() {
        let mut config = password_config();
        config.token = Some("abc".into());
        assert_eq!(config.credentials().unwrap(), Credentials::Token("abc".into()));
    }

    #[test]
    fn missing_credentials_are_rejected() {
        let mut config = password_config();
        config.password = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_urls_are_rejected() {
        let mut config = password_config();
        config.url = "not a url".into();
        assert!(config.validate().is_err());

        config.url = "ftp://contoso.sharepoint.com/sites/team".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_sizes_are_rejected() {
        let mut config = password_config();
        config.chunk_size = 0;
        assert!(config.validate().is_err());

        let mut config = password_config();
        config.upload_threshold = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_buffers_are_rejected() {
        let mut config = password_config();
        config.upload_threshold = usize::MAX;
        assert!(config.validate().is_err());

        let mut config = password_config();
        config.chunk_size = MAX_CHUNK_SIZE + 1;
        assert!(config.validate().is_err());

        let mut config = password_config();
        config.chunk_size = MAX_CHUNK_SIZE;
        config.upload_threshold = MAX_CHUNK_SIZE;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let rendered = format!("{:?}", password_config());
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("alice@contoso.com"));

        let token = format!("{:?}", Credentials::Token("abc123".into()));
        assert!(!token.contains("abc123"));
    }
}
