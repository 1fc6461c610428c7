//! Client configuration.
//!
//! Configuration is an explicit value handed to [`Client`](crate::helix::Client) constructors;
//! nothing here is cached process-wide.

use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub const HELIX_URI_BASE: &str = "https://api.twitch.tv/helix";

pub const VAR_CLIENT_ID: &str = "CLIENT_ID";
pub const VAR_APP_TOKEN: &str = "APP_TOKEN";
pub const VAR_BASE_URL: &str = "HELIX_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigErr {
    #[error("while reading environment variable '{name}': {source}")]
    EnvError {
        name: &'static str,
        #[source]
        source: dotenvy::Error,
    },

    #[error("invalid base url '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

pub type ConfigResult<T> = core::result::Result<T, ConfigErr>;

#[derive(Clone)]
pub struct Config {
    pub client_id: String,
    pub app_access_token: Option<String>,
    pub base_url: Url,
}

impl Config {
    /// Builds a config against the public Helix endpoint with no access token.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            app_access_token: None,
            base_url: default_base_url(),
        }
    }

    pub fn with_app_access_token(mut self, token: impl Into<String>) -> Self {
        self.app_access_token = Some(token.into());
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Reads `CLIENT_ID`, `APP_TOKEN` and `HELIX_BASE_URL` from the process environment (or a
    /// `.env` file, if present).
    ///
    /// Only `CLIENT_ID` is required.
    #[instrument]
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| dotenvy::var(name))
    }

    fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&'static str) -> Result<String, dotenvy::Error>,
    {
        let required = |name: &'static str| {
            lookup(name).map_err(|source| ConfigErr::EnvError { name, source })
        };
        let optional = |name: &'static str| match lookup(name) {
            Ok(value) => Ok(Some(value)),
            Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
            Err(source) => Err(ConfigErr::EnvError { name, source }),
        };

        let mut config = Self::new(required(VAR_CLIENT_ID)?);
        config.app_access_token = optional(VAR_APP_TOKEN)?;

        if let Some(url) = optional(VAR_BASE_URL)? {
            let base_url =
                Url::parse(&url).map_err(|source| ConfigErr::InvalidBaseUrl { url, source })?;
            config.base_url = base_url;
        }

        debug!(
            base_url = %config.base_url,
            has_token = config.app_access_token.is_some(),
            "loaded client config"
        );

        Ok(config)
    }
}

// tokens stay out of logs
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field(
                "app_access_token",
                &self.app_access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

#[inline]
fn default_base_url() -> Url {
    Url::parse(HELIX_URI_BASE).expect("HELIX_URI_BASE is a valid url")
}
