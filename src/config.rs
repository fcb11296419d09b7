//! Marketplace connection settings.
//!
//! Settings come from a JSON file or from `HITSYNC_*` environment variables.
//! The host is normalized (scheme and trailing slash stripped) and must name
//! either the production or the sandbox marketplace endpoint; omitting it
//! selects production.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Production marketplace API host.
pub const PRODUCTION_HOST: &str = "mechanicalturk.amazonaws.com";
/// Sandbox marketplace API host.
pub const SANDBOX_HOST: &str = "mechanicalturk.sandbox.amazonaws.com";
/// Worker-facing site for the production marketplace.
pub const PRODUCTION_WORKER_URL: &str = "https://www.mturk.com";
/// Worker-facing site for the sandbox marketplace.
pub const SANDBOX_WORKER_URL: &str = "https://workersandbox.mturk.com";

/// Debug level used when none is configured.
pub const DEFAULT_DEBUG_LEVEL: u8 = 1;

const ENV_ACCESS_KEY_ID: &str = "HITSYNC_ACCESS_KEY_ID";
const ENV_SECRET_ACCESS_KEY: &str = "HITSYNC_SECRET_ACCESS_KEY";
const ENV_HOST: &str = "HITSYNC_HOST";
const ENV_DEBUG: &str = "HITSYNC_DEBUG";

/// Errors raised while loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential is absent or empty.
    #[error("connection credential {0} is missing or empty")]
    MissingCredentials(&'static str),
    /// The host names neither the production nor the sandbox endpoint.
    #[error("unsupported marketplace host: {0}")]
    UnsupportedHost(String),
    /// The debug level is not a small non-negative integer.
    #[error("invalid debug level: {0}")]
    InvalidDebugLevel(String),
    /// The settings file could not be read.
    #[error("failed to read configuration file {path}")]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The settings file is not valid JSON.
    #[error("configuration file {path} is not valid JSON")]
    Malformed {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct RawSettings {
    #[serde(default)]
    access_key_id: String,
    #[serde(default)]
    secret_access_key: String,
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_debug_level")]
    debug: u8,
}

fn default_host() -> String {
    PRODUCTION_HOST.to_owned()
}

const fn default_debug_level() -> u8 {
    DEFAULT_DEBUG_LEVEL
}

/// Validated marketplace connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct MarketplaceSettings {
    access_key_id: String,
    secret_access_key: String,
    host: String,
    debug_level: u8,
}

impl std::fmt::Debug for MarketplaceSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketplaceSettings")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("host", &self.host)
            .field("debug_level", &self.debug_level)
            .finish()
    }
}

impl MarketplaceSettings {
    /// Builds settings from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredentials`] for empty credentials and
    /// [`ConfigError::UnsupportedHost`] when the host, after normalization,
    /// is neither the production nor the sandbox endpoint.
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        host: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let access_key_id = access_key_id.into();
        if access_key_id.trim().is_empty() {
            return Err(ConfigError::MissingCredentials("access_key_id"));
        }
        let secret_access_key = secret_access_key.into();
        if secret_access_key.trim().is_empty() {
            return Err(ConfigError::MissingCredentials("secret_access_key"));
        }
        let host = normalize_host(&host.into())?;
        Ok(Self {
            access_key_id,
            secret_access_key,
            host,
            debug_level: DEFAULT_DEBUG_LEVEL,
        })
    }

    /// Sets the client library debug level.
    #[must_use]
    pub const fn with_debug_level(mut self, debug_level: u8) -> Self {
        self.debug_level = debug_level;
        self
    }

    /// Loads settings from a JSON file.
    ///
    /// Expected shape: `{"access_key_id": ..., "secret_access_key": ...,
    /// "host": ..., "debug": ...}`. The host defaults to the production
    /// endpoint and the debug level to [`DEFAULT_DEBUG_LEVEL`] when omitted.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read,
    /// [`ConfigError::Malformed`] when it is not valid JSON, plus the
    /// validation errors of [`Self::new`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        let raw: RawSettings =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Malformed {
                path: path.to_owned(),
                source,
            })?;
        Ok(Self::new(raw.access_key_id, raw.secret_access_key, raw.host)?
            .with_debug_level(raw.debug))
    }

    /// Loads settings from `HITSYNC_ACCESS_KEY_ID`,
    /// `HITSYNC_SECRET_ACCESS_KEY`, `HITSYNC_HOST`, and `HITSYNC_DEBUG`.
    ///
    /// An unset `HITSYNC_HOST` selects the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDebugLevel`] when `HITSYNC_DEBUG` does
    /// not parse, plus the validation errors of [`Self::new`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let access_key_id =
            lookup(ENV_ACCESS_KEY_ID).ok_or(ConfigError::MissingCredentials("access_key_id"))?;
        let secret_access_key = lookup(ENV_SECRET_ACCESS_KEY)
            .ok_or(ConfigError::MissingCredentials("secret_access_key"))?;
        let host = lookup(ENV_HOST).unwrap_or_else(default_host);
        let debug_level = match lookup(ENV_DEBUG) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidDebugLevel(raw))?,
            None => DEFAULT_DEBUG_LEVEL,
        };
        Ok(Self::new(access_key_id, secret_access_key, host)?.with_debug_level(debug_level))
    }

    /// Access key identifier used to sign marketplace requests.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret key used to sign marketplace requests.
    #[must_use]
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Normalized API host the client connects to.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Client library debug verbosity.
    #[must_use]
    pub const fn debug_level(&self) -> u8 {
        self.debug_level
    }

    /// Returns `true` when the settings point at the sandbox endpoint.
    #[must_use]
    pub fn is_sandbox(&self) -> bool {
        self.host == SANDBOX_HOST
    }

    /// Worker-facing site matching the configured endpoint.
    #[must_use]
    pub fn worker_url(&self) -> &'static str {
        if self.is_sandbox() {
            SANDBOX_WORKER_URL
        } else {
            PRODUCTION_WORKER_URL
        }
    }
}

fn normalize_host(host: &str) -> Result<String, ConfigError> {
    let trimmed = host.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let normalized = without_scheme.trim_end_matches('/');
    if normalized.eq_ignore_ascii_case(PRODUCTION_HOST) {
        return Ok(PRODUCTION_HOST.to_owned());
    }
    if normalized.eq_ignore_ascii_case(SANDBOX_HOST) {
        return Ok(SANDBOX_HOST.to_owned());
    }
    Err(ConfigError::UnsupportedHost(trimmed.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, DEFAULT_DEBUG_LEVEL, MarketplaceSettings, PRODUCTION_HOST,
        PRODUCTION_WORKER_URL, SANDBOX_HOST, SANDBOX_WORKER_URL,
    };

    #[test]
    fn accepts_production_host_with_scheme_and_slash() {
        let settings = MarketplaceSettings::new(
            "key",
            "secret",
            "https://mechanicalturk.amazonaws.com/",
        )
        .expect("valid settings");
        assert_eq!(settings.host(), PRODUCTION_HOST);
        assert!(!settings.is_sandbox());
        assert_eq!(settings.worker_url(), PRODUCTION_WORKER_URL);
    }

    #[test]
    fn accepts_sandbox_host_case_insensitively() {
        let settings =
            MarketplaceSettings::new("key", "secret", "Mechanicalturk.Sandbox.Amazonaws.Com")
                .expect("valid settings");
        assert_eq!(settings.host(), SANDBOX_HOST);
        assert!(settings.is_sandbox());
        assert_eq!(settings.worker_url(), SANDBOX_WORKER_URL);
    }

    #[test]
    fn rejects_unknown_host() {
        let result = MarketplaceSettings::new("key", "secret", "example.com");
        assert!(matches!(result, Err(ConfigError::UnsupportedHost(host)) if host == "example.com"));
    }

    #[test]
    fn rejects_empty_credentials() {
        let missing_key = MarketplaceSettings::new("", "secret", SANDBOX_HOST);
        assert!(matches!(
            missing_key,
            Err(ConfigError::MissingCredentials("access_key_id"))
        ));
        let missing_secret = MarketplaceSettings::new("key", "  ", SANDBOX_HOST);
        assert!(matches!(
            missing_secret,
            Err(ConfigError::MissingCredentials("secret_access_key"))
        ));
    }

    #[test]
    fn lookup_defaults_host_to_production() {
        let settings = MarketplaceSettings::from_lookup(|key| match key {
            "HITSYNC_ACCESS_KEY_ID" => Some("key".to_owned()),
            "HITSYNC_SECRET_ACCESS_KEY" => Some("secret".to_owned()),
            _ => None,
        })
        .expect("valid settings");
        assert!(!settings.is_sandbox());
        assert_eq!(settings.host(), PRODUCTION_HOST);
        assert_eq!(settings.debug_level(), DEFAULT_DEBUG_LEVEL);
    }

    #[test]
    fn lookup_reads_debug_level() {
        let settings = MarketplaceSettings::from_lookup(|key| match key {
            "HITSYNC_ACCESS_KEY_ID" => Some("key".to_owned()),
            "HITSYNC_SECRET_ACCESS_KEY" => Some("secret".to_owned()),
            "HITSYNC_DEBUG" => Some("2".to_owned()),
            _ => None,
        })
        .expect("valid settings");
        assert_eq!(settings.debug_level(), 2);
    }

    #[test]
    fn lookup_rejects_a_malformed_debug_level() {
        let result = MarketplaceSettings::from_lookup(|key| match key {
            "HITSYNC_ACCESS_KEY_ID" => Some("key".to_owned()),
            "HITSYNC_SECRET_ACCESS_KEY" => Some("secret".to_owned()),
            "HITSYNC_DEBUG" => Some("verbose".to_owned()),
            _ => None,
        });
        assert!(matches!(result, Err(ConfigError::InvalidDebugLevel(_))));
    }

    #[test]
    fn lookup_requires_credentials() {
        let result = MarketplaceSettings::from_lookup(|_| None);
        assert!(matches!(
            result,
            Err(ConfigError::MissingCredentials("access_key_id"))
        ));
    }

    #[test]
    fn debug_redacts_secret() {
        let settings = MarketplaceSettings::new("key", "hunter2-secret-value", SANDBOX_HOST)
            .expect("valid settings");
        let rendered = format!("{settings:?}");
        assert!(
            !rendered.contains("hunter2-secret-value"),
            "secret leaked: {rendered}"
        );
        assert!(rendered.contains("<redacted>"));
    }
}
