//! Client configuration.
//!
//! [`ClientConfig`] is assembled in layers: built-in defaults, then an
//! optional TOML file, then `MODUMENTOR_*` environment variables.  Callers
//! apply command-line flags on top and finish with
//! [`ClientConfig::validate`].
//!
//! ```toml
//! base_url = "http://localhost:5000"
//! push_url = "ws://localhost:5000/ws"
//! user_id = "web-user"
//! request_timeout_secs = 30
//! reconnect_delay_ms = 1000
//! compact_width = 80
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{ClientError, Result};

/// Config file read when no explicit path is given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "config/modumentor.toml";

/// Connection and display settings for the chat client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root url of the assistant's HTTP API.
    pub base_url: String,
    /// WebSocket url of the push channel.  Derived from `base_url` when
    /// unset.
    pub push_url: Option<String>,
    /// User identifier sent with every request.
    pub user_id: String,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Delay before reconnecting the push channel.  `0` disables reconnects.
    pub reconnect_delay_ms: u64,
    /// Terminal widths up to this many columns use the compact layout.
    pub compact_width: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
            push_url: None,
            user_id: "web-user".into(),
            request_timeout_secs: 30,
            reconnect_delay_ms: 1000,
            compact_width: 80,
        }
    }
}

impl ClientConfig {
    /// Parse a config from TOML text.  Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Load defaults, the config file, and environment overrides.
    ///
    /// An explicit `path` must exist.  Without one, [`DEFAULT_CONFIG_PATH`]
    /// is read only if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    debug!("no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Apply `MODUMENTOR_*` overrides from the given variables.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                "MODUMENTOR_BASE_URL" => self.base_url = value,
                "MODUMENTOR_PUSH_URL" => self.push_url = Some(value),
                "MODUMENTOR_USER_ID" => self.user_id = value,
                "MODUMENTOR_TIMEOUT_SECS" => {
                    self.request_timeout_secs = parse_number(&key, &value)?;
                }
                "MODUMENTOR_RECONNECT_MS" => {
                    self.reconnect_delay_ms = parse_number(&key, &value)?;
                }
                _ => continue,
            }
            debug!(key = %key, "environment override applied");
        }
        Ok(())
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        self.push_url()?;
        if self.user_id.trim().is_empty() {
            return Err(ClientError::InvalidConfig {
                key: "user_id".into(),
                reason: "must not be empty".into(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig {
                key: "request_timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// The parsed HTTP base url.
    pub fn base_url(&self) -> Result<Url> {
        parse_url(&self.base_url, &["http", "https"])
    }

    /// The push channel url, explicit or derived from `base_url`.
    pub fn push_url(&self) -> Result<Url> {
        match &self.push_url {
            Some(raw) => parse_url(raw, &["ws", "wss"]),
            None => derive_push_url(&self.base_url()?),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `None` when reconnects are disabled.
    pub fn reconnect_delay(&self) -> Option<Duration> {
        (self.reconnect_delay_ms > 0).then(|| Duration::from_millis(self.reconnect_delay_ms))
    }
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value.trim().parse().map_err(|e| ClientError::InvalidConfig {
        key: key.to_owned(),
        reason: format!("`{value}` is not a number: {e}"),
    })
}

fn parse_url(raw: &str, schemes: &[&str]) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| ClientError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;
    if !schemes.contains(&url.scheme()) {
        return Err(ClientError::InvalidUrl {
            url: raw.to_owned(),
            reason: format!("scheme must be one of {}", schemes.join(", ")),
        });
    }
    Ok(url)
}

/// `http://host:port/prefix` becomes `ws://host:port/prefix/ws`.
fn derive_push_url(base: &Url) -> Result<Url> {
    let scheme = if base.scheme() == "https" { "wss" } else { "ws" };
    let path = format!("{}/ws", base.path().trim_end_matches('/'));

    let mut raw = format!("{scheme}://{}", base.host_str().unwrap_or("localhost"));
    if let Some(port) = base.port() {
        raw.push_str(&format!(":{port}"));
    }
    raw.push_str(&path);
    parse_url(&raw, &["ws", "wss"])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn defaults_are_valid() {
        let config = ClientConfig::default();
        config.validate().unwrap();
        assert_eq!(config.user_id, "web-user");
        assert_eq!(config.push_url().unwrap().as_str(), "ws://localhost:5000/ws");
        assert_eq!(config.reconnect_delay(), Some(Duration::from_millis(1000)));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ClientConfig::from_toml_str("user_id = \"alice\"\n").unwrap();
        assert_eq!(config.user_id, "alice");
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = ClientConfig::from_toml_str("request_timeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, ClientError::ConfigParse(_)));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"https://chat.example.com/bot\"").unwrap();
        writeln!(file, "reconnect_delay_ms = 0").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://chat.example.com/bot");
        assert_eq!(config.reconnect_delay(), None);
        assert_eq!(
            config.push_url().unwrap().as_str(),
            "wss://chat.example.com/bot/ws"
        );
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = ClientConfig::load(Some(Path::new("/nonexistent/modumentor.toml"))).unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn environment_overrides_apply() {
        let mut config = ClientConfig::default();
        config
            .apply_env(vars(&[
                ("MODUMENTOR_BASE_URL", "http://10.0.0.2:8080"),
                ("MODUMENTOR_USER_ID", "tui-user"),
                ("MODUMENTOR_TIMEOUT_SECS", "5"),
                ("MODUMENTOR_RECONNECT_MS", "250"),
                ("UNRELATED", "ignored"),
            ]))
            .unwrap();

        assert_eq!(config.base_url, "http://10.0.0.2:8080");
        assert_eq!(config.user_id, "tui-user");
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.reconnect_delay(), Some(Duration::from_millis(250)));
        assert_eq!(config.push_url().unwrap().as_str(), "ws://10.0.0.2:8080/ws");
    }

    #[test]
    fn non_numeric_env_value_is_rejected() {
        let mut config = ClientConfig::default();
        let err = config
            .apply_env(vars(&[("MODUMENTOR_TIMEOUT_SECS", "thirty")]))
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig { .. }));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad_scheme = ClientConfig {
            base_url: "ftp://example.com".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            bad_scheme.validate(),
            Err(ClientError::InvalidUrl { .. })
        ));

        let bad_push = ClientConfig {
            push_url: Some("http://example.com/ws".into()),
            ..ClientConfig::default()
        };
        assert!(bad_push.validate().is_err());

        let blank_user = ClientConfig {
            user_id: "  ".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(
            blank_user.validate(),
            Err(ClientError::InvalidConfig { .. })
        ));

        let zero_timeout = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }
}
