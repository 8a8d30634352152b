//! Client error types.
//!
//! [`ClientError`] covers building the client: loading configuration and
//! constructing the HTTP stack.  Failures of individual calls are reported
//! as [`modumentor_chat::TransportError`] instead.

use thiserror::Error;

/// Unified error type for client setup.
#[derive(Error, Debug)]
pub enum ClientError {
    /// An I/O operation failed (e.g. reading the config file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`ClientConfig`](crate::ClientConfig).
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// A configuration value is present but unusable.
    #[error("invalid config value for `{key}`: {reason}")]
    InvalidConfig { key: String, reason: String },

    /// A url could not be parsed or has the wrong scheme.
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Convenience alias used throughout the client crate.
pub type Result<T> = std::result::Result<T, ClientError>;
