use crate::fingerprint::FingerprintConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Store bucket name cannot be empty")]
    EmptyBucket,

    #[error("Store root directory cannot be empty")]
    EmptyRoot,
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

impl Listener {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

fn default_admin_listener() -> Listener {
    Listener {
        host: "127.0.0.1".into(),
        port: 3001,
    }
}

/// Backing store selection.
///
/// `gcs` reads a bucket through the JSON API; `endpoint` overrides the
/// public Google endpoint for gateways and tests. `filesystem` serves a
/// local directory tree with the same key semantics.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Gcs {
        bucket: String,
        endpoint: Option<String>,
        bearer_token: Option<String>,
    },
    Filesystem {
        root: String,
    },
}

impl StoreConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            StoreConfig::Gcs { bucket, .. } if bucket.is_empty() => {
                Err(ValidationError::EmptyBucket)
            }
            StoreConfig::Filesystem { root } if root.is_empty() => Err(ValidationError::EmptyRoot),
            _ => Ok(()),
        }
    }
}

/// Router configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener for visitor requests
    #[serde(default)]
    pub listener: Listener,
    /// Admin listener for health and readiness probes
    #[serde(default = "default_admin_listener")]
    pub admin_listener: Listener,
    /// Where the experiment content trees live
    pub store: StoreConfig,
    /// Header names the visitor fingerprint is read from
    #[serde(default)]
    pub fingerprint: FingerprintConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.store.validate()?;
        Ok(())
    }
}
