//! Configuration for the relocation subsystem

use crate::errors::{TravelError, TravelResult};
use crate::ids::Realm;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Distance from an anchor within which relocation is authorized
pub const DEFAULT_PROXIMITY_RADIUS: f64 = 25.0;

/// Seconds a pending request waits for an answer
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Relocation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelConfig {
    /// Authorization radius around every anchor
    pub proximity_radius: f64,

    /// Lifetime of a pending request in seconds
    pub request_timeout_secs: u64,

    /// The only realm in which relocation commands work
    pub home_realm: Realm,

    /// Directory of persisted actor records
    pub record_dir: Option<PathBuf>,
}

impl Default for TravelConfig {
    fn default() -> Self {
        Self {
            proximity_radius: DEFAULT_PROXIMITY_RADIUS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            home_realm: Realm::overworld(),
            record_dir: None,
        }
    }
}

impl TravelConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing path or file yields the defaults.
    pub fn load(path: Option<&Path>) -> TravelResult<Self> {
        let config = match path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path)?;
                Self::from_toml(&contents)?
            }
            _ => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(contents: &str) -> TravelResult<Self> {
        toml::from_str(contents).map_err(|e| TravelError::Config(e.to_string()))
    }

    /// Reject settings that would make every check fail or never expire
    pub fn validate(&self) -> TravelResult<()> {
        if !self.proximity_radius.is_finite() || self.proximity_radius <= 0.0 {
            return Err(TravelError::Config(format!(
                "proximity_radius must be positive, got {}",
                self.proximity_radius
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(TravelError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Request lifetime as a duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
