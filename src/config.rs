//! Probe configuration.
//!
//! ```yaml
//! liveness:
//!   kind: mongo            # adapter kind to inspect
//!   # service_name: adapterMongo   # legacy marker match, wins over `kind`
//!   logger: dbprobe-liveness
//! server:
//!   addr: 0.0.0.0:3001
//!   live_path: /live
//! ```
//!
//! Every field is optional.

use std::path::Path;

use serde::Deserialize;

use crate::adapter::{AdapterKind, AdapterMatch};
use crate::error::Error;

pub const DEFAULT_LOGGER: &str = "dbprobe-liveness";
pub const DEFAULT_ADDR: &str = "0.0.0.0:3001";
pub const DEFAULT_LIVE_PATH: &str = "/live";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub liveness: LivenessConfig,
    pub server: ServerConfig,
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }
}

/// What the checker inspects and where it logs.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LivenessConfig {
    pub kind: AdapterKind,
    pub service_name: Option<String>,
    /// Name attached to every log line the checker writes.
    pub logger: String,
}

impl LivenessConfig {
    pub fn matching(target: AdapterMatch) -> Self {
        match target {
            AdapterMatch::Kind(kind) => Self { kind, ..Self::default() },
            AdapterMatch::ServiceName(name) => Self { service_name: Some(name), ..Self::default() },
        }
    }

    pub fn target(&self) -> AdapterMatch {
        match &self.service_name {
            Some(name) => AdapterMatch::ServiceName(name.clone()),
            None => AdapterMatch::Kind(self.kind.clone()),
        }
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            kind: AdapterKind::Mongo,
            service_name: None,
            logger: DEFAULT_LOGGER.to_owned(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    pub live_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            live_path: DEFAULT_LIVE_PATH.to_owned(),
        }
    }
}
