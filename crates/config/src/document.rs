//! Canonical configuration document

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    agent::{AgentConfig, S3Config},
    bridge::{AppConfig, BridgeDeploymentInfo},
    contracts::CoreDeploymentInfo,
    gas::NomadGasConfig,
    network::NetworkInfo,
    schema::SchemaVersion,
    ConfigError,
};

/// A complete deployment description in the current schema shape
///
/// `core`, `bridge`, `agent` and `gas` are keyed by domain name and are
/// expected to cover exactly `networks`. `bridgeGui` and `rpcs` may cover a
/// subset. Every table is always present after normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NomadConfig {
    #[serde(deserialize_with = "nomad_types::deser_nomad_u64")]
    pub version: u64,
    pub environment: String,
    /// Participating domain names, in deployment order
    pub networks: Vec<String>,
    #[serde(default)]
    pub rpcs: BTreeMap<String, BTreeSet<String>>,
    pub protocol: NetworkInfo,
    pub core: BTreeMap<String, CoreDeploymentInfo>,
    pub bridge: BTreeMap<String, BridgeDeploymentInfo>,
    pub agent: BTreeMap<String, AgentConfig>,
    pub gas: BTreeMap<String, NomadGasConfig>,
    #[serde(default)]
    pub bridge_gui: BTreeMap<String, AppConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,
}

impl Default for NomadConfig {
    fn default() -> Self {
        Self {
            version: SchemaVersion::CURRENT.as_u64(),
            environment: String::new(),
            networks: Vec::new(),
            rpcs: BTreeMap::new(),
            protocol: NetworkInfo::default(),
            core: BTreeMap::new(),
            bridge: BTreeMap::new(),
            agent: BTreeMap::new(),
            gas: BTreeMap::new(),
            bridge_gui: BTreeMap::new(),
            s3: None,
        }
    }
}

impl NomadConfig {
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn contains_network(&self, name: &str) -> bool {
        self.networks.iter().any(|n| n == name)
    }
}
