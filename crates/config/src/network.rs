//! Protocol-level network descriptions
//!
//! One [`Domain`] per participating chain, keyed by name in
//! [`NetworkInfo::networks`]. Domains reference each other by name through
//! `connections`; those references are checked by the validator, not here.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use nomad_types::{
    deser_nomad_u32, deser_nomad_u64, deser_nomad_u8, NomadIdentifier, NomadLocator,
};

/// Governance details
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Governance {
    /// Governor, set on at most one domain of a deployment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governor: Option<NomadLocator>,
    /// Address of the recovery manager on this domain
    pub recovery_manager: NomadIdentifier,
    /// Length of the recovery timelock (in seconds) on this domain
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub recovery_timelock: u64,
}

/// Contract deploy-time configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContractConfig {
    /// Optimistic seconds for replicas to wait
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub optimistic_seconds: u64,
    /// Updater for this network
    pub updater: NomadIdentifier,
    /// Watchers for this network
    #[serde(default)]
    pub watchers: BTreeSet<NomadIdentifier>,
    /// Governance info
    pub governance: Governance,
}

/// Physical chain parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpecs {
    /// EVM chain id. 0 for non-EVM chains
    #[serde(default, deserialize_with = "deser_nomad_u64")]
    pub chain_id: u64,
    /// Block time in seconds
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub block_time: u64,
    /// Blocks until a block is considered final
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub finalization_blocks: u64,
    /// True if the network supports EIP-1559 transactions
    #[serde(default)]
    pub supports_1559: bool,
    /// Desired number of confirmations on transactions
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub confirmations: u64,
    /// Block explorer URL
    #[serde(default)]
    pub block_explorer: String,
    /// Number of blocks to include in a page while indexing
    #[serde(deserialize_with = "deser_nomad_u32")]
    pub index_page_size: u32,
}

/// Specifier for deploy-time custom bridge tokens
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomTokenSpecifier {
    /// Canonical token domain and id
    pub token: NomadLocator,
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "deser_nomad_u8")]
    pub decimals: u8,
}

/// Bridge deploy-time configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BridgeConfiguration {
    /// Wrapped native asset, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weth: Option<NomadIdentifier>,
    /// Custom token deployment specifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customs: Option<Vec<CustomTokenSpecifier>>,
}

/// One participating network
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    /// Network name, unique within a document
    pub name: String,
    /// Protocol-level domain identifier
    #[serde(deserialize_with = "deser_nomad_u32")]
    pub domain: u32,
    /// Names of the networks this one exchanges messages with
    #[serde(default)]
    pub connections: BTreeSet<String>,
    /// Protocol configuration options
    pub configuration: ContractConfig,
    /// Chain specifications
    pub specs: NetworkSpecs,
    /// Bridge contract configuration options
    #[serde(default)]
    pub bridge_configuration: BridgeConfiguration,
}

impl Domain {
    pub fn is_connected_to(&self, name: &str) -> bool {
        self.connections.contains(name)
    }

    /// The governor declared by this domain, if any
    pub fn governor(&self) -> Option<NomadLocator> {
        self.configuration.governance.governor
    }
}

/// Protocol information for all networks of a deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    /// Protocol-level governor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governor: Option<NomadLocator>,
    /// The network information for each network
    pub networks: BTreeMap<String, Domain>,
}

impl NetworkInfo {
    /// Find a domain by numeric id (linear scan; use the resolver index on hot paths)
    pub fn find_by_id(&self, id: u32) -> Option<&Domain> {
        self.networks.values().find(|d| d.domain == id)
    }
}
