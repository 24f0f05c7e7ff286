//! Version 1 document shape
//!
//! Gas limits were flat fields on each domain and agents carried a global
//! `timelag` plus per-role `enabled` flags. Contracts were EVM-only.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use nomad_types::{
    deser_nomad_opt_u64, deser_nomad_u32, deser_nomad_u64, NomadIdentifier, NomadLocator, Proxy,
};

use crate::{
    agent::{LogConfig, RpcStyle},
    bridge::{AppConfig, DeployedCustomToken},
    contracts::EthereumCoreDeploymentInfo,
    network::{CustomTokenSpecifier, Governance, NetworkSpecs},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContractConfigV1 {
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub optimistic_seconds: u64,
    #[serde(default, deserialize_with = "deser_nomad_opt_u64")]
    pub process_gas: Option<u64>,
    #[serde(default, deserialize_with = "deser_nomad_opt_u64")]
    pub reserve_gas: Option<u64>,
    #[serde(default, deserialize_with = "deser_nomad_opt_u64")]
    pub maximum_gas: Option<u64>,
    pub updater: NomadIdentifier,
    #[serde(default)]
    pub watchers: BTreeSet<NomadIdentifier>,
    pub governance: Governance,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BridgeConfigurationV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weth: Option<NomadIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customs: Option<Vec<CustomTokenSpecifier>>,
    #[serde(default, deserialize_with = "deser_nomad_opt_u64")]
    pub mint_gas: Option<u64>,
    #[serde(default, deserialize_with = "deser_nomad_opt_u64")]
    pub deploy_gas: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DomainV1 {
    pub name: String,
    #[serde(deserialize_with = "deser_nomad_u32")]
    pub domain: u32,
    #[serde(default)]
    pub connections: BTreeSet<String>,
    pub configuration: ContractConfigV1,
    pub specs: NetworkSpecs,
    #[serde(default)]
    pub bridge_configuration: BridgeConfigurationV1,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NetworkInfoV1 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governor: Option<NomadLocator>,
    pub networks: BTreeMap<String, DomainV1>,
}

/// Same fields as the later EVM core record
pub type EvmCoreContractsV1 = EthereumCoreDeploymentInfo;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EvmBridgeContractsV1 {
    #[serde(default, deserialize_with = "deser_nomad_u32")]
    pub deploy_height: u32,
    pub bridge_router: Proxy,
    pub token_registry: Proxy,
    pub bridge_token: Proxy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth_helper: Option<NomadIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customs: Option<Vec<DeployedCustomToken>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BaseAgentConfigV1 {
    #[serde(default)]
    pub enabled: bool,
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub interval: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AgentConfigV1 {
    #[serde(default)]
    pub rpc_style: RpcStyle,
    #[serde(default, deserialize_with = "deser_nomad_opt_u64")]
    pub timelag: Option<u64>,
    pub db: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<u16>,
    #[serde(default)]
    pub logging: LogConfig,
    pub updater: BaseAgentConfigV1,
    pub relayer: BaseAgentConfigV1,
    pub processor: BaseAgentConfigV1,
    pub watcher: BaseAgentConfigV1,
    pub kathy: BaseAgentConfigV1,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NomadConfigV1 {
    #[serde(deserialize_with = "deser_nomad_u64")]
    pub version: u64,
    pub environment: String,
    pub networks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpcs: Option<BTreeMap<String, BTreeSet<String>>>,
    pub protocol: NetworkInfoV1,
    pub core: BTreeMap<String, EvmCoreContractsV1>,
    pub bridge: BTreeMap<String, EvmBridgeContractsV1>,
    pub agent: BTreeMap<String, AgentConfigV1>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bridge_gui: Option<BTreeMap<String, AppConfig>>,
}
