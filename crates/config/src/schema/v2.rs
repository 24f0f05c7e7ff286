//! Version 2 document shape
//!
//! Field-for-field identical to the current shape. Only the contract record
//! types carry their earlier names.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    agent::{AgentConfig, S3Config},
    bridge::{
        AppConfig, BridgeDeploymentInfo, EthereumBridgeDeploymentInfo,
        SubstrateBridgeDeploymentInfo,
    },
    contracts::{
        deserialize_by_family, CoreDeploymentInfo, EthereumCoreDeploymentInfo,
        SubstrateCoreDeploymentInfo,
    },
    gas::NomadGasConfig,
    network::NetworkInfo,
};

pub type EvmCoreContracts = EthereumCoreDeploymentInfo;
pub type SubstrateCoreContracts = SubstrateCoreDeploymentInfo;
pub type EvmBridgeContracts = EthereumBridgeDeploymentInfo;
pub type SubstrateBridgeContracts = SubstrateBridgeDeploymentInfo;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CoreContracts {
    Evm(EvmCoreContracts),
    Substrate(SubstrateCoreContracts),
}

impl<'de> Deserialize<'de> for CoreContracts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_by_family(deserializer, CoreContracts::Evm, CoreContracts::Substrate)
    }
}

impl From<CoreContracts> for CoreDeploymentInfo {
    fn from(contracts: CoreContracts) -> Self {
        match contracts {
            CoreContracts::Evm(info) => CoreDeploymentInfo::Ethereum(info),
            CoreContracts::Substrate(info) => CoreDeploymentInfo::Substrate(info),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BridgeContracts {
    Evm(EvmBridgeContracts),
    Substrate(SubstrateBridgeContracts),
}

impl<'de> Deserialize<'de> for BridgeContracts {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_by_family(deserializer, BridgeContracts::Evm, BridgeContracts::Substrate)
    }
}

impl From<BridgeContracts> for BridgeDeploymentInfo {
    fn from(contracts: BridgeContracts) -> Self {
        match contracts {
            BridgeContracts::Evm(info) => BridgeDeploymentInfo::Ethereum(info),
            BridgeContracts::Substrate(info) => BridgeDeploymentInfo::Substrate(info),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NomadConfigV2 {
    #[serde(deserialize_with = "nomad_types::deser_nomad_u64")]
    pub version: u64,
    pub environment: String,
    pub networks: Vec<String>,
    #[serde(default)]
    pub rpcs: BTreeMap<String, BTreeSet<String>>,
    pub protocol: NetworkInfo,
    pub core: BTreeMap<String, CoreContracts>,
    pub bridge: BTreeMap<String, BridgeContracts>,
    pub agent: BTreeMap<String, AgentConfig>,
    pub gas: BTreeMap<String, NomadGasConfig>,
    #[serde(default)]
    pub bridge_gui: BTreeMap<String, AppConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3Config>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_core_contracts_rename() {
        let contracts: CoreContracts =
            serde_json::from_value(json!({ "deployHeight": 5 })).unwrap();
        assert_eq!(
            CoreDeploymentInfo::from(contracts),
            CoreDeploymentInfo::Substrate(SubstrateCoreDeploymentInfo { deploy_height: 5 })
        );
    }
}
