//! Token bridge deployments and bridge front-end settings

use serde::{Deserialize, Deserializer, Serialize};

use nomad_types::{deser_nomad_u32, deser_nomad_u8, NomadIdentifier, NomadLocator, Proxy};

use crate::contracts::{deserialize_by_family, ChainFamily};

/// A custom (non-default) bridged token deployed at deploy time
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployedCustomToken {
    /// Canonical token domain and id
    pub token: NomadLocator,
    pub name: String,
    pub symbol: String,
    #[serde(deserialize_with = "deser_nomad_u8")]
    pub decimals: u8,
    /// Upgrade beacon controller of the local representation
    pub controller: NomadIdentifier,
    /// Local representation
    pub addresses: Proxy,
}

/// Bridge contracts deployed on an EVM chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthereumBridgeDeploymentInfo {
    #[serde(default, deserialize_with = "deser_nomad_u32")]
    pub deploy_height: u32,
    pub bridge_router: Proxy,
    pub token_registry: Proxy,
    pub bridge_token: Proxy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accountant: Option<Proxy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eth_helper: Option<NomadIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customs: Option<Vec<DeployedCustomToken>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstrateBridgeDeploymentInfo {
    #[serde(deserialize_with = "deser_nomad_u32")]
    pub deploy_height: u32,
}

/// Bridge deployment record of one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BridgeDeploymentInfo {
    Ethereum(EthereumBridgeDeploymentInfo),
    Substrate(SubstrateBridgeDeploymentInfo),
}

impl Default for BridgeDeploymentInfo {
    fn default() -> Self {
        BridgeDeploymentInfo::Ethereum(Default::default())
    }
}

impl<'de> Deserialize<'de> for BridgeDeploymentInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_by_family(
            deserializer,
            BridgeDeploymentInfo::Ethereum,
            BridgeDeploymentInfo::Substrate,
        )
    }
}

impl From<EthereumBridgeDeploymentInfo> for BridgeDeploymentInfo {
    fn from(info: EthereumBridgeDeploymentInfo) -> Self {
        BridgeDeploymentInfo::Ethereum(info)
    }
}

impl BridgeDeploymentInfo {
    pub fn family(&self) -> ChainFamily {
        match self {
            BridgeDeploymentInfo::Ethereum(_) => ChainFamily::Ethereum,
            BridgeDeploymentInfo::Substrate(_) => ChainFamily::Substrate,
        }
    }

    pub fn deploy_height(&self) -> u32 {
        match self {
            BridgeDeploymentInfo::Ethereum(info) => info.deploy_height,
            BridgeDeploymentInfo::Substrate(info) => info.deploy_height,
        }
    }

    /// Deployed custom tokens, empty when none were deployed
    pub fn customs(&self) -> &[DeployedCustomToken] {
        match self {
            BridgeDeploymentInfo::Ethereum(info) => info.customs.as_deref().unwrap_or_default(),
            BridgeDeploymentInfo::Substrate(_) => &[],
        }
    }
}

const fn is_false(b: &bool) -> bool {
    !*b
}

/// Per-domain settings for the bridge front-end
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub display_name: String,
    pub native_token_symbol: String,
    /// Domains offered as destinations. Empty means all connections
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub manual_processing: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub connext_enabled: bool,
}
