//! Core messaging contract deployments

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

use nomad_types::{deser_nomad_u32, NomadIdentifier, Proxy};

/// Chain family of a deployment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    Ethereum,
    Substrate,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Ethereum => "ethereum",
            ChainFamily::Substrate => "substrate",
        }
    }
}

impl std::fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Core contracts deployed on an EVM chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthereumCoreDeploymentInfo {
    /// Block at which the contracts were deployed
    #[serde(default, deserialize_with = "deser_nomad_u32")]
    pub deploy_height: u32,
    pub upgrade_beacon_controller: NomadIdentifier,
    pub x_app_connection_manager: NomadIdentifier,
    pub updater_manager: NomadIdentifier,
    pub governance_router: Proxy,
    pub home: Proxy,
    /// Remote domain name -> that remote's replica on this chain
    #[serde(default)]
    pub replicas: BTreeMap<String, Proxy>,
}

/// Core contracts deployed on a Substrate chain
///
/// The pallets live at fixed locations, so only the deploy height is recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstrateCoreDeploymentInfo {
    #[serde(deserialize_with = "deser_nomad_u32")]
    pub deploy_height: u32,
}

/// Core deployment record of one domain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CoreDeploymentInfo {
    Ethereum(EthereumCoreDeploymentInfo),
    Substrate(SubstrateCoreDeploymentInfo),
}

impl Default for CoreDeploymentInfo {
    fn default() -> Self {
        CoreDeploymentInfo::Ethereum(Default::default())
    }
}

/// Substrate records carry nothing but `deployHeight`
fn is_substrate_shape(value: &serde_json::Value) -> bool {
    match value.as_object() {
        Some(map) => map.keys().all(|k| k == "deployHeight"),
        None => false,
    }
}

/// Pick the chain family of a deployment record from its key set
///
/// Errors inside an EVM record surface as themselves instead of as the
/// opaque "no variant matched" of an untagged enum.
pub(crate) fn deserialize_by_family<'de, D, E, S, T>(
    deserializer: D,
    ethereum: impl FnOnce(E) -> T,
    substrate: impl FnOnce(S) -> T,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    E: DeserializeOwned,
    S: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if is_substrate_shape(&value) {
        S::deserialize(value)
            .map(substrate)
            .map_err(serde::de::Error::custom)
    } else {
        E::deserialize(value)
            .map(ethereum)
            .map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for CoreDeploymentInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_by_family(
            deserializer,
            CoreDeploymentInfo::Ethereum,
            CoreDeploymentInfo::Substrate,
        )
    }
}

impl From<EthereumCoreDeploymentInfo> for CoreDeploymentInfo {
    fn from(info: EthereumCoreDeploymentInfo) -> Self {
        CoreDeploymentInfo::Ethereum(info)
    }
}

impl From<SubstrateCoreDeploymentInfo> for CoreDeploymentInfo {
    fn from(info: SubstrateCoreDeploymentInfo) -> Self {
        CoreDeploymentInfo::Substrate(info)
    }
}

impl CoreDeploymentInfo {
    pub fn family(&self) -> ChainFamily {
        match self {
            CoreDeploymentInfo::Ethereum(_) => ChainFamily::Ethereum,
            CoreDeploymentInfo::Substrate(_) => ChainFamily::Substrate,
        }
    }

    pub fn deploy_height(&self) -> u32 {
        match self {
            CoreDeploymentInfo::Ethereum(info) => info.deploy_height,
            CoreDeploymentInfo::Substrate(info) => info.deploy_height,
        }
    }

    /// Enrolled replicas. Always empty for Substrate records
    pub fn replicas(&self) -> impl Iterator<Item = (&String, &Proxy)> {
        let replicas = match self {
            CoreDeploymentInfo::Ethereum(info) => Some(&info.replicas),
            CoreDeploymentInfo::Substrate(_) => None,
        };
        replicas.into_iter().flat_map(|r| r.iter())
    }

    pub fn has_replica(&self, remote: &str) -> bool {
        self.replica_of(remote).is_some()
    }

    /// The replica of `remote` enrolled on this domain
    pub fn replica_of(&self, remote: &str) -> Option<&Proxy> {
        match self {
            CoreDeploymentInfo::Ethereum(info) => info.replicas.get(remote),
            CoreDeploymentInfo::Substrate(_) => None,
        }
    }

    pub(crate) fn retain_replicas(&mut self, mut keep: impl FnMut(&str) -> bool) {
        if let CoreDeploymentInfo::Ethereum(info) = self {
            info.replicas.retain(|name, _| keep(name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn proxy(n: u8) -> serde_json::Value {
        let addr = format!("0x{:040x}", n);
        json!({ "implementation": addr, "proxy": addr, "beacon": addr })
    }

    #[test]
    fn test_ethereum_variant_selected() {
        let value = json!({
            "deployHeight": 100,
            "upgradeBeaconController": "0x0000000000000000000000000000000000000001",
            "xAppConnectionManager": "0x0000000000000000000000000000000000000002",
            "updaterManager": "0x0000000000000000000000000000000000000003",
            "governanceRouter": proxy(4),
            "home": proxy(5),
            "replicas": { "moonbeam": proxy(6) }
        });
        let core: CoreDeploymentInfo = serde_json::from_value(value).unwrap();
        assert_eq!(core.family(), ChainFamily::Ethereum);
        assert_eq!(core.deploy_height(), 100);
        assert!(core.has_replica("moonbeam"));
        assert!(!core.has_replica("polkadot"));
    }

    #[test]
    fn test_substrate_variant_selected() {
        let core: CoreDeploymentInfo =
            serde_json::from_value(json!({ "deployHeight": "0x10" })).unwrap();
        assert_eq!(core.family(), ChainFamily::Substrate);
        assert_eq!(core.deploy_height(), 16);
        assert_eq!(core.replicas().count(), 0);
        assert!(core.replica_of("anything").is_none());
    }

    #[test]
    fn test_broken_ethereum_record_reports_field() {
        let err = serde_json::from_value::<CoreDeploymentInfo>(json!({
            "deployHeight": 1,
            "home": proxy(5)
        }))
        .unwrap_err();
        assert!(err.to_string().contains("upgradeBeaconController"));
    }

    #[test]
    fn test_serializes_untagged() {
        let core = CoreDeploymentInfo::Substrate(SubstrateCoreDeploymentInfo { deploy_height: 7 });
        assert_eq!(serde_json::to_value(&core).unwrap(), json!({ "deployHeight": 7 }));
    }
}
